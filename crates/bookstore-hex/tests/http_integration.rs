use bookstore_hex::application::Services;
use bookstore_hex::inbound::http::{HttpServer, HttpServerConfig, USER_ID_HEADER};
use bookstore_repo::memory::InMemoryRepo;
use bookstore_types::domain::book::Book;
use bookstore_types::domain::cart::CartView;
use bookstore_types::domain::order::{Order, OrderStatus};
use bookstore_types::domain::page::Page;
use bookstore_types::domain::user::User;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

struct Running {
    addr: String,
    admin: Uuid,
    handle: tokio::task::JoinHandle<()>,
}

async fn start() -> Running {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };

    let services = Services::new(InMemoryRepo::new());
    let admin = services
        .users
        .ensure_admin("admin@example.com")
        .await
        .unwrap()
        .id;
    let server = HttpServer::new(services, config).await.unwrap();

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });

    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    Running {
        addr: format!("http://127.0.0.1:{}", port),
        admin,
        handle,
    }
}

async fn register(client: &reqwest::Client, addr: &str, email: &str) -> User {
    let res = client
        .post(format!("{}/auth/registration", addr))
        .json(&json!({
            "email": email,
            "first_name": "Http",
            "last_name": "User",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn catalogue_cart_and_order_over_http() {
    let server = start().await;
    let addr = &server.addr;
    let client = reqwest::Client::new();
    let user = register(&client, addr, "http@example.com").await;

    let mut books = Vec::new();
    for (title, author, isbn, price) in [
        ("It", "Stephen King", "1", "10.00"),
        ("The Hobbit", "J.R.R. Tolkien", "2", "5.00"),
    ] {
        let res = client
            .post(format!("{}/books", addr))
            .header(USER_ID_HEADER, server.admin.to_string())
            .json(&json!({
                "title": title,
                "author": author,
                "isbn": isbn,
                "price": price,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
        books.push(res.json::<Book>().await.unwrap());
    }

    let found: Page<Book> = client
        .get(format!("{}/books/search?author=king,TOLKIEN&title=hob", addr))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.total_elements, 1);
    assert_eq!(found.content[0].id, books[1].id);

    let res = client
        .get(format!("{}/books/search?isbn=1", addr))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    for (book, quantity) in [(&books[0], 2), (&books[1], 1)] {
        let res = client
            .post(format!("{}/cart", addr))
            .header(USER_ID_HEADER, user.id.to_string())
            .json(&json!({ "book_id": book.id, "quantity": quantity }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    }
    let cart: CartView = client
        .get(format!("{}/cart", addr))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart.cart_items.len(), 2);

    let res = client
        .put(format!("{}/cart/items/{}", addr, cart.cart_items[0].id))
        .header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/orders", addr))
        .header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "shipping_address": "1 Main Street" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let order: Order = res.json().await.unwrap();
    assert_eq!(order.total, Decimal::new(2500, 2));
    assert_eq!(order.status, OrderStatus::Pending);

    let res = client
        .patch(format!("{}/orders/{}", addr, order.id))
        .header(USER_ID_HEADER, server.admin.to_string())
        .json(&json!({ "status": OrderStatus::Processing }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::ACCEPTED);
    let updated: Order = res.json().await.unwrap();
    assert_eq!(updated.status, OrderStatus::Processing);

    let res = client
        .get(format!("{}/orders/{}/items", addr, order.id))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = client
        .delete(format!("{}/orders/{}", addr, order.id))
        .header(USER_ID_HEADER, server.admin.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);

    // stop server task
    server.handle.abort();
}

#[tokio::test]
async fn auth_roles_and_error_statuses() {
    let server = start().await;
    let addr = &server.addr;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", addr)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = client.get(format!("{}/books", addr)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
    let res = client
        .get(format!("{}/books", addr))
        .header(USER_ID_HEADER, Uuid::new_v4().to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let user = register(&client, addr, "plain@example.com").await;
    let res = client
        .post(format!("{}/categories", addr))
        .header(USER_ID_HEADER, user.id.to_string())
        .json(&json!({ "name": "Horror" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/auth/registration", addr))
        .json(&json!({
            "email": "plain@example.com",
            "first_name": "Again",
            "last_name": "User",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    let res = client
        .get(format!("{}/books/not-a-uuid", addr))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/books/{}", addr, Uuid::new_v4()))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/cart/items/{}", addr, Uuid::new_v4()))
        .header(USER_ID_HEADER, user.id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    server.handle.abort();
}
