///  To run :
///  cargo r --example client_example
use bookstore_client::BookstoreClient;
use bookstore_hex::application::Services;
use bookstore_hex::inbound::http::{HttpServer, HttpServerConfig};
use bookstore_repo::build_repo;
use bookstore_types::domain::book::NewBook;
use bookstore_types::domain::order::OrderStatus;
use bookstore_types::domain::page::PageRequest;
use bookstore_types::domain::search::BookSearchParameters;
use bookstore_types::domain::user::NewUser;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn book(title: &str, author: &str, isbn: &str, cents: i64) -> NewBook {
    NewBook {
        title: title.into(),
        author: author.into(),
        isbn: isbn.into(),
        price: Decimal::new(cents, 2),
        description: None,
        cover_image: None,
        category_ids: Default::default(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("bookstore.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let services = Services::new(build_repo(Some(&db_url)).await?);
    let admin = services.users.ensure_admin("admin@example.com").await?;
    let server = HttpServer::new(
        services,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let client = BookstoreClient::new(&addr)?;
    client.health().await?;
    let as_admin = client.as_user(admin.id);

    let it = as_admin
        .create_book(&book("It", "Stephen King", "978-1501142970", 1000))
        .await?;
    let hobbit = as_admin
        .create_book(&book("The Hobbit", "J.R.R. Tolkien", "978-0261102217", 500))
        .await?;
    println!("Created books {} and {}", it.id, hobbit.id);

    let reader = client
        .register(&NewUser {
            email: "reader@example.com".into(),
            first_name: "Example".into(),
            last_name: "Reader".into(),
            shipping_address: Some("1 Main Street".into()),
        })
        .await?;
    let as_reader = client.as_user(reader.id);

    let found = as_reader
        .search_books(
            &BookSearchParameters::new().with("author", &["king", "tolkien"]),
            PageRequest::default(),
        )
        .await?;
    println!("Search matched {} books", found.total_elements);
    assert_eq!(found.total_elements, 2);

    as_reader.add_to_cart(it.id, 2).await?;
    let cart = as_reader.add_to_cart(hobbit.id, 1).await?;
    println!("Cart holds {} lines", cart.cart_items.len());

    let order = as_reader.create_order("1 Main Street").await?;
    println!("Placed order id={} total={}", order.id, order.total);
    assert_eq!(order.total, Decimal::new(2500, 2));
    assert!(as_reader.get_cart().await?.cart_items.is_empty());

    let updated = as_admin
        .update_order_status(order.id, OrderStatus::Processing)
        .await?;
    println!("Updated status={:?} for id {:?}", updated.status, updated.id);

    let items = as_reader.order_items(order.id).await?;
    println!("Order has {} items", items.len());

    as_admin.delete_order(order.id).await?;
    println!("Deleted order");

    handle.abort();
    Ok(())
}
