use bookstore_hex::application::Services;
use bookstore_hex::errors::AppError;
use bookstore_repo::memory::InMemoryRepo;
use bookstore_types::domain::book::{Book, NewBook};
use bookstore_types::domain::order::OrderStatus;
use bookstore_types::domain::page::PageRequest;
use bookstore_types::domain::search::BookSearchParameters;
use bookstore_types::domain::user::{NewUser, User};
use rust_decimal::Decimal;

fn new_book(title: &str, author: &str, isbn: &str, cents: i64) -> NewBook {
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

async fn register(services: &Services<InMemoryRepo>, email: &str) -> User {
    services
        .users
        .register(NewUser {
            email: email.into(),
            first_name: "Test".into(),
            last_name: "Reader".into(),
            shipping_address: None,
        })
        .await
        .unwrap()
}

async fn catalogue(services: &Services<InMemoryRepo>) -> Vec<Book> {
    let mut books = Vec::new();
    for (i, (title, author)) in [
        ("It", "Stephen King"),
        ("The Shining", "Stephen King"),
        ("The Hobbit", "J.R.R. Tolkien"),
        ("The Silmarillion", "J.R.R. Tolkien"),
        ("Dune", "Frank Herbert"),
    ]
    .into_iter()
    .enumerate()
    {
        books.push(
            services
                .books
                .create_book(new_book(title, author, &format!("isbn-{i}"), 1000))
                .await
                .unwrap(),
        );
    }
    books
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

// Search, cart and checkout end to end against the in-memory adapter.
#[tokio::test]
async fn browse_fill_cart_and_checkout_flow() {
    let services = Services::new(InMemoryRepo::new());
    let books = catalogue(&services).await;
    let reader = register(&services, "reader@example.com").await;

    let found = services
        .books
        .search_books(
            &BookSearchParameters::new().with("author", &["KING", "herbert"]),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(titles(&found.content), ["Dune", "It", "The Shining"]);

    let found = services
        .books
        .search_books(
            &BookSearchParameters::new()
                .with("author", &["tolkien", "king"])
                .with("title", &["sil", "shin"]),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(titles(&found.content), ["The Shining", "The Silmarillion"]);

    let everything = services
        .books
        .search_books(&BookSearchParameters::new(), PageRequest::new(0, 2))
        .await
        .unwrap();
    assert_eq!(everything.total_elements, 5);
    assert_eq!(everything.total_pages(), 3);

    let (it, dune) = (&books[0], &books[4]);
    services.carts.add_item(reader.id, it.id, 2).await.unwrap();
    services.carts.add_item(reader.id, dune.id, 1).await.unwrap();
    let cart = services.carts.add_item(reader.id, it.id, 3).await.unwrap();
    assert_eq!(cart.cart_items.len(), 2);
    let it_line = cart
        .cart_items
        .iter()
        .find(|line| line.book_id == it.id)
        .unwrap();
    assert_eq!(it_line.quantity, 5);

    let res = services.carts.update_quantity(reader.id, it_line.id, 0).await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
    let cart = services
        .carts
        .update_quantity(reader.id, it_line.id, 2)
        .await
        .unwrap();
    assert_eq!(
        cart.cart_items.iter().map(|l| l.quantity).sum::<u32>(),
        3
    );

    let order = services
        .orders
        .create_order(reader.id, "221B Baker Street".into())
        .await
        .unwrap();
    assert_eq!(order.total, Decimal::new(3000, 2));
    assert!(services
        .carts
        .get_cart(reader.id)
        .await
        .unwrap()
        .cart_items
        .is_empty());

    let mut repriced = new_book("It", "Stephen King", "isbn-0", 4200);
    repriced.description = Some("Now in hardcover".into());
    services.books.update_book(it.id, repriced).await.unwrap();
    let items = services
        .orders
        .get_items_for_user(reader.id, order.id)
        .await
        .unwrap();
    let line = items.iter().find(|i| i.book_id == it.id).unwrap();
    assert_eq!(line.price, Decimal::new(1000, 2));
    let mine = services
        .orders
        .get_orders(reader.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.content[0].total, Decimal::new(3000, 2));
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
    let services = Services::new(InMemoryRepo::new());
    let books = catalogue(&services).await;
    let alice = register(&services, "alice@example.com").await;
    let mallory = register(&services, "mallory@example.com").await;

    services.carts.add_item(alice.id, books[0].id, 1).await.unwrap();
    let order = services
        .orders
        .create_order(alice.id, "1 Wonderland Way".into())
        .await
        .unwrap();

    let peek = services.orders.get_items_for_user(mallory.id, order.id).await;
    assert!(matches!(peek, Err(AppError::NotFound(_))));
    let peek = services
        .orders
        .get_item(mallory.id, order.id, order.items[0].id)
        .await;
    assert!(matches!(peek, Err(AppError::NotFound(_))));
    let theirs = services
        .orders
        .get_orders(mallory.id, PageRequest::default())
        .await
        .unwrap();
    assert!(theirs.content.is_empty());

    let res = services
        .carts
        .delete_item(mallory.id, uuid::Uuid::new_v4())
        .await;
    assert!(matches!(res, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn admin_lifecycle_of_an_order() {
    let services = Services::new(InMemoryRepo::new());
    let books = catalogue(&services).await;
    let buyer = register(&services, "buyer@example.com").await;
    services.carts.add_item(buyer.id, books[2].id, 1).await.unwrap();
    let order = services
        .orders
        .create_order(buyer.id, "42 Hobbiton Lane".into())
        .await
        .unwrap();

    let order = services
        .orders
        .update_order_status(order.id, OrderStatus::Processing)
        .await
        .unwrap();
    let res = services
        .orders
        .update_order_status(order.id, OrderStatus::Pending)
        .await;
    assert!(matches!(res, Err(AppError::BadRequest(_))));
    assert_eq!(
        services.orders.get_items_for_admin(order.id).await.unwrap(),
        order.items
    );

    services.orders.delete_order(order.id).await.unwrap();
    let res = services.orders.get_order_by_id(order.id).await;
    assert!(matches!(res, Err(AppError::NotFound(_))));
}
