use async_trait::async_trait;
use bookstore_types::domain::book::Book;
use bookstore_types::domain::cart::{CartItem, ShoppingCart};
use bookstore_types::domain::category::Category;
use bookstore_types::domain::order::{Order, OrderItem, OrderStatus};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::domain::search::{BookField, BookPredicate};
use bookstore_types::domain::user::{Role, User};
use bookstore_types::ports::book_repository::BookRepository;
use bookstore_types::ports::cart_repository::CartRepository;
use bookstore_types::ports::category_repository::CategoryRepository;
use bookstore_types::ports::order_repository::OrderRepository;
use bookstore_types::ports::user_repository::UserRepository;
use bookstore_types::ports::RepoError;
use chrono::{DateTime, SecondsFormat, Utc};
use crate::status_changed;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

const BOOK_COLUMNS: &str = "b.id, b.title, b.author, b.isbn, b.price, b.description, \
     b.cover_image, b.is_deleted, \
     (SELECT GROUP_CONCAT(bc.category_id) FROM books_categories bc WHERE bc.book_id = b.id) \
     AS category_ids";

const ORDER_COLUMNS: &str = "id, user_id, status, total, created_at, shipping_address";

fn db_err(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::DbError(e.to_string()),
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(|e| RepoError::DbError(e.to_string()))
}

fn parse_decimal(s: &str) -> Result<Decimal, RepoError> {
    Decimal::from_str(s).map_err(|e| RepoError::DbError(e.to_string()))
}

fn parse_quantity(q: i64) -> Result<u32, RepoError> {
    u32::try_from(q).map_err(|e| RepoError::DbError(e.to_string()))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn page_bounds(page: PageRequest) -> (i64, i64) {
    (
        i64::from(page.size),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

#[derive(FromRow)]
struct DbBook {
    id: String,
    title: String,
    author: String,
    isbn: String,
    price: String,
    description: Option<String>,
    cover_image: Option<String>,
    is_deleted: bool,
    category_ids: Option<String>,
}

impl DbBook {
    fn into_book(self) -> Result<Book, RepoError> {
        let category_ids = self
            .category_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(parse_uuid)
            .collect::<Result<_, _>>()?;
        Ok(Book {
            id: parse_uuid(&self.id)?,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            price: parse_decimal(&self.price)?,
            description: self.description,
            cover_image: self.cover_image,
            category_ids,
            deleted: self.is_deleted,
        })
    }
}

#[derive(FromRow)]
struct DbCategory {
    id: String,
    name: String,
    description: Option<String>,
    is_deleted: bool,
}

impl DbCategory {
    fn into_category(self) -> Result<Category, RepoError> {
        Ok(Category {
            id: parse_uuid(&self.id)?,
            name: self.name,
            description: self.description,
            deleted: self.is_deleted,
        })
    }
}

#[derive(FromRow)]
struct DbUser {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    shipping_address: Option<String>,
    role: String,
}

impl DbUser {
    fn into_user(self) -> Result<User, RepoError> {
        let role = match self.role.as_str() {
            "Admin" => Role::Admin,
            "User" => Role::User,
            other => return Err(RepoError::DbError(format!("unknown role {other}"))),
        };
        Ok(User {
            id: parse_uuid(&self.id)?,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            shipping_address: self.shipping_address,
            role,
        })
    }
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::User => "User",
    }
}

#[derive(FromRow)]
struct DbCartItem {
    id: String,
    book_id: String,
    quantity: i64,
}

#[derive(FromRow)]
struct DbOrder {
    id: String,
    user_id: String,
    status: String,
    total: String,
    created_at: String,
    shipping_address: String,
}

#[derive(FromRow)]
struct DbOrderItem {
    id: String,
    book_id: String,
    book_title: String,
    quantity: i64,
    price: String,
}

impl DbOrderItem {
    fn into_item(self) -> Result<OrderItem, RepoError> {
        Ok(OrderItem {
            id: parse_uuid(&self.id)?,
            book_id: parse_uuid(&self.book_id)?,
            book_title: self.book_title,
            quantity: parse_quantity(self.quantity)?,
            price: parse_decimal(&self.price)?,
        })
    }
}

impl DbOrder {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepoError> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| RepoError::DbError(format!("unknown order status {}", self.status)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| RepoError::DbError(e.to_string()))?
            .with_timezone(&Utc);
        Ok(Order {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            status,
            total: parse_decimal(&self.total)?,
            created_at,
            shipping_address: self.shipping_address,
            items,
        })
    }
}

/// Appends a SQL rendering of `predicate` over the `books b` alias, pushing
/// one bind argument per placeholder.
fn push_predicate(predicate: &BookPredicate, sql: &mut String, args: &mut Vec<String>) {
    match predicate {
        BookPredicate::Always => sql.push_str("1 = 1"),
        BookPredicate::FieldContains { field, needle } => {
            sql.push_str("b.");
            sql.push_str(folded_column(*field));
            sql.push_str(" LIKE ? ESCAPE '\\'");
            args.push(format!("%{}%", escape_like(needle)));
        }
        BookPredicate::AnyOf(ps) => push_joined(ps, " OR ", "1 = 0", sql, args),
        BookPredicate::AllOf(ps) => push_joined(ps, " AND ", "1 = 1", sql, args),
        BookPredicate::InCategory(id) => {
            sql.push_str("b.id IN (SELECT book_id FROM books_categories WHERE category_id = ?)");
            args.push(id.to_string());
        }
    }
}

// SQLite's LOWER() only folds ASCII, so searchable text is stored
// lowercased by `str::to_lowercase`, the same folding the needle gets.
fn folded_column(field: BookField) -> &'static str {
    match field {
        BookField::Title => "title_lc",
        BookField::Author => "author_lc",
    }
}

fn push_joined(
    ps: &[BookPredicate],
    op: &str,
    empty: &str,
    sql: &mut String,
    args: &mut Vec<String>,
) {
    if ps.is_empty() {
        sql.push_str(empty);
        return;
    }
    sql.push('(');
    for (i, p) in ps.iter().enumerate() {
        if i > 0 {
            sql.push_str(op);
        }
        push_predicate(p, sql, args);
    }
    sql.push(')');
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl SqliteRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_bookstore.sql");
        for statement in ddl.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    async fn order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, RepoError> {
        let rows: Vec<DbOrderItem> = sqlx::query_as(
            "SELECT id, book_id, book_title, quantity, price FROM order_items
             WHERE order_id = ? ORDER BY position",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(DbOrderItem::into_item).collect()
    }

    async fn hydrate_order(&self, row: DbOrder) -> Result<Order, RepoError> {
        let items = self.order_items(&row.id).await?;
        row.into_order(items)
    }

    async fn cart_items(&self, cart_id: &str) -> Result<Vec<CartItem>, RepoError> {
        let rows: Vec<DbCartItem> = sqlx::query_as(
            "SELECT id, book_id, quantity FROM cart_items
             WHERE shopping_cart_id = ? ORDER BY position",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter()
            .map(|r| {
                Ok(CartItem {
                    id: parse_uuid(&r.id)?,
                    book_id: parse_uuid(&r.book_id)?,
                    quantity: parse_quantity(r.quantity)?,
                })
            })
            .collect()
    }

    async fn commit(tx: Transaction<'_, Sqlite>) -> Result<(), RepoError> {
        tx.commit().await.map_err(db_err)
    }
}

#[async_trait]
impl BookRepository for SqliteRepo {
    async fn save_book(&self, book: Book) -> Result<Book, RepoError> {
        let id = book.id.to_string();
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "INSERT INTO books (id, title, author, title_lc, author_lc, isbn, price, description,
                                cover_image, is_deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title, author = excluded.author,
                title_lc = excluded.title_lc, author_lc = excluded.author_lc, isbn = excluded.isbn,
                price = excluded.price, description = excluded.description,
                cover_image = excluded.cover_image, is_deleted = excluded.is_deleted",
        )
        .bind(&id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.title.to_lowercase())
        .bind(book.author.to_lowercase())
        .bind(&book.isbn)
        .bind(book.price.to_string())
        .bind(&book.description)
        .bind(&book.cover_image)
        .bind(book.deleted)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM books_categories WHERE book_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        for category_id in &book.category_ids {
            sqlx::query("INSERT INTO books_categories (book_id, category_id) VALUES (?, ?)")
                .bind(&id)
                .bind(category_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        Self::commit(tx).await?;
        Ok(book)
    }

    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, RepoError> {
        let sql = format!("SELECT {} FROM books b WHERE b.id = ? AND b.is_deleted = 0", BOOK_COLUMNS);
        let row: Option<DbBook> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(DbBook::into_book).transpose()
    }

    async fn find_books(
        &self,
        predicate: &BookPredicate,
        page: PageRequest,
    ) -> Result<Page<Book>, RepoError> {
        let mut clause = String::new();
        let mut args = Vec::new();
        push_predicate(predicate, &mut clause, &mut args);

        let count_sql = format!("SELECT COUNT(*) FROM books b WHERE b.is_deleted = 0 AND {}", clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for a in &args {
            count = count.bind(a.clone());
        }
        let total = count.fetch_one(&self.pool).await.map_err(db_err)?;

        let select_sql = format!(
            "SELECT {} FROM books b WHERE b.is_deleted = 0 AND {} ORDER BY b.title, b.id LIMIT ? OFFSET ?",
            BOOK_COLUMNS, clause
        );
        let (limit, offset) = page_bounds(page);
        let mut select = sqlx::query_as::<_, DbBook>(&select_sql);
        for a in &args {
            select = select.bind(a.clone());
        }
        let rows = select
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Page {
            content: rows
                .into_iter()
                .map(DbBook::into_book)
                .collect::<Result<_, _>>()?,
            page: page.page,
            size: page.size,
            total_elements: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("UPDATE books SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl CategoryRepository for SqliteRepo {
    async fn save_category(&self, category: Category) -> Result<Category, RepoError> {
        sqlx::query(
            "INSERT INTO categories (id, name, description, is_deleted) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, description = excluded.description,
                is_deleted = excluded.is_deleted",
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.deleted)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(category)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let row: Option<DbCategory> = sqlx::query_as(
            "SELECT id, name, description, is_deleted FROM categories WHERE id = ? AND is_deleted = 0",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(DbCategory::into_category).transpose()
    }

    async fn find_categories(&self, page: PageRequest) -> Result<Page<Category>, RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE is_deleted = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let (limit, offset) = page_bounds(page);
        let rows: Vec<DbCategory> = sqlx::query_as(
            "SELECT id, name, description, is_deleted FROM categories WHERE is_deleted = 0
             ORDER BY name, id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(Page {
            content: rows
                .into_iter()
                .map(DbCategory::into_category)
                .collect::<Result<_, _>>()?,
            page: page.page,
            size: page.size,
            total_elements: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let res =
            sqlx::query("UPDATE categories SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
                .bind(id.to_string())
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for SqliteRepo {
    async fn save_user(&self, user: User) -> Result<User, RepoError> {
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, shipping_address, role)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                email = excluded.email, first_name = excluded.first_name,
                last_name = excluded.last_name, shipping_address = excluded.shipping_address,
                role = excluded.role",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.shipping_address)
        .bind(role_str(user.role))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, shipping_address, role FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(DbUser::into_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, shipping_address, role FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(DbUser::into_user).transpose()
    }
}

#[async_trait]
impl CartRepository for SqliteRepo {
    async fn save_cart(&self, cart: ShoppingCart) -> Result<ShoppingCart, RepoError> {
        let id = cart.user_id.to_string();
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "INSERT INTO shopping_carts (id, is_deleted) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET is_deleted = excluded.is_deleted",
        )
        .bind(&id)
        .bind(cart.deleted)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM cart_items WHERE shopping_cart_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        for (position, item) in cart.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO cart_items (id, shopping_cart_id, book_id, quantity, position)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(item.id.to_string())
            .bind(&id)
            .bind(item.book_id.to_string())
            .bind(i64::from(item.quantity))
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        Self::commit(tx).await?;
        Ok(cart)
    }

    async fn find_cart(&self, user_id: Uuid) -> Result<Option<ShoppingCart>, RepoError> {
        let id = user_id.to_string();
        let exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM shopping_carts WHERE id = ? AND is_deleted = 0")
                .bind(&id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        if exists.is_none() {
            return Ok(None);
        }
        Ok(Some(ShoppingCart {
            user_id,
            items: self.cart_items(&id).await?,
            deleted: false,
        }))
    }

    async fn find_cart_by_item(&self, item_id: Uuid) -> Result<Option<ShoppingCart>, RepoError> {
        let owner: Option<String> = sqlx::query_scalar(
            "SELECT ci.shopping_cart_id FROM cart_items ci
             JOIN shopping_carts sc ON sc.id = ci.shopping_cart_id
             WHERE ci.id = ? AND sc.is_deleted = 0",
        )
        .bind(item_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        match owner {
            Some(cart_id) => self.find_cart(parse_uuid(&cart_id)?).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn place_order(&self, order: Order, cart_id: Uuid) -> Result<Order, RepoError> {
        let id = order.id.to_string();
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        sqlx::query(
            "INSERT INTO orders (id, user_id, status, total, created_at, shipping_address)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(order.user_id.to_string())
        .bind(order.status.as_str())
        .bind(order.total.to_string())
        .bind(timestamp(order.created_at))
        .bind(&order.shipping_address)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, book_id, book_title, quantity, price, position)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(item.id.to_string())
            .bind(&id)
            .bind(item.book_id.to_string())
            .bind(&item.book_title)
            .bind(i64::from(item.quantity))
            .bind(item.price.to_string())
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        sqlx::query("DELETE FROM cart_items WHERE shopping_cart_id = ?")
            .bind(cart_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        Self::commit(tx).await?;
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS);
        let row: Option<DbOrder> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(r) => Ok(Some(self.hydrate_order(r).await?)),
            None => Ok(None),
        }
    }

    async fn find_orders_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError> {
        let uid = user_id.to_string();
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?")
            .bind(&uid)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let (limit, offset) = page_bounds(page);
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
            ORDER_COLUMNS
        );
        let rows: Vec<DbOrder> = sqlx::query_as(&sql)
            .bind(&uid)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut content = Vec::with_capacity(rows.len());
        for r in rows {
            content.push(self.hydrate_order(r).await?);
        }
        Ok(Page {
            content,
            page: page.page,
            size: page.size,
            total_elements: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        let updated = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return match self.find_order(id).await? {
                Some(current) => Err(status_changed(id, current.status)),
                None => Ok(None),
            };
        }
        self.find_order(id).await
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}
