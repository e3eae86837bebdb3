use std::sync::Arc;

use crate::errors::AppError;
use bookstore_types::domain::book::{Book, NewBook};
use bookstore_types::domain::page::{Page, PageRequest};
use bookstore_types::domain::search::{BookPredicate, BookSearchParameters, BookSpecificationBuilder};
use bookstore_types::ports::book_repository::BookRepository;
use bookstore_types::ports::category_repository::CategoryRepository;
use bookstore_types::ports::RepoError;
use uuid::Uuid;

pub struct BookService<R: BookRepository + CategoryRepository> {
    repo: Arc<R>,
    specs: BookSpecificationBuilder,
}

impl<R: BookRepository + CategoryRepository> BookService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_builder(repo, BookSpecificationBuilder::default())
    }

    pub fn with_builder(repo: Arc<R>, specs: BookSpecificationBuilder) -> Self {
        Self { repo, specs }
    }

    pub async fn create_book(&self, input: NewBook) -> Result<Book, AppError> {
        let book = Book::new(input)?;
        self.check_categories(&book).await?;
        let book = self.store(book).await?;
        tracing::info!(book_id = %book.id, isbn = %book.isbn, "book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: Uuid, input: NewBook) -> Result<Book, AppError> {
        let mut book = self.get_book(id).await?;
        book.apply(input)?;
        self.check_categories(&book).await?;
        self.store(book).await
    }

    pub async fn get_book(&self, id: Uuid) -> Result<Book, AppError> {
        self.repo
            .find_book(id)
            .await?
            .ok_or_else(|| AppError::not_found("book", id))
    }

    pub async fn list_books(&self, page: PageRequest) -> Result<Page<Book>, AppError> {
        Ok(self.repo.find_books(&BookPredicate::Always, page).await?)
    }

    /// Filters are ANDed together and the values of one filter are ORed.
    /// An unknown filter key fails before storage is queried.
    pub async fn search_books(
        &self,
        params: &BookSearchParameters,
        page: PageRequest,
    ) -> Result<Page<Book>, AppError> {
        let spec = self.specs.build(params)?;
        tracing::debug!(?spec, "searching books");
        Ok(self.repo.find_books(&spec, page).await?)
    }

    pub async fn books_by_category(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Book>, AppError> {
        if self.repo.find_category(category_id).await?.is_none() {
            return Err(AppError::not_found("category", category_id));
        }
        Ok(self
            .repo
            .find_books(&BookPredicate::InCategory(category_id), page)
            .await?)
    }

    pub async fn delete_book(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete_book(id).await? {
            tracing::info!(book_id = %id, "book deleted");
            Ok(())
        } else {
            Err(AppError::not_found("book", id))
        }
    }

    async fn check_categories(&self, book: &Book) -> Result<(), AppError> {
        for id in &book.category_ids {
            if self.repo.find_category(*id).await?.is_none() {
                return Err(AppError::not_found("category", id));
            }
        }
        Ok(())
    }

    async fn store(&self, book: Book) -> Result<Book, AppError> {
        let isbn = book.isbn.clone();
        self.repo.save_book(book).await.map_err(|e| match e {
            RepoError::Conflict(_) => AppError::Conflict(format!("isbn {isbn} already exists")),
            other => other.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_repo::memory::InMemoryRepo;
    use bookstore_types::domain::category::{Category, NewCategory};
    use rust_decimal::Decimal;

    fn input(title: &str, author: &str, isbn: &str) -> NewBook {
        NewBook {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            price: Decimal::new(999, 2),
            description: None,
            cover_image: None,
            category_ids: Default::default(),
        }
    }

    async fn seeded() -> BookService<InMemoryRepo> {
        let svc = BookService::new(Arc::new(InMemoryRepo::new()));
        for (i, (title, author)) in [
            ("It", "Stephen King"),
            ("The Shining", "Stephen King"),
            ("The Hobbit", "J.R.R. Tolkien"),
            ("Dune", "Frank Herbert"),
        ]
        .into_iter()
        .enumerate()
        {
            svc.create_book(input(title, author, &format!("isbn-{i}")))
                .await
                .unwrap();
        }
        svc
    }

    fn titles(page: Page<Book>) -> Vec<String> {
        page.content.into_iter().map(|b| b.title).collect()
    }

    #[tokio::test]
    async fn search_unions_values_and_intersects_keys() {
        let svc = seeded().await;
        let page = svc
            .search_books(
                &BookSearchParameters::new().with("author", &["King", "Tolkien"]),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(titles(page), ["It", "The Hobbit", "The Shining"]);

        let page = svc
            .search_books(
                &BookSearchParameters::new()
                    .with("author", &["king", "tolkien"])
                    .with("title", &["hobbit"]),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(titles(page), ["The Hobbit"]);

        let page = svc
            .search_books(&BookSearchParameters::new(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_elements, 4);
    }

    #[tokio::test]
    async fn unknown_filter_key_is_rejected() {
        let svc = seeded().await;
        let res = svc
            .search_books(
                &BookSearchParameters::new().with("isbn", &["1"]),
                PageRequest::default(),
            )
            .await;
        assert!(matches!(res, Err(AppError::UnknownFilter(_))));
    }

    #[tokio::test]
    async fn duplicate_isbn_conflicts() {
        let svc = seeded().await;
        let res = svc.create_book(input("Copy", "Someone", "isbn-0")).await;
        assert!(matches!(res, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn categories_must_exist_and_filter_books() {
        let repo = Arc::new(InMemoryRepo::new());
        let svc = BookService::new(repo.clone());
        let horror = repo
            .save_category(
                Category::new(NewCategory {
                    name: "Horror".into(),
                    description: None,
                })
                .unwrap(),
            )
            .await
            .unwrap();

        let mut it = input("It", "Stephen King", "1");
        it.category_ids.insert(Uuid::new_v4());
        assert!(matches!(
            svc.create_book(it.clone()).await,
            Err(AppError::NotFound(_))
        ));

        it.category_ids = [horror.id].into();
        svc.create_book(it).await.unwrap();
        svc.create_book(input("Dune", "Frank Herbert", "2")).await.unwrap();

        let page = svc
            .books_by_category(horror.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(titles(page), ["It"]);
        assert!(matches!(
            svc.books_by_category(Uuid::new_v4(), PageRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_and_soft_delete() {
        let svc = seeded().await;
        let dune = svc
            .search_books(
                &BookSearchParameters::new().with("title", &["dune"]),
                PageRequest::default(),
            )
            .await
            .unwrap()
            .content
            .remove(0);

        let mut changed = input("Dune Messiah", "Frank Herbert", "isbn-3");
        changed.price = Decimal::new(1500, 2);
        let updated = svc.update_book(dune.id, changed).await.unwrap();
        assert_eq!(updated.id, dune.id);
        assert_eq!(updated.price, Decimal::new(1500, 2));

        svc.delete_book(dune.id).await.unwrap();
        assert!(matches!(svc.get_book(dune.id).await, Err(AppError::NotFound(_))));
        assert_eq!(
            svc.list_books(PageRequest::default()).await.unwrap().total_elements,
            3
        );
    }
}
