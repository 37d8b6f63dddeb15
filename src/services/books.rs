//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook},
    repository::Repository,
    services::covers::{CoverStorage, CoverUpload},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    covers: CoverStorage,
}

impl BooksService {
    pub fn new(repository: Repository, covers: CoverStorage) -> Self {
        Self { repository, covers }
    }

    /// Create a book whose cover reference, if any, is already stored
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let book = book.into_new_book()?;
        let created = self.repository.books.insert(&book).await?;

        tracing::info!(book_id = created.id, "Book created: {}", created.title);
        Ok(created)
    }

    /// Create a book and store its uploaded cover.
    ///
    /// The cover is written only once the fields are valid, and removed again
    /// if the insert fails.
    pub async fn create_with_cover(&self, book: CreateBook, cover: Option<CoverUpload>) -> AppResult<Book> {
        let mut book = book.into_new_book()?;

        let stored = match cover {
            Some(ref upload) => Some(self.covers.store(upload).await?),
            None => None,
        };
        if stored.is_some() {
            book.cover_image = stored.clone();
        }

        match self.repository.books.insert(&book).await {
            Ok(created) => {
                tracing::info!(book_id = created.id, "Book created: {}", created.title);
                Ok(created)
            }
            Err(e) => {
                if let Some(reference) = stored {
                    self.covers.remove(&reference).await;
                }
                Err(e)
            }
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeRange;

    fn sample() -> CreateBook {
        CreateBook {
            title: "O Livro".to_string(),
            author: "X".to_string(),
            quantity: 3,
            publisher: "Y".to_string(),
            subject: None,
            age_range: "Infantil".to_string(),
            cover_image: None,
        }
    }

    fn cover() -> CoverUpload {
        CoverUpload {
            file_name: Some("capa.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let books = BooksService::new(Repository::in_memory(), CoverStorage::new(dir.path()));

        let created = books.create(sample()).await.unwrap();
        assert_eq!(created.age_range, AgeRange::Children);
        assert_eq!(created.cover_image, None);

        assert_eq!(books.get_by_id(created.id).await.unwrap(), created);
        assert_eq!(books.list().await.unwrap(), vec![created]);
        assert!(matches!(books.get_by_id(99).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_cover() {
        let dir = tempfile::tempdir().unwrap();
        let books = BooksService::new(Repository::in_memory(), CoverStorage::new(dir.path()));

        let created = books.create_with_cover(sample(), Some(cover())).await.unwrap();
        let reference = created.cover_image.expect("cover reference");
        assert!(reference.ends_with(".png"));
        assert!(dir.path().join(&reference).exists());
    }

    #[tokio::test]
    async fn test_invalid_book_stores_no_cover() {
        let dir = tempfile::tempdir().unwrap();
        let books = BooksService::new(Repository::in_memory(), CoverStorage::new(dir.path()));

        let input = CreateBook {
            age_range: "Unknown".to_string(),
            ..sample()
        };
        let err = books.create_with_cover(input, Some(cover())).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(books.list().await.unwrap().is_empty());
    }
}
