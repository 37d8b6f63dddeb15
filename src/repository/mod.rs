//! Repository layer for database operations
//!
//! Each entity has a store trait. [`Repository`] bundles one implementation
//! of each, either over an injected PostgreSQL pool or over the in-memory
//! tables used by tests.

pub mod books;
pub mod loans;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, Loan, NewBook, NewUser, UserRecord},
};

/// Persistence of user records.
///
/// `insert` must return [`AppError::DuplicateEmail`](crate::error::AppError)
/// when the email is already taken.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &NewUser) -> AppResult<UserRecord>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<UserRecord>>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn insert(&self, book: &NewBook) -> AppResult<Book>;
    async fn list(&self) -> AppResult<Vec<Book>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>>;
}

/// Persistence of loans.
///
/// `insert` must return `NotFound` when the user or the book does not exist
/// at the moment of insertion; `renew` when the loan does not exist.
#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn insert(&self, user_id: i32, book_id: i32, due_date: DateTime<Utc>) -> AppResult<Loan>;
    async fn renew(&self, loan_id: i32, due_date: DateTime<Utc>) -> AppResult<Loan>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>>;
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Loan>>;
    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Loan>>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UserStore>,
    pub books: Arc<dyn BookStore>,
    pub loans: Arc<dyn LoanStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            loans: Arc::new(loans::LoansRepository::new(pool)),
        }
    }

    /// Create a repository over fresh in-memory tables
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            loans: Arc::new(store),
        }
    }
}

/// True when `err` is a unique violation of `constraint`
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation() && db.constraint() == Some(constraint),
        _ => false,
    }
}

/// Name of the violated foreign key constraint, if `err` is one
pub(crate) fn foreign_key_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
