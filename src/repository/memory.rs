//! In-memory stores
//!
//! Enforce the same constraints as the PostgreSQL schema (unique email,
//! loan foreign keys) so services and handlers can be exercised without a
//! database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{BookStore, LoanStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{Book, Loan, NewBook, NewUser, UserRecord},
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    books: Vec<Book>,
    loans: Vec<Loan>,
}

/// Shared in-memory tables. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn loan_count(&self) -> usize {
        self.tables.read().await.loans.len()
    }
}

// Ids start at 1 and follow insertion order, like a SERIAL column
fn next_id(len: usize) -> i32 {
    len as i32 + 1
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &NewUser) -> AppResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: next_id(tables.users.len()),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            staff_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, book: &NewBook) -> AppResult<Book> {
        if book.quantity < 0 {
            return Err(AppError::Validation("Quantity cannot be negative".to_string()));
        }

        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let created = Book {
            id: next_id(tables.books.len()),
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            quantity: book.quantity,
            subject: book.subject.clone(),
            age_range: book.age_range,
            cover_image: book.cover_image.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.books.push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> AppResult<Vec<Book>> {
        Ok(self.tables.read().await.books.clone())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.iter().find(|b| b.id == id).cloned())
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn insert(&self, user_id: i32, book_id: i32, due_date: DateTime<Utc>) -> AppResult<Loan> {
        // Checked under the write lock, like a foreign key at insert time
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }
        if !tables.books.iter().any(|b| b.id == book_id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }

        let now = Utc::now();
        let loan = Loan {
            id: next_id(tables.loans.len()),
            user_id,
            book_id,
            due_date,
            renewal_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.loans.push(loan.clone());
        Ok(loan)
    }

    async fn renew(&self, loan_id: i32, due_date: DateTime<Utc>) -> AppResult<Loan> {
        let mut tables = self.tables.write().await;
        let loan = tables
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        loan.due_date = due_date;
        loan.renewal_count += 1;
        loan.updated_at = Utc::now();
        Ok(loan.clone())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let tables = self.tables.read().await;
        Ok(tables.loans.iter().find(|l| l.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Loan>> {
        let tables = self.tables.read().await;
        Ok(tables.loans.iter().filter(|l| l.user_id == user_id).cloned().collect())
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Loan>> {
        let tables = self.tables.read().await;
        Ok(tables.loans.iter().filter(|l| l.book_id == book_id).cloned().collect())
    }
}
