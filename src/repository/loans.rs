//! Loans repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use super::{foreign_key_violation, LoanStore};
use crate::{
    error::{AppError, AppResult},
    models::Loan,
};

const USER_FK: &str = "loans_user_id_fkey";
const BOOK_FK: &str = "loans_book_id_fkey";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    /// Create a new loan. The foreign keys are checked by the insert itself.
    async fn insert(&self, user_id: i32, book_id: i32, due_date: DateTime<Utc>) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, due_date, renewal_count)
            VALUES ($1, $2, $3, 0)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match foreign_key_violation(&e).as_deref() {
            Some(USER_FK) => AppError::NotFound(format!("User with id {} not found", user_id)),
            Some(BOOK_FK) => AppError::NotFound(format!("Book with id {} not found", book_id)),
            Some(other) => {
                tracing::warn!("Unexpected foreign key violation on loans: {}", other);
                AppError::NotFound("Referenced record not found".to_string())
            }
            None => AppError::Database(e),
        })
    }

    /// Renew a loan
    async fn renew(&self, loan_id: i32, due_date: DateTime<Utc>) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET due_date = $1, renewal_count = renewal_count + 1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(due_date)
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))
    }

    /// Get loan by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(loan)
    }

    /// Get loans for a user
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(loans)
    }

    /// Get loans for a book
    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE book_id = $1 ORDER BY id")
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(loans)
    }
}
