//! Loan management service
//!
//! Loans only carry a due date and a renewal count. There is no return
//! workflow and no cap on renewals.

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, RenewLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new loan. Existence of the user and book is checked by the
    /// store when inserting.
    pub async fn create_loan(&self, loan: CreateLoan) -> AppResult<Loan> {
        let created = self
            .repository
            .loans
            .insert(loan.user_id, loan.book_id, loan.due_date)
            .await?;

        tracing::info!(
            loan_id = created.id,
            user_id = created.user_id,
            book_id = created.book_id,
            "Loan created"
        );
        Ok(created)
    }

    /// Renew a loan
    pub async fn renew_loan(&self, loan_id: i32, request: RenewLoan) -> AppResult<Loan> {
        let renewed = self.repository.loans.renew(loan_id, request.due_date).await?;
        tracing::info!(loan_id, renewals = renewed.renewal_count, "Loan renewed");
        Ok(renewed)
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        self.repository
            .loans
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loans for a user
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<Loan>> {
        // Verify user exists
        if self.repository.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User with id {} not found", user_id)));
        }
        self.repository.loans.list_for_user(user_id).await
    }

    /// Get loans for a book
    pub async fn get_book_loans(&self, book_id: i32) -> AppResult<Vec<Loan>> {
        // Verify book exists
        if self.repository.books.find_by_id(book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }
        self.repository.loans.list_for_book(book_id).await
    }
}
