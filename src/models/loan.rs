//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub due_date: DateTime<Utc>,
    pub renewal_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub user_id: i32,
    pub book_id: i32,
    /// Due date (ISO 8601)
    pub due_date: DateTime<Utc>,
}

/// Renew loan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenewLoan {
    /// New due date (ISO 8601)
    pub due_date: DateTime<Utc>,
}
