//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::AgeRange;
use crate::error::{AppError, AppResult};

/// Book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: String,
    /// Total copies owned
    pub quantity: i32,
    pub subject: Option<String>,
    pub age_range: AgeRange,
    /// Stored cover image reference, served under the covers path
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request, filled from the multipart form.
///
/// `age_range` stays textual here so an unknown value surfaces as a
/// validation error.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(length(min = 1, message = "Publisher is required"))]
    pub publisher: String,
    pub subject: Option<String>,
    pub age_range: String,
    pub cover_image: Option<String>,
}

impl CreateBook {
    /// Trim, validate and resolve into the values handed to the store
    pub fn into_new_book(self) -> AppResult<NewBook> {
        let input = CreateBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            quantity: self.quantity,
            publisher: self.publisher.trim().to_string(),
            subject: self
                .subject
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            age_range: self.age_range,
            cover_image: self.cover_image,
        };
        input.validate()?;

        let age_range = input
            .age_range
            .parse::<AgeRange>()
            .map_err(AppError::Validation)?;

        Ok(NewBook {
            title: input.title,
            author: input.author,
            quantity: input.quantity,
            publisher: input.publisher,
            subject: input.subject,
            age_range,
            cover_image: input.cover_image,
        })
    }
}

/// Validated values handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub quantity: i32,
    pub publisher: String,
    pub subject: Option<String>,
    pub age_range: AgeRange,
    pub cover_image: Option<String>,
}

/// Multipart form accepted by `POST /books` (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateBookForm {
    pub title: String,
    pub author: String,
    pub quantity: i32,
    pub publisher: String,
    pub subject: Option<String>,
    /// general, children, young_adult or adult
    pub age_range: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub cover: Option<Vec<u8>>,
}
