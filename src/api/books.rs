//! Book (catalog) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::{multipart::MultipartError, Multipart};

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::book::{Book, CreateBook, CreateBookForm},
    services::covers::CoverUpload,
    AppState,
};

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Create a new book, with an optional cover image
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body(content = CreateBookForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    let (book, cover) = read_book_form(multipart).await?;
    let created = state.services.books.create_with_cover(book, cover).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Collect the text fields and the `cover` file part. Unknown fields are
/// ignored; an empty file part counts as no cover.
async fn read_book_form(mut multipart: Multipart) -> AppResult<(CreateBook, Option<CoverUpload>)> {
    let mut book = CreateBook::default();
    let mut quantity: Option<String> = None;
    let mut cover = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cover" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_form)?;
                if !bytes.is_empty() {
                    cover = Some(CoverUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" => book.title = field.text().await.map_err(invalid_form)?,
            "author" => book.author = field.text().await.map_err(invalid_form)?,
            "publisher" => book.publisher = field.text().await.map_err(invalid_form)?,
            "subject" => book.subject = Some(field.text().await.map_err(invalid_form)?),
            "age_range" => book.age_range = field.text().await.map_err(invalid_form)?,
            "quantity" => quantity = Some(field.text().await.map_err(invalid_form)?),
            _ => {}
        }
    }

    book.quantity = parse_quantity(quantity.as_deref())?;
    Ok((book, cover))
}

fn parse_quantity(value: Option<&str>) -> AppResult<i32> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Quantity is required".to_string()))?;

    value
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("Invalid quantity: {}", value)))
}

fn invalid_form(e: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {}", e))
}
