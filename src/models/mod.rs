//! Data models for Biblio

pub mod book;
pub mod enums;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, CreateBook, NewBook};
pub use enums::AgeRange;
pub use loan::{CreateLoan, Loan, RenewLoan};
pub use user::{LoginRequest, NewUser, RegisterUser, User, UserRecord, UserSummary};
