//! Business logic services

pub mod books;
pub mod covers;
pub mod credentials;
pub mod loans;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub covers: covers::CoverStorage,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let credentials = credentials::CredentialService::new(&config.credentials)?;
        let covers = covers::CoverStorage::new(config.storage.covers_dir.clone());

        Ok(Self {
            users: users::UsersService::new(repository.clone(), credentials),
            books: books::BooksService::new(repository.clone(), covers.clone()),
            loans: loans::LoansService::new(repository),
            covers,
        })
    }
}
