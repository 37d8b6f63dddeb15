//! Registration, login and user lookup

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{normalize_email, LoginRequest, NewUser, RegisterUser, User, UserSummary},
    repository::Repository,
    services::credentials::CredentialService,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    credentials: CredentialService,
}

impl UsersService {
    pub fn new(repository: Repository, credentials: CredentialService) -> Self {
        Self { repository, credentials }
    }

    /// Register a new user. The password is hashed before it reaches the store.
    pub async fn register(&self, user: RegisterUser) -> AppResult<User> {
        let user = user.normalized();
        user.validate()?;

        // Skip the hashing cost for the common case; the unique constraint
        // still decides concurrent registrations.
        if self.repository.users.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = self.credentials.spawn_hash(user.password).await?;
        let record = self
            .repository
            .users
            .insert(&NewUser {
                name: user.name,
                email: user.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = record.id, "User registered");
        Ok(record.into())
    }

    /// Check an email/password pair
    pub async fn login(&self, request: LoginRequest) -> AppResult<UserSummary> {
        let email = normalize_email(&request.email);

        let Some(user) = self.repository.users.find_by_email(&email).await? else {
            self.credentials.spawn_verify_dummy(request.password).await?;
            tracing::warn!("Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        };

        let valid = self
            .credentials
            .spawn_verify(request.password, user.password_hash.clone())
            .await?;
        if !valid {
            tracing::warn!("Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }

        tracing::debug!(user_id = user.id, "User logged in");
        Ok(user.into())
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self
            .repository
            .users
            .find_by_email(&normalize_email(email))
            .await?;
        Ok(user.map(User::from))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository
            .users
            .find_by_id(id)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}
