//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and return a JWT token with the user
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Create JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Self-registration: creates a member account
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;

        if self
            .repository
            .users
            .username_exists(&request.username)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password = self.hash_password(&request.password)?;
        self.repository
            .users
            .create(&request.username, &password, Role::Member)
            .await
    }

    /// Bootstrap the first admin account. Conflicts once any admin exists.
    pub async fn create_admin(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;

        if self.repository.users.admin_exists().await? {
            return Err(AppError::Conflict("An admin already exists".to_string()));
        }
        if self
            .repository
            .users
            .username_exists(&request.username)
            .await?
        {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password = self.hash_password(&request.password)?;
        self.repository
            .users
            .create(&request.username, &password, Role::Admin)
            .await
    }

    /// Create a new user (admin operation)
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;

        if self.repository.users.username_exists(&user.username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let password = self.hash_password(&user.password)?;
        self.repository
            .users
            .create(&user.username, &password, user.role.unwrap_or(Role::Member))
            .await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }
}
