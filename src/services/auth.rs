//! Credential verification and user registration/login

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{AuthResponse, LoginRequest, NewUser, RegisterRequest, User, UserClaims},
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

    /// Resolve an `Authorization` header value to the calling user.
    ///
    /// Missing or non-Bearer header and unknown subject fail with
    /// `Unauthorized`; a bad signature or expired token fails with
    /// `TokenInvalid`.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AppResult<User> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        let claims = UserClaims::from_token(token, &self.config.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            AppError::TokenInvalid
        })?;

        self.repository
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }

    /// Create a signed token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            user_id: user.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Register a new user and log them in
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let user = User {
            id: Uuid::new_v4(),
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            created_at: Utc::now(),
        };
        let new_user = NewUser {
            password_hash: self.hash_password(&request.password)?,
            user: user.clone(),
        };

        self.repository.users.insert(&new_user).await?;
        tracing::info!(user_id = %user.id, "User registered: {}", user.username);

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    /// Check email/password and issue a token
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let credentials = self
            .repository
            .users
            .find_credentials_by_email(request.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(&credentials.password_hash, &request.password)? {
            return Err(invalid());
        }

        let user = self
            .repository
            .users
            .find_by_id(credentials.id)
            .await?
            .ok_or_else(invalid)?;

        tracing::info!(user_id = %user.id, "User logged in");

        let token = self.issue_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    /// Hash a password with argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
