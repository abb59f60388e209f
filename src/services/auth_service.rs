//! Authentication service - registration, login and token verification.
//!
//! Password hashing lives in the domain `Password` value object; repository
//! access goes through the Unit of Work.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Load the account behind a verified token
    async fn current_user(&self, id: Uuid) -> AppResult<User>;
}

/// Emails compare case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        // Email format is validated by the handler's ValidatedJson extractor
        let email = normalize_email(&email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(email, password_hash, name.trim().to_string())
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&normalize_email(&email)).await?;

        // Verify against a decoy when the account is unknown so both paths
        // cost one Argon2 verification.
        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.as_str()),
            None => Password::decoy(),
        };
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => generate_token(&user, &self.config),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn current_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::MockUserRepository;
    use crate::infra::{
        MockAnalysisRepository, MockComparisonRepository, MockMonitoredCompanyRepository,
        MockSentimentRepository, RepositorySet,
    };

    fn config() -> Config {
        Config::for_tests()
    }

    fn uow(users: MockUserRepository) -> Arc<RepositorySet> {
        Arc::new(RepositorySet {
            users: Arc::new(users),
            analyses: Arc::new(MockAnalysisRepository::new()),
            comparisons: Arc::new(MockComparisonRepository::new()),
            monitored: Arc::new(MockMonitoredCompanyRepository::new()),
            sentiment: Arc::new(MockSentimentRepository::new()),
        })
    }

    fn user(password: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "analyst@example.com".to_string(),
            password_hash: Password::new(password).unwrap().into_string(),
            name: "Analyst".to_string(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let existing = user("password123");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "analyst@example.com")
            .returning(move |_| Ok(Some(existing.clone())));

        let auth = Authenticator::new(uow(users), config());
        let err = auth
            .register(
                " Analyst@Example.com ".to_string(),
                "password123".to_string(),
                "A".to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|email, hash, name| {
                email == "new@example.com" && hash.starts_with("$argon2") && name == "New"
            })
            .returning(|email, hash, name| {
                let now = Utc::now();
                Ok(User {
                    id: Uuid::new_v4(),
                    email,
                    password_hash: hash,
                    name,
                    role: UserRole::User,
                    created_at: now,
                    updated_at: now,
                })
            });

        let auth = Authenticator::new(uow(users), config());
        let created = auth
            .register("new@example.com".into(), "password123".into(), " New ".into())
            .await
            .unwrap();
        assert!(Password::from_hash(created.password_hash).verify("password123"));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().never();

        let auth = Authenticator::new(uow(users), config());
        let err = auth
            .register("a@example.com".into(), "short".into(), "A".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let account = user("password123");
        let id = account.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(account.clone())));

        let auth = Authenticator::new(uow(users), config());
        let token = auth
            .login("analyst@example.com".into(), "password123".into())
            .await
            .unwrap();
        assert_eq!(token.token_type, "Bearer");

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let account = user("password123");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |email| Ok((email == "analyst@example.com").then(|| account.clone())));

        let auth = Authenticator::new(uow(users), config());
        let wrong_password = auth
            .login("analyst@example.com".into(), "wrong-password".into())
            .await
            .unwrap_err();
        let unknown_user = auth
            .login("ghost@example.com".into(), "password123".into())
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = Authenticator::new(uow(MockUserRepository::new()), config());
        assert!(matches!(
            auth.verify_token("not.a.token").unwrap_err(),
            AppError::Jwt(_)
        ));
    }

    #[tokio::test]
    async fn test_current_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let auth = Authenticator::new(uow(users), config());
        let err = auth.current_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
