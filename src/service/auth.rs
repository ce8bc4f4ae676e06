use argon2::{password_hash::PasswordHash, Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use rand::RngCore;
use sea_orm::ActiveValue::Set;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    entities::users,
    repo::users::UsersRepo,
    service::{
        cache::CacheStore,
        email::MailService,
        token::{TokenKind, TokenPair, TokenService},
    },
};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AuthError {
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn invalid_credentials() -> Self {
        Self::new("invalid_credentials", "invalid credentials")
    }

    fn invalid_refresh_token() -> Self {
        Self::new("invalid_refresh_token", "invalid refresh token")
    }
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: users::Model,
    pub tokens: TokenPair,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<users::Model, AuthError>;
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, AuthError>;
    /// Exchanges a refresh token for a new pair. The presented token is single-use.
    async fn refresh(&self, refresh_token: &str) -> Result<LoginOutput, AuthError>;
}

pub struct AuthServiceImpl {
    users_repo: Arc<dyn UsersRepo>,
    tokens: Arc<TokenService>,
    cache: Arc<dyn CacheStore>,
    mailer: Option<Arc<dyn MailService>>,
    key_prefix: String,
}

impl AuthServiceImpl {
    pub fn new(
        users_repo: Arc<dyn UsersRepo>,
        tokens: Arc<TokenService>,
        cache: Arc<dyn CacheStore>,
        mailer: Option<Arc<dyn MailService>>,
        key_prefix: String,
    ) -> Self {
        Self {
            users_repo,
            tokens,
            cache,
            mailer,
            key_prefix,
        }
    }

    fn refresh_key(&self, jti: Uuid) -> String {
        format!("{}:refresh:{}", self.key_prefix, jti.simple())
    }

    fn normalize_email(email: &str) -> Result<String, AuthError> {
        let value = email.trim().to_lowercase();
        if value.is_empty() || !value.contains('@') {
            return Err(AuthError::new("invalid_email", "invalid email"));
        }
        Ok(value)
    }

    fn normalize_name(name: &str) -> Result<String, AuthError> {
        let value = name.trim();
        if value.is_empty() {
            return Err(AuthError::new("invalid_name", "name is required"));
        }
        Ok(value.to_string())
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(
                "invalid_password",
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        Ok(())
    }

    pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = argon2::password_hash::SaltString::encode_b64(&salt)
            .map_err(|err| AuthError::new("password_hash_failed", err.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| AuthError::new("password_hash_failed", err.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify_password(hash: &str, password: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::invalid_credentials())?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::invalid_credentials())
    }

    async fn issue(&self, user: users::Model) -> Result<LoginOutput, AuthError> {
        let tokens = self
            .tokens
            .issue_pair(user.uid)
            .map_err(|err| AuthError::new("token_error", err.to_string()))?;
        let ttl = self.tokens.refresh_ttl().num_seconds().max(1) as u64;
        self.cache
            .set_ex(
                &self.refresh_key(tokens.refresh.claims.jti),
                &user.uid.to_string(),
                ttl,
            )
            .await
            .map_err(|err| AuthError::new("cache_error", err.to_string()))?;
        Ok(LoginOutput { user, tokens })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<users::Model, AuthError> {
        let name = Self::normalize_name(name)?;
        let email = Self::normalize_email(email)?;
        Self::validate_password(password)?;

        let existing = self
            .users_repo
            .find_by_email(&email)
            .await
            .map_err(|err| AuthError::new("db_error", err.to_string()))?;
        if existing.is_some() {
            return Err(AuthError::new("email_taken", "email already registered"));
        }

        let user = self
            .users_repo
            .insert(users::ActiveModel {
                uid: Set(Uuid::new_v4()),
                name: Set(name),
                email: Set(email),
                password_hash: Set(Self::hash_password(password)?),
                ..Default::default()
            })
            .await
            .map_err(|err| AuthError::new("db_error", err.to_string()))?;
        info!(user = %user.uid, "user registered");

        // Best-effort delivery: registration succeeds even when mail is down.
        if let Some(mailer) = &self.mailer {
            if let Err(err) = mailer.send_welcome(&user.email, &user.name).await {
                warn!(user = %user.uid, error = %err, "failed to send welcome email");
            }
        }

        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, AuthError> {
        let email = Self::normalize_email(email).map_err(|_| AuthError::invalid_credentials())?;
        let user = self
            .users_repo
            .find_by_email(&email)
            .await
            .map_err(|err| AuthError::new("db_error", err.to_string()))?
            .ok_or_else(AuthError::invalid_credentials)?;
        Self::verify_password(&user.password_hash, password)?;
        self.issue(user).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<LoginOutput, AuthError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::invalid_refresh_token())?;
        let existed = self
            .cache
            .del(&self.refresh_key(claims.jti))
            .await
            .map_err(|err| AuthError::new("cache_error", err.to_string()))?;
        if !existed {
            return Err(AuthError::invalid_refresh_token());
        }
        let user = self
            .users_repo
            .find_by_uid(claims.sub)
            .await
            .map_err(|err| AuthError::new("db_error", err.to_string()))?
            .ok_or_else(AuthError::invalid_refresh_token)?;
        self.issue(user).await
    }
}
