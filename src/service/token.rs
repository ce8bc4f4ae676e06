use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub jti: Uuid,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT_SECRET is not set")]
    MissingSecret,
    #[error("{key}={hours} is not a usable token lifetime")]
    InvalidLifetime { key: &'static str, hours: i64 },
    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Lifetimes must be positive and leave `now + ttl` representable.
fn lifetime(
    key: &'static str,
    hours: i64,
    ttl: Option<Duration>,
) -> Result<Duration, TokenError> {
    match ttl {
        Some(ttl) if hours > 0 && Utc::now().checked_add_signed(ttl).is_some() => Ok(ttl),
        _ => Err(TokenError::InvalidLifetime { key, hours }),
    }
}

/// HS256 tokens signed with `JWT_SECRET`. Access and refresh lifetimes come from
/// `JWT_EXPIRE_HOURS` and `JWT_REFRESH_TOKEN_EXPIRE_HOURS`.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Result<Self, TokenError> {
        if cfg.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let access_ttl = lifetime("JWT_EXPIRE_HOURS", cfg.expire_hours, cfg.access_ttl())?;
        let refresh_ttl = lifetime(
            "JWT_REFRESH_TOKEN_EXPIRE_HOURS",
            cfg.refresh_token_expire_hours,
            cfg.refresh_ttl(),
        )?;
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn issue(&self, subject: Uuid, kind: TokenKind) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let (key, ttl) = match kind {
            TokenKind::Access => ("JWT_EXPIRE_HOURS", self.access_ttl),
            TokenKind::Refresh => ("JWT_REFRESH_TOKEN_EXPIRE_HOURS", self.refresh_ttl),
        };
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::InvalidLifetime {
                key,
                hours: ttl.num_hours(),
            })?;
        let claims = Claims {
            sub: subject,
            jti: Uuid::new_v4(),
            typ: kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken { token, claims })
    }

    pub fn issue_pair(&self, subject: Uuid) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(subject, TokenKind::Access)?,
            refresh: self.issue(subject, TokenKind::Refresh)?,
        })
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        if data.claims.typ != expected {
            return Err(TokenError::WrongKind { expected });
        }
        Ok(data.claims)
    }
}
