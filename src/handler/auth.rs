use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{entities::users, service::auth::LoginOutput, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub uid: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub refresh_expires_in: i64,
    pub user: UserResponse,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            uid: user.uid.to_string(),
            name: user.name,
            email: user.email,
        }
    }
}

impl From<LoginOutput> for TokenResponse {
    fn from(output: LoginOutput) -> Self {
        let access = output.tokens.access;
        let refresh = output.tokens.refresh;
        Self {
            expires_in: access.claims.exp - access.claims.iat,
            refresh_expires_in: refresh.claims.exp - refresh.claims.iat,
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: "Bearer",
            user: output.user.into(),
        }
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", post(refresh))
        .with_state(state)
}

fn status_for(code: &str) -> StatusCode {
    match code {
        "invalid_credentials" | "invalid_refresh_token" => StatusCode::UNAUTHORIZED,
        "email_taken" => StatusCode::CONFLICT,
        "db_error" | "cache_error" | "token_error" | "password_hash_failed" => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    match state
        .auth()
        .register(&payload.name, &payload.email, &payload.password)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(user))).into_response(),
        Err(err) => error_response(status_for(err.code), err.code, err.message),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    match state.auth().login(&payload.email, &payload.password).await {
        Ok(output) => (StatusCode::OK, Json(TokenResponse::from(output))).into_response(),
        Err(err) => error_response(status_for(err.code), err.code, err.message),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated tokens", body = TokenResponse),
        (status = 401, description = "Invalid or reused refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Response {
    match state.auth().refresh(&payload.refresh_token).await {
        Ok(output) => (StatusCode::OK, Json(TokenResponse::from(output))).into_response(),
        Err(err) => error_response(status_for(err.code), err.code, err.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_codes_to_statuses() {
        assert_eq!(status_for("invalid_credentials"), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("invalid_refresh_token"), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("email_taken"), StatusCode::CONFLICT);
        assert_eq!(status_for("cache_error"), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for("invalid_password"), StatusCode::BAD_REQUEST);
    }
}
