use utoipa::OpenApi;

use crate::handler::{
    self,
    auth::{ErrorResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserResponse},
    health::{Health, Readiness},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::health::ready,
        handler::auth::register,
        handler::auth::login,
        handler::auth::refresh
    ),
    components(schemas(
        Health,
        Readiness,
        ErrorResponse,
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        UserResponse,
        TokenResponse
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Registration and JWT issuance")
    )
)]
pub struct ApiDoc;
