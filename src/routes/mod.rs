pub mod auth;

use axum::routing::post;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route(
            "/api/v1/auth/reset-password/verify",
            post(auth::verify_reset_token),
        )
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
}
