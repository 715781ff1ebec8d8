pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::ResetTokenService;
use crate::config::{Config, ConfigError};
use crate::db::AccountStore;
use crate::email::SystemMailer;
use crate::rate_limit::ResetRequestLimiter;
use crate::state::{AppState, SharedState};

/// Build the router. Fails when the reset-token secret is unusable, in which
/// case the process must not serve requests.
pub fn build_app(
    config: Config,
    accounts: Arc<dyn AccountStore>,
) -> Result<(Router, SharedState), ConfigError> {
    let reset_tokens = ResetTokenService::new(&config.reset_token_secret, config.reset_ttl())?;

    let system_mailer = config.smtp.as_ref().and_then(|smtp| {
        match SystemMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("System SMTP configured");
                Some(Arc::new(mailer))
            }
            Err(e) => {
                tracing::warn!("System SMTP not available: {e}");
                None
            }
        }
    });

    let state: SharedState = Arc::new(AppState {
        config,
        accounts,
        reset_tokens,
        system_mailer,
        reset_limiter: ResetRequestLimiter::default(),
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    Ok((app, state))
}

async fn health() -> &'static str {
    "ok"
}
