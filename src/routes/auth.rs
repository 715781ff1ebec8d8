use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password;
use crate::error::{AppError, INVALID_RESET_LINK};
use crate::models::Account;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyResetRequest {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct VerifyResetResponse {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_string();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    state
        .reset_limiter
        .check_and_record(&email)
        .map_err(AppError::RateLimited)?;

    // Same answer whether or not the account exists
    let response = Json(MessageResponse {
        message: "If that email is registered, a reset link has been sent.".to_string(),
    });

    tokio::spawn(async move {
        if let Err(e) = send_reset_link(&state, &email).await {
            tracing::error!("Password reset request failed: {e}");
        }
    });

    Ok(response)
}

async fn send_reset_link(state: &SharedState, email: &str) -> Result<(), AppError> {
    let Some(account) = state.accounts.find_by_email(email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(());
    };

    let token = state.reset_tokens.issue(
        &account.id.to_string(),
        &account.email,
        &account.password_hash,
    )?;
    let reset_url = format!("{}/reset-password?token={token}", state.config.base_url);

    match &state.system_mailer {
        Some(mailer) => {
            mailer
                .send_password_reset(&account.email, &reset_url, state.config.reset_ttl_minutes)
                .await
                .map_err(|e| {
                    AppError::Internal(format!("Failed to send password reset email: {e}"))
                })?;
            tracing::info!(account_id = %account.id, "Password reset email sent");
        }
        None => {
            tracing::warn!("System SMTP not configured. Password reset link: {reset_url}");
        }
    }

    Ok(())
}

/// Resolve the account a token claims to belong to and verify the token
/// against that account's current hash.
async fn authorize_reset(state: &SharedState, token: &str) -> Result<Account, AppError> {
    let subject = state.reset_tokens.peek_subject(token)?;
    let account_id = Uuid::parse_str(&subject)
        .map_err(|_| AppError::BadRequest(INVALID_RESET_LINK.to_string()))?;

    let account = state
        .accounts
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| AppError::BadRequest(INVALID_RESET_LINK.to_string()))?;

    state.reset_tokens.verify(token, &account.password_hash)?;

    Ok(account)
}

pub async fn verify_reset_token(
    State(state): State<SharedState>,
    Json(req): Json<VerifyResetRequest>,
) -> Result<Json<VerifyResetResponse>, AppError> {
    let account = authorize_reset(&state, &req.token).await?;

    Ok(Json(VerifyResetResponse {
        email: account.email,
    }))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    password::check_strength(&req.password)?;

    let account = authorize_reset(&state, &req.token).await?;

    // The new hash has a fresh salt, which retires this token and any other
    // outstanding one for the account. The swap only lands if no concurrent
    // reset replaced the hash this token was verified against.
    let pw_hash = password::hash(&req.password)?;
    let swapped = state
        .accounts
        .update_password(account.id, &account.password_hash, &pw_hash)
        .await?;
    if !swapped {
        tracing::warn!(account_id = %account.id, "Reset token lost a concurrent password update");
        return Err(AppError::BadRequest(INVALID_RESET_LINK.to_string()));
    }

    tracing::info!(account_id = %account.id, "Password reset completed");

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}
