use std::sync::Arc;

use crate::auth::ResetTokenService;
use crate::config::Config;
use crate::db::AccountStore;
use crate::email::SystemMailer;
use crate::rate_limit::ResetRequestLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub accounts: Arc<dyn AccountStore>,
    pub reset_tokens: ResetTokenService,
    pub system_mailer: Option<Arc<SystemMailer>>,
    pub reset_limiter: ResetRequestLimiter,
}
