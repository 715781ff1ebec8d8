pub mod password;
pub mod reset_token;
pub mod signer;

pub use reset_token::{ResetClaim, ResetTokenError, ResetTokenService, PASSWORD_RESET_KIND};
