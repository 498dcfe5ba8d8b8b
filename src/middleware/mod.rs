mod auth;
mod error_handler;

pub use auth::{AuthUser, auth_middleware};
pub use error_handler::{log_errors, log_requests};
