pub(crate) mod handler;
mod model;

pub use handler::{REFRESH_TOKEN_COOKIE, refresh, sign_in, sign_up};
pub use model::AccessTokenResponse;
