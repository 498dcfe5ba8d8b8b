pub mod book;
pub mod token;
pub mod user;

pub use book::{Book, BookInput, NewBook};
pub use token::{NewRefreshToken, RefreshToken, TokenPair};
pub use user::{NewUser, SignInInput, SignUpInput, User};
