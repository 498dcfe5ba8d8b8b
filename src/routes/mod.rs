pub mod auth;
pub mod book;
pub mod docs;
pub mod health;
