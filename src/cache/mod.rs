// 缓存模块
// 进程内图书缓存，带 TTL 与“全集已缓存”标记

pub mod book;
pub mod keys;

pub use book::{BookCache, DEFAULT_BOOK_TTL};
