// 服务层
// 组合存储库、缓存与令牌逻辑，供 HTTP 处理器调用

pub mod book;
pub mod user;

pub use book::BookService;
pub use user::UserService;
