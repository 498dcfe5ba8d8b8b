pub(crate) mod handler;

pub use handler::{create_book, delete_book, get_book_by_id, get_books, update_book};
