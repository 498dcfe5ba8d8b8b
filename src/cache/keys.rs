/// 图书缓存键前缀
const BOOK_PREFIX: &str = "book_";

/// 生成图书缓存键
pub fn book_key(book_id: i64) -> String {
    format!("{}{}", BOOK_PREFIX, book_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_key_format() {
        assert_eq!(book_key(7), "book_7");
    }
}
