use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::keys::book_key;
use crate::models::Book;

/// 图书缓存默认有效期：8 小时
pub const DEFAULT_BOOK_TTL: Duration = Duration::from_secs(8 * 60 * 60);

// 超过该值的 TTL 会被截断，避免计算过期时间时溢出
const MAX_BOOK_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

struct CachedBook {
    book: Book,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedBook>,
    /// 最近一次 `put_all` 之后没有发生过写操作
    complete: bool,
    /// 每次使缓存失效的写操作都会递增
    epoch: u64,
}

/// 进程内图书读穿缓存
///
/// 条目、全集标记与写纪元由同一把锁保护。锁从不跨越 `.await` 持有，
/// 仓库调用再慢也不会阻塞其他请求读缓存。过期在读取时惰性检查，没有后台清理。
///
/// 从仓库读取再回填时，应先取 [`BookCache::epoch`]，读取完成后用
/// [`BookCache::put_all_since`] / [`BookCache::put_since`] 回填：期间若有写操作，
/// 回填会被放弃，避免把过期的列表标记为完整。
pub struct BookCache {
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl Default for BookCache {
    fn default() -> Self {
        Self::new(DEFAULT_BOOK_TTL)
    }
}

impl BookCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_BOOK_TTL),
            state: RwLock::new(CacheState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 当前写纪元
    pub fn epoch(&self) -> u64 {
        self.read().epoch
    }

    pub fn is_complete(&self) -> bool {
        self.read().complete
    }

    pub fn get(&self, book_id: i64) -> Option<Book> {
        let key = book_key(book_id);
        let now = Instant::now();

        {
            let state = self.read();
            match state.entries.get(&key) {
                None => return None,
                Some(entry) if entry.expires_at > now => {
                    tracing::debug!("{} retrieved from cache", key);
                    return Some(entry.book.clone());
                }
                Some(_) => {}
            }
        }

        // 条目已过期，换写锁淘汰
        let mut state = self.write();
        if state
            .entries
            .get(&key)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            state.entries.remove(&key);
            state.complete = false;
            tracing::debug!("{} expired", key);
        }
        None
    }

    pub fn put(&self, book: Book) {
        let mut state = self.write();
        self.insert(&mut state, book);
    }

    /// 仅当 `epoch` 之后没有写操作时才写入，返回是否写入
    pub fn put_since(&self, epoch: u64, book: Book) -> bool {
        let mut state = self.write();
        if state.epoch != epoch {
            tracing::debug!("book_{} not cached: cache changed during read", book.id);
            return false;
        }
        self.insert(&mut state, book);
        true
    }

    /// 返回全部图书；全集未标记完整或任一条目过期时视为未命中
    pub fn get_all(&self) -> Option<Vec<Book>> {
        let now = Instant::now();

        {
            let state = self.read();
            if !state.complete {
                return None;
            }
            if state.entries.values().all(|entry| entry.expires_at > now) {
                let mut books: Vec<Book> =
                    state.entries.values().map(|entry| entry.book.clone()).collect();
                books.sort_by_key(|book| book.id);
                tracing::debug!("all {} cached books retrieved", books.len());
                return Some(books);
            }
        }

        let mut state = self.write();
        state.entries.retain(|_, entry| entry.expires_at > now);
        state.complete = false;
        tracing::debug!("cached book list expired");
        None
    }

    /// 用仓库返回的完整列表替换缓存并标记为完整
    pub fn put_all(&self, books: Vec<Book>) {
        let mut state = self.write();
        self.replace_all(&mut state, books);
    }

    /// 仅当 `epoch` 之后没有写操作时才回填全集，返回是否写入
    pub fn put_all_since(&self, epoch: u64, books: Vec<Book>) -> bool {
        let mut state = self.write();
        if state.epoch != epoch {
            tracing::debug!("book list not cached: cache changed during read");
            return false;
        }
        self.replace_all(&mut state, books);
        true
    }

    /// 淘汰单个条目并清除全集标记
    pub fn invalidate(&self, book_id: i64) {
        let key = book_key(book_id);
        let mut state = self.write();
        if state.entries.remove(&key).is_some() {
            tracing::debug!("{} removed from cache", key);
        }
        state.complete = false;
        state.epoch += 1;
    }

    /// 清除全集标记但保留条目
    pub fn mark_dirty(&self) {
        let mut state = self.write();
        state.complete = false;
        state.epoch += 1;
    }

    fn insert(&self, state: &mut CacheState, book: Book) {
        let key = book_key(book.id);
        tracing::debug!("{} added to cache", key);
        state.entries.insert(
            key,
            CachedBook {
                book,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    fn replace_all(&self, state: &mut CacheState, books: Vec<Book>) {
        state.entries.clear();
        for book in books {
            self.insert(state, book);
        }
        state.complete = true;
    }
}
