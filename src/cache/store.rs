//! In-memory cache of fetched post-list pages and derived statistics.

use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use metrics::counter;
use noticeboard_api_types::{Post, PostListQuery};
use tracing::debug;

use crate::application::pagination::CursorPage;
use crate::domain::stats::PostStats;

use super::keys::{hash_cursor_str, hash_post_list_key};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT: &str = "noticeboard_cache_hit_total";
const METRIC_CACHE_MISS: &str = "noticeboard_cache_miss_total";
const METRIC_CACHE_INVALIDATION: &str = "noticeboard_cache_invalidation_total";

/// Monotonic counter bumped by every invalidation. Writers capture it before
/// fetching and the write is dropped if it moved in the meantime.
pub type Epoch = u64;

pub struct PostListCache {
    // Key: (filter_hash, cursor_hash)
    post_lists: RwLock<LruCache<(u64, u64), CursorPage<Post>>>,
    stats: RwLock<Option<PostStats>>,
    epoch: AtomicU64,
}

impl PostListCache {
    pub fn new(limit: NonZeroUsize) -> Self {
        Self {
            post_lists: RwLock::new(LruCache::new(limit)),
            stats: RwLock::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn get_post_list(&self, query: &PostListQuery) -> Option<CursorPage<Post>> {
        let key = list_key(query);
        let page = rw_write(&self.post_lists, SOURCE, "get_post_list")
            .get(&key)
            .cloned();
        let metric = if page.is_some() {
            METRIC_CACHE_HIT
        } else {
            METRIC_CACHE_MISS
        };
        counter!(metric, "kind" => "post_list").increment(1);
        page
    }

    /// Store a page fetched under `epoch`. Returns `false` when an
    /// invalidation happened since and the page was discarded.
    pub fn set_post_list(
        &self,
        epoch: Epoch,
        query: &PostListQuery,
        page: CursorPage<Post>,
    ) -> bool {
        let mut lists = rw_write(&self.post_lists, SOURCE, "set_post_list");
        if self.epoch() != epoch {
            debug!(epoch, "Discarding post list fetched before invalidation");
            return false;
        }
        lists.put(list_key(query), page);
        true
    }

    pub fn get_stats(&self) -> Option<PostStats> {
        let stats = rw_read(&self.stats, SOURCE, "get_stats").clone();
        let metric = if stats.is_some() {
            METRIC_CACHE_HIT
        } else {
            METRIC_CACHE_MISS
        };
        counter!(metric, "kind" => "stats").increment(1);
        stats
    }

    pub fn set_stats(&self, epoch: Epoch, stats: PostStats) -> bool {
        let mut slot = rw_write(&self.stats, SOURCE, "set_stats");
        if self.epoch() != epoch {
            return false;
        }
        *slot = Some(stats);
        true
    }

    /// Drop every cached listing and the statistics snapshot.
    pub fn invalidate_posts(&self) {
        let mut lists = rw_write(&self.post_lists, SOURCE, "invalidate_posts.lists");
        let mut stats = rw_write(&self.stats, SOURCE, "invalidate_posts.stats");
        self.epoch.fetch_add(1, Ordering::AcqRel);
        lists.clear();
        *stats = None;
        counter!(METRIC_CACHE_INVALIDATION).increment(1);
        debug!(epoch = self.epoch(), "Invalidated cached post lists");
    }

    pub fn len(&self) -> usize {
        rw_read(&self.post_lists, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn list_key(query: &PostListQuery) -> (u64, u64) {
    (
        hash_post_list_key(query),
        hash_cursor_str(query.cursor.as_deref()),
    )
}
