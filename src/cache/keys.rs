//! Cache key derivation for post-list pages.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use noticeboard_api_types::PostListQuery;

/// Hash every listing parameter except the cursor.
pub fn hash_post_list_key(query: &PostListQuery) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.search.hash(&mut hasher);
    query.category.hash(&mut hasher);
    query.from.hash(&mut hasher);
    query.to.hash(&mut hasher);
    query.sort.hash(&mut hasher);
    query.order.hash(&mut hasher);
    query.limit.hash(&mut hasher);
    hasher.finish()
}

pub fn hash_cursor_str(cursor: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    cursor.hash(&mut hasher);
    hasher.finish()
}
