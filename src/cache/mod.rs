//! Client-side cache for post listings.
//!
//! Pages are keyed by the full listing query (filters, sort, size, cursor).
//! Any successful write to the board invalidates every cached page together
//! with the statistics snapshot.

mod keys;
pub(crate) mod lock;
mod store;

pub use keys::{hash_cursor_str, hash_post_list_key};
pub use store::{Epoch, PostListCache};
