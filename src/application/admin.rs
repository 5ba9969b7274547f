//! Administrative operations over the whole board.

use std::sync::Arc;
use std::time::Duration;

use noticeboard_api_types::{DeleteResponse, PostListQuery};
use tracing::{info, instrument, warn};

use crate::application::error::AppError;
use crate::application::import::{BulkImporter, ImportSummary};
use crate::application::repos::{MockDataApi, PostsApi};
use crate::cache::PostListCache;
use crate::domain::stats::PostStats;

/// Number of posts sampled for the statistics view.
pub const STATS_SAMPLE_LIMIT: u32 = 100;

pub struct AdminService {
    posts: Arc<dyn PostsApi>,
    mock: Arc<dyn MockDataApi>,
    cache: Arc<PostListCache>,
    import_throttle: Duration,
}

impl AdminService {
    pub fn new(
        posts: Arc<dyn PostsApi>,
        mock: Arc<dyn MockDataApi>,
        cache: Arc<PostListCache>,
        import_throttle: Duration,
    ) -> Self {
        Self {
            posts,
            mock,
            cache,
            import_throttle,
        }
    }

    /// Post count and category distribution of the newest posts.
    pub async fn stats(&self) -> Result<PostStats, AppError> {
        if let Some(stats) = self.cache.get_stats() {
            return Ok(stats);
        }
        let epoch = self.cache.epoch();
        let query = PostListQuery {
            limit: STATS_SAMPLE_LIMIT,
            ..PostListQuery::default()
        };
        let response = self.posts.list_posts(&query).await?;
        let stats = PostStats::from_posts(&response.items);
        self.cache.set_stats(epoch, stats.clone());
        Ok(stats)
    }

    /// Delete every post. Refuses when the board is already empty.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<DeleteResponse, AppError> {
        let stats = self.stats().await?;
        if stats.is_empty() {
            return Err(AppError::validation("there are no posts to delete"));
        }

        let response = self.posts.delete_all_posts().await?;
        self.cache.invalidate_posts();
        if response.ok {
            info!(deleted = response.deleted, "Deleted all posts");
        } else {
            warn!(deleted = response.deleted, "Server reported delete-all as not ok");
        }
        Ok(response)
    }

    pub async fn import(&self, count: u32) -> Result<ImportSummary, AppError> {
        let importer = BulkImporter::new(
            self.posts.clone(),
            self.mock.clone(),
            self.cache.clone(),
            self.import_throttle,
        );
        Ok(importer.run(count).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use noticeboard_api_types::{
        Category, Post, PostCreateRequest, PostListResponse, PostUpdateRequest,
    };
    use serde_json::Value;
    use time::OffsetDateTime;

    use super::*;
    use crate::application::repos::ApiError;

    struct Board {
        categories: Vec<Category>,
        lists: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl Board {
        fn new(categories: Vec<Category>) -> Arc<Self> {
            Arc::new(Self {
                categories,
                lists: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PostsApi for Board {
        async fn list_posts(&self, query: &PostListQuery) -> Result<PostListResponse, ApiError> {
            assert_eq!(query.limit, STATS_SAMPLE_LIMIT);
            self.lists.fetch_add(1, Ordering::SeqCst);
            let items = self
                .categories
                .iter()
                .enumerate()
                .map(|(i, category)| Post {
                    id: i.to_string(),
                    user_id: "u".into(),
                    title: "t".into(),
                    body: "b".into(),
                    category: *category,
                    tags: Vec::new(),
                    created_at: OffsetDateTime::UNIX_EPOCH,
                })
                .collect();
            Ok(PostListResponse {
                items,
                ..PostListResponse::default()
            })
        }

        async fn get_post(&self, _id: &str) -> Result<Post, ApiError> {
            unreachable!()
        }

        async fn create_post(&self, _payload: &PostCreateRequest) -> Result<Post, ApiError> {
            unreachable!()
        }

        async fn update_post(
            &self,
            _id: &str,
            _patch: &PostUpdateRequest,
        ) -> Result<Post, ApiError> {
            unreachable!()
        }

        async fn delete_post(&self, _id: &str) -> Result<DeleteResponse, ApiError> {
            unreachable!()
        }

        async fn delete_all_posts(&self) -> Result<DeleteResponse, ApiError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(DeleteResponse {
                ok: true,
                deleted: self.categories.len() as u64,
            })
        }
    }

    struct NoMock;

    #[async_trait]
    impl MockDataApi for NoMock {
        async fn mock_posts(&self, _count: u32) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }
    }

    fn admin(board: Arc<Board>) -> (AdminService, Arc<PostListCache>) {
        let cache = Arc::new(PostListCache::new(NonZeroUsize::new(4).expect("non-zero")));
        let service = AdminService::new(board, Arc::new(NoMock), cache.clone(), Duration::ZERO);
        (service, cache)
    }

    #[tokio::test]
    async fn stats_are_cached_until_invalidated() {
        let board = Board::new(vec![Category::Free, Category::Qna, Category::Free]);
        let (admin, cache) = admin(board.clone());

        let stats = admin.stats().await.expect("stats");
        assert_eq!(stats.total, 3);
        assert_eq!(stats.categories[0].category, Category::Free);
        admin.stats().await.expect("cached");
        assert_eq!(board.lists.load(Ordering::SeqCst), 1);

        cache.invalidate_posts();
        admin.stats().await.expect("refetched");
        assert_eq!(board.lists.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn delete_all_refuses_an_empty_board() {
        let board = Board::new(Vec::new());
        let (admin, _) = admin(board.clone());
        let err = admin.delete_all().await.expect_err("nothing to delete");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(board.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_all_invalidates_cache() {
        let board = Board::new(vec![Category::Notice]);
        let (admin, cache) = admin(board.clone());
        let response = admin.delete_all().await.expect("deleted");
        assert_eq!(response.deleted, 1);
        assert_eq!(cache.epoch(), 1);
    }

    #[tokio::test]
    async fn import_surfaces_malformed_batches() {
        let (admin, _) = admin(Board::new(Vec::new()));
        let err = admin.import(5).await.expect_err("null batch");
        assert_eq!(err.presentation_message(), "Generated data had an unexpected shape");
    }
}
