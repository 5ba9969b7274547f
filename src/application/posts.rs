use std::sync::Arc;

use noticeboard_api_types::{
    Category, DeleteResponse, Post, PostCreateRequest, PostUpdateRequest,
};
use tracing::{info, instrument};

use crate::application::error::AppError;
use crate::application::repos::PostsApi;
use crate::cache::PostListCache;
use crate::domain::validation::{validate_patch, validate_post, validate_tags};

/// Input for a new post before validation.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub category: Category,
    pub tags: Vec<String>,
}

/// Single-post reads and every write. Writes are validated locally first
/// and invalidate the post-list cache on success.
pub struct PostService {
    posts: Arc<dyn PostsApi>,
    cache: Arc<PostListCache>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostsApi>, cache: Arc<PostListCache>) -> Self {
        Self { posts, cache }
    }

    pub async fn get(&self, id: &str) -> Result<Post, AppError> {
        Ok(self.posts.get_post(require_id(id)?).await?)
    }

    /// Tags are checked strictly and rejected past five, unlike the
    /// bulk import path which trims the list with `normalize_tags`.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: PostDraft) -> Result<Post, AppError> {
        validate_post(&draft.title, &draft.body)?;
        let tags = validate_tags(&draft.tags)?;

        let request = PostCreateRequest {
            title: draft.title.trim().to_string(),
            body: draft.body,
            category: draft.category,
            tags,
        };
        let post = self.posts.create_post(&request).await?;
        self.cache.invalidate_posts();
        info!(id = %post.id, "Post created");
        Ok(post)
    }

    /// Only the fields present in `patch` are validated and sent.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, mut patch: PostUpdateRequest) -> Result<Post, AppError> {
        let id = require_id(id)?;
        if patch.is_empty() {
            return Err(AppError::validation("nothing to update"));
        }
        validate_patch(patch.title.as_deref(), patch.body.as_deref())?;
        if let Some(tags) = patch.tags.take() {
            patch.tags = Some(validate_tags(&tags)?);
        }
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
        }

        let post = self.posts.update_post(id, &patch).await?;
        self.cache.invalidate_posts();
        info!(id = %post.id, "Post updated");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<DeleteResponse, AppError> {
        let response = self.posts.delete_post(require_id(id)?).await?;
        self.cache.invalidate_posts();
        info!(deleted = response.deleted, "Post deleted");
        Ok(response)
    }
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(AppError::validation("post id is required"))
    } else {
        Ok(trimmed)
    }
}
