//! Bulk import of generator-produced posts.
//!
//! The generator's response shape is not fixed, so everything it returns goes
//! through [`normalize_batch`] before any write happens. Writes are strictly
//! sequential with a throttle delay after each attempt.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use noticeboard_api_types::{Category, PostCreateRequest};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::application::repos::{ApiError, MockDataApi, PostsApi};
use crate::cache::PostListCache;
use crate::config::MAX_IMPORT_COUNT;
use crate::domain::validation::normalize_tags;

pub const PLACEHOLDER_TITLE: &str = "Untitled";
pub const PLACEHOLDER_BODY: &str = "No content";
pub const FALLBACK_TAG: &str = "sample";

const METRIC_IMPORT_CREATED: &str = "noticeboard_import_created_total";
const METRIC_IMPORT_FAILED: &str = "noticeboard_import_failed_total";
const PREVIEW_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("import count must be between 1 and {max}, got {count}")]
    InvalidCount { count: u32, max: u32 },
    #[error("failed to fetch generated posts: {0}")]
    Fetch(ApiError),
    #[error("generated batch has an unrecognized shape: {preview}")]
    MalformedResponse { preview: String },
}

/// One rejected create; the run continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("item {index} (`{title}`): {message}")]
pub struct PerItemCreateError {
    pub index: usize,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub requested: u32,
    pub created: u32,
    pub failed: u32,
    pub failures: Vec<PerItemCreateError>,
}

/// Loosely-typed generator record. Missing or mistyped fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportCandidate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ImportCandidate {
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            title: text("title"),
            body: text("body"),
            category: text("category"),
            tags: map.get("tags").and_then(Value::as_array).map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        }
    }

    /// Apply the import fallbacks and produce the create payload.
    pub fn into_create_request(self) -> PostCreateRequest {
        let title = non_blank(self.title).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());
        let body = non_blank(self.body).unwrap_or_else(|| PLACEHOLDER_BODY.to_string());
        let category = self
            .category
            .and_then(|raw| raw.parse::<Category>().ok())
            .unwrap_or(Category::Free);
        let mut tags = self
            .tags
            .map(|raw| normalize_tags(&raw))
            .unwrap_or_default();
        if tags.is_empty() {
            tags.push(FALLBACK_TAG.to_string());
        }

        PostCreateRequest {
            title,
            body,
            category,
            tags,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Extract the candidate list from a generator response.
///
/// Shapes are tried in order: a bare array, an object's `items` array, an
/// object's `data` array, then the first array-valued field of the object in
/// document order. An empty batch is as unusable as an unrecognized one.
pub fn normalize_batch(payload: &Value) -> Result<Vec<ImportCandidate>, ImportError> {
    let items = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => ["items", "data"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array)),
        _ => None,
    };

    match items {
        Some(items) if !items.is_empty() => {
            Ok(items.iter().map(ImportCandidate::from_value).collect())
        }
        _ => Err(ImportError::MalformedResponse {
            preview: preview(payload),
        }),
    }
}

fn preview(payload: &Value) -> String {
    let text = payload.to_string();
    if text.chars().count() <= PREVIEW_CHARS {
        text
    } else {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    }
}

pub struct BulkImporter {
    posts: Arc<dyn PostsApi>,
    mock: Arc<dyn MockDataApi>,
    cache: Arc<PostListCache>,
    throttle: Duration,
}

impl BulkImporter {
    pub fn new(
        posts: Arc<dyn PostsApi>,
        mock: Arc<dyn MockDataApi>,
        cache: Arc<PostListCache>,
        throttle: Duration,
    ) -> Self {
        Self {
            posts,
            mock,
            cache,
            throttle,
        }
    }

    /// Fetch `count` generated posts and create them one at a time.
    ///
    /// Item failures are collected in the summary. The post caches are
    /// invalidated once, after the last attempt.
    #[instrument(skip(self))]
    pub async fn run(&self, count: u32) -> Result<ImportSummary, ImportError> {
        if !(1..=MAX_IMPORT_COUNT).contains(&count) {
            return Err(ImportError::InvalidCount {
                count,
                max: MAX_IMPORT_COUNT,
            });
        }

        let payload = self
            .mock
            .mock_posts(count)
            .await
            .map_err(ImportError::Fetch)?;
        let candidates = normalize_batch(&payload)?;
        info!(
            requested = count,
            received = candidates.len(),
            "Starting bulk import"
        );

        let mut summary = ImportSummary {
            requested: count,
            created: 0,
            failed: 0,
            failures: Vec::new(),
        };

        for (index, candidate) in candidates.into_iter().enumerate() {
            let request = candidate.into_create_request();
            match self.posts.create_post(&request).await {
                Ok(post) => {
                    summary.created += 1;
                    counter!(METRIC_IMPORT_CREATED).increment(1);
                    debug!(index, id = %post.id, "Imported post");
                }
                Err(err) => {
                    summary.failed += 1;
                    counter!(METRIC_IMPORT_FAILED).increment(1);
                    warn!(index, title = %request.title, error = %err, "Import item rejected");
                    summary.failures.push(PerItemCreateError {
                        index,
                        title: request.title,
                        message: err.to_string(),
                    });
                }
            }

            if !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        self.cache.invalidate_posts();
        info!(
            created = summary.created,
            failed = summary.failed,
            "Bulk import finished"
        );
        Ok(summary)
    }
}
