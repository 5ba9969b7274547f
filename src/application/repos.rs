//! Traits describing the remote board API consumed by the services.
//!
//! `infra::http::ApiClient` implements all of them; tests substitute stubs.

use async_trait::async_trait;
use noticeboard_api_types::{
    CoffeeConsumptionResponse, DeleteResponse, HealthResponse, LoginRequest, LoginResponse, Post,
    PostCreateRequest, PostListQuery, PostListResponse, PostUpdateRequest, TopCoffeeBrandItem,
    WeeklyMoodItem,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The collaborator could not be reached or did not answer in time.
    #[error("network error: {0}")]
    Network(String),
    #[error("session expired or missing; log in again")]
    Unauthorized,
    #[error("server responded {status}: {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, query: &PostListQuery) -> Result<PostListResponse, ApiError>;

    async fn get_post(&self, id: &str) -> Result<Post, ApiError>;

    async fn create_post(&self, payload: &PostCreateRequest) -> Result<Post, ApiError>;

    async fn update_post(&self, id: &str, patch: &PostUpdateRequest) -> Result<Post, ApiError>;

    async fn delete_post(&self, id: &str) -> Result<DeleteResponse, ApiError>;

    async fn delete_all_posts(&self) -> Result<DeleteResponse, ApiError>;
}

/// Generator endpoints. The post batch is returned untyped because its shape
/// varies between deployments.
#[async_trait]
pub trait MockDataApi: Send + Sync {
    async fn mock_posts(&self, count: u32) -> Result<serde_json::Value, ApiError>;
}

#[async_trait]
pub trait ChartsApi: Send + Sync {
    async fn top_coffee_brands(&self) -> Result<Vec<TopCoffeeBrandItem>, ApiError>;

    async fn weekly_mood_trend(&self) -> Result<Vec<WeeklyMoodItem>, ApiError>;

    async fn coffee_consumption(&self) -> Result<CoffeeConsumptionResponse, ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;

    async fn health(&self) -> Result<HealthResponse, ApiError>;
}
