use std::sync::Arc;

use async_trait::async_trait;
use noticeboard_api_types::{
    CoffeeConsumptionResponse, DeleteResponse, HealthResponse, LoginRequest, LoginResponse, Post,
    PostCreateRequest, PostListQuery, PostListResponse, PostUpdateRequest, TopCoffeeBrandItem,
    WeeklyMoodItem,
};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::application::repos::{ApiError, AuthApi, ChartsApi, MockDataApi, PostsApi};
use crate::application::session::Session;
use crate::config::ApiSettings;
use crate::infra::error::InfraError;

const FALLBACK_ERROR_MESSAGE: &str = "an error occurred";

/// HTTP adapter for the board API.
///
/// Attaches the session's bearer token to every request and clears the
/// session when the server answers 401.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Arc<Session>) -> Result<Self, InfraError> {
        if settings.base_url.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "API base URL `{}` cannot carry paths",
                settings.base_url
            )));
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base: settings.base_url.clone(),
            session,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("noticeboard/", env!("CARGO_PKG_VERSION"))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Append path segments to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidRequest(format!("base URL `{}` cannot carry paths", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(token) = self.session.bearer() {
            req = req.bearer_auth(token);
        }
        if let Some(payload) = body {
            req = req.json(&payload);
        }

        let resp = req.send().await.map_err(transport_error)?;
        debug!(
            method = %method,
            url = %url,
            status = resp.status().as_u16(),
            "API call finished"
        );
        self.handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(&self, resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport_error)?;

        if status == StatusCode::UNAUTHORIZED {
            if let Err(err) = self.session.clear() {
                warn!(error = %err, "Failed to clear session after 401");
            }
            warn!("Server rejected credentials; session cleared");
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

fn to_body(payload: &impl Serialize) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(payload).map_err(|err| ApiError::InvalidRequest(err.to_string()))
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network(format!("request timed out: {err}"))
    } else {
        ApiError::network(err)
    }
}

/// Prefer the body's `message`, then `error`, then its raw text.
fn error_message(bytes: &[u8]) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(bytes) {
        for key in ["message", "error"] {
            if let Some(text) = map.get(key).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl PostsApi for ApiClient {
    async fn list_posts(&self, query: &PostListQuery) -> Result<PostListResponse, ApiError> {
        self.request(Method::GET, &["posts"], &query.to_query_pairs(), None)
            .await
    }

    async fn get_post(&self, id: &str) -> Result<Post, ApiError> {
        self.request(Method::GET, &["posts", id], &[], None).await
    }

    async fn create_post(&self, payload: &PostCreateRequest) -> Result<Post, ApiError> {
        self.request(Method::POST, &["posts"], &[], Some(to_body(payload)?))
            .await
    }

    async fn update_post(&self, id: &str, patch: &PostUpdateRequest) -> Result<Post, ApiError> {
        self.request(Method::PATCH, &["posts", id], &[], Some(to_body(patch)?))
            .await
    }

    async fn delete_post(&self, id: &str) -> Result<DeleteResponse, ApiError> {
        self.request(Method::DELETE, &["posts", id], &[], None).await
    }

    async fn delete_all_posts(&self) -> Result<DeleteResponse, ApiError> {
        self.request(Method::DELETE, &["posts"], &[], None).await
    }
}

#[async_trait]
impl MockDataApi for ApiClient {
    async fn mock_posts(&self, count: u32) -> Result<serde_json::Value, ApiError> {
        self.request(
            Method::GET,
            &["mock", "posts"],
            &[("count", count.to_string())],
            None,
        )
        .await
    }
}

#[async_trait]
impl ChartsApi for ApiClient {
    async fn top_coffee_brands(&self) -> Result<Vec<TopCoffeeBrandItem>, ApiError> {
        self.request(Method::GET, &["mock", "top-coffee-brands"], &[], None)
            .await
    }

    async fn weekly_mood_trend(&self) -> Result<Vec<WeeklyMoodItem>, ApiError> {
        self.request(Method::GET, &["mock", "weekly-mood-trend"], &[], None)
            .await
    }

    async fn coffee_consumption(&self) -> Result<CoffeeConsumptionResponse, ApiError> {
        self.request(Method::GET, &["mock", "coffee-consumption"], &[], None)
            .await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.request(
            Method::POST,
            &["auth", "login"],
            &[],
            Some(to_body(credentials)?),
        )
        .await
    }

    async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.request(Method::GET, &["health"], &[], None).await
    }
}
