#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use noticeboard::application::admin::AdminService;
use noticeboard::application::auth::AuthService;
use noticeboard::application::board::BoardService;
use noticeboard::application::charts::ChartService;
use noticeboard::application::error::AppError;
use noticeboard::application::posts::PostService;
use noticeboard::application::session::Session;
use noticeboard::cache::PostListCache;
use noticeboard::config::{LoadError, Settings};
use noticeboard::infra::error::InfraError;
use noticeboard::infra::http::ApiClient;
use noticeboard::infra::session_store::FileSessionStore;
use noticeboard_api_types::PostListQuery;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to write output: {0}")]
    Output(String),
}

impl CliError {
    /// Follow-up advice printed under the error, when there is any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::App(err) if err.is_unauthorized() => {
                Some("run `noticeboard login --email <EMAIL>` and try again")
            }
            CliError::App(err) if err.is_retryable() => {
                Some("the failure looks transient; retry the command")
            }
            CliError::Config(_) => Some("check config files, NOTICEBOARD__* variables and flags"),
            _ => None,
        }
    }
}

/// Everything a command needs, built once from the resolved settings.
pub struct Ctx {
    pub settings: Settings,
    pub session: Arc<Session>,
    pub api: Arc<ApiClient>,
    pub cache: Arc<PostListCache>,
}

impl Ctx {
    pub fn new(settings: Settings) -> Result<Self, CliError> {
        let store = Arc::new(FileSessionStore::new(settings.session.file.clone()));
        let session = Arc::new(Session::restore(store));
        let api = Arc::new(ApiClient::new(&settings.api, session.clone())?);
        let cache = Arc::new(PostListCache::new(settings.cache.post_list_limit));
        Ok(Self {
            settings,
            session,
            api,
            cache,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.settings.api.page_size.get()
    }

    pub fn board(&self, query: PostListQuery) -> BoardService {
        BoardService::with_query(self.api.clone(), self.cache.clone(), query)
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.api.clone(), self.cache.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(
            self.api.clone(),
            self.api.clone(),
            self.cache.clone(),
            self.settings.import.throttle,
        )
    }

    pub fn charts(&self) -> ChartService {
        ChartService::new(self.api.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.api.clone(), self.session.clone())
    }
}
