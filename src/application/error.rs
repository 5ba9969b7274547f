use thiserror::Error;

use crate::{
    application::{import::ImportError, pagination::PaginationError, repos::ApiError},
    domain::error::DomainError,
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether repeating the same operation may succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Api(err) | AppError::Import(ImportError::Fetch(err)) => err.is_retryable(),
            AppError::Pagination(PaginationError::FetchInFlight) => true,
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AppError::Api(ApiError::Unauthorized)
                | AppError::Import(ImportError::Fetch(ApiError::Unauthorized))
        )
    }

    /// Short user-facing explanation, without internal detail.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(_) | AppError::Validation(_) => "Input was rejected",
            AppError::Api(ApiError::Network(_)) => "Could not reach the board API",
            AppError::Api(ApiError::Unauthorized) => "Please log in again",
            AppError::Api(ApiError::Server { .. }) => "The board API rejected the request",
            AppError::Api(ApiError::Decode(_)) => "The board API sent an unexpected response",
            AppError::Api(ApiError::InvalidRequest(_)) => "Request could not be built",
            AppError::Import(ImportError::MalformedResponse { .. }) => {
                "Generated data had an unexpected shape"
            }
            AppError::Import(_) => "Import failed",
            AppError::Pagination(_) => "A page is still loading",
            AppError::Infra(_) => "Local storage failure",
        }
    }
}
