use std::sync::Arc;

use noticeboard_api_types::{HealthResponse, LoginRequest, User};
use tracing::instrument;

use crate::application::error::AppError;
use crate::application::repos::AuthApi;
use crate::application::session::{Session, SessionData};

pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: Arc<Session>,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApi>, session: Arc<Session>) -> Self {
        Self { api, session }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("a valid email is required"));
        }
        if password.is_empty() {
            return Err(AppError::validation("password is required"));
        }

        let response = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        let user = response.user.clone();
        self.session.activate(SessionData {
            token: response.token,
            user: response.user,
        })?;
        Ok(user)
    }

    /// Returns whether a session was active.
    pub fn logout(&self) -> Result<bool, AppError> {
        let was_active = self.session.is_authenticated();
        self.session.clear()?;
        Ok(was_active)
    }

    pub fn whoami(&self) -> Option<User> {
        self.session.user()
    }

    pub async fn health(&self) -> Result<HealthResponse, AppError> {
        Ok(self.api.health().await?)
    }
}
