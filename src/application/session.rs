//! Process-wide authentication context.
//!
//! The bearer token and user live behind a lock so the HTTP client can read
//! them on every request and clear them when the server answers 401.

use std::sync::{Arc, RwLock};

use noticeboard_api_types::User;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::lock::{rw_read, rw_write};
use crate::infra::error::InfraError;

const SOURCE: &str = "application::session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: User,
}

/// Durable storage for the session between CLI invocations.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionData>, InfraError>;

    fn save(&self, data: &SessionData) -> Result<(), InfraError>;

    fn clear(&self) -> Result<(), InfraError>;
}

pub struct Session {
    store: Arc<dyn SessionStore>,
    state: RwLock<Option<SessionData>>,
}

impl Session {
    /// Restore a previously persisted session. An unreadable store yields an
    /// anonymous session rather than an error.
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let state = match store.load() {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable session; starting anonymous");
                None
            }
        };
        Self {
            store,
            state: RwLock::new(state),
        }
    }

    pub fn bearer(&self) -> Option<String> {
        rw_read(&self.state, SOURCE, "bearer")
            .as_ref()
            .map(|data| data.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        rw_read(&self.state, SOURCE, "user")
            .as_ref()
            .map(|data| data.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        rw_read(&self.state, SOURCE, "is_authenticated").is_some()
    }

    /// Persist and activate a fresh session.
    pub fn activate(&self, data: SessionData) -> Result<(), InfraError> {
        self.store.save(&data)?;
        info!(user = %data.user.email, "Session activated");
        *rw_write(&self.state, SOURCE, "activate") = Some(data);
        Ok(())
    }

    /// Forget the session in memory and in the store.
    pub fn clear(&self) -> Result<(), InfraError> {
        let previous = rw_write(&self.state, SOURCE, "clear").take();
        if previous.is_some() {
            info!("Session cleared");
        }
        self.store.clear()
    }
}

/// Store that keeps nothing; used when persistence is not wanted.
#[derive(Debug, Default)]
pub struct EphemeralSessionStore;

impl SessionStore for EphemeralSessionStore {
    fn load(&self) -> Result<Option<SessionData>, InfraError> {
        Ok(None)
    }

    fn save(&self, _data: &SessionData) -> Result<(), InfraError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        Ok(())
    }
}
