use std::sync::Arc;

use tracing::{debug, error, warn};

use super::api::{ClientError, DeliveryApi};
use super::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};
use crate::models::{AuthSession, Credentials, ProfileUpdate, Registration, UserProfile};

// ============================================================================
// Session - authentication state of the app
// ============================================================================
//
// Mirrors the logged-in user into view state and into the key-value store,
// so a restart can pick the session up again with `restore`.
//
// Operations report success as `bool` and log the failure.
//
// ============================================================================

pub struct Session {
    api: Arc<dyn DeliveryApi>,
    store: Arc<dyn KeyValueStore>,
    current_user: Option<UserProfile>,
    loading: bool,
}

impl Session {
    /// Starts out loading until `restore` has run
    pub fn new(api: Arc<dyn DeliveryApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            store,
            current_user: None,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current_user.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Pick up a session persisted by an earlier run
    pub async fn restore(&mut self) {
        match self.read_persisted().await {
            Ok(Some((token, user))) => {
                debug!(user_id = %user.id, "Restored session");
                self.api.set_token(Some(token));
                self.current_user = Some(user);
            }
            Ok(None) => debug!("No persisted session"),
            Err(e) => error!(error = %e, "Failed to restore session"),
        }
        self.loading = false;
    }

    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = match self.api.login(&credentials).await {
            Ok(session) => self.start(session).await,
            Err(e) => Err(e),
        };
        report("login", result)
    }

    pub async fn register(&mut self, registration: &Registration) -> bool {
        let result = match self.api.register(registration).await {
            Ok(session) => self.start(session).await,
            Err(e) => Err(e),
        };
        report("register", result)
    }

    pub async fn logout(&mut self) -> bool {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Server-side logout failed");
        }
        let result = self.forget().await;
        report("logout", result)
    }

    /// Merge the server's view of the profile into the local one
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> bool {
        let result = match self.api.update_profile(update).await {
            Ok(profile) => self.persist_user(profile).await,
            Err(e) => Err(e),
        };
        report("update_profile", result)
    }

    /// The server no longer accepts our token: drop the session locally
    pub async fn expire(&mut self) {
        self.api.set_token(None);
        if let Err(e) = self.forget().await {
            error!(error = %e, "Failed to clear expired session");
        }
    }

    async fn start(&mut self, session: AuthSession) -> Result<(), ClientError> {
        let AuthSession { user, token } = session;
        self.store.set(TOKEN_KEY, token.clone()).await?;
        if let Err(e) = self.persist_user(user).await {
            // Never leave a token persisted without its user
            if let Err(cleanup) = self.store.delete(TOKEN_KEY).await {
                warn!(error = %cleanup, "Failed to remove orphaned token");
            }
            return Err(e);
        }
        self.api.set_token(Some(token));
        Ok(())
    }

    async fn persist_user(&mut self, user: UserProfile) -> Result<(), ClientError> {
        let json = serde_json::to_string(&user).map_err(|e| ClientError::Storage(e.to_string()))?;
        self.store.set(USER_KEY, json).await?;
        self.current_user = Some(user);
        Ok(())
    }

    async fn forget(&mut self) -> Result<(), ClientError> {
        self.current_user = None;
        self.store.delete(TOKEN_KEY).await?;
        self.store.delete(USER_KEY).await
    }

    async fn read_persisted(&self) -> Result<Option<(String, UserProfile)>, ClientError> {
        let token = self.store.get(TOKEN_KEY).await?;
        let user = self.store.get(USER_KEY).await?;
        match (token, user) {
            (Some(token), Some(user)) => {
                let user = serde_json::from_str(&user).map_err(|e| ClientError::Storage(e.to_string()))?;
                Ok(Some((token, user)))
            }
            _ => Ok(None),
        }
    }
}

fn report(operation: &str, result: Result<(), ClientError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!(operation, error = %e, "Session operation failed");
            false
        }
    }
}
