use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::backend::{BackendError, ErrorKind, MockBackend, OrderDetails};
use crate::domain::order::{Order, OrderRequest};
use crate::models::{
    AuthSession, Category, Credentials, ProfileUpdate, Registration, Restaurant, RestaurantDetails,
    UserProfile,
};

// ============================================================================
// Delivery API - what the client state containers talk to
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("Order cannot be submitted: {0}")]
    InvalidOrder(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl ClientError {
    /// The session is gone and the user has to log in again
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated
                | ClientError::Rejected {
                    kind: ErrorKind::Unauthorized,
                    ..
                }
        )
    }
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        ClientError::Rejected {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// Bearer token sent with authenticated calls
    fn set_token(&self, token: Option<String>);

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ClientError>;
    async fn register(&self, registration: &Registration) -> Result<AuthSession, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError>;

    async fn list_restaurants(&self, category_id: Option<&str>) -> Result<Vec<Restaurant>, ClientError>;
    async fn get_restaurant(&self, restaurant_id: &str) -> Result<RestaurantDetails, ClientError>;
    async fn list_categories(&self) -> Result<Vec<Category>, ClientError>;

    async fn list_orders(&self) -> Result<Vec<Order>, ClientError>;
    async fn get_order(&self, order_id: &str) -> Result<OrderDetails, ClientError>;
    async fn submit_order(&self, request: OrderRequest) -> Result<Order, ClientError>;
    async fn cancel_order(&self, order_id: &str) -> Result<Order, ClientError>;
    async fn rate_order(
        &self,
        order_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Order, ClientError>;
}

/// `DeliveryApi` bound directly to an in-process backend
pub struct InProcessApi {
    backend: Arc<MockBackend>,
    token: RwLock<Option<String>>,
}

impl InProcessApi {
    pub fn new(backend: Arc<MockBackend>) -> Self {
        Self {
            backend,
            token: RwLock::new(None),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// User id for the current token
    fn caller(&self) -> Result<String, ClientError> {
        let token = self.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.backend.authenticate(&token)?)
    }
}

#[async_trait]
impl DeliveryApi for InProcessApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ClientError> {
        Ok(self.backend.login(credentials)?)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthSession, ClientError> {
        Ok(self.backend.register(registration)?)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let token = self.token.write().take();
        if let Some(token) = token {
            if !self.backend.logout(&token) {
                debug!("Token was already revoked");
            }
        }
        Ok(())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        let user_id = self.caller()?;
        Ok(self.backend.update_profile(&user_id, update)?)
    }

    async fn list_restaurants(&self, category_id: Option<&str>) -> Result<Vec<Restaurant>, ClientError> {
        Ok(self.backend.list_restaurants(category_id))
    }

    async fn get_restaurant(&self, restaurant_id: &str) -> Result<RestaurantDetails, ClientError> {
        Ok(self.backend.get_restaurant(restaurant_id)?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        Ok(self.backend.list_categories())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        let user_id = self.caller()?;
        Ok(self.backend.list_orders(&user_id).await?)
    }

    async fn get_order(&self, order_id: &str) -> Result<OrderDetails, ClientError> {
        let user_id = self.caller()?;
        Ok(self.backend.get_order(&user_id, order_id).await?)
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<Order, ClientError> {
        let user_id = self.caller()?;
        Ok(self.backend.place_order(&user_id, request).await?)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<Order, ClientError> {
        let user_id = self.caller()?;
        Ok(self.backend.cancel_order(&user_id, order_id, None).await?)
    }

    async fn rate_order(
        &self,
        order_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Order, ClientError> {
        let user_id = self.caller()?;
        Ok(self.backend.rate_order(&user_id, order_id, rating, comment).await?)
    }
}
