use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::accounts::{AccountDirectory, AccountError};
use crate::catalog::{Catalog, CatalogError};
use crate::domain::order::{
    Order, OrderCommand, OrderCommandHandler, OrderDelivered, OrderError, OrderEvent, OrderLine,
    OrderPlaced, OrderPreparationStarted, OrderRequest, Rating,
};
use crate::event_sourcing::EventStore;
use crate::metrics::Metrics;
use crate::models::{
    AuthSession, Category, Credentials, ProfileUpdate, Registration, Restaurant, RestaurantDetails,
    UserProfile,
};

// ============================================================================
// Mock Backend - catalog, accounts and ordering in one process
// ============================================================================

/// Broad failure class, used to pick HTTP statuses and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Catalog(CatalogError::RestaurantNotFound(_)) => ErrorKind::NotFound,
            BackendError::Catalog(CatalogError::DishNotOnMenu { .. }) => ErrorKind::Validation,

            BackendError::Account(e) => match e {
                AccountError::Unauthorized(_) => ErrorKind::Unauthorized,
                AccountError::Validation(_) => ErrorKind::Validation,
                AccountError::Conflict(_) => ErrorKind::Conflict,
                AccountError::NotFound(_) => ErrorKind::NotFound,
                AccountError::Hashing(_) => ErrorKind::Internal,
            },

            BackendError::Order(e) => match e {
                OrderError::NotFound(_) => ErrorKind::NotFound,
                OrderError::AlreadyExists(_)
                | OrderError::ConcurrentModification(_)
                | OrderError::AlreadyCancelled
                | OrderError::InvalidStatusTransition { .. }
                | OrderError::CannotRateCancelled => ErrorKind::Conflict,
                OrderError::EmptyItems
                | OrderError::InvalidQuantity { .. }
                | OrderError::NegativePrice(_)
                | OrderError::DuplicateItem(_)
                | OrderError::MissingRestaurant
                | OrderError::MissingAddress
                | OrderError::AmountOverflow
                | OrderError::InvalidRating(_) => ErrorKind::Validation,
                OrderError::NotInitialized | OrderError::Store(_) => ErrorKind::Internal,
            },
        }
    }
}

/// An order together with the restaurant it was placed at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    #[serde(default)]
    pub restaurant: Option<Restaurant>,
}

pub struct MockBackend {
    catalog: Catalog,
    accounts: AccountDirectory,
    orders: OrderCommandHandler,
    next_order_id: AtomicU64,
    metrics: Option<Arc<Metrics>>,
}

impl MockBackend {
    /// Backend without any orders
    pub fn new(catalog: Catalog, accounts: AccountDirectory) -> Self {
        Self {
            catalog,
            accounts,
            orders: OrderCommandHandler::new(Arc::new(EventStore::new("Order"))),
            next_order_id: AtomicU64::new(1),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Demo catalog, the demo user and their two past orders
    pub async fn seeded() -> anyhow::Result<Self> {
        let backend = Self::new(Catalog::seeded(), AccountDirectory::seeded()?);

        let placed_at: DateTime<Utc> = "2023-06-10T14:30:00Z".parse()?;
        let delivered_at: DateTime<Utc> = "2023-06-10T15:15:00Z".parse()?;
        backend
            .orders
            .record_history(
                "1",
                vec![
                    OrderEvent::Placed(OrderPlaced {
                        order_id: "1".to_string(),
                        customer_id: "1".to_string(),
                        restaurant_id: "1".to_string(),
                        items: vec![line("1", "Feijoada Completa", dec!(35.90), 2)],
                        total: dec!(71.80),
                        delivery_fee: dec!(5.99),
                        delivery_address: None,
                        placed_at,
                    }),
                    OrderEvent::Delivered(OrderDelivered { delivered_at }),
                ],
            )
            .await?;

        let placed_at: DateTime<Utc> = "2023-06-15T19:45:00Z".parse()?;
        backend
            .orders
            .record_history(
                "2",
                vec![
                    OrderEvent::Placed(OrderPlaced {
                        order_id: "2".to_string(),
                        customer_id: "1".to_string(),
                        restaurant_id: "2".to_string(),
                        items: vec![
                            line("3", "Pizza Margherita", dec!(39.90), 1),
                            line("4", "Pizza Pepperoni", dec!(45.90), 1),
                        ],
                        total: dec!(85.80),
                        delivery_fee: dec!(4.99),
                        delivery_address: None,
                        placed_at,
                    }),
                    OrderEvent::PreparationStarted(OrderPreparationStarted {
                        started_at: placed_at,
                    }),
                ],
            )
            .await?;

        backend.next_order_id.store(3, Ordering::SeqCst);
        info!("Mock backend seeded with demo data");
        Ok(backend)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn record<F: FnOnce(&Metrics)>(&self, f: F) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub fn list_restaurants(&self, category_id: Option<&str>) -> Vec<Restaurant> {
        self.catalog.list_restaurants(category_id)
    }

    pub fn get_restaurant(&self, restaurant_id: &str) -> Result<RestaurantDetails, BackendError> {
        Ok(self.catalog.get_restaurant(restaurant_id)?)
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.catalog.list_categories()
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    pub fn login(&self, credentials: &Credentials) -> Result<AuthSession, BackendError> {
        let result = self.accounts.login(credentials);
        self.record(|m| m.record_auth_attempt("login", result.is_ok()));
        Ok(result?)
    }

    pub fn register(&self, registration: &Registration) -> Result<AuthSession, BackendError> {
        let result = self.accounts.register(registration);
        self.record(|m| m.record_auth_attempt("register", result.is_ok()));
        Ok(result?)
    }

    pub fn logout(&self, token: &str) -> bool {
        let revoked = self.accounts.logout(token);
        self.record(|m| m.record_auth_attempt("logout", revoked));
        revoked
    }

    /// User id behind a bearer token
    pub fn authenticate(&self, token: &str) -> Result<String, BackendError> {
        Ok(self.accounts.authenticate(token)?)
    }

    pub fn profile(&self, user_id: &str) -> Result<UserProfile, BackendError> {
        Ok(self.accounts.profile(user_id)?)
    }

    pub fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        Ok(self.accounts.update_profile(user_id, update)?)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// The customer's orders, newest first
    pub async fn list_orders(&self, customer_id: &str) -> Result<Vec<Order>, BackendError> {
        let mut orders: Vec<Order> = self
            .orders
            .load_all()
            .await?
            .into_iter()
            .filter(|order| order.customer_id == customer_id)
            .collect();
        orders.reverse();
        Ok(orders)
    }

    pub async fn get_order(
        &self,
        customer_id: &str,
        order_id: &str,
    ) -> Result<OrderDetails, BackendError> {
        let order = self.owned_order(customer_id, order_id).await?;
        let restaurant = self.catalog.find_restaurant(&order.restaurant_id).cloned();
        Ok(OrderDetails { order, restaurant })
    }

    /// Prices are taken from the request; dishes must belong to the restaurant
    #[instrument(skip(self, request), fields(restaurant_id = %request.restaurant_id))]
    pub async fn place_order(
        &self,
        customer_id: &str,
        request: OrderRequest,
    ) -> Result<Order, BackendError> {
        request.validate()?;
        if self.catalog.find_restaurant(&request.restaurant_id).is_none() {
            return Err(CatalogError::RestaurantNotFound(request.restaurant_id.clone()).into());
        }
        for line in &request.items {
            self.catalog.ensure_on_menu(&request.restaurant_id, &line.id)?;
        }

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst).to_string();
        let command = OrderCommand::PlaceOrder {
            order_id: order_id.clone(),
            customer_id: customer_id.to_string(),
            delivery_fee: self.catalog.delivery_fee(&request.restaurant_id),
            request,
            placed_at: Utc::now(),
        };

        let order = self
            .orders
            .handle(&order_id, command, Uuid::new_v4(), Some(customer_id))
            .await?;

        info!(order_id = %order.id, total = %order.total, "Order placed");
        self.record(|m| m.record_order_placed(order.grand_total()));
        Ok(order)
    }

    pub async fn cancel_order(
        &self,
        customer_id: &str,
        order_id: &str,
        reason: Option<String>,
    ) -> Result<Order, BackendError> {
        self.owned_order(customer_id, order_id).await?;
        let command = OrderCommand::CancelOrder {
            reason,
            cancelled_at: Utc::now(),
        };
        let order = self
            .orders
            .handle(order_id, command, Uuid::new_v4(), Some(customer_id))
            .await?;

        info!(order_id = %order_id, "Order cancelled");
        self.record(|m| m.record_order_cancelled());
        Ok(order)
    }

    pub async fn rate_order(
        &self,
        customer_id: &str,
        order_id: &str,
        stars: u8,
        comment: Option<String>,
    ) -> Result<Order, BackendError> {
        let rating = Rating::new(stars)?;
        self.owned_order(customer_id, order_id).await?;

        let order = self
            .orders
            .handle(
                order_id,
                OrderCommand::RateOrder { rating, comment },
                Uuid::new_v4(),
                Some(customer_id),
            )
            .await?;

        self.record(|m| m.record_order_rated());
        Ok(order)
    }

    /// Restaurant side: the kitchen picked the order up
    pub async fn start_preparation(&self, order_id: &str) -> Result<Order, BackendError> {
        let command = OrderCommand::StartPreparation { started_at: Utc::now() };
        Ok(self.orders.handle(order_id, command, Uuid::new_v4(), None).await?)
    }

    /// Restaurant side: the courier handed the order over
    pub async fn mark_delivered(&self, order_id: &str) -> Result<Order, BackendError> {
        let command = OrderCommand::MarkDelivered { delivered_at: Utc::now() };
        Ok(self.orders.handle(order_id, command, Uuid::new_v4(), None).await?)
    }

    /// Orders of other customers are reported as missing
    async fn owned_order(&self, customer_id: &str, order_id: &str) -> Result<Order, BackendError> {
        match self.orders.load(order_id).await? {
            Some(order) if order.customer_id == customer_id => Ok(order),
            _ => Err(OrderError::NotFound(order_id.to_string()).into()),
        }
    }
}

fn line(id: &str, name: &str, price: rust_decimal::Decimal, quantity: u32) -> OrderLine {
    OrderLine {
        id: id.to_string(),
        name: name.to_string(),
        price,
        quantity,
    }
}
