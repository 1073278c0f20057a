use std::sync::Arc;

use tracing::{error, instrument};

use super::api::{ClientError, DeliveryApi};
use crate::backend::OrderDetails;
use crate::domain::cart::Cart;
use crate::domain::order::{DeliveryAddress, Order, OrderRequest};

const FETCH_FAILED: &str = "Failed to load orders. Please try again.";

/// The customer's orders as last seen from the server
pub struct OrderBook {
    api: Arc<dyn DeliveryApi>,
    orders: Vec<Order>,
    loading: bool,
    error: Option<String>,
}

impl OrderBook {
    pub fn new(api: Arc<dyn DeliveryApi>) -> Self {
        Self {
            api,
            orders: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the local list with the server's; on failure keep the old
    /// list and set `error`
    pub async fn fetch_orders(&mut self) {
        self.loading = true;
        self.error = None;

        match self.api.list_orders().await {
            Ok(orders) => self.orders = orders,
            Err(e) => {
                error!(error = %e, "Error fetching orders");
                self.error = Some(FETCH_FAILED.to_string());
            }
        }

        self.loading = false;
    }

    pub async fn get_order(&self, order_id: &str) -> Result<OrderDetails, ClientError> {
        self.api.get_order(order_id).await
    }

    /// Submit a request and put the new order at the top of the list
    pub async fn place_order(&mut self, request: OrderRequest) -> Result<Order, ClientError> {
        let order = self.api.submit_order(request).await?;
        self.orders.insert(0, order.clone());
        Ok(order)
    }

    /// Snapshot the cart and submit it. The cart is left as it was, whatever
    /// the outcome.
    #[instrument(skip(self, cart, address), fields(items = cart.item_count()))]
    pub async fn checkout(
        &mut self,
        cart: &Cart,
        address: DeliveryAddress,
    ) -> Result<Order, ClientError> {
        let request = OrderRequest::from_cart(cart, address)
            .map_err(|e| ClientError::InvalidOrder(e.to_string()))?;
        self.place_order(request).await
    }

    pub async fn cancel_order(&mut self, order_id: &str) -> Result<Order, ClientError> {
        let order = self.api.cancel_order(order_id).await?;
        self.replace(&order);
        Ok(order)
    }

    pub async fn rate_order(
        &mut self,
        order_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Order, ClientError> {
        let order = self.api.rate_order(order_id, rating, comment).await?;
        self.replace(&order);
        Ok(order)
    }

    fn replace(&mut self, updated: &Order) {
        if let Some(slot) = self.orders.iter_mut().find(|o| o.id == updated.id) {
            *slot = updated.clone();
        }
    }
}
