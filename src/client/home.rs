use std::sync::Arc;

use futures_util::future::try_join;
use tracing::error;

use super::api::DeliveryApi;
use crate::models::{Category, Restaurant};

/// Restaurants and categories shown on the home screen
pub struct HomeFeed {
    api: Arc<dyn DeliveryApi>,
    restaurants: Vec<Restaurant>,
    categories: Vec<Category>,
    loading: bool,
    refreshing: bool,
}

impl HomeFeed {
    pub fn new(api: Arc<dyn DeliveryApi>) -> Self {
        Self {
            api,
            restaurants: Vec::new(),
            categories: Vec::new(),
            loading: false,
            refreshing: false,
        }
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn refreshing(&self) -> bool {
        self.refreshing
    }

    /// Fetch both lists concurrently. If either request fails nothing is
    /// replaced.
    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let result = try_join(self.api.list_restaurants(None), self.api.list_categories()).await;
        self.loading = false;

        match result {
            Ok((restaurants, categories)) => {
                self.restaurants = restaurants;
                self.categories = categories;
                true
            }
            Err(e) => {
                error!(error = %e, "Error fetching home feed");
                false
            }
        }
    }

    pub async fn refresh(&mut self) -> bool {
        self.refreshing = true;
        let loaded = self.load().await;
        self.refreshing = false;
        loaded
    }

    /// Restaurants tagged with `category_id`, from the last load
    pub fn restaurants_in(&self, category_id: &str) -> Vec<&Restaurant> {
        self.restaurants
            .iter()
            .filter(|r| r.has_category(category_id))
            .collect()
    }
}
