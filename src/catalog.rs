use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{Category, Dish, Restaurant, RestaurantDetails};

// ============================================================================
// Catalog - restaurants, categories and dishes
// ============================================================================
//
// Read-only after construction, so it is shared without locking.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(String),

    #[error("Dish {dish_id} is not on the menu of restaurant {restaurant_id}")]
    DishNotOnMenu { dish_id: String, restaurant_id: String },
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
    categories: Vec<Category>,
    dishes: Vec<Dish>,
}

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

impl Catalog {
    pub fn new(restaurants: Vec<Restaurant>, categories: Vec<Category>, dishes: Vec<Dish>) -> Self {
        Self {
            restaurants,
            categories,
            dishes,
        }
    }

    /// The demo data set: three restaurants, eight categories, five dishes
    pub fn seeded() -> Self {
        let categories = vec![
            Category::new("1", "Brasileira"),
            Category::new("2", "Tradicional"),
            Category::new("3", "Pizza"),
            Category::new("4", "Italiana"),
            Category::new("5", "Japonesa"),
            Category::new("6", "Sushi"),
            Category::new("7", "Lanches"),
            Category::new("8", "Vegetariana"),
        ];

        let restaurant = |id: &str, name: &str, rating, rating_count, delivery_time, delivery_fee, tags: [usize; 2]| {
            Restaurant {
                id: id.to_string(),
                name: name.to_string(),
                image_url: PLACEHOLDER_IMAGE.to_string(),
                rating,
                rating_count,
                delivery_time,
                delivery_fee,
                categories: tags.iter().map(|&i| categories[i].clone()).collect(),
            }
        };

        let restaurants = vec![
            restaurant("1", "Restaurante Brasileiro", dec!(4.7), 253, 30, dec!(5.99), [0, 1]),
            restaurant("2", "Pizza Express", dec!(4.5), 187, 25, dec!(4.99), [2, 3]),
            restaurant("3", "Sushi Delícia", dec!(4.8), 312, 40, dec!(7.99), [4, 5]),
        ];

        let dish = |id: &str, restaurant_id: &str, name: &str, description: &str, price| Dish {
            id: id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            image_url: PLACEHOLDER_IMAGE.to_string(),
        };

        let dishes = vec![
            dish("1", "1", "Feijoada Completa", "Feijoada tradicional com arroz, couve, farofa e laranja", dec!(35.90)),
            dish("2", "1", "Moqueca de Peixe", "Moqueca de peixe com arroz e pirão", dec!(42.90)),
            dish("3", "2", "Pizza Margherita", "Molho de tomate, mussarela, manjericão fresco", dec!(39.90)),
            dish("4", "2", "Pizza Pepperoni", "Molho de tomate, mussarela, pepperoni", dec!(45.90)),
            dish("5", "3", "Combo Sushi (30 peças)", "Mix de sushis e sashimis variados", dec!(89.90)),
        ];

        Self::new(restaurants, categories, dishes)
    }

    /// All restaurants, or only those tagged with `category_id`
    pub fn list_restaurants(&self, category_id: Option<&str>) -> Vec<Restaurant> {
        self.restaurants
            .iter()
            .filter(|r| category_id.map_or(true, |id| r.has_category(id)))
            .cloned()
            .collect()
    }

    pub fn find_restaurant(&self, restaurant_id: &str) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == restaurant_id)
    }

    pub fn get_restaurant(&self, restaurant_id: &str) -> Result<RestaurantDetails, CatalogError> {
        let restaurant = self
            .find_restaurant(restaurant_id)
            .ok_or_else(|| CatalogError::RestaurantNotFound(restaurant_id.to_string()))?;

        Ok(RestaurantDetails {
            restaurant: restaurant.clone(),
            dishes: self.dishes_for(restaurant_id),
        })
    }

    pub fn list_categories(&self) -> Vec<Category> {
        self.categories.clone()
    }

    pub fn dishes_for(&self, restaurant_id: &str) -> Vec<Dish> {
        self.dishes
            .iter()
            .filter(|d| d.restaurant_id == restaurant_id)
            .cloned()
            .collect()
    }

    /// Zero for restaurants the catalog does not know
    pub fn delivery_fee(&self, restaurant_id: &str) -> Decimal {
        self.find_restaurant(restaurant_id)
            .map_or(Decimal::ZERO, |r| r.delivery_fee)
    }

    pub fn ensure_on_menu(&self, restaurant_id: &str, dish_id: &str) -> Result<(), CatalogError> {
        let on_menu = self
            .dishes
            .iter()
            .any(|d| d.id == dish_id && d.restaurant_id == restaurant_id);

        if on_menu {
            Ok(())
        } else {
            Err(CatalogError::DishNotOnMenu {
                dish_id: dish_id.to_string(),
                restaurant_id: restaurant_id.to_string(),
            })
        }
    }
}
