use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog Models
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub rating: Decimal,
    pub rating_count: u32,
    /// Estimated delivery time in minutes
    pub delivery_time: u32,
    pub delivery_fee: Decimal,
    pub categories: Vec<Category>,
}

impl Restaurant {
    pub fn has_category(&self, category_id: &str) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
}

/// Restaurant together with its menu, as served by `GET /restaurant/{id}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RestaurantDetails {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub dishes: Vec<Dish>,
}

// ============================================================================
// Account Models
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Profile plus the bearer token issued at login/registration.
/// Serialized flat, the way the mobile client expects it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AuthSession {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Partial profile update; absent fields are left untouched
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_restaurant() -> Restaurant {
        Restaurant {
            id: "2".to_string(),
            name: "Pizza Express".to_string(),
            image_url: "https://via.placeholder.com/150".to_string(),
            rating: dec!(4.5),
            rating_count: 187,
            delivery_time: 25,
            delivery_fee: dec!(4.99),
            categories: vec![Category::new("3", "Pizza"), Category::new("4", "Italiana")],
        }
    }

    #[test]
    fn test_restaurant_uses_camel_case_fields() {
        let json = serde_json::to_value(sample_restaurant()).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("ratingCount").is_some());
        assert!(json.get("deliveryFee").is_some());
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_restaurant_details_is_flattened() {
        let details = RestaurantDetails {
            restaurant: sample_restaurant(),
            dishes: vec![],
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "Pizza Express");
        assert!(json["dishes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_auth_session_is_flattened() {
        let session = AuthSession {
            user: UserProfile {
                id: "1".to_string(),
                name: "Usuário Teste".to_string(),
                email: "user@example.com".to_string(),
                phone: Some("(11) 98765-4321".to_string()),
            },
            token: "abc".to_string(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["email"], "user@example.com");
        assert_eq!(json["token"], "abc");
    }

    #[test]
    fn test_has_category() {
        let restaurant = sample_restaurant();
        assert!(restaurant.has_category("3"));
        assert!(!restaurant.has_category("1"));
    }
}
