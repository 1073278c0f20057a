use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::CartError;
use crate::models::{Dish, Restaurant};

// ============================================================================
// Cart Value Objects
// ============================================================================

/// The restaurant a cart is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RestaurantRef {
    pub id: String,
    pub name: String,
}

impl RestaurantRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, CartError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CartError::EmptyRestaurantId);
        }
        Ok(Self {
            id,
            name: name.into(),
        })
    }
}

impl From<&Restaurant> for RestaurantRef {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id.clone(),
            name: restaurant.name.clone(),
        }
    }
}

/// Most a single unit may cost
pub const MAX_UNIT_PRICE: Decimal = dec!(1000000);

/// A purchasable dish as offered to the cart.
///
/// Construction validates the id and keeps the price within
/// `0..=MAX_UNIT_PRICE`, so cart totals stay far from `Decimal::MAX`.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    id: String,
    name: String,
    unit_price: Decimal,
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
    ) -> Result<Self, CartError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CartError::EmptyItemId);
        }
        if unit_price < Decimal::ZERO {
            return Err(CartError::NegativePrice {
                item_id: id,
                price: unit_price,
            });
        }
        if unit_price > MAX_UNIT_PRICE {
            return Err(CartError::PriceTooHigh {
                item_id: id,
                price: unit_price,
                max: MAX_UNIT_PRICE,
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            unit_price,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl TryFrom<&Dish> for MenuItem {
    type Error = CartError;

    fn try_from(dish: &Dish) -> Result<Self, Self::Error> {
        MenuItem::new(dish.id.clone(), dish.name.clone(), dish.price)
    }
}

/// One dish and how many units of it are in the cart. Quantity is always >= 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLineItem {
    pub(crate) fn first_unit(item: MenuItem) -> Self {
        Self {
            item_id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            quantity: 1,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Logical state of the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartState {
    /// No restaurant bound, no items
    Empty,
    /// Exactly one restaurant bound, at least one item
    Bound,
}

/// What `add_item` should do when the cart belongs to another restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddDirective {
    /// Report the conflict and leave the cart untouched
    #[default]
    KeepExisting,
    /// Discard the current items and rebind to the new restaurant
    ReplaceExisting,
}

/// The cart already holds items from `current`; the caller tried to add one from `requested`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantConflict {
    pub current: RestaurantRef,
    pub requested: RestaurantRef,
}

impl fmt::Display for RestaurantConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cart holds items from {} and cannot take items from {} without being cleared",
            self.current.name, self.requested.name
        )
    }
}

/// Result of `Cart::add_item`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added { item_id: String, quantity: u32 },
    Conflict(RestaurantConflict),
}

impl AddOutcome {
    pub fn was_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }

    pub fn conflict(&self) -> Option<&RestaurantConflict> {
        match self {
            AddOutcome::Conflict(conflict) => Some(conflict),
            AddOutcome::Added { .. } => None,
        }
    }
}

/// Read-only copy of the cart for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub restaurant: Option<RestaurantRef>,
    pub items: Vec<CartLineItem>,
    pub total: Decimal,
    pub item_count: u32,
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_menu_item_rejects_negative_price() {
        let result = MenuItem::new("1", "Feijoada", dec!(-1.00));
        assert!(matches!(result, Err(CartError::NegativePrice { .. })));
    }

    #[test]
    fn test_menu_item_price_is_bounded() {
        assert!(MenuItem::new("1", "Banquete", MAX_UNIT_PRICE).is_ok());

        let err = MenuItem::new("1", "Banquete", Decimal::MAX).unwrap_err();
        assert!(matches!(err, CartError::PriceTooHigh { max, .. } if max == MAX_UNIT_PRICE));
    }

    #[test]
    fn test_menu_item_accepts_free_item() {
        let item = MenuItem::new("9", "Água", dec!(0)).unwrap();
        assert_eq!(item.unit_price(), Decimal::ZERO);
    }

    #[test]
    fn test_menu_item_rejects_blank_id() {
        assert_eq!(MenuItem::new("  ", "x", dec!(1)), Err(CartError::EmptyItemId));
    }

    #[test]
    fn test_restaurant_ref_rejects_blank_id() {
        assert_eq!(RestaurantRef::new("", "x"), Err(CartError::EmptyRestaurantId));
    }

    #[test]
    fn test_menu_item_from_dish() {
        let dish = Dish {
            id: "3".to_string(),
            restaurant_id: "2".to_string(),
            name: "Pizza Margherita".to_string(),
            description: String::new(),
            price: dec!(39.90),
            image_url: String::new(),
        };
        let item = MenuItem::try_from(&dish).unwrap();
        assert_eq!(item.id(), "3");
        assert_eq!(item.unit_price(), dec!(39.90));
    }

    #[test]
    fn test_line_subtotal() {
        let mut line = CartLineItem::first_unit(MenuItem::new("1", "Feijoada", dec!(35.90)).unwrap());
        line.quantity = 3;
        assert_eq!(line.subtotal(), dec!(107.70));
    }

    #[test]
    fn test_conflict_message_names_both_restaurants() {
        let conflict = RestaurantConflict {
            current: RestaurantRef::new("1", "Restaurante Brasileiro").unwrap(),
            requested: RestaurantRef::new("2", "Pizza Express").unwrap(),
        };
        let message = conflict.to_string();
        assert!(message.contains("Restaurante Brasileiro"));
        assert!(message.contains("Pizza Express"));
    }
}
