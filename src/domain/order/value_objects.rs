use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use crate::domain::cart::CartLineItem;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Still moving towards the customer
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProgress)
    }
}

/// A dish as recorded on an order, priced at submission time
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderLine {
    /// `None` when price times quantity does not fit in a `Decimal`
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

impl From<&CartLineItem> for OrderLine {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.item_id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// Parts of a postal address, as a geocoder would return them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressComponents {
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    #[serde(flatten)]
    pub components: AddressComponents,
    pub formatted_address: String,
}

impl DeliveryAddress {
    /// Free-text address typed by the user
    pub fn from_line(line: impl Into<String>) -> Self {
        Self {
            components: AddressComponents::default(),
            formatted_address: line.into().trim().to_string(),
        }
    }

    /// Formats as `street, number, district, city`, skipping missing parts
    pub fn from_components(components: AddressComponents) -> Self {
        let formatted_address = [
            &components.street,
            &components.number,
            &components.district,
            &components.city,
        ]
        .into_iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            components,
            formatted_address,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.formatted_address.trim().is_empty()
    }
}

/// Customer rating of an order, 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, OrderError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(OrderError::InvalidRating(stars))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = OrderError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Rating::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
