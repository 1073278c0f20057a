use tracing::debug;

use crate::domain::order::{AddressComponents, DeliveryAddress};

const INVALID_ADDRESS: &str = "Could not update your location";

/// Delivery address picked by the user. Geocoding happens outside the crate;
/// this only holds its result.
#[derive(Debug, Default)]
pub struct Location {
    address: Option<DeliveryAddress>,
    error: Option<String>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> Option<&DeliveryAddress> {
        self.address.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Free-text address. A blank line is rejected and the previous
    /// address kept.
    pub fn set_address_line(&mut self, line: &str) -> bool {
        self.accept(DeliveryAddress::from_line(line))
    }

    /// Address resolved from coordinates
    pub fn set_address_components(&mut self, components: AddressComponents) -> bool {
        self.accept(DeliveryAddress::from_components(components))
    }

    pub fn clear(&mut self) {
        self.address = None;
        self.error = None;
    }

    fn accept(&mut self, address: DeliveryAddress) -> bool {
        if address.is_blank() {
            self.error = Some(INVALID_ADDRESS.to_string());
            return false;
        }
        debug!(address = %address.formatted_address, "Delivery address set");
        self.address = Some(address);
        self.error = None;
        true
    }
}
