use rust_decimal::Decimal;

use super::value_objects::{
    AddDirective, AddOutcome, CartLineItem, CartSnapshot, CartState, MenuItem, RestaurantConflict,
    RestaurantRef,
};

// ============================================================================
// Cart Aggregate - Domain Logic
// ============================================================================
//
// Invariants:
// 1. Line items are unique by item id and kept in insertion order
// 2. Every line item has quantity >= 1
// 3. A non-empty cart is bound to exactly one restaurant
// 4. An empty cart is bound to no restaurant
//
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    restaurant: Option<RestaurantRef>,
    lines: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item` from `restaurant`.
    ///
    /// When the cart is bound to another restaurant, `KeepExisting` reports the
    /// conflict without touching the cart and `ReplaceExisting` discards the
    /// current items first.
    pub fn add_item(
        &mut self,
        item: MenuItem,
        restaurant: RestaurantRef,
        directive: AddDirective,
    ) -> AddOutcome {
        if let Some(current) = &self.restaurant {
            if current.id != restaurant.id {
                match directive {
                    AddDirective::KeepExisting => {
                        tracing::debug!(
                            current = %current.id,
                            requested = %restaurant.id,
                            "Cart add refused: conflicting restaurant"
                        );
                        return AddOutcome::Conflict(RestaurantConflict {
                            current: current.clone(),
                            requested: restaurant,
                        });
                    }
                    AddDirective::ReplaceExisting => {
                        tracing::debug!(
                            previous = %current.id,
                            replacement = %restaurant.id,
                            discarded_lines = self.lines.len(),
                            "Replacing cart contents"
                        );
                        self.clear();
                    }
                }
            }
        }

        if self.restaurant.is_none() {
            self.restaurant = Some(restaurant);
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item.id()) {
            line.quantity = line.quantity.saturating_add(1);
            return AddOutcome::Added {
                item_id: line.item_id.clone(),
                quantity: line.quantity,
            };
        }

        let line = CartLineItem::first_unit(item);
        let item_id = line.item_id.clone();
        self.lines.push(line);
        AddOutcome::Added { item_id, quantity: 1 }
    }

    /// Remove one unit of `item_id`. Absent ids are ignored.
    pub fn remove_item(&mut self, item_id: &str) {
        let Some(index) = self.lines.iter().position(|l| l.item_id == item_id) else {
            return;
        };

        if self.lines[index].quantity > 1 {
            self.lines[index].quantity -= 1;
        } else {
            self.lines.remove(index);
        }

        if self.lines.is_empty() {
            self.restaurant = None;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.restaurant = None;
    }

    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLineItem::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of quantities across all lines
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, l| count.saturating_add(l.quantity))
    }

    /// Number of distinct dishes
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.item_id == item_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn state(&self) -> CartState {
        if self.lines.is_empty() {
            CartState::Empty
        } else {
            CartState::Bound
        }
    }

    pub fn restaurant(&self) -> Option<&RestaurantRef> {
        self.restaurant.as_ref()
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            restaurant: self.restaurant.clone(),
            items: self.lines.clone(),
            total: self.total(),
            item_count: self.item_count(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::MAX_UNIT_PRICE;
    use rust_decimal_macros::dec;

    fn brasileiro() -> RestaurantRef {
        RestaurantRef::new("1", "Restaurante Brasileiro").unwrap()
    }

    fn pizza_express() -> RestaurantRef {
        RestaurantRef::new("2", "Pizza Express").unwrap()
    }

    fn feijoada() -> MenuItem {
        MenuItem::new("1", "Feijoada Completa", dec!(35.90)).unwrap()
    }

    fn moqueca() -> MenuItem {
        MenuItem::new("2", "Moqueca de Peixe", dec!(42.90)).unwrap()
    }

    fn margherita() -> MenuItem {
        MenuItem::new("3", "Pizza Margherita", dec!(39.90)).unwrap()
    }

    fn add(cart: &mut Cart, item: MenuItem, restaurant: RestaurantRef) -> AddOutcome {
        cart.add_item(item, restaurant, AddDirective::KeepExisting)
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
        assert!(cart.restaurant().is_none());
    }

    #[test]
    fn test_first_add_binds_restaurant() {
        let mut cart = Cart::new();
        let outcome = add(&mut cart, feijoada(), brasileiro());

        assert!(outcome.was_added());
        assert_eq!(cart.state(), CartState::Bound);
        assert_eq!(cart.restaurant(), Some(&brasileiro()));
    }

    #[test]
    fn test_same_item_twice_increments_quantity() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        let outcome = add(&mut cart, feijoada(), brasileiro());

        assert_eq!(
            outcome,
            AddOutcome::Added {
                item_id: "1".to_string(),
                quantity: 2
            }
        );
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("1"), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        add(&mut cart, moqueca(), brasileiro());
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.item_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_item_count_tracks_adds_minus_removes() {
        let mut cart = Cart::new();
        let mut expected: u32 = 0;

        let script = [
            (true, "1"),
            (true, "2"),
            (true, "1"),
            (false, "2"),
            (false, "2"),
            (true, "2"),
            (false, "1"),
            (false, "1"),
        ];

        for (is_add, item_id) in script {
            if is_add {
                let item = if item_id == "1" { feijoada() } else { moqueca() };
                add(&mut cart, item, brasileiro());
                expected += 1;
            } else {
                let present = cart.quantity_of(item_id) > 0;
                cart.remove_item(item_id);
                if present {
                    expected -= 1;
                }
            }
            assert_eq!(cart.item_count(), expected);
        }
    }

    #[test]
    fn test_remove_decrements_then_drops_line() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());

        cart.remove_item("1");
        assert_eq!(cart.quantity_of("1"), 1);
        assert_eq!(cart.line_count(), 2);

        cart.remove_item("1");
        assert_eq!(cart.quantity_of("1"), 0);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.state(), CartState::Bound);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        let before = cart.clone();

        cart.remove_item("does-not-exist");
        assert_eq!(cart, before);

        let mut empty = Cart::new();
        empty.remove_item("1");
        assert_eq!(empty.state(), CartState::Empty);
    }

    #[test]
    fn test_removing_last_unit_empties_cart_and_unbinds() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        cart.remove_item("1");

        assert_eq!(cart.state(), CartState::Empty);
        assert!(cart.restaurant().is_none());

        let outcome = add(&mut cart, margherita(), pizza_express());
        assert!(outcome.was_added());
        assert_eq!(cart.restaurant(), Some(&pizza_express()));
    }

    #[test]
    fn test_conflicting_restaurant_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());
        let before = cart.clone();

        let outcome = add(&mut cart, margherita(), pizza_express());

        assert!(!outcome.was_added());
        let conflict = outcome.conflict().unwrap();
        assert_eq!(conflict.current, brasileiro());
        assert_eq!(conflict.requested, pizza_express());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_confirmed_replacement_rebinds_cart() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());

        let outcome = cart.add_item(margherita(), pizza_express(), AddDirective::ReplaceExisting);

        assert!(outcome.was_added());
        assert_eq!(cart.restaurant(), Some(&pizza_express()));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("3"), 1);
        assert_eq!(cart.quantity_of("1"), 0);
    }

    #[test]
    fn test_replace_directive_is_harmless_for_same_restaurant() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        cart.add_item(moqueca(), brasileiro(), AddDirective::ReplaceExisting);

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_total_is_exact() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());

        assert_eq!(cart.total(), dec!(114.70));
    }

    #[test]
    fn test_total_has_no_drift_over_many_additions() {
        let mut cart = Cart::new();
        let item = MenuItem::new("x", "Pão de Queijo", dec!(0.10)).unwrap();
        for _ in 0..1000 {
            add(&mut cart, item.clone(), brasileiro());
        }
        assert_eq!(cart.total(), dec!(100.00));
    }

    #[test]
    fn test_total_at_price_limit() {
        let mut cart = Cart::new();
        let banquete = || MenuItem::new("9", "Banquete", MAX_UNIT_PRICE).unwrap();
        add(&mut cart, banquete(), brasileiro());
        add(&mut cart, banquete(), brasileiro());

        assert_eq!(cart.total(), dec!(2000000));
    }

    #[test]
    fn test_quantity_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());
        cart.lines[0].quantity = u32::MAX;

        let outcome = add(&mut cart, feijoada(), brasileiro());
        assert_eq!(
            outcome,
            AddOutcome::Added {
                item_id: "1".to_string(),
                quantity: u32::MAX
            }
        );
        assert_eq!(cart.item_count(), u32::MAX);
        assert!(cart.total() > Decimal::ZERO);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, moqueca(), brasileiro());

        cart.clear();

        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
        assert!(cart.restaurant().is_none());
        assert_eq!(cart.state(), CartState::Empty);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_snapshot_reflects_cart() {
        let mut cart = Cart::new();
        add(&mut cart, feijoada(), brasileiro());
        add(&mut cart, feijoada(), brasileiro());

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.restaurant, Some(brasileiro()));
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.item_count, 2);
        assert_eq!(snapshot.total, dec!(71.80));
    }
}
