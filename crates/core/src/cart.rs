//! Session-scoped cart aggregate.
//!
//! The cart is a pure value type: every reducer consumes the current snapshot
//! and returns the next one, with no I/O and no interior mutability. The HTTP
//! layer stores the snapshot in the session; everything here is testable
//! without a server.
//!
//! Totals follow the storefront pricing rules: 10% tax on the subtotal and a
//! flat delivery fee that is waived above the free-delivery threshold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Tax rate applied to the cart subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Flat delivery fee in rupees.
pub const DELIVERY_FEE_RUPEES: i64 = 50;

/// Orders strictly above this subtotal ship free.
pub const FREE_DELIVERY_OVER_RUPEES: i64 = 500;

/// Configuration of a made-to-order custom cake.
///
/// Attached to a cart line when the customer builds their own cake instead of
/// picking a catalogue item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCakeSpec {
    /// Base cake (e.g., "Sponge", "Red Velvet").
    pub base: String,
    /// Shape (e.g., "Round", "Square", "Heart").
    pub shape: String,
    /// Size (e.g., "1kg", "2kg").
    pub size: String,
    /// Flavor (e.g., "Chocolate", "Butterscotch").
    pub flavor: String,
    /// Frosting (e.g., "Buttercream", "Fondant").
    pub frosting: String,
    /// Extra toppings, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toppings: Option<String>,
    /// Message piped onto the cake, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line identity. Catalogue items reuse the product id; custom cakes get
    /// a fresh id per line so two custom cakes never collapse into one.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price per unit.
    pub unit_price: Price,
    /// Quantity, always >= 1.
    pub quantity: u32,
    /// Custom-cake details when this line is a made-to-order cake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomCakeSpec>,
}

impl CartItem {
    /// Total for this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price * self.quantity
    }

    /// Whether this line is a made-to-order custom cake.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        self.custom.is_some()
    }
}

/// Computed cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of all line totals.
    pub subtotal: Price,
    /// Tax on the subtotal.
    pub tax: Price,
    /// Delivery fee (zero for an empty cart or above the free threshold).
    pub delivery: Price,
    /// Subtotal + tax + delivery.
    pub grand_total: Price,
}

/// The cart snapshot held in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Add an item.
    ///
    /// A catalogue item whose id is already in the cart merges into the
    /// existing line by bumping its quantity. Custom cakes are always kept as
    /// distinct lines, even with equal ids.
    #[must_use]
    pub fn add(mut self, item: CartItem) -> Self {
        if !item.is_custom()
            && let Some(existing) = self
                .items
                .iter_mut()
                .find(|i| i.id == item.id && !i.is_custom())
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            return self;
        }
        self.items.push(item);
        self
    }

    /// Increase the quantity of the line with the given id by one.
    ///
    /// Unknown ids leave the cart unchanged.
    #[must_use]
    pub fn increase_qty(mut self, id: &str) -> Self {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = item.quantity.saturating_add(1);
        }
        self
    }

    /// Decrease the quantity of the line with the given id by one.
    ///
    /// Quantity floors at 1; removing a line entirely is [`Cart::remove`].
    /// Unknown ids leave the cart unchanged.
    #[must_use]
    pub fn decrease_qty(mut self, id: &str) -> Self {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id)
            && item.quantity > 1
        {
            item.quantity -= 1;
        }
        self
    }

    /// Remove the line with the given id.
    #[must_use]
    pub fn remove(mut self, id: &str) -> Self {
        self.items.retain(|i| i.id != id);
        self
    }

    /// Drop every line.
    #[must_use]
    pub fn clear(mut self) -> Self {
        self.items.clear();
        self
    }

    /// Compute subtotal, tax, delivery, and grand total for this snapshot.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal = self
            .items
            .iter()
            .fold(Price::zero(), |acc, i| acc + i.line_total());

        let tax = subtotal * TAX_RATE;

        let delivery = if self.items.is_empty()
            || subtotal > Price::from_rupees(FREE_DELIVERY_OVER_RUPEES)
        {
            Price::zero()
        } else {
            Price::from_rupees(DELIVERY_FEE_RUPEES)
        };

        CartTotals {
            subtotal,
            tax,
            delivery,
            grand_total: subtotal + tax + delivery,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pastry(id: &str, rupees: i64, qty: u32) -> CartItem {
        CartItem {
            id: id.to_owned(),
            name: format!("pastry-{id}"),
            unit_price: Price::from_rupees(rupees),
            quantity: qty,
            custom: None,
        }
    }

    fn custom_cake(id: &str, rupees: i64) -> CartItem {
        CartItem {
            id: id.to_owned(),
            name: "Custom Cake".to_owned(),
            unit_price: Price::from_rupees(rupees),
            quantity: 1,
            custom: Some(CustomCakeSpec {
                base: "Sponge".to_owned(),
                shape: "Round".to_owned(),
                size: "1kg".to_owned(),
                flavor: "Chocolate".to_owned(),
                frosting: "Buttercream".to_owned(),
                toppings: None,
                message: Some("Happy Birthday".to_owned()),
            }),
        }
    }

    #[test]
    fn test_add_merges_catalogue_lines_by_id() {
        let cart = Cart::new().add(pastry("brownie", 120, 1)).add(pastry("brownie", 120, 2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_never_merges_custom_cakes() {
        let cart = Cart::new().add(custom_cake("cc-1", 900)).add(custom_cake("cc-1", 900));
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_increase_and_decrease_qty() {
        let cart = Cart::new().add(pastry("tart", 80, 1)).increase_qty("tart");
        assert_eq!(cart.item_count(), 2);

        let cart = cart.decrease_qty("tart");
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_decrease_qty_floors_at_one() {
        let cart = Cart::new().add(pastry("tart", 80, 1)).decrease_qty("tart");
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let cart = Cart::new().add(pastry("tart", 80, 1));
        let same = cart.clone().increase_qty("nope").decrease_qty("nope").remove("nope");
        assert_eq!(same, cart);
    }

    #[test]
    fn test_remove_and_clear() {
        let cart = Cart::new()
            .add(pastry("tart", 80, 1))
            .add(pastry("brownie", 120, 1))
            .remove("tart");
        assert_eq!(cart.items().len(), 1);

        let cart = cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_tax_and_delivery() {
        // 2 x 150 = 300 subtotal, 30 tax, 50 delivery (below threshold)
        let cart = Cart::new().add(pastry("cake", 150, 2));
        let totals = cart.totals();
        assert_eq!(totals.subtotal, Price::from_rupees(300));
        assert_eq!(totals.tax, Price::from_rupees(30));
        assert_eq!(totals.delivery, Price::from_rupees(50));
        assert_eq!(totals.grand_total, Price::from_rupees(380));
    }

    #[test]
    fn test_free_delivery_above_threshold() {
        let cart = Cart::new().add(pastry("wedding", 600, 1));
        assert_eq!(cart.totals().delivery, Price::zero());

        // Exactly at the threshold still pays delivery
        let cart = Cart::new().add(pastry("big-box", 500, 1));
        assert_eq!(cart.totals().delivery, Price::from_rupees(50));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let totals = Cart::new().totals();
        assert_eq!(totals.subtotal, Price::zero());
        assert_eq!(totals.delivery, Price::zero());
        assert_eq!(totals.grand_total, Price::zero());
    }
}
