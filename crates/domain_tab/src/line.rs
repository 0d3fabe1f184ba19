//! Tab lines
//!
//! A line is one product entry on a tab: a unit count at a price captured
//! when the product was added. Catalog price changes never re-price a line.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{LineId, Money, ProductId};

/// One ordered line on a tab
///
/// # Invariants
///
/// - `quantity` is positive
/// - `paid == true` means the entire remaining quantity of this exact line
///   has been settled; no further payment may reference it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabLine {
    /// Unique identifier
    pub id: LineId,
    /// Product this line orders
    pub product_id: ProductId,
    /// Number of units
    pub quantity: u32,
    /// Price per unit, locked in at add time
    pub unit_price: Money,
    /// Whether the full quantity of this line has been settled
    pub paid: bool,
    /// Ingredient customizations; do not affect the price
    pub customizations: BTreeSet<String>,
}

impl TabLine {
    /// Creates a new unpaid line
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
        customizations: BTreeSet<String>,
    ) -> Self {
        Self {
            id: LineId::new_v7(),
            product_id,
            quantity,
            unit_price,
            paid: false,
            customizations,
        }
    }

    /// Returns `unit_price × quantity`, exact
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(Decimal::from(self.quantity))
    }

    /// Splits off a settled sibling for part of this line's quantity
    ///
    /// Reduces this line by `units` and returns a new line for exactly
    /// `units` at the same price, product, and customizations, marked paid.
    /// Callers must ensure `0 < units < self.quantity`.
    pub(crate) fn settle_part(&mut self, units: u32) -> TabLine {
        self.quantity -= units;
        TabLine {
            id: LineId::new_v7(),
            product_id: self.product_id,
            quantity: units,
            unit_price: self.unit_price,
            paid: true,
            customizations: self.customizations.clone(),
        }
    }
}
