//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use core_kernel::{BranchId, Currency, Money, ProductId};
use domain_tab::tab::Tab;

/// Builder for constructing test tabs
pub struct TabBuilder {
    branch_id: BranchId,
    label: String,
    currency: Currency,
    lines: Vec<(ProductId, u32, Decimal, BTreeSet<String>)>,
    split: Option<u32>,
}

impl Default for TabBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TabBuilder {
    /// Creates a builder with default values
    pub fn new() -> Self {
        Self {
            branch_id: BranchId::new(),
            label: "Table 1".to_string(),
            currency: Currency::USD,
            lines: Vec::new(),
            split: None,
        }
    }

    /// Sets the owning branch
    pub fn with_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = branch_id;
        self
    }

    /// Sets the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Adds a line for a fresh product
    pub fn with_line(self, quantity: u32, unit_price: Decimal) -> Self {
        self.with_product_line(ProductId::new(), quantity, unit_price)
    }

    /// Adds a line for a specific product
    pub fn with_product_line(
        mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        self.lines
            .push((product_id, quantity, unit_price, BTreeSet::new()));
        self
    }

    /// Adds a line with customizations
    pub fn with_customized_line(
        mut self,
        quantity: u32,
        unit_price: Decimal,
        customizations: &[&str],
    ) -> Self {
        self.lines.push((
            ProductId::new(),
            quantity,
            unit_price,
            customizations.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    /// Divides the tab into equal shares after the lines are added
    pub fn with_split(mut self, shares: u32) -> Self {
        self.split = Some(shares);
        self
    }

    /// Builds the tab
    ///
    /// # Panics
    ///
    /// Panics when a line or the split violates the tab's own validation;
    /// builder inputs are expected to be well-formed in tests.
    pub fn build(self) -> Tab {
        let mut tab = Tab::new(self.branch_id, self.label, self.currency);
        for (product_id, quantity, unit_price, customizations) in self.lines {
            tab.add_line(
                product_id,
                quantity,
                Money::new(unit_price, self.currency),
                customizations,
            )
            .expect("builder line must be valid");
        }
        if let Some(shares) = self.split {
            tab.init_or_update_split(shares)
                .expect("builder split must be valid");
        }
        tab
    }
}
