//! Finalized sales
//!
//! Closing a tab materializes its lines into an immutable sale record.
//! The transition is one-way: closing never un-splits and never revisits
//! payment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, Currency, Money, ProductId, SaleId, TabId, UserId};

use crate::tab::Tab;

/// One line of a finalized sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    /// Product sold
    pub product_id: ProductId,
    /// Units sold
    pub quantity: u32,
    /// Unit price as captured on the tab
    pub unit_price: Money,
    /// `unit_price × quantity`
    pub line_total: Money,
}

/// An immutable finalized sale produced by closing a tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier
    pub id: SaleId,
    /// The tab this sale settles
    pub tab_id: TabId,
    /// Branch the sale belongs to
    pub branch_id: BranchId,
    /// Tab display label at close time
    pub label: String,
    /// Currency of all amounts
    pub currency: Currency,
    /// Copied line set
    pub lines: Vec<SaleLine>,
    /// Exact sum of `unit_price × quantity` over the lines.
    ///
    /// This is the full tab value: partial payments already collected are
    /// NOT subtracted here. That asymmetry matches the behavior this system
    /// replaces and is preserved deliberately.
    pub total: Money,
    /// User who closed the tab
    pub closed_by: UserId,
    /// When the tab was closed
    pub closed_at: DateTime<Utc>,
}

impl Sale {
    /// Materializes a sale from a tab's current lines
    pub fn materialize(tab: &Tab, closed_by: UserId) -> Self {
        let lines: Vec<SaleLine> = tab
            .lines
            .iter()
            .map(|line| SaleLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total(),
            })
            .collect();

        let total = lines
            .iter()
            .fold(Money::zero(tab.currency), |acc, line| acc + line.line_total);

        Self {
            id: SaleId::new_v7(),
            tab_id: tab.id,
            branch_id: tab.branch_id,
            label: tab.label.clone(),
            currency: tab.currency,
            lines,
            total,
            closed_by,
            closed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::collections::HashMap;

    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_materialize_copies_lines_and_total() {
        let mut tab = Tab::new(BranchId::new(), "Table 9", Currency::USD);
        tab.add_line(ProductId::new(), 2, usd(dec!(7.50)), BTreeSet::new())
            .unwrap();
        tab.add_line(ProductId::new(), 1, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();

        let closer = UserId::new();
        let sale = Sale::materialize(&tab, closer);

        assert_eq!(sale.tab_id, tab.id);
        assert_eq!(sale.branch_id, tab.branch_id);
        assert_eq!(sale.label, "Table 9");
        assert_eq!(sale.lines.len(), 2);
        assert_eq!(sale.lines[0].line_total.amount(), dec!(15.00));
        assert_eq!(sale.total.amount(), dec!(19.00));
        assert_eq!(sale.closed_by, closer);
    }

    #[test]
    fn test_sale_total_ignores_partial_collections() {
        let mut tab = Tab::new(BranchId::new(), "Table 2", Currency::USD);
        let line_id = tab
            .add_line(ProductId::new(), 4, usd(dec!(5.00)), BTreeSet::new())
            .unwrap();
        // two units already settled through an item payment
        tab.settle_units(&HashMap::from([(line_id, 2)])).unwrap();

        let sale = Sale::materialize(&tab, UserId::new());

        // the full tab value, paid lines included
        assert_eq!(sale.total.amount(), dec!(20.00));
    }
}
