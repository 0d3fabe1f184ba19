//! Receipt assembly
//!
//! Builds the customer-facing projection of a tab: labels, line entries,
//! totals, and the split snapshot when one is active. Rendering (thermal
//! printer markup, character encoding) happens outside this crate; these
//! types carry everything a renderer needs.
//!
//! Amounts on a receipt are rounded to the currency's decimal places; this
//! is the presentation boundary, so rounding happens here and nowhere
//! earlier.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ProductId};

use crate::payment::PaymentRecord;
use crate::split::{split_status, SplitStatus};
use crate::tab::Tab;

/// One printable line entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// Product display name
    pub product: String,
    /// Units ordered
    pub quantity: u32,
    /// Price per unit as captured on the tab
    pub unit_price: Money,
    /// Line total, rounded for display
    pub line_total: Money,
    /// Whether this line has been settled already
    pub settled: bool,
}

/// Everything an external renderer needs to print a receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Company display label
    pub company: String,
    /// Branch display label
    pub branch: String,
    /// Tab display label (table or customer)
    pub tab_label: String,
    /// Who served the tab
    pub served_by: String,
    /// Printable line entries, in tab order
    pub lines: Vec<ReceiptLine>,
    /// Tab total, rounded for display
    pub total: Money,
    /// Aggregate of recorded payments, rounded for display
    pub paid: Money,
    /// What is still owed; zero when fully covered
    pub balance_due: Money,
    /// Split snapshot, present when a split is active
    pub split: Option<SplitStatus>,
    /// When the receipt was assembled
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    /// Assembles a receipt from a tab, its payment history, and product
    /// display names
    ///
    /// Products missing from `product_names` fall back to their identifier.
    pub fn assemble(
        company: impl Into<String>,
        branch: impl Into<String>,
        served_by: impl Into<String>,
        tab: &Tab,
        payments: &[PaymentRecord],
        product_names: &HashMap<ProductId, String>,
    ) -> Self {
        let lines: Vec<ReceiptLine> = tab
            .lines
            .iter()
            .map(|line| ReceiptLine {
                product: product_names
                    .get(&line.product_id)
                    .cloned()
                    .unwrap_or_else(|| line.product_id.to_string()),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total().round_to_currency(),
                settled: line.paid,
            })
            .collect();

        let total = tab.calculate_total();
        let paid = payments
            .iter()
            .fold(Money::zero(tab.currency), |acc, p| acc + p.amount);
        let outstanding = total - paid;
        let balance_due = if outstanding.is_negative() {
            Money::zero(tab.currency)
        } else {
            outstanding
        };

        let split = tab
            .split_total
            .map(|_| split_status(tab, payments));

        Self {
            company: company.into(),
            branch: branch.into(),
            tab_label: tab.label.clone(),
            served_by: served_by.into(),
            lines,
            total: total.round_to_currency(),
            paid: paid.round_to_currency(),
            balance_due: balance_due.round_to_currency(),
            split,
            issued_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use rust_decimal_macros::dec;

    use core_kernel::{BranchId, Currency};

    use crate::payment::PaymentStatus;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_assemble_labels_and_totals() {
        let mut tab = Tab::new(BranchId::new(), "Table 3", Currency::USD);
        let product_id = ProductId::new();
        tab.add_line(product_id, 2, usd(dec!(7.50)), BTreeSet::new())
            .unwrap();

        let payment = PaymentRecord::new(
            tab.id,
            usd(dec!(5.00)),
            Some("Ana".to_string()),
            PaymentStatus::PartiallyPaid,
        )
        .unwrap();

        let names = HashMap::from([(product_id, "Margherita".to_string())]);
        let receipt = Receipt::assemble("Trattoria", "Centro", "Mario", &tab, &[payment], &names);

        assert_eq!(receipt.company, "Trattoria");
        assert_eq!(receipt.branch, "Centro");
        assert_eq!(receipt.tab_label, "Table 3");
        assert_eq!(receipt.served_by, "Mario");
        assert_eq!(receipt.lines.len(), 1);
        assert_eq!(receipt.lines[0].product, "Margherita");
        assert_eq!(receipt.lines[0].line_total.amount(), dec!(15.00));
        assert_eq!(receipt.total.amount(), dec!(15.00));
        assert_eq!(receipt.paid.amount(), dec!(5.00));
        assert_eq!(receipt.balance_due.amount(), dec!(10.00));
        assert!(receipt.split.is_none());
    }

    #[test]
    fn test_assemble_unknown_product_falls_back_to_id() {
        let mut tab = Tab::new(BranchId::new(), "Table 3", Currency::USD);
        let product_id = ProductId::new();
        tab.add_line(product_id, 1, usd(dec!(3.00)), BTreeSet::new())
            .unwrap();

        let receipt =
            Receipt::assemble("Trattoria", "Centro", "Mario", &tab, &[], &HashMap::new());

        assert_eq!(receipt.lines[0].product, product_id.to_string());
    }

    #[test]
    fn test_assemble_includes_split_when_active() {
        let mut tab = Tab::new(BranchId::new(), "Table 3", Currency::USD);
        tab.add_line(ProductId::new(), 3, usd(dec!(10.00)), BTreeSet::new())
            .unwrap();
        tab.init_or_update_split(3).unwrap();

        let receipt =
            Receipt::assemble("Trattoria", "Centro", "Mario", &tab, &[], &HashMap::new());

        let split = receipt.split.expect("split snapshot expected");
        assert_eq!(split.total_shares, 3);
        assert_eq!(split.share_due.amount(), dec!(10.00));
    }

    #[test]
    fn test_assemble_clamps_overpaid_balance_to_zero() {
        let mut tab = Tab::new(BranchId::new(), "Table 3", Currency::USD);
        tab.add_line(ProductId::new(), 1, usd(dec!(10.00)), BTreeSet::new())
            .unwrap();

        let payment = PaymentRecord::new(
            tab.id,
            usd(dec!(12.00)),
            None,
            PaymentStatus::PaidInFull,
        )
        .unwrap();

        let receipt =
            Receipt::assemble("Trattoria", "Centro", "Mario", &tab, &[payment], &HashMap::new());

        assert!(receipt.balance_due.is_zero());
        assert_eq!(receipt.paid.amount(), dec!(12.00));
    }
}
