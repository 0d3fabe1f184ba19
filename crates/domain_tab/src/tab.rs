//! The open tab aggregate
//!
//! A tab owns its ordered lines and the split-share counters. Edits to the
//! item set and unit-level settlement both happen here; everything returns
//! `Result` and leaves the tab untouched on error.
//!
//! # Invariants
//!
//! - `split_remaining <= split_total` whenever both are present
//! - any structural edit (add, remove, requantify) resets `split_remaining`
//!   to `split_total`: prior share bookkeeping restarts at "nothing paid
//!   yet", while money already recorded stays recorded
//! - every line's currency matches the tab currency

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BranchId, Currency, LineId, Money, ProductId, TabId};

use crate::error::TabError;
use crate::line::TabLine;

/// An open, unsettled order associated with a table or customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tab {
    /// Unique identifier
    pub id: TabId,
    /// Display name, e.g. a table or person label
    pub label: String,
    /// Owning branch
    pub branch_id: BranchId,
    /// Currency all lines and payments are denominated in
    pub currency: Currency,
    /// Whether the tab has been settled; a one-way transition
    pub closed: bool,
    /// Ordered lines; stored order is the allocation order for split status
    pub lines: Vec<TabLine>,
    /// Total number of equal shares the tab is divided into, if split
    pub split_total: Option<u32>,
    /// Shares not yet consumed by a payment; never exceeds `split_total`
    pub split_remaining: Option<u32>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Tab {
    /// Opens a new empty tab under a branch
    pub fn new(branch_id: BranchId, label: impl Into<String>, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: TabId::new_v7(),
            label: label.into(),
            branch_id,
            currency,
            closed: false,
            lines: Vec::new(),
            split_total: None,
            split_remaining: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the tab's current total: exact `Σ unit_price × quantity`
    ///
    /// No rounding is applied here; callers round at presentation time.
    pub fn calculate_total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(self.currency), |acc, line| {
                acc + line.line_total()
            })
    }

    /// Adds units of a product at a captured unit price
    ///
    /// Merges into an existing unpaid line of the same product if one
    /// exists, otherwise appends a new line. Structural edit: resets the
    /// split-remaining counter.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the tab is closed
    /// - `Validation` for a zero quantity, a non-positive price, or a price
    ///   in another currency
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
        customizations: BTreeSet<String>,
    ) -> Result<LineId, TabError> {
        self.ensure_open()?;
        if quantity == 0 {
            return Err(TabError::validation("quantity must be positive"));
        }
        if unit_price.currency() != self.currency {
            return Err(TabError::validation(format!(
                "unit price currency {} does not match tab currency {}",
                unit_price.currency(),
                self.currency
            )));
        }
        if !unit_price.is_positive() {
            return Err(TabError::validation(format!(
                "unit price must be positive, got {unit_price}"
            )));
        }

        let line_id = match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && !l.paid)
        {
            Some(existing) => {
                existing.quantity += quantity;
                existing.customizations.extend(customizations);
                existing.id
            }
            None => {
                let line = TabLine::new(product_id, quantity, unit_price, customizations);
                let id = line.id;
                self.lines.push(line);
                id
            }
        };

        self.reset_split_remaining();
        self.touch();
        Ok(line_id)
    }

    /// Removes a line
    ///
    /// Structural edit: resets the split-remaining counter.
    pub fn remove_line(&mut self, line_id: LineId) -> Result<(), TabError> {
        self.ensure_open()?;
        let position = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| TabError::not_found(format!("line {line_id}")))?;

        self.lines.remove(position);
        self.reset_split_remaining();
        self.touch();
        Ok(())
    }

    /// Sets a line's quantity and purges unpaid sibling lines of the same
    /// product
    ///
    /// Structural edit: resets the split-remaining counter.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the tab is closed or the line is already settled
    /// - `Validation` for a zero quantity
    /// - `NotFound` for an unknown line
    pub fn set_line_quantity(&mut self, line_id: LineId, quantity: u32) -> Result<(), TabError> {
        self.ensure_open()?;
        if quantity == 0 {
            return Err(TabError::validation("quantity must be positive"));
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| TabError::not_found(format!("line {line_id}")))?;
        if line.paid {
            return Err(TabError::invalid_state(format!(
                "line {line_id} is already settled"
            )));
        }

        line.quantity = quantity;
        let product_id = line.product_id;
        self.lines
            .retain(|l| l.id == line_id || l.product_id != product_id || l.paid);

        self.reset_split_remaining();
        self.touch();
        Ok(())
    }

    /// Divides the tab into `shares` equal shares
    ///
    /// Sets both counters to `shares`; calling again restarts the split.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the tab is closed
    /// - `Validation` for a zero share count
    pub fn init_or_update_split(&mut self, shares: u32) -> Result<(), TabError> {
        self.ensure_open()?;
        if shares == 0 {
            return Err(TabError::validation("share count must be positive"));
        }

        self.split_total = Some(shares);
        self.split_remaining = Some(shares);
        self.touch();
        Ok(())
    }

    /// Settles the requested unit counts per line, in stored line order
    ///
    /// Validates every targeted line up front and mutates nothing on error.
    /// A line settled in full is flipped paid in place; a partial settlement
    /// shrinks the original and appends a paid sibling for the settled
    /// units. Returns the total amount charged. Not a structural edit: the
    /// split counters are untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the tab is closed
    /// - `NotFound` for an unknown line
    /// - `Conflict` for a line that is already settled
    /// - `Validation` for a zero unit count or more units than the line has
    pub fn settle_units(
        &mut self,
        units_by_line: &HashMap<LineId, u32>,
    ) -> Result<Money, TabError> {
        self.ensure_open()?;

        for (line_id, units) in units_by_line {
            let line = self
                .lines
                .iter()
                .find(|l| l.id == *line_id)
                .ok_or_else(|| TabError::not_found(format!("line {line_id}")))?;
            if line.paid {
                return Err(TabError::conflict(format!(
                    "line {line_id} is already settled"
                )));
            }
            if *units == 0 {
                return Err(TabError::validation(format!(
                    "requested zero units of line {line_id}"
                )));
            }
            if *units > line.quantity {
                return Err(TabError::validation(format!(
                    "requested {units} units of line {line_id} but only {} exist",
                    line.quantity
                )));
            }
        }

        let mut charged = Money::zero(self.currency);
        let mut settled = Vec::new();
        for line in &mut self.lines {
            let Some(&units) = units_by_line.get(&line.id) else {
                continue;
            };
            charged = charged + line.unit_price.multiply(Decimal::from(units));
            if units == line.quantity {
                line.paid = true;
            } else {
                settled.push(line.settle_part(units));
            }
        }
        self.lines.extend(settled);

        self.touch();
        Ok(charged)
    }

    /// Consumes one split share, if a split is active
    ///
    /// One qualifying payment consumes exactly one share regardless of the
    /// amount paid.
    pub fn consume_split_share(&mut self) {
        if let Some(remaining) = self.split_remaining {
            if remaining > 0 {
                self.split_remaining = Some(remaining - 1);
                self.touch();
            }
        }
    }

    /// Marks the tab closed; a one-way transition
    pub fn mark_closed(&mut self) {
        self.closed = true;
        self.touch();
    }

    /// Returns a line by id
    pub fn find_line(&self, line_id: LineId) -> Option<&TabLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    fn ensure_open(&self) -> Result<(), TabError> {
        if self.closed {
            return Err(TabError::invalid_state(format!(
                "tab {} is closed",
                self.id
            )));
        }
        Ok(())
    }

    fn reset_split_remaining(&mut self) {
        self.split_remaining = self.split_total;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn open_tab() -> Tab {
        Tab::new(BranchId::new(), "Table 4", Currency::USD)
    }

    #[test]
    fn test_new_tab_is_open_and_unsplit() {
        let tab = open_tab();
        assert!(!tab.closed);
        assert!(tab.lines.is_empty());
        assert_eq!(tab.split_total, None);
        assert_eq!(tab.split_remaining, None);
        assert!(tab.calculate_total().is_zero());
    }

    #[test]
    fn test_add_line_creates_new_line() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 3, usd(dec!(10.00)), BTreeSet::new())
            .unwrap();

        assert_eq!(tab.lines.len(), 1);
        assert_eq!(tab.find_line(line_id).unwrap().quantity, 3);
        assert_eq!(tab.calculate_total().amount(), dec!(30.00));
    }

    #[test]
    fn test_add_line_merges_into_unpaid_line_of_same_product() {
        let mut tab = open_tab();
        let product_id = ProductId::new();

        let first = tab
            .add_line(product_id, 2, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        let second = tab
            .add_line(product_id, 3, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(tab.lines.len(), 1);
        assert_eq!(tab.lines[0].quantity, 5);
    }

    #[test]
    fn test_add_line_does_not_merge_into_paid_line() {
        let mut tab = open_tab();
        let product_id = ProductId::new();
        let line_id = tab
            .add_line(product_id, 2, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        tab.settle_units(&HashMap::from([(line_id, 2)])).unwrap();

        let new_id = tab
            .add_line(product_id, 1, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();

        assert_ne!(new_id, line_id);
        assert_eq!(tab.lines.len(), 2);
    }

    #[test]
    fn test_add_line_merge_unions_customizations() {
        let mut tab = open_tab();
        let product_id = ProductId::new();

        tab.add_line(
            product_id,
            1,
            usd(dec!(8.00)),
            BTreeSet::from(["no onions".to_string()]),
        )
        .unwrap();
        tab.add_line(
            product_id,
            1,
            usd(dec!(8.00)),
            BTreeSet::from(["extra cheese".to_string()]),
        )
        .unwrap();

        assert_eq!(tab.lines[0].customizations.len(), 2);
    }

    #[test]
    fn test_add_line_validation() {
        let mut tab = open_tab();

        let zero_qty = tab.add_line(ProductId::new(), 0, usd(dec!(1.00)), BTreeSet::new());
        assert!(zero_qty.unwrap_err().is_validation());

        let zero_price = tab.add_line(ProductId::new(), 1, usd(dec!(0)), BTreeSet::new());
        assert!(zero_price.unwrap_err().is_validation());

        let wrong_currency = tab.add_line(
            ProductId::new(),
            1,
            Money::new(dec!(1.00), Currency::EUR),
            BTreeSet::new(),
        );
        assert!(wrong_currency.unwrap_err().is_validation());
    }

    #[test]
    fn test_edits_rejected_on_closed_tab() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 1, usd(dec!(5.00)), BTreeSet::new())
            .unwrap();
        tab.mark_closed();

        assert!(matches!(
            tab.add_line(ProductId::new(), 1, usd(dec!(5.00)), BTreeSet::new()),
            Err(TabError::InvalidState(_))
        ));
        assert!(matches!(
            tab.remove_line(line_id),
            Err(TabError::InvalidState(_))
        ));
        assert!(matches!(
            tab.set_line_quantity(line_id, 2),
            Err(TabError::InvalidState(_))
        ));
        assert!(matches!(
            tab.init_or_update_split(2),
            Err(TabError::InvalidState(_))
        ));
        assert!(matches!(
            tab.settle_units(&HashMap::from([(line_id, 1)])),
            Err(TabError::InvalidState(_))
        ));
    }

    #[test]
    fn test_remove_line() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 1, usd(dec!(5.00)), BTreeSet::new())
            .unwrap();

        tab.remove_line(line_id).unwrap();
        assert!(tab.lines.is_empty());

        assert!(tab.remove_line(line_id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_line_quantity_purges_unpaid_duplicates() {
        let mut tab = open_tab();
        let product_id = ProductId::new();
        let keep = tab
            .add_line(product_id, 2, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        // settle one unit so a paid sibling exists for the same product
        tab.settle_units(&HashMap::from([(keep, 1)])).unwrap();
        // a second unpaid line for the same product, forced in directly
        tab.lines.push(TabLine::new(
            product_id,
            7,
            usd(dec!(4.00)),
            BTreeSet::new(),
        ));

        tab.set_line_quantity(keep, 4).unwrap();

        assert_eq!(tab.find_line(keep).unwrap().quantity, 4);
        // the paid sibling survives, the unpaid duplicate is purged
        assert_eq!(tab.lines.len(), 2);
        assert!(tab.lines.iter().any(|l| l.paid && l.quantity == 1));
    }

    #[test]
    fn test_set_line_quantity_on_settled_line_rejected() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 2, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        tab.settle_units(&HashMap::from([(line_id, 2)])).unwrap();

        assert!(matches!(
            tab.set_line_quantity(line_id, 5),
            Err(TabError::InvalidState(_))
        ));
    }

    #[test]
    fn test_init_or_update_split() {
        let mut tab = open_tab();

        tab.init_or_update_split(3).unwrap();
        assert_eq!(tab.split_total, Some(3));
        assert_eq!(tab.split_remaining, Some(3));

        tab.consume_split_share();
        assert_eq!(tab.split_remaining, Some(2));

        // re-initializing restarts the counters
        tab.init_or_update_split(5).unwrap();
        assert_eq!(tab.split_total, Some(5));
        assert_eq!(tab.split_remaining, Some(5));

        assert!(tab.init_or_update_split(0).unwrap_err().is_validation());
    }

    #[test]
    fn test_structural_edits_reset_split_remaining() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 3, usd(dec!(10.00)), BTreeSet::new())
            .unwrap();
        tab.init_or_update_split(3).unwrap();
        tab.consume_split_share();
        assert_eq!(tab.split_remaining, Some(2));

        tab.add_line(ProductId::new(), 1, usd(dec!(2.00)), BTreeSet::new())
            .unwrap();
        assert_eq!(tab.split_remaining, Some(3));

        tab.consume_split_share();
        tab.set_line_quantity(line_id, 2).unwrap();
        assert_eq!(tab.split_remaining, Some(3));

        tab.consume_split_share();
        tab.remove_line(line_id).unwrap();
        assert_eq!(tab.split_remaining, Some(3));
    }

    #[test]
    fn test_settlement_does_not_reset_split_remaining() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 3, usd(dec!(10.00)), BTreeSet::new())
            .unwrap();
        tab.init_or_update_split(3).unwrap();
        tab.consume_split_share();

        tab.settle_units(&HashMap::from([(line_id, 1)])).unwrap();
        assert_eq!(tab.split_remaining, Some(2));
    }

    #[test]
    fn test_consume_split_share_without_split_is_a_no_op() {
        let mut tab = open_tab();
        tab.consume_split_share();
        assert_eq!(tab.split_remaining, None);

        tab.init_or_update_split(1).unwrap();
        tab.consume_split_share();
        tab.consume_split_share();
        assert_eq!(tab.split_remaining, Some(0));
    }

    #[test]
    fn test_settle_units_full_line_flips_in_place() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 5, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();

        let charged = tab
            .settle_units(&HashMap::from([(line_id, 5)]))
            .unwrap();

        assert_eq!(charged.amount(), dec!(20.00));
        assert_eq!(tab.lines.len(), 1);
        let line = tab.find_line(line_id).unwrap();
        assert!(line.paid);
        assert_eq!(line.quantity, 5);
    }

    #[test]
    fn test_settle_units_partial_splits_line() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 5, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();

        let charged = tab
            .settle_units(&HashMap::from([(line_id, 2)]))
            .unwrap();

        assert_eq!(charged.amount(), dec!(8.00));
        assert_eq!(tab.lines.len(), 2);

        let original = tab.find_line(line_id).unwrap();
        assert_eq!(original.quantity, 3);
        assert!(!original.paid);

        let sibling = tab.lines.iter().find(|l| l.id != line_id).unwrap();
        assert_eq!(sibling.quantity, 2);
        assert!(sibling.paid);
        assert_eq!(sibling.unit_price, original.unit_price);

        // the split does not change the tab total
        assert_eq!(tab.calculate_total().amount(), dec!(20.00));
    }

    #[test]
    fn test_settle_units_over_request_rejected_without_mutation() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 5, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        let before = tab.lines.clone();

        let result = tab.settle_units(&HashMap::from([(line_id, 6)]));

        assert!(result.unwrap_err().is_validation());
        assert_eq!(tab.lines, before);
    }

    #[test]
    fn test_settle_units_rejects_whole_batch_on_one_bad_line() {
        let mut tab = open_tab();
        let good = tab
            .add_line(ProductId::new(), 5, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        let before = tab.lines.clone();

        let mut request = HashMap::new();
        request.insert(good, 1);
        request.insert(LineId::new(), 1);

        let result = tab.settle_units(&request);

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(tab.lines, before);
    }

    #[test]
    fn test_settle_units_on_paid_line_conflicts() {
        let mut tab = open_tab();
        let line_id = tab
            .add_line(ProductId::new(), 2, usd(dec!(4.00)), BTreeSet::new())
            .unwrap();
        tab.settle_units(&HashMap::from([(line_id, 2)])).unwrap();

        let result = tab.settle_units(&HashMap::from([(line_id, 1)]));
        assert!(matches!(result, Err(TabError::Conflict(_))));
    }

    #[test]
    fn test_calculate_total_is_exact() {
        let mut tab = open_tab();
        tab.add_line(ProductId::new(), 3, usd(dec!(0.10)), BTreeSet::new())
            .unwrap();
        tab.add_line(ProductId::new(), 7, usd(dec!(1.99)), BTreeSet::new())
            .unwrap();

        assert_eq!(tab.calculate_total().amount(), dec!(14.23));
    }
}
