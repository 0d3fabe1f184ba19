//! Split status projection
//!
//! Computes, at any point in time, the tab's total, the aggregate paid
//! amount, the share counters, and a per-line view of how many units are
//! already covered by payments. Everything here is a read-side projection
//! over the line list and the payment history; no per-unit ledger is stored.
//!
//! The covered-units walk is greedy and order-dependent: paid money is
//! assigned to lines in their stored order, whole units at a time. It does
//! not reflect which specific units were actually paid for by which payment;
//! it is a best-effort reconstruction for display purposes only, and the
//! stored line order must stay the allocation order.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{LineId, Money};

use crate::payment::PaymentRecord;
use crate::tab::Tab;

/// A line with at least one unit covered by the greedy walk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveredLine {
    /// Line identifier
    pub line_id: LineId,
    /// The line's total quantity
    pub quantity: u32,
    /// Units of the line covered by paid money
    pub covered: u32,
}

/// Snapshot of a tab's split and payment state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitStatus {
    /// Total number of shares the tab is divided into; 0 when no split
    pub total_shares: u32,
    /// Shares not yet consumed by a payment
    pub remaining_shares: u32,
    /// Shares already consumed
    pub paid_shares: u32,
    /// Aggregate of all recorded payments
    pub paid_amount: Money,
    /// The tab's current total
    pub tab_total: Money,
    /// Amount due per remaining share, rounded to 2 decimal places half-up
    pub share_due: Money,
    /// Lines fully or partially covered by the greedy walk
    pub covered_lines: Vec<CoveredLine>,
}

/// Computes the split status of a tab against its payment history
pub fn split_status(tab: &Tab, payments: &[PaymentRecord]) -> SplitStatus {
    let total_shares = tab.split_total.unwrap_or(0);
    let remaining_shares = tab.split_remaining.unwrap_or(total_shares);
    let paid_shares = total_shares.saturating_sub(remaining_shares);

    let paid_amount = payments
        .iter()
        .fold(Money::zero(tab.currency), |acc, p| acc + p.amount);
    let tab_total = tab.calculate_total();

    let covered_lines = cover_lines(tab, paid_amount.amount());

    // negative only transiently after an overpayment; zero for share math
    let remaining_money = {
        let diff = tab_total.amount() - paid_amount.amount();
        if diff.is_sign_negative() {
            Decimal::ZERO
        } else {
            diff
        }
    };

    let share_due = if remaining_shares == 0 {
        Money::zero(tab.currency)
    } else {
        Money::new(
            remaining_money / Decimal::from(remaining_shares),
            tab.currency,
        )
        .round_half_up(2)
    };

    SplitStatus {
        total_shares,
        remaining_shares,
        paid_shares,
        paid_amount,
        tab_total,
        share_due,
        covered_lines,
    }
}

/// Greedy, order-dependent allocation of paid money to whole units
fn cover_lines(tab: &Tab, paid: Decimal) -> Vec<CoveredLine> {
    let mut covered_lines = Vec::new();
    let mut leftover = paid;

    for line in &tab.lines {
        let line_total = line.line_total().amount();
        if leftover >= line_total {
            covered_lines.push(CoveredLine {
                line_id: line.id,
                quantity: line.quantity,
                covered: line.quantity,
            });
            leftover -= line_total;
        } else {
            // line_total > leftover >= 0, so the unit price is non-zero here;
            // partial money never covers a fractional unit
            let covered = (leftover / line.unit_price.amount())
                .floor()
                .to_u32()
                .unwrap_or(0);
            if covered > 0 {
                covered_lines.push(CoveredLine {
                    line_id: line.id,
                    quantity: line.quantity,
                    covered,
                });
            }
            break;
        }
    }

    covered_lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use rust_decimal_macros::dec;

    use core_kernel::{BranchId, Currency, ProductId, TabId};

    use crate::payment::{PaymentRecord, PaymentStatus};

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn payment(tab_id: TabId, amount: Decimal) -> PaymentRecord {
        PaymentRecord::new(tab_id, usd(amount), None, PaymentStatus::PartiallyPaid).unwrap()
    }

    fn tab_with_lines(lines: &[(u32, Decimal)]) -> Tab {
        let mut tab = Tab::new(BranchId::new(), "Table 1", Currency::USD);
        for (quantity, price) in lines {
            tab.add_line(ProductId::new(), *quantity, usd(*price), BTreeSet::new())
                .unwrap();
        }
        tab
    }

    #[test]
    fn test_no_split_no_payments() {
        let tab = tab_with_lines(&[(3, dec!(10.00))]);
        let status = split_status(&tab, &[]);

        assert_eq!(status.total_shares, 0);
        assert_eq!(status.remaining_shares, 0);
        assert_eq!(status.paid_shares, 0);
        assert!(status.paid_amount.is_zero());
        assert_eq!(status.tab_total.amount(), dec!(30.00));
        assert!(status.share_due.is_zero());
        assert!(status.covered_lines.is_empty());
    }

    #[test]
    fn test_share_due_after_one_payment() {
        // one line of 3 at 10.00, split 3 ways, one share of 10.00 paid
        let mut tab = tab_with_lines(&[(3, dec!(10.00))]);
        tab.init_or_update_split(3).unwrap();
        tab.consume_split_share();

        let status = split_status(&tab, &[payment(tab.id, dec!(10.00))]);

        assert_eq!(status.total_shares, 3);
        assert_eq!(status.remaining_shares, 2);
        assert_eq!(status.paid_shares, 1);
        assert_eq!(status.paid_amount.amount(), dec!(10.00));
        assert_eq!(status.tab_total.amount(), dec!(30.00));
        assert_eq!(status.share_due.amount(), dec!(10.00));
    }

    #[test]
    fn test_share_due_rounds_half_up() {
        let mut tab = tab_with_lines(&[(1, dec!(10.00))]);
        tab.init_or_update_split(3).unwrap();

        let status = split_status(&tab, &[]);

        // 10.00 / 3 = 3.333... -> 3.33
        assert_eq!(status.share_due.amount(), dec!(3.33));

        let mut tab = tab_with_lines(&[(1, dec!(10.01))]);
        tab.init_or_update_split(2).unwrap();
        let status = split_status(&tab, &[]);

        // 10.01 / 2 = 5.005 -> 5.01 (half-up)
        assert_eq!(status.share_due.amount(), dec!(5.01));
    }

    #[test]
    fn test_share_due_zero_when_no_shares_remain() {
        let mut tab = tab_with_lines(&[(1, dec!(10.00))]);
        tab.init_or_update_split(1).unwrap();
        tab.consume_split_share();

        let status = split_status(&tab, &[payment(tab.id, dec!(4.00))]);

        assert_eq!(status.remaining_shares, 0);
        assert!(status.share_due.is_zero());
    }

    #[test]
    fn test_overpayment_clamps_remaining_to_zero() {
        let mut tab = tab_with_lines(&[(1, dec!(10.00))]);
        tab.init_or_update_split(2).unwrap();

        let status = split_status(&tab, &[payment(tab.id, dec!(25.00))]);

        assert!(status.share_due.is_zero());
        assert_eq!(status.paid_amount.amount(), dec!(25.00));
    }

    #[test]
    fn test_greedy_walk_covers_lines_in_stored_order() {
        // lines: 2 x 6.00 = 12.00, then 3 x 5.00 = 15.00
        let tab = tab_with_lines(&[(2, dec!(6.00)), (3, dec!(5.00))]);

        // 17.00 covers the first line (12.00) and one unit of the second
        let status = split_status(&tab, &[payment(tab.id, dec!(17.00))]);

        assert_eq!(status.covered_lines.len(), 2);
        assert_eq!(status.covered_lines[0].line_id, tab.lines[0].id);
        assert_eq!(status.covered_lines[0].covered, 2);
        assert_eq!(status.covered_lines[1].line_id, tab.lines[1].id);
        assert_eq!(status.covered_lines[1].covered, 1);
    }

    #[test]
    fn test_greedy_walk_rounds_partial_units_down() {
        let tab = tab_with_lines(&[(3, dec!(10.00))]);

        // 19.99 covers one whole unit, not two
        let status = split_status(&tab, &[payment(tab.id, dec!(19.99))]);

        assert_eq!(status.covered_lines.len(), 1);
        assert_eq!(status.covered_lines[0].covered, 1);
    }

    #[test]
    fn test_greedy_walk_stops_at_first_partial_line() {
        let tab = tab_with_lines(&[(2, dec!(6.00)), (3, dec!(5.00)), (1, dec!(1.00))]);

        // 13.00: first line covered, the 1.00 left covers no unit of line
        // two, and the walk stops there even though 1.00 would have bought
        // the whole third line
        let status = split_status(&tab, &[payment(tab.id, dec!(13.00))]);

        assert_eq!(status.covered_lines.len(), 1);
        assert_eq!(status.covered_lines[0].covered, 2);
    }

    #[test]
    fn test_greedy_walk_allocation_is_order_sensitive() {
        // same lines, opposite order, same paid money -> different cover
        let forward = tab_with_lines(&[(1, dec!(9.00)), (1, dec!(3.00))]);
        let reverse = tab_with_lines(&[(1, dec!(3.00)), (1, dec!(9.00))]);

        let paid = dec!(3.00);
        let fwd = split_status(&forward, &[payment(forward.id, paid)]);
        let rev = split_status(&reverse, &[payment(reverse.id, paid)]);

        assert!(fwd.covered_lines.is_empty());
        assert_eq!(rev.covered_lines.len(), 1);
        assert_eq!(rev.covered_lines[0].covered, 1);
    }

    #[test]
    fn test_multiple_payments_are_summed() {
        let tab = tab_with_lines(&[(3, dec!(10.00))]);

        let payments = vec![
            payment(tab.id, dec!(7.00)),
            payment(tab.id, dec!(13.00)),
        ];
        let status = split_status(&tab, &payments);

        assert_eq!(status.paid_amount.amount(), dec!(20.00));
        assert_eq!(status.covered_lines[0].covered, 2);
    }
}
