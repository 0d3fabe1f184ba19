//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_tab::split::SplitStatus;

/// Asserts that a Money value equals the expected raw amount
///
/// # Panics
///
/// Panics if the amounts differ, with both values in the message
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money amount mismatch: actual={}, expected={}",
        actual.amount(),
        expected
    );
}

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than
/// the tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the internal consistency of a split snapshot
///
/// # Panics
///
/// Panics when the share counters disagree or a covered line reports more
/// covered units than it has
pub fn assert_split_consistent(status: &SplitStatus) {
    assert!(
        status.remaining_shares <= status.total_shares,
        "remaining shares {} exceed total shares {}",
        status.remaining_shares,
        status.total_shares
    );
    assert_eq!(
        status.paid_shares + status.remaining_shares,
        status.total_shares,
        "share counters do not add up"
    );
    for covered in &status.covered_lines {
        assert!(
            covered.covered >= 1 && covered.covered <= covered.quantity,
            "line {} reports {} covered of {} units",
            covered.line_id,
            covered.covered,
            covered.quantity
        );
    }
}
