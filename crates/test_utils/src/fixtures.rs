//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the tabledger
//! test suite. These fixtures are designed to be consistent and predictable
//! for unit tests.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BranchId, CompanyId, Currency, Money, TabId, UserId};
use domain_tab::payment::{PaymentRecord, PaymentStatus};
use domain_tab::service::CallerContext;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard ten-dollar amount
    pub fn usd_10() -> Money {
        Money::new(dec!(10.00), Currency::USD)
    }

    /// A small unit price
    pub fn usd_4() -> Money {
        Money::new(dec!(4.00), Currency::USD)
    }

    /// A zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_10() -> Money {
        Money::new(dec!(10.00), Currency::EUR)
    }

    /// A CLP amount (zero decimal places)
    pub fn clp_9500() -> Money {
        Money::new(dec!(9500), Currency::CLP)
    }
}

/// Fixture for payment records
pub struct PaymentFixtures;

impl PaymentFixtures {
    /// A partial payment of the given amount against a tab
    pub fn partial(tab_id: TabId, amount: Decimal) -> PaymentRecord {
        PaymentRecord::new(
            tab_id,
            Money::new(amount, Currency::USD),
            None,
            PaymentStatus::PartiallyPaid,
        )
        .expect("fixture amount must be positive")
    }

    /// A covering payment of the given amount against a tab
    pub fn covering(tab_id: TabId, amount: Decimal) -> PaymentRecord {
        PaymentRecord::new(
            tab_id,
            Money::new(amount, Currency::USD),
            Some("Ana".to_string()),
            PaymentStatus::PaidInFull,
        )
        .expect("fixture amount must be positive")
    }
}

/// Fixture for caller contexts
pub struct CallerFixtures;

impl CallerFixtures {
    /// A waiter at a fixed branch of a fixed company
    pub fn waiter() -> CallerContext {
        CallerContext {
            user_id: UserId::new(),
            user_name: "Mario".to_string(),
            company_id: CompanyId::new(),
            branch_id: BranchId::new(),
            company_label: "La Esquina".to_string(),
            branch_label: "Centro".to_string(),
        }
    }

    /// A caller scoped to a different branch of the same company
    pub fn other_branch(caller: &CallerContext) -> CallerContext {
        CallerContext {
            branch_id: BranchId::new(),
            ..caller.clone()
        }
    }
}

/// A small fixed menu of (name, unit price) pairs, shared across tests
pub static SAMPLE_MENU: Lazy<Vec<(&'static str, Decimal)>> = Lazy::new(|| {
    vec![
        ("Empanada", dec!(4.00)),
        ("Milanesa", dec!(10.00)),
        ("Ensalada", dec!(6.50)),
        ("Flan", dec!(3.75)),
        ("Limonada", dec!(2.25)),
    ]
});
