//! Test Data Generators
//!
//! Proptest strategies for generating random domain data that maintains
//! invariants, plus fake-data helpers for realistic labels.

use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_tab::tab::Tab;

use crate::builders::TabBuilder;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::MXN),
        Just(Currency::COP),
        Just(Currency::CLP),
        Just(Currency::ARS),
        Just(Currency::PEN),
    ]
}

/// Strategy for generating positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for generating positive USD Money values
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Strategy for generating line quantities
pub fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..30u32
}

/// Strategy for generating (quantity, unit price in minor units) line entries
pub fn line_entry_strategy() -> impl Strategy<Value = (u32, i64)> {
    (quantity_strategy(), 1i64..100_000i64)
}

/// Strategy for generating open USD tabs with 1 to 8 lines
pub fn tab_strategy() -> impl Strategy<Value = Tab> {
    prop::collection::vec(line_entry_strategy(), 1..8).prop_map(|entries| {
        let mut builder = TabBuilder::new();
        for (quantity, price_minor) in entries {
            builder = builder.with_line(quantity, Decimal::new(price_minor, 2));
        }
        builder.build()
    })
}

/// A realistic payer name
pub fn fake_payer_name() -> String {
    Name().fake()
}

/// A realistic company label
pub fn fake_company_label() -> String {
    CompanyName().fake()
}

/// A plausible product name
pub fn fake_product_name() -> String {
    let word: String = Word().fake();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_tabs_are_open_and_priced(tab in tab_strategy()) {
            prop_assert!(!tab.closed);
            prop_assert!(!tab.lines.is_empty());
            prop_assert!(tab.calculate_total().is_positive());
        }

        #[test]
        fn generated_money_is_positive(money in usd_money_strategy()) {
            prop_assert!(money.is_positive());
        }
    }

    #[test]
    fn test_fake_helpers_produce_nonempty_labels() {
        assert!(!fake_payer_name().is_empty());
        assert!(!fake_company_label().is_empty());
        assert!(!fake_product_name().is_empty());
    }
}
