//! Production workflow tests
//!
//! Covers the stock-ledger consistency rules for production runs:
//! - materials are debited and the product credited together
//! - delete restores every balance the run touched
//! - update behaves as revert(old) followed by apply(new)

use std::collections::BTreeMap;
use std::str::FromStr;

use proptest::prelude::*;
use rust_decimal::Decimal;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// In-memory mirror of the ledgers a production run touches
#[derive(Debug, Clone, PartialEq)]
struct Ledger {
    stocks: BTreeMap<String, Decimal>,
    product_quantity: i32,
}

impl Ledger {
    fn new(stocks: &[(&str, &str)], product_quantity: i32) -> Self {
        Self {
            stocks: stocks
                .iter()
                .map(|(name, stock)| (name.to_string(), dec(stock)))
                .collect(),
            product_quantity,
        }
    }
}

/// Apply a production run: validate, debit materials, credit the product.
/// Mirrors the service's create path: nothing changes when validation fails.
fn apply_production(
    ledger: &mut Ledger,
    units: i32,
    consumptions: &[(String, Decimal)],
) -> Result<(), String> {
    if units < 1 {
        return Err("units must be at least 1".to_string());
    }

    for (name, quantity) in consumptions {
        match ledger.stocks.get(name) {
            None => return Err(format!("unknown material: {}", name)),
            Some(stock) if *stock < *quantity => {
                return Err(format!("insufficient stock: {}", name))
            }
            Some(_) => {}
        }
    }

    for (name, quantity) in consumptions {
        *ledger.stocks.get_mut(name).unwrap() -= *quantity;
    }
    ledger.product_quantity += units;

    Ok(())
}

/// Revert a production run: credit materials back, debit the product.
/// `clamp` models the delete path's zero floor on product quantity.
fn revert_production(
    ledger: &mut Ledger,
    units: i32,
    consumptions: &[(String, Decimal)],
    clamp: bool,
) {
    for (name, quantity) in consumptions {
        if let Some(stock) = ledger.stocks.get_mut(name) {
            *stock += *quantity;
        }
    }

    ledger.product_quantity -= units;
    if clamp && ledger.product_quantity < 0 {
        ledger.product_quantity = 0;
    }
}

fn consumptions(entries: &[(&str, &str)]) -> Vec<(String, Decimal)> {
    entries
        .iter()
        .map(|(name, q)| (name.to_string(), dec(q)))
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_apply_debits_materials_and_credits_product() {
        let mut ledger = Ledger::new(&[("pigment", "10"), ("solvent", "8")], 0);
        let used = consumptions(&[("pigment", "4"), ("solvent", "2")]);

        apply_production(&mut ledger, 5, &used).unwrap();

        assert_eq!(ledger.stocks["pigment"], dec("6"));
        assert_eq!(ledger.stocks["solvent"], dec("6"));
        assert_eq!(ledger.product_quantity, 5);
    }

    #[test]
    fn test_apply_rejects_unknown_material_without_mutation() {
        let mut ledger = Ledger::new(&[("pigment", "10")], 0);
        let before = ledger.clone();
        let used = consumptions(&[("pigment", "4"), ("resin", "1")]);

        assert!(apply_production(&mut ledger, 5, &used).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_apply_rejects_insufficient_stock_without_mutation() {
        let mut ledger = Ledger::new(&[("pigment", "3")], 0);
        let before = ledger.clone();
        let used = consumptions(&[("pigment", "5")]);

        assert!(apply_production(&mut ledger, 1, &used).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_apply_allows_exact_stock() {
        let mut ledger = Ledger::new(&[("pigment", "5")], 0);
        let used = consumptions(&[("pigment", "5")]);

        apply_production(&mut ledger, 2, &used).unwrap();
        assert_eq!(ledger.stocks["pigment"], Decimal::ZERO);
    }

    #[test]
    fn test_apply_rejects_zero_units() {
        let mut ledger = Ledger::new(&[("pigment", "10")], 0);
        assert!(apply_production(&mut ledger, 0, &[]).is_err());
    }

    /// Create followed by delete restores all balances exactly
    #[test]
    fn test_create_then_delete_restores_ledger() {
        let mut ledger = Ledger::new(&[("pigment", "10"), ("solvent", "8")], 3);
        let before = ledger.clone();
        let used = consumptions(&[("pigment", "4"), ("solvent", "2")]);

        apply_production(&mut ledger, 5, &used).unwrap();
        revert_production(&mut ledger, 5, &used, true);

        assert_eq!(ledger, before);
    }

    /// Update = revert(old) then apply(new)
    #[test]
    fn test_update_is_revert_then_apply() {
        let mut ledger = Ledger::new(&[("pigment", "10"), ("solvent", "8")], 0);
        let old = consumptions(&[("pigment", "4")]);
        let new = consumptions(&[("pigment", "2"), ("solvent", "6")]);

        apply_production(&mut ledger, 5, &old).unwrap();

        revert_production(&mut ledger, 5, &old, false);
        apply_production(&mut ledger, 3, &new).unwrap();

        assert_eq!(ledger.stocks["pigment"], dec("8"));
        assert_eq!(ledger.stocks["solvent"], dec("2"));
        assert_eq!(ledger.product_quantity, 3);
    }

    /// Updating with unchanged fields leaves every balance as it was
    #[test]
    fn test_update_with_unchanged_fields_is_noop() {
        let mut ledger = Ledger::new(&[("pigment", "10"), ("solvent", "8")], 0);
        let used = consumptions(&[("pigment", "4"), ("solvent", "2")]);

        apply_production(&mut ledger, 5, &used).unwrap();
        let after_create = ledger.clone();

        revert_production(&mut ledger, 5, &used, false);
        apply_production(&mut ledger, 5, &used).unwrap();

        assert_eq!(ledger, after_create);
    }

    /// The reverted balances are what the new consumptions validate against
    #[test]
    fn test_update_validates_against_reverted_stock() {
        let mut ledger = Ledger::new(&[("pigment", "5")], 0);
        let old = consumptions(&[("pigment", "5")]);

        apply_production(&mut ledger, 1, &old).unwrap();
        assert_eq!(ledger.stocks["pigment"], Decimal::ZERO);

        // With the old run reverted, all 5 units are available again.
        revert_production(&mut ledger, 1, &old, false);
        let new = consumptions(&[("pigment", "5")]);
        assert!(apply_production(&mut ledger, 2, &new).is_ok());
    }

    /// Delete clamps product quantity at zero when sales already drained it
    #[test]
    fn test_delete_clamps_product_quantity_at_zero() {
        let mut ledger = Ledger::new(&[("pigment", "10")], 0);
        let used = consumptions(&[("pigment", "4")]);

        apply_production(&mut ledger, 5, &used).unwrap();

        // Sales took 4 of the 5 produced units.
        ledger.product_quantity -= 4;

        revert_production(&mut ledger, 5, &used, true);

        assert_eq!(ledger.product_quantity, 0);
        assert_eq!(ledger.stocks["pigment"], dec("10"));
    }

    /// Reverting skips materials that were deleted in the meantime
    #[test]
    fn test_revert_skips_deleted_materials() {
        let mut ledger = Ledger::new(&[("pigment", "10"), ("solvent", "8")], 0);
        let used = consumptions(&[("pigment", "4"), ("solvent", "2")]);

        apply_production(&mut ledger, 5, &used).unwrap();
        ledger.stocks.remove("solvent");

        revert_production(&mut ledger, 5, &used, true);

        assert_eq!(ledger.stocks["pigment"], dec("10"));
        assert!(!ledger.stocks.contains_key("solvent"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for consumption quantities (0.1 to 100.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for a ledger with ample stock plus consumptions within it
    fn run_strategy() -> impl Strategy<Value = (Vec<(String, Decimal)>, Vec<(String, Decimal)>)> {
        prop::collection::vec(quantity_strategy(), 1..6).prop_flat_map(|quantities| {
            let materials: Vec<(String, Decimal)> = quantities
                .iter()
                .enumerate()
                // Stocks are double the consumption, so every run is coverable
                .map(|(i, q)| (format!("material-{}", i), *q * Decimal::from(2)))
                .collect();
            let consumptions: Vec<(String, Decimal)> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| (format!("material-{}", i), *q))
                .collect();
            Just((materials, consumptions))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stocks never go negative after a validated apply
        #[test]
        fn prop_apply_never_negative((materials, used) in run_strategy(), units in 1i32..100) {
            let mut ledger = Ledger {
                stocks: materials.into_iter().collect(),
                product_quantity: 0,
            };

            apply_production(&mut ledger, units, &used).unwrap();

            for stock in ledger.stocks.values() {
                prop_assert!(*stock >= Decimal::ZERO);
            }
            prop_assert_eq!(ledger.product_quantity, units);
        }

        /// Apply then revert is the identity on the ledger
        #[test]
        fn prop_apply_revert_roundtrip((materials, used) in run_strategy(), units in 1i32..100) {
            let mut ledger = Ledger {
                stocks: materials.into_iter().collect(),
                product_quantity: 0,
            };
            let before = ledger.clone();

            apply_production(&mut ledger, units, &used).unwrap();
            revert_production(&mut ledger, units, &used, true);

            prop_assert_eq!(ledger, before);
        }

        /// A failed apply leaves the ledger untouched
        #[test]
        fn prop_failed_apply_mutates_nothing((materials, used) in run_strategy(), units in 1i32..100) {
            let mut ledger = Ledger {
                stocks: materials.into_iter().collect(),
                product_quantity: 0,
            };
            // Overdraw the first material so validation must fail.
            let mut overdrawn = used.clone();
            let first_stock = ledger.stocks[&overdrawn[0].0];
            overdrawn[0].1 = first_stock + Decimal::ONE;

            let before = ledger.clone();
            prop_assert!(apply_production(&mut ledger, units, &overdrawn).is_err());
            prop_assert_eq!(ledger, before);
        }

        /// Revert-then-apply with identical fields is a no-op
        #[test]
        fn prop_unchanged_update_is_noop((materials, used) in run_strategy(), units in 1i32..100) {
            let mut ledger = Ledger {
                stocks: materials.into_iter().collect(),
                product_quantity: 0,
            };

            apply_production(&mut ledger, units, &used).unwrap();
            let after_create = ledger.clone();

            revert_production(&mut ledger, units, &used, false);
            apply_production(&mut ledger, units, &used).unwrap();

            prop_assert_eq!(ledger, after_create);
        }
    }
}
