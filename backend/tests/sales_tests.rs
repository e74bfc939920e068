//! Sales workflow tests
//!
//! Covers the product-quantity ledger: create debits, delete credits back,
//! and update adjusts by the delta between old and new unit counts.

use std::str::FromStr;

use proptest::prelude::*;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// The product state a sale mutates
#[derive(Debug, Clone, PartialEq)]
struct ProductSim {
    quantity: i32,
    price_per_unit: Decimal,
}

/// A recorded sale
#[derive(Debug, Clone, PartialEq)]
struct SaleSim {
    no_of_units_sold: i32,
    total_sale: Decimal,
}

/// Record a sale, debiting the product. Mirrors the service's create path.
fn create_sale(product: &mut ProductSim, units: i32) -> Result<SaleSim, &'static str> {
    if units < 0 {
        return Err("units cannot be negative");
    }
    if product.quantity < units {
        return Err("Insufficient product stock for the sale");
    }

    product.quantity -= units;
    Ok(SaleSim {
        no_of_units_sold: units,
        total_sale: Decimal::from(units) * product.price_per_unit,
    })
}

/// Edit a sale, applying the unit delta to the product
fn update_sale(
    product: &mut ProductSim,
    sale: &mut SaleSim,
    new_units: i32,
) -> Result<(), &'static str> {
    if new_units < 0 {
        return Err("units cannot be negative");
    }

    let delta = new_units - sale.no_of_units_sold;
    if product.quantity < delta {
        return Err("Insufficient product stock for the update");
    }

    product.quantity -= delta;
    sale.no_of_units_sold = new_units;
    sale.total_sale = Decimal::from(new_units) * product.price_per_unit;
    Ok(())
}

/// Delete a sale, crediting its units back
fn delete_sale(product: &mut ProductSim, sale: &SaleSim) {
    product.quantity += sale.no_of_units_sold;
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Selling 5 of a quantity-10, price-2 product leaves quantity 5, total 10
    #[test]
    fn test_create_sale_debits_and_prices() {
        let mut product = ProductSim {
            quantity: 10,
            price_per_unit: dec("2"),
        };

        let sale = create_sale(&mut product, 5).unwrap();

        assert_eq!(product.quantity, 5);
        assert_eq!(sale.total_sale, dec("10"));
    }

    /// Updating 5 -> 8 with quantity 5 needs only the delta of 3
    #[test]
    fn test_update_sale_applies_delta() {
        let mut product = ProductSim {
            quantity: 10,
            price_per_unit: dec("2"),
        };
        let mut sale = create_sale(&mut product, 5).unwrap();
        assert_eq!(product.quantity, 5);

        update_sale(&mut product, &mut sale, 8).unwrap();

        assert_eq!(product.quantity, 2);
        assert_eq!(sale.total_sale, dec("16"));
    }

    /// Shrinking a sale credits the difference back
    #[test]
    fn test_update_sale_downward_credits_back() {
        let mut product = ProductSim {
            quantity: 10,
            price_per_unit: dec("3"),
        };
        let mut sale = create_sale(&mut product, 6).unwrap();
        assert_eq!(product.quantity, 4);

        update_sale(&mut product, &mut sale, 2).unwrap();

        assert_eq!(product.quantity, 8);
        assert_eq!(sale.total_sale, dec("6"));
    }

    #[test]
    fn test_create_sale_rejects_oversell() {
        let mut product = ProductSim {
            quantity: 4,
            price_per_unit: dec("2"),
        };
        let before = product.clone();

        assert!(create_sale(&mut product, 5).is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn test_update_sale_rejects_uncovered_delta() {
        let mut product = ProductSim {
            quantity: 10,
            price_per_unit: dec("2"),
        };
        let mut sale = create_sale(&mut product, 5).unwrap();

        // quantity is 5; growing the sale by 6 more units cannot be covered
        assert!(update_sale(&mut product, &mut sale, 11).is_err());
        assert_eq!(product.quantity, 5);
        assert_eq!(sale.no_of_units_sold, 5);
    }

    #[test]
    fn test_delete_sale_credits_units_back() {
        let mut product = ProductSim {
            quantity: 10,
            price_per_unit: dec("2"),
        };
        let sale = create_sale(&mut product, 7).unwrap();
        assert_eq!(product.quantity, 3);

        delete_sale(&mut product, &sale);

        assert_eq!(product.quantity, 10);
    }

    /// A zero-unit sale is allowed and changes nothing
    #[test]
    fn test_zero_unit_sale() {
        let mut product = ProductSim {
            quantity: 10,
            price_per_unit: dec("2"),
        };

        let sale = create_sale(&mut product, 0).unwrap();

        assert_eq!(product.quantity, 10);
        assert_eq!(sale.total_sale, Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// totalSale is exactly units x pricePerUnit
        #[test]
        fn prop_total_sale(units in 0i32..1000, price in price_strategy()) {
            let mut product = ProductSim { quantity: 1000, price_per_unit: price };
            let sale = create_sale(&mut product, units).unwrap();

            prop_assert_eq!(sale.total_sale, Decimal::from(units) * price);
        }

        /// Create then delete restores the product quantity exactly
        #[test]
        fn prop_create_delete_roundtrip(initial in 0i32..1000, units in 0i32..1000) {
            prop_assume!(units <= initial);

            let mut product = ProductSim { quantity: initial, price_per_unit: dec("2") };
            let sale = create_sale(&mut product, units).unwrap();
            delete_sale(&mut product, &sale);

            prop_assert_eq!(product.quantity, initial);
        }

        /// After any successful update, conservation holds:
        /// initial quantity == final quantity + units now recorded as sold
        #[test]
        fn prop_update_conserves_units(
            initial in 0i32..1000,
            first in 0i32..1000,
            second in 0i32..1000,
        ) {
            prop_assume!(first <= initial);

            let mut product = ProductSim { quantity: initial, price_per_unit: dec("2") };
            let mut sale = create_sale(&mut product, first).unwrap();

            if update_sale(&mut product, &mut sale, second).is_ok() {
                prop_assert_eq!(product.quantity + sale.no_of_units_sold, initial);
            } else {
                // Failed updates change nothing
                prop_assert_eq!(product.quantity + sale.no_of_units_sold, initial);
                prop_assert_eq!(sale.no_of_units_sold, first);
            }
        }

        /// Product quantity never goes negative through sales
        #[test]
        fn prop_quantity_never_negative(
            initial in 0i32..100,
            attempts in prop::collection::vec(0i32..100, 1..20),
        ) {
            let mut product = ProductSim { quantity: initial, price_per_unit: dec("1") };

            for units in attempts {
                let _ = create_sale(&mut product, units);
                prop_assert!(product.quantity >= 0);
            }
        }
    }
}
