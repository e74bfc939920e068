//! Purchase order workflow tests
//!
//! Covers pricing, the Pending -> Received state machine, and the stock
//! credit that happens exactly once per order.

use std::str::FromStr;

use proptest::prelude::*;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Pending,
    Received,
}

/// An order plus the material balance it credits on receipt
#[derive(Debug, Clone)]
struct OrderSim {
    quantity: i32,
    status: Status,
    material_stock: Decimal,
}

/// Receive an order: credit stock and flip the status, or fail on a repeat.
/// Mirrors the service: both effects land together or not at all.
fn receive(order: &mut OrderSim) -> Result<(), &'static str> {
    if order.status == Status::Received {
        return Err("Order has already been received");
    }

    order.material_stock += Decimal::from(order.quantity);
    order.status = Status::Received;
    Ok(())
}

fn total_cost(quantity: i32, cost_per_unit: Decimal) -> Decimal {
    Decimal::from(quantity) * cost_per_unit
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Vendor supplying at cost 3, quantity 4 -> total 12, Pending
    #[test]
    fn test_create_computes_total_cost() {
        assert_eq!(total_cost(4, dec("3")), dec("12"));
    }

    #[test]
    fn test_receive_credits_stock_and_flips_status() {
        let mut order = OrderSim {
            quantity: 4,
            status: Status::Pending,
            material_stock: dec("10"),
        };

        receive(&mut order).unwrap();

        assert_eq!(order.material_stock, dec("14"));
        assert_eq!(order.status, Status::Received);
    }

    /// Receiving twice fails and leaves the first credit in place
    #[test]
    fn test_double_receive_conflicts() {
        let mut order = OrderSim {
            quantity: 4,
            status: Status::Pending,
            material_stock: dec("0"),
        };

        receive(&mut order).unwrap();
        let after_first = order.material_stock;

        assert!(receive(&mut order).is_err());
        assert_eq!(order.material_stock, after_first);
    }

    /// A pending order has never touched stock
    #[test]
    fn test_pending_order_leaves_stock_untouched() {
        let order = OrderSim {
            quantity: 100,
            status: Status::Pending,
            material_stock: dec("5"),
        };

        assert_eq!(order.material_stock, dec("5"));
        assert_eq!(order.status, Status::Pending);
    }

    /// Edit re-prices without touching stock, even after a receipt
    #[test]
    fn test_edit_repricing_does_not_touch_stock() {
        let mut order = OrderSim {
            quantity: 4,
            status: Status::Pending,
            material_stock: dec("0"),
        };
        receive(&mut order).unwrap();

        // Edit: quantity 4 -> 9 and a new unit price. Stock keeps the credit
        // from the original receipt.
        order.quantity = 9;
        let new_total = total_cost(order.quantity, dec("2.5"));

        assert_eq!(new_total, dec("22.5"));
        assert_eq!(order.material_stock, dec("4"));
    }

    /// Pending orders sort before received ones
    #[test]
    fn test_status_sort_order() {
        let mut statuses = vec![Status::Received, Status::Pending, Status::Received];
        statuses.sort_by_key(|s| match s {
            Status::Pending => 0,
            Status::Received => 1,
        });
        assert_eq!(statuses[0], Status::Pending);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 1000.00
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// totalCost is exactly quantity x costPerUnit and positive
        #[test]
        fn prop_total_cost(quantity in 1i32..10000, cost in price_strategy()) {
            let total = total_cost(quantity, cost);
            prop_assert_eq!(total, Decimal::from(quantity) * cost);
            prop_assert!(total > Decimal::ZERO);
        }

        /// Receiving a batch of pending orders credits the sum of quantities
        #[test]
        fn prop_receipts_accumulate(quantities in prop::collection::vec(1i32..1000, 1..20)) {
            let mut stock = Decimal::ZERO;

            for quantity in &quantities {
                let mut order = OrderSim {
                    quantity: *quantity,
                    status: Status::Pending,
                    material_stock: stock,
                };
                receive(&mut order).unwrap();
                stock = order.material_stock;
            }

            let expected: i64 = quantities.iter().map(|q| *q as i64).sum();
            prop_assert_eq!(stock, Decimal::from(expected));
        }

        /// Stock only ever grows through receipts
        #[test]
        fn prop_receive_never_debits(quantity in 1i32..10000, initial in 0i64..100000) {
            let mut order = OrderSim {
                quantity,
                status: Status::Pending,
                material_stock: Decimal::from(initial),
            };

            receive(&mut order).unwrap();
            prop_assert!(order.material_stock >= Decimal::from(initial));
        }

        /// However many times receive is attempted, the credit lands once
        #[test]
        fn prop_receive_is_single_shot(quantity in 1i32..10000, attempts in 2usize..10) {
            let mut order = OrderSim {
                quantity,
                status: Status::Pending,
                material_stock: Decimal::ZERO,
            };

            let mut successes = 0;
            for _ in 0..attempts {
                if receive(&mut order).is_ok() {
                    successes += 1;
                }
            }

            prop_assert_eq!(successes, 1);
            prop_assert_eq!(order.material_stock, Decimal::from(quantity));
        }
    }
}
