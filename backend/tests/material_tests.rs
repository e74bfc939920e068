//! Material ledger tests
//!
//! Covers the low-stock ranking used by material listings and the shared
//! pagination arithmetic.

use std::cmp::Ordering;
use std::str::FromStr;

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::types::{normalize_page, page_offset, total_pages, PAGE_SIZE};
use shared::validation::is_low_stock;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
struct MaterialSim {
    name: String,
    stock: Decimal,
    threshold: Decimal,
}

fn material(name: &str, stock: &str, threshold: &str) -> MaterialSim {
    MaterialSim {
        name: name.to_string(),
        stock: dec(stock),
        threshold: dec(threshold),
    }
}

/// The listing order: low-stock first, then threshold ascending, then stock
/// ascending. Mirrors the SQL `(stock < threshold) DESC, threshold, stock`.
fn low_stock_cmp(a: &MaterialSim, b: &MaterialSim) -> Ordering {
    let a_low = is_low_stock(a.stock, a.threshold);
    let b_low = is_low_stock(b.stock, b.threshold);

    b_low
        .cmp(&a_low)
        .then(a.threshold.cmp(&b.threshold))
        .then(a.stock.cmp(&b.stock))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_low_stock_materials_rank_first() {
        let mut materials = vec![
            material("resin", "50", "10"),
            material("pigment", "2", "10"),
            material("solvent", "30", "5"),
        ];

        materials.sort_by(low_stock_cmp);

        assert_eq!(materials[0].name, "pigment");
    }

    #[test]
    fn test_ties_break_by_threshold_then_stock() {
        let mut materials = vec![
            material("d", "9", "20"),
            material("c", "8", "20"),
            material("b", "1", "5"),
            material("a", "0", "5"),
        ];

        materials.sort_by(low_stock_cmp);

        let names: Vec<&str> = materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_stock_equal_to_threshold_is_not_low() {
        assert!(!is_low_stock(dec("10"), dec("10")));
        assert!(is_low_stock(dec("9.9"), dec("10")));
    }

    #[test]
    fn test_page_size_is_ten() {
        assert_eq!(PAGE_SIZE, 10);
    }

    #[test]
    fn test_pagination_metadata() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(21), 3);
        assert_eq!(page_offset(normalize_page(Some(3))), 20);
    }

    #[test]
    fn test_invalid_pages_fall_back_to_first() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(-5)), 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn material_strategy() -> impl Strategy<Value = MaterialSim> {
        ("[a-z]{3,8}", quantity_strategy(), quantity_strategy()).prop_map(
            |(name, stock, threshold)| MaterialSim {
                name,
                stock,
                threshold,
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every low-stock material sorts before every well-stocked one
        #[test]
        fn prop_low_stock_partition(
            materials in prop::collection::vec(material_strategy(), 1..30)
        ) {
            let mut sorted = materials;
            sorted.sort_by(low_stock_cmp);

            let first_ok = sorted
                .iter()
                .position(|m| !is_low_stock(m.stock, m.threshold))
                .unwrap_or(sorted.len());

            for m in &sorted[first_ok..] {
                prop_assert!(!is_low_stock(m.stock, m.threshold));
            }
        }

        /// Page offsets tile the result set without gaps or overlaps
        #[test]
        fn prop_page_offsets_tile(total in 0i64..10000) {
            let pages = total_pages(total);

            if total == 0 {
                prop_assert_eq!(pages, 0);
            } else {
                // Last page holds the remainder; every prior page is full.
                prop_assert!(page_offset(pages) < total || pages == 0);
                prop_assert!(pages * PAGE_SIZE >= total);
                prop_assert!((pages - 1) * PAGE_SIZE < total);
            }
        }

        /// Normalized pages are always valid offsets
        #[test]
        fn prop_normalized_page_offset_non_negative(page in proptest::option::of(-100i64..100)) {
            let normalized = normalize_page(page);
            prop_assert!(normalized >= 1);
            prop_assert!(page_offset(normalized) >= 0);
        }
    }
}
