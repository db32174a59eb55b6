//! Pure aggregation over amounts fetched from the database.
//!
//! Amounts are summed in whole cents so totals do not pick up floating point
//! noise from long columns of figures.

use std::collections::BTreeMap;

use crate::money::{CENTS_PER_UNIT, to_cents};

/// Summed amounts keyed by category, in ascending order of category.
pub type Breakdown = BTreeMap<String, f64>;

/// Sums `amounts` exactly to the cent.
pub(super) fn sum_amounts(amounts: impl IntoIterator<Item = f64>) -> f64 {
    from_wide_cents(amounts.into_iter().map(|amount| i128::from(to_cents(amount))).sum())
}

/// Convert a cent total of any size back to an amount.
fn from_wide_cents(cents: i128) -> f64 {
    cents as f64 / CENTS_PER_UNIT
}

/// Groups `(category, amount)` pairs by category and sums each group.
///
/// # Returns
/// A map from category to total that iterates in ascending category order.
pub(super) fn group_by_category(entries: impl IntoIterator<Item = (String, f64)>) -> Breakdown {
    let mut cents_by_category: BTreeMap<String, i128> = BTreeMap::new();

    for (category, amount) in entries {
        *cents_by_category.entry(category).or_insert(0) += i128::from(to_cents(amount));
    }

    cents_by_category
        .into_iter()
        .map(|(category, cents)| (category, from_wide_cents(cents)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{group_by_category, sum_amounts};

    #[test]
    fn sum_amounts_is_exact_to_the_cent() {
        let amounts = std::iter::repeat_n(0.1, 10);

        assert_eq!(sum_amounts(amounts), 1.0);
    }

    #[test]
    fn sum_amounts_handles_empty_input() {
        assert_eq!(sum_amounts([]), 0.0);
    }

    #[test]
    fn sum_amounts_does_not_overflow_on_large_totals() {
        let amounts = std::iter::repeat_n(6e16, 4);

        assert_eq!(sum_amounts(amounts), 2.4e17);
    }

    #[test]
    fn group_by_category_does_not_overflow_on_large_totals() {
        let entries = vec![("Mortgage".to_owned(), 6e16), ("Mortgage".to_owned(), 6e16)];

        assert_eq!(group_by_category(entries)["Mortgage"], 1.2e17);
    }

    #[test]
    fn group_by_category_sums_each_category() {
        let entries = vec![
            ("Rent".to_owned(), 1000.0),
            ("Food".to_owned(), 45.5),
            ("Food".to_owned(), 54.5),
            ("Utilities".to_owned(), 80.0),
        ];

        let breakdown = group_by_category(entries);

        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown["Food"], 100.0);
        assert_eq!(breakdown["Rent"], 1000.0);
        assert_eq!(breakdown["Utilities"], 80.0);
    }

    #[test]
    fn group_by_category_sorts_by_label() {
        let entries = vec![
            ("Zebra".to_owned(), 1.0),
            ("Alpha".to_owned(), 2.0),
            ("Middle".to_owned(), 3.0),
        ];

        let categories: Vec<String> = group_by_category(entries).into_keys().collect();

        assert_eq!(categories, vec!["Alpha", "Middle", "Zebra"]);
    }
}
