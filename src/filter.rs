use crate::query_parser::PriceConstraint;
use crate::storage::Listing;

/// Reduce `products` to the ones satisfying `constraint`, keeping their relative order.
///
/// Products whose price isn't numeric never satisfy a bound and are left out
/// of the cheapest/most-expensive extremum.
pub fn apply_constraint<T: Listing + Clone>(constraint: PriceConstraint, products: &[T]) -> Vec<T> {
    match constraint {
        PriceConstraint::None => products.to_vec(),
        PriceConstraint::Under(max) => retain_by_price(products, |price| price <= max as f64),
        PriceConstraint::Over(min) => retain_by_price(products, |price| price >= min as f64),
        PriceConstraint::Between(low, high) => retain_by_price(products, |price| {
            low as f64 <= price && price <= high as f64
        }),
        PriceConstraint::Cheapest => retain_extreme(products, f64::min),
        PriceConstraint::MostExpensive => retain_extreme(products, f64::max),
    }
}

fn retain_by_price<T, F>(products: &[T], keep: F) -> Vec<T>
where
    T: Listing + Clone,
    F: Fn(f64) -> bool,
{
    products
        .iter()
        .filter(|p| p.price_value().is_some_and(&keep))
        .cloned()
        .collect()
}

/// All products tied at the extremum picked by `pick`.
fn retain_extreme<T: Listing + Clone>(products: &[T], pick: fn(f64, f64) -> f64) -> Vec<T> {
    let Some(extreme) = products
        .iter()
        .filter_map(|p| p.price_value())
        .reduce(pick)
    else {
        return Vec::new();
    };

    retain_by_price(products, |price| price == extreme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Price, Product};
    use serde_json::json;

    fn product(id: i64, price: &str) -> Product {
        Product {
            id: Some(id),
            name: format!("product-{}", id),
            price: Price::new(price),
            description: String::new(),
            image_url: String::new(),
        }
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().filter_map(|p| p.id).collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "139999"),
            product(2, "99999"),
            product(3, "100000"),
            product(4, "15000.50"),
            product(5, "n/a"),
            product(6, "100000.01"),
        ]
    }

    #[test]
    fn test_none_passes_everything_through() {
        let products = catalog();
        assert_eq!(apply_constraint(PriceConstraint::None, &products), products);
    }

    #[test]
    fn test_under_is_inclusive_and_complete() {
        let products = catalog();
        let filtered = apply_constraint(PriceConstraint::Under(100000), &products);
        assert_eq!(ids(&filtered), vec![2, 3, 4]);

        for p in &products {
            let qualifies = p.price.value().is_some_and(|v| v <= 100000.0);
            assert_eq!(qualifies, filtered.contains(p));
        }
    }

    #[test]
    fn test_over_is_inclusive() {
        let filtered = apply_constraint(PriceConstraint::Over(100000), &catalog());
        assert_eq!(ids(&filtered), vec![1, 3, 6]);
    }

    #[test]
    fn test_between_is_exact_inclusive_range() {
        let filtered = apply_constraint(PriceConstraint::Between(15000, 100000), &catalog());
        assert_eq!(ids(&filtered), vec![2, 3, 4]);

        let filtered = apply_constraint(PriceConstraint::Between(15001, 100001), &catalog());
        assert_eq!(ids(&filtered), vec![2, 3, 6]);
    }

    #[test]
    fn test_inverted_between_matches_nothing() {
        assert!(apply_constraint(PriceConstraint::Between(500, 100), &catalog()).is_empty());
    }

    #[test]
    fn test_cheapest_keeps_ties() {
        let products = vec![product(1, "10"), product(2, "5"), product(3, "5")];
        let filtered = apply_constraint(PriceConstraint::Cheapest, &products);
        assert_eq!(ids(&filtered), vec![2, 3]);
    }

    #[test]
    fn test_most_expensive_keeps_ties_and_ignores_non_numeric() {
        let products = vec![
            product(1, "n/a"),
            product(2, "250"),
            product(3, "250.00"),
            product(4, "20"),
        ];
        let filtered = apply_constraint(PriceConstraint::MostExpensive, &products);
        assert_eq!(ids(&filtered), vec![2, 3]);
    }

    #[test]
    fn test_empty_input_for_every_constraint() {
        for constraint in [
            PriceConstraint::None,
            PriceConstraint::Under(10),
            PriceConstraint::Over(10),
            PriceConstraint::Between(1, 10),
            PriceConstraint::Cheapest,
            PriceConstraint::MostExpensive,
        ] {
            assert!(apply_constraint::<Product>(constraint, &[]).is_empty());
        }
    }

    #[test]
    fn test_extreme_with_no_numeric_prices() {
        let products = vec![product(1, "call us"), product(2, "")];
        assert!(apply_constraint(PriceConstraint::Cheapest, &products).is_empty());
    }

    #[test]
    fn test_json_products_filter_on_numeric_and_text_prices() {
        let products = vec![
            json!({"name": "a", "price": 64999}),
            json!({"name": "b", "price": "Rs. 59,999"}),
            json!({"name": "c"}),
            json!({"name": "d", "price": 79999.0}),
        ];
        let filtered = apply_constraint(PriceConstraint::Under(65000), &products);
        assert_eq!(filtered, vec![products[0].clone(), products[1].clone()]);

        let filtered = apply_constraint(PriceConstraint::MostExpensive, &products);
        assert_eq!(filtered, vec![products[3].clone()]);
    }
}
