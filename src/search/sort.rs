//! Client-side ordering of already-fetched results.
//!
//! Results keep the server's order unless the view asks for one of these.
//! Sorting is stable, so ties keep the server's relative order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::search::ProductResult;

/// An ordering the view can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Cheapest first; products without a price last.
    PriceAscending,
    /// Most expensive first; products without a price last.
    PriceDescending,
    /// Best rated first; missing or unparsable ratings count as 0.
    RatingDescending,
}

impl SortOrder {
    /// The identifier used by the view's sort menu.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAscending => "price-asc",
            Self::PriceDescending => "price-desc",
            Self::RatingDescending => "rating-desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price-asc" => Ok(Self::PriceAscending),
            "price-desc" => Ok(Self::PriceDescending),
            "rating-desc" => Ok(Self::RatingDescending),
            other => Err(ValidationError::field(
                "sort",
                format!("Unknown sort order '{other}'"),
            )),
        }
    }
}

/// Sorts `results` in place.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::search::{sort_results, ProductResult, SortOrder};
///
/// let mut results: Vec<ProductResult> = serde_json::from_value(serde_json::json!([
///     {"name": "a", "price": 1200},
///     {"name": "b", "price": null},
///     {"name": "c", "price": 500},
/// ])).unwrap();
///
/// sort_results(&mut results, SortOrder::PriceAscending);
/// let prices: Vec<_> = results.iter().map(|p| p.price).collect();
/// assert_eq!(prices, vec![Some(500.0), Some(1200.0), None]);
/// ```
pub fn sort_results(results: &mut [ProductResult], order: SortOrder) {
    match order {
        SortOrder::PriceAscending => {
            results.sort_by(|a, b| missing_last(a.price, b.price, |x, y| x.total_cmp(&y)));
        }
        SortOrder::PriceDescending => {
            results.sort_by(|a, b| missing_last(a.price, b.price, |x, y| y.total_cmp(&x)));
        }
        SortOrder::RatingDescending => {
            results.sort_by(|a, b| {
                let ra = a.rating_value().unwrap_or(0.0);
                let rb = b.rating_value().unwrap_or(0.0);
                rb.total_cmp(&ra)
            });
        }
    }
}

fn missing_last(
    a: Option<f64>,
    b: Option<f64>,
    cmp: impl Fn(f64, f64) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
