//! Search queries and the optional filters that narrow them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest rating a product can carry.
pub const MAX_RATING: f64 = 5.0;

macro_rules! filter_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl $name {
            /// All values, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The value sent to the server.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        ValidationError::field(
                            stringify!($name).to_lowercase(),
                            format!("Unknown {} '{s}'", stringify!($name).to_lowercase()),
                        )
                    })
            }
        }
    };
}

filter_enum! {
    /// A retailer the server can search.
    Site { Meesho => "meesho", Nykaa => "nykaa", FabIndia => "fabindia" }
}

filter_enum! {
    /// Garment size.
    Size { S => "S", M => "M", L => "L", Xl => "XL" }
}

filter_enum! {
    /// Garment colour.
    Color { Black => "black", White => "white", Blue => "blue", Red => "red", Green => "green" }
}

filter_enum! {
    /// Intended wearer.
    Gender { Men => "men", Women => "women", Unisex => "unisex" }
}

/// Optional constraints narrowing a search.
///
/// Unset filters are omitted from the request entirely so the server applies
/// its own defaults. A `min_price` or `min_rating` of zero counts as unset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Retailers to search; empty means all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<Site>,
    /// Lowest acceptable price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    /// Highest acceptable price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// Lowest acceptable rating, 0 to 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Garment size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Garment colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Intended wearer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Free-text fabric, e.g. "cotton".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    /// Seconds the server may spend scraping; the server default applies
    /// when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
}

impl SearchFilters {
    /// Checks ranges: prices finite and non-negative with min ≤ max, rating in `[0, 5]`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the offending filter.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ValidationError::field(
                        field,
                        "Price must be a non-negative number",
                    ));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(ValidationError::field(
                    "min_price",
                    "Minimum price cannot exceed maximum price",
                ));
            }
        }

        if let Some(rating) = self.min_rating {
            if !(0.0..=MAX_RATING).contains(&rating) {
                return Err(ValidationError::field(
                    "min_rating",
                    "Rating must be between 0 and 5",
                ));
            }
        }

        if self.timeout == Some(0) {
            return Err(ValidationError::field(
                "timeout",
                "Timeout must be at least one second",
            ));
        }

        Ok(())
    }

    /// Returns the query parameters for the filters that differ from the
    /// server defaults.
    #[must_use]
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !self.sites.is_empty() {
            let sites: Vec<&str> = self.sites.iter().map(Site::as_str).collect();
            params.push(("sites".to_string(), sites.join(",")));
        }
        if let Some(min) = self.min_price.filter(|v| *v > 0.0) {
            params.push(("min_price".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("max_price".to_string(), max.to_string()));
        }
        if let Some(rating) = self.min_rating.filter(|v| *v > 0.0) {
            params.push(("min_rating".to_string(), rating.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size".to_string(), size.to_string()));
        }
        if let Some(color) = self.color {
            params.push(("color".to_string(), color.to_string()));
        }
        if let Some(gender) = self.gender {
            params.push(("gender".to_string(), gender.to_string()));
        }
        if let Some(material) = self.material.as_deref().map(str::trim) {
            if !material.is_empty() {
                params.push(("material".to_string(), material.to_string()));
            }
        }
        if let Some(timeout) = self.timeout {
            params.push(("timeout".to_string(), timeout.to_string()));
        }

        params
    }
}

/// Free text plus filters, built per submission.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::search::{SearchFilters, SearchQuery, Size};
///
/// let query = SearchQuery::new(
///     "black shirt",
///     SearchFilters { size: Some(Size::M), ..SearchFilters::default() },
/// );
/// assert!(query.validate().is_ok());
///
/// let params = query.to_query_params();
/// assert_eq!(params[0], ("query".to_string(), "black shirt".to_string()));
/// assert_eq!(params[1], ("size".to_string(), "M".to_string()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// What the user typed.
    pub text: String,
    /// Optional constraints.
    #[serde(default)]
    pub filters: SearchFilters,
}

impl SearchQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(text: impl Into<String>, filters: SearchFilters) -> Self {
        Self {
            text: text.into(),
            filters,
        }
    }

    /// Creates a query without filters.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, SearchFilters::default())
    }

    /// Checks that the text is not blank and the filters are in range.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::field("query", "Please enter a search query"));
        }
        self.filters.validate()
    }

    /// Returns `query` followed by the non-default filter parameters.
    #[must_use]
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("query".to_string(), self.text.trim().to_string())];
        params.extend(self.filters.to_query_params());
        params
    }
}
