//! Product records returned by the search endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One product offer from one retailer.
///
/// Deserialization is lenient about the field names different server
/// versions used (`title`/`name`, `price_display`/`display_price`,
/// `source_website`/`site`, `url`/`product_url`) and about prices and
/// ratings arriving as strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProduct")]
pub struct ProductResult {
    /// Product title.
    pub name: String,
    /// Numeric price, if the retailer listed one.
    pub price: Option<f64>,
    /// Price as shown to the user.
    pub display_price: String,
    /// Thumbnail URL.
    pub image_url: Option<String>,
    /// Fabric, if known.
    pub material: Option<String>,
    /// Rating as the retailer formats it, e.g. `"4.2|1,024 ratings"`.
    pub rating: Option<String>,
    /// Retailer name.
    pub source_site: String,
    /// Link to the product page.
    pub product_url: String,
}

impl ProductResult {
    /// Returns the numeric rating, if the raw rating starts with a number.
    ///
    /// # Example
    ///
    /// ```rust
    /// use clothing_comparator::search::parse_rating;
    ///
    /// assert_eq!(parse_rating("4.2|1,024 ratings"), Some(4.2));
    /// assert_eq!(parse_rating("N/A"), None);
    /// ```
    #[must_use]
    pub fn rating_value(&self) -> Option<f64> {
        self.rating.as_deref().and_then(parse_rating)
    }
}

/// Parses the leading number of a rating such as `"4.5 out of 5"` or `"3.9|120"`.
#[must_use]
pub fn parse_rating(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    raw[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the first amount in a retailer price string.
///
/// Currency prefixes are skipped, thousands separators dropped, and anything
/// after the first amount (such as a struck-through original price) ignored.
///
/// # Example
///
/// ```rust
/// use clothing_comparator::search::parse_price;
///
/// assert_eq!(parse_price("Rs. 1,299"), Some(1299.0));
/// assert_eq!(parse_price("₹1,299 ₹1,999"), Some(1299.0));
/// assert_eq!(parse_price("N/A"), None);
/// ```
#[must_use]
pub fn parse_price(raw: &str) -> Option<f64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    let mut number = String::new();
    let mut seen_dot = false;
    for c in raw[start..].chars() {
        match c {
            '0'..='9' => number.push(c),
            ',' if !seen_dot => {}
            '.' if !seen_dot => {
                seen_dot = true;
                number.push(c);
            }
            _ => break,
        }
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats a price the way the storefront shows it.
#[must_use]
pub fn format_price(price: f64) -> String {
    format!("₹{price}")
}

#[derive(Deserialize)]
struct RawProduct {
    #[serde(default, alias = "title")]
    name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Option<f64>,
    #[serde(default, alias = "price_display", alias = "displayPrice")]
    display_price: Option<String>,
    #[serde(default, alias = "imageUrl", alias = "image")]
    image_url: Option<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    rating: Option<String>,
    #[serde(default, alias = "source_website", alias = "sourceSite", alias = "site")]
    source_site: String,
    #[serde(default, alias = "productUrl", alias = "url")]
    product_url: String,
}

impl From<RawProduct> for ProductResult {
    fn from(raw: RawProduct) -> Self {
        let display_price = raw
            .display_price
            .filter(|s| !s.trim().is_empty())
            .or_else(|| raw.price.map(format_price))
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            name: raw.name,
            price: raw.price,
            display_price,
            image_url: raw.image_url.filter(|s| !s.is_empty()),
            material: raw.material.filter(|s| !s.is_empty() && s != "N/A"),
            rating: raw.rating.filter(|s| !s.is_empty() && s != "N/A"),
            source_site: raw.source_site,
            product_url: raw.product_url,
        }
    }
}

/// Accepts a number, a formatted string such as `"₹1,299"`, or null.
fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(&s),
        _ => None,
    })
}

/// Accepts a string or a number and keeps its text form.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The body of a successful search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Products in the order the server returned them.
    #[serde(default)]
    pub results: Vec<ProductResult>,
    /// Server-side search time in seconds.
    #[serde(default, alias = "executionTime")]
    pub execution_time: Option<f64>,
    /// Per-retailer problems that did not fail the whole search.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
    /// Result count reported by the server.
    #[serde(default, alias = "totalResults")]
    pub total_results: Option<u64>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scraper_shape() {
        let product: ProductResult = serde_json::from_value(json!({
            "name": "Cotton Kurta",
            "price": 799,
            "price_display": "₹799",
            "image_url": "https://img.example.com/1.jpg",
            "material": "Cotton",
            "rating": "4.1|230 ratings",
            "site": "Meesho",
            "url": "https://meesho.com/p/1"
        }))
        .unwrap();

        assert_eq!(product.name, "Cotton Kurta");
        assert_eq!(product.price, Some(799.0));
        assert_eq!(product.display_price, "₹799");
        assert_eq!(product.source_site, "Meesho");
        assert_eq!(product.product_url, "https://meesho.com/p/1");
        assert_eq!(product.rating_value(), Some(4.1));
    }

    #[test]
    fn test_stored_item_shape() {
        let product: ProductResult = serde_json::from_value(json!({
            "id": 12,
            "title": "Linen Shirt",
            "price": "₹1,299",
            "image_url": "",
            "product_url": "https://fabindia.com/p/2",
            "source_website": "FabIndia",
            "scraped_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(product.name, "Linen Shirt");
        assert_eq!(product.price, Some(1299.0));
        assert_eq!(product.display_price, "₹1299");
        assert_eq!(product.image_url, None);
        assert_eq!(product.rating, None);
    }

    #[test]
    fn test_missing_price_and_na_rating() {
        let product: ProductResult = serde_json::from_value(json!({
            "name": "Scarf",
            "price": null,
            "rating": "N/A",
            "material": "N/A"
        }))
        .unwrap();

        assert_eq!(product.price, None);
        assert_eq!(product.display_price, "N/A");
        assert_eq!(product.rating, None);
        assert_eq!(product.material, None);
    }

    #[test]
    fn test_numeric_rating_is_kept_as_text() {
        let product: ProductResult =
            serde_json::from_value(json!({"name": "Tee", "rating": 4.5})).unwrap();
        assert_eq!(product.rating.as_deref(), Some("4.5"));
        assert_eq!(product.rating_value(), Some(4.5));
    }

    #[test]
    fn test_price_strings_take_the_first_amount() {
        for (raw, expected) in [
            ("Rs. 1,299", Some(1299.0)),
            ("₹1,299 ₹1,999", Some(1299.0)),
            ("MRP ₹2,499.00", Some(2499.0)),
            ("₹799.50 (20% off)", Some(799.5)),
            ("1,00,000", Some(100_000.0)),
            ("N/A", None),
            ("", None),
        ] {
            let product: ProductResult =
                serde_json::from_value(json!({"name": "Tee", "price": raw})).unwrap();
            assert_eq!(product.price, expected, "price {raw:?}");
        }
    }

    #[test]
    fn test_sale_price_string_sorts_by_first_amount() {
        let mut results: Vec<ProductResult> = serde_json::from_value(json!([
            {"name": "sale", "price": "₹1,299 ₹1,999"},
            {"name": "plain", "price": "Rs. 1,500"}
        ]))
        .unwrap();
        crate::search::sort_results(&mut results, crate::search::SortOrder::PriceAscending);
        assert_eq!(results[0].name, "sale");
        assert_eq!(results[0].display_price, "₹1299");
    }

    #[test]
    fn test_parse_rating_variants() {
        assert_eq!(parse_rating("4.5 out of 5"), Some(4.5));
        assert_eq!(parse_rating(" 3 "), Some(3.0));
        assert_eq!(parse_rating("★4.2"), None);
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("."), None);
    }

    #[test]
    fn test_search_response_tolerates_null_errors() {
        let response: SearchResponse = serde_json::from_value(json!({
            "query": "shirt",
            "total_results": 1,
            "results": [{"name": "Shirt", "price": 500}],
            "execution_time": 2.31,
            "errors": null
        }))
        .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.total_results, Some(1));
        assert_eq!(response.execution_time, Some(2.31));
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_search_response_keeps_partial_errors() {
        let response: SearchResponse = serde_json::from_value(json!({
            "results": [],
            "executionTime": 60.0,
            "errors": ["Timeout while scraping nykaa"]
        }))
        .unwrap();
        assert_eq!(response.errors, vec!["Timeout while scraping nykaa"]);
    }
}
