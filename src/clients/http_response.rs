//! HTTP response types for the clothing comparator SDK.

use serde::de::DeserializeOwned;

/// An HTTP response from the API.
///
/// The body is `Value::Null` when the server sent nothing or something that
/// was not JSON.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The parsed response body.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(code: u16, body: serde_json::Value) -> Self {
        Self { code, body }
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body does not match `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_is_ok_for_2xx_only() {
        assert!(HttpResponse::new(200, json!({})).is_ok());
        assert!(HttpResponse::new(201, json!({})).is_ok());
        assert!(!HttpResponse::new(301, json!({})).is_ok());
        assert!(!HttpResponse::new(401, json!({})).is_ok());
    }

    #[test]
    fn test_parse_body() {
        #[derive(Deserialize)]
        struct Access {
            access: String,
        }

        let response = HttpResponse::new(200, json!({"access": "abc"}));
        let parsed: Access = response.parse().unwrap();
        assert_eq!(parsed.access, "abc");

        assert!(response.parse::<Vec<String>>().is_err());
    }
}
