//! Parsed API requests.

use std::borrow::Cow;

use axum::{
    body::Bytes,
    extract::Query,
    http::{Method, Uri},
};
use sneako_core::Record;

use crate::error::AppError;

/// A request under the API prefix, split into what the dispatcher matches on.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Percent-decoded path segments after the API prefix.
    pub segments: Vec<String>,
    /// Query parameters, in the order given.
    pub query: Vec<(String, String)>,
    body: Bytes,
}

impl ApiRequest {
    /// Parse a request.
    ///
    /// Returns `Ok(None)` if the path is not under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a path segment is not valid UTF-8
    /// once decoded, or the query string cannot be parsed.
    pub fn parse(
        prefix: &str,
        method: Method,
        uri: &Uri,
        body: Bytes,
    ) -> Result<Option<Self>, AppError> {
        let Some(rest) = strip_prefix(uri.path(), prefix) else {
            return Ok(None);
        };

        let segments = rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                urlencoding::decode(segment)
                    .map(Cow::into_owned)
                    .map_err(|_| AppError::Validation("Invalid path encoding".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let query = if uri.query().is_some() {
            Query::<Vec<(String, String)>>::try_from_uri(uri)
                .map_err(|_| AppError::Validation("Invalid query string".to_string()))?
                .0
        } else {
            Vec::new()
        };

        Ok(Some(Self {
            method,
            segments,
            query,
            body,
        }))
    }

    /// The path after the prefix, segments joined by `/`.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// First path segment, naming the resource.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Last path segment.
    #[must_use]
    pub fn trailing_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The body as a JSON object. An empty body is an empty object.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the body is not a JSON object.
    pub fn json_body(&self) -> Result<Record, AppError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Record::new());
        }
        let value: serde_json::Value = serde_json::from_slice(&self.body)
            .map_err(|_| AppError::Validation("Malformed JSON body".to_string()))?;
        Record::from_value(value).map_err(|e| AppError::Validation(format!("Request body: {e}")))
    }
}

/// The part of `path` after `prefix`, if `path` is under it.
fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(method: Method, uri: &str, body: &str) -> Option<ApiRequest> {
        let uri: Uri = uri.parse().unwrap();
        ApiRequest::parse("/api/v1", method, &uri, Bytes::from(body.to_owned())).unwrap()
    }

    #[test]
    fn test_parse_segments_and_query() {
        let req = parse(Method::GET, "/api/v1/orders?userId=42&_sort=date", "").unwrap();
        assert_eq!(req.segments, vec!["orders"]);
        assert_eq!(req.query_param("userId"), Some("42"));
        assert_eq!(req.query_param("_sort"), Some("date"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_parse_decodes_segments() {
        let req = parse(Method::PUT, "/api/v1/cart/a%20b/", "").unwrap();
        assert_eq!(req.segments, vec!["cart", "a b"]);
        assert_eq!(req.resource(), Some("cart"));
        assert_eq!(req.trailing_segment(), Some("a b"));
        assert_eq!(req.path(), "cart/a b");
    }

    #[test]
    fn test_parse_outside_prefix() {
        assert!(parse(Method::GET, "/health", "").is_none());
        assert!(parse(Method::GET, "/api/v10/users", "").is_none());
        assert!(parse(Method::GET, "/api/v1", "").is_some());
    }

    #[test]
    fn test_json_body() {
        let req = parse(Method::POST, "/api/v1/cart", r#"{"productId": "p1"}"#).unwrap();
        assert_eq!(req.json_body().unwrap().get("productId"), Some(&json!("p1")));

        let req = parse(Method::POST, "/api/v1/cart", "").unwrap();
        assert_eq!(req.json_body().unwrap(), Record::new());
    }

    #[test]
    fn test_json_body_rejects_non_objects() {
        let req = parse(Method::POST, "/api/v1/cart", "[1, 2]").unwrap();
        assert!(matches!(req.json_body(), Err(AppError::Validation(_))));

        let req = parse(Method::POST, "/api/v1/cart", "{oops").unwrap();
        assert!(matches!(
            req.json_body(),
            Err(AppError::Validation(msg)) if msg == "Malformed JSON body"
        ));
    }
}
