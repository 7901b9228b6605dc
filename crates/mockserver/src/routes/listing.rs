//! Default router: read-only listing, filtering and lookup.
//!
//! Answers every request the custom table and the generic override leave
//! alone. Query parameters:
//!
//! - `field=value` - keep records whose `field` equals `value` (repeat the
//!   parameter to accept any of several values)
//! - `_sort=field`, `_order=asc|desc` - stable sort
//! - `_start`, `_end`, `_limit` - slice the (filtered, sorted) result

use std::cmp::Ordering;
use std::collections::BTreeMap;

use axum::{
    Json,
    http::Method,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use sneako_core::{Record, RecordId, display_value};

use super::request::ApiRequest;
use crate::error::{AppError, Result};
use crate::store::ResourceStore;

/// Handles requests no earlier stage claims.
pub trait DefaultRouter: Send + Sync {
    /// Answer a request.
    ///
    /// # Errors
    ///
    /// Returns `AppError` to be rendered as the response.
    fn handle(&self, store: &ResourceStore, request: &ApiRequest) -> Result<Response>;
}

/// Built-in listing router.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingRouter;

impl DefaultRouter for ListingRouter {
    fn handle(&self, store: &ResourceStore, request: &ApiRequest) -> Result<Response> {
        let resource = match request.segments.as_slice() {
            [resource] | [resource, _] if store.contains(resource) => resource.as_str(),
            _ => return Err(AppError::NotFound("Not found".to_string())),
        };

        if request.method != Method::GET {
            return Err(AppError::MethodNotAllowed);
        }

        if let [_, id] = request.segments.as_slice() {
            let id = RecordId::new(id.clone());
            return store
                .find_by_id(resource, &id)
                .map(|record| Json(record).into_response())
                .ok_or_else(|| AppError::NotFound(format!("{resource} not found")));
        }

        let query = ListQuery::from_params(&request.query)?;
        Ok(Json(query.apply(store.load(resource))).into_response())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Asc,
    Desc,
}

/// Listing options taken from the query string.
#[derive(Debug, Default)]
struct ListQuery<'a> {
    filters: BTreeMap<&'a str, Vec<&'a str>>,
    sort: Option<(&'a str, SortOrder)>,
    start: Option<usize>,
    end: Option<usize>,
    limit: Option<usize>,
}

impl<'a> ListQuery<'a> {
    fn from_params(params: &'a [(String, String)]) -> Result<Self> {
        let mut query = Self::default();
        let mut sort_field = None;
        let mut order = SortOrder::Asc;

        for (key, value) in params {
            match key.as_str() {
                "_sort" => sort_field = Some(value.as_str()),
                "_order" => order = parse_order(value)?,
                "_start" => query.start = Some(parse_index(key, value)?),
                "_end" => query.end = Some(parse_index(key, value)?),
                "_limit" => query.limit = Some(parse_index(key, value)?),
                // Unknown control parameters are ignored.
                k if k.starts_with('_') => {}
                k => query.filters.entry(k).or_default().push(value.as_str()),
            }
        }

        query.sort = sort_field.map(|field| (field, order));
        Ok(query)
    }

    fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|(field, accepted)| {
            accepted
                .iter()
                .any(|expected| record.field_equals(field, expected))
        })
    }

    fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        let mut records: Vec<Record> = records.into_iter().filter(|r| self.matches(r)).collect();

        if let Some((field, order)) = self.sort {
            records.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let start = self.start.unwrap_or(0).min(records.len());
        let end = match (self.end, self.limit) {
            (Some(end), _) => end,
            (None, Some(limit)) => start.saturating_add(limit),
            (None, None) => records.len(),
        }
        .clamp(start, records.len());

        records.truncate(end);
        records.drain(..start);
        records
    }
}

fn parse_order(value: &str) -> Result<SortOrder> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        _ => Err(AppError::Validation(format!(
            "_order must be asc or desc, got '{value}'"
        ))),
    }
}

fn parse_index(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| AppError::Validation(format!("{key} must be a non-negative integer")))
}

/// Order two field values: missing first, then numbers, then everything
/// else by its string form.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Some(Value::Number(_)), Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Number(_))) => Ordering::Greater,
        (Some(x), Some(y)) => display_value(x).cmp(&display_value(y)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(values: &[Value]) -> Vec<Record> {
        values
            .iter()
            .map(|v| Record::from_value(v.clone()).unwrap())
            .collect()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().filter_map(|r| r.get_str("id")).collect()
    }

    fn products() -> Vec<Record> {
        records(&[
            json!({"id": "1", "category": "running", "price": 120}),
            json!({"id": "2", "category": "casual", "price": 80}),
            json!({"id": "3", "category": "running", "price": 95}),
            json!({"id": "4", "category": "boots"}),
        ])
    }

    #[test]
    fn test_filter_exact_match() {
        let running = params(&[("category", "running")]);
        let query = ListQuery::from_params(&running).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["1", "3"]);
    }

    #[test]
    fn test_filter_repeated_key_accepts_any() {
        let either = params(&[("category", "casual"), ("category", "boots")]);
        let query = ListQuery::from_params(&either).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["2", "4"]);
    }

    #[test]
    fn test_filter_numeric_field() {
        let price = params(&[("price", "80")]);
        let query = ListQuery::from_params(&price).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["2"]);
    }

    #[test]
    fn test_sort_numeric_missing_first() {
        let asc = params(&[("_sort", "price")]);
        let query = ListQuery::from_params(&asc).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["4", "2", "3", "1"]);

        let desc = params(&[("_sort", "price"), ("_order", "DESC")]);
        let query = ListQuery::from_params(&desc).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["1", "3", "2", "4"]);
    }

    #[test]
    fn test_slice() {
        let limited = params(&[("_start", "1"), ("_limit", "2")]);
        let query = ListQuery::from_params(&limited).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["2", "3"]);

        let ranged = params(&[("_start", "2"), ("_end", "10")]);
        let query = ListQuery::from_params(&ranged).unwrap();
        assert_eq!(ids(&query.apply(products())), vec!["3", "4"]);

        let past_end = params(&[("_start", "9")]);
        let query = ListQuery::from_params(&past_end).unwrap();
        assert!(query.apply(products()).is_empty());
    }

    #[test]
    fn test_invalid_control_params() {
        let bad = params(&[("_limit", "-1")]);
        assert!(matches!(
            ListQuery::from_params(&bad),
            Err(AppError::Validation(_))
        ));
        let bad = params(&[("_order", "sideways")]);
        assert!(ListQuery::from_params(&bad).is_err());
    }

    #[test]
    fn test_unknown_control_params_ignored() {
        let embed = params(&[("_embed", "reviews")]);
        let query = ListQuery::from_params(&embed).unwrap();
        assert_eq!(query.apply(products()).len(), 4);
    }
}
