//! Generic create, replace and delete for any known resource.

use axum::{
    Json,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use sneako_core::RecordId;

use super::request::ApiRequest;
use crate::error::Result;
use crate::state::AppState;

/// A mutation the generic override performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `POST {resource}`
    Create { resource: String },
    /// `PUT {resource}/{id}`
    Update { resource: String, id: String },
    /// `DELETE {resource}/{id}`
    Delete { resource: String, id: String },
}

impl Operation {
    /// The operation a request asks for, if the generic override takes it.
    ///
    /// Only mutations on known resources qualify. Reads and deeper paths
    /// are left to the default router.
    pub fn for_request<F>(method: &Method, segments: &[String], is_resource: F) -> Option<Self>
    where
        F: Fn(&str) -> bool,
    {
        let resource = segments
            .first()
            .filter(|name| is_resource(name.as_str()))?
            .clone();

        match (method, segments) {
            (m, [_]) if *m == Method::POST => Some(Self::Create { resource }),
            (m, [_, id]) if *m == Method::PUT => Some(Self::Update {
                resource,
                id: id.clone(),
            }),
            (m, [_, id]) if *m == Method::DELETE => Some(Self::Delete {
                resource,
                id: id.clone(),
            }),
            _ => None,
        }
    }
}

/// Apply a generic operation.
///
/// # Errors
///
/// - `AppError::Validation` if the body is not a JSON object
/// - a store `NotFound` (404, "{resource} not found") for a missing id
/// - a store `DuplicateId` (409) if a POST body carries a taken id
/// - a store persistence error (500) if the file cannot be written
pub fn apply(state: &AppState, operation: &Operation, request: &ApiRequest) -> Result<Response> {
    let store = state.store();

    match operation {
        Operation::Create { resource } => {
            let record = store.append(resource, request.json_body()?)?;
            Ok(Json(record).into_response())
        }
        Operation::Update { resource, id } => {
            let body = request.json_body()?;
            let record = store.replace_by_id(resource, &RecordId::new(id.as_str()), body)?;
            Ok(Json(record).into_response())
        }
        Operation::Delete { resource, id } => {
            store.remove_by_id(resource, &RecordId::new(id.as_str()))?;
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}
