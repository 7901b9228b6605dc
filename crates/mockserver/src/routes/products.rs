//! Product replacement.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use sneako_core::{PRODUCTS, RecordId};
use tracing::instrument;

use super::request::ApiRequest;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `PUT products/{id}`
///
/// # Errors
///
/// - `AppError::NotFound` if no product has this id; the collection is left
///   unchanged
/// - a store persistence error if the product cannot be written
#[instrument(skip(state, request))]
pub fn update(state: &AppState, id: &str, request: &ApiRequest) -> Result<Response> {
    let body = request.json_body()?;
    let stored = state
        .store()
        .replace_by_id(PRODUCTS, &RecordId::new(id), body)
        .map_err(|e| AppError::not_found_as(e, "Product not found."))?;
    Ok(Json(stored).into_response())
}
