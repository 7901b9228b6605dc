//! Cart items.
//!
//! `GET` and `POST` on the collection and `PUT` on a single item are
//! handled here. `DELETE cart/{id}` goes through the generic override, and
//! every other method on the collection is refused.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use sneako_core::{CART, RecordId, new_cart_item};
use tracing::instrument;

use super::request::ApiRequest;
use crate::error::{AppError, Result};
use crate::state::AppState;

const MISSING_FIELDS: &str = "Missing required cart item fields.";
const ITEM_NOT_FOUND: &str = "Cart item not found.";

/// `GET cart`
#[instrument(skip_all)]
pub fn list(state: &AppState) -> Response {
    Json(state.store().load(CART)).into_response()
}

/// `POST cart`
///
/// The stored item always gets a freshly allocated id.
///
/// # Errors
///
/// - `AppError::Validation` if productId, size or quantity is missing
/// - a store persistence error if the item cannot be written
#[instrument(skip_all)]
pub fn add(state: &AppState, request: &ApiRequest) -> Result<Response> {
    let item = new_cart_item(request.json_body()?)
        .map_err(|_| AppError::Validation(MISSING_FIELDS.to_string()))?;
    let stored = state.store().append(CART, item)?;
    Ok(Json(stored).into_response())
}

/// `PUT cart/{id}`
///
/// # Errors
///
/// - `AppError::NotFound` if no item has this id
/// - a store persistence error if the item cannot be written
#[instrument(skip(state, request))]
pub fn update(state: &AppState, id: &str, request: &ApiRequest) -> Result<Response> {
    let body = request.json_body()?;
    let stored = state
        .store()
        .replace_by_id(CART, &RecordId::new(id), body)
        .map_err(|e| AppError::not_found_as(e, ITEM_NOT_FOUND))?;
    Ok(Json(stored).into_response())
}
