//! User listing and replacement.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use sneako_core::{RecordId, USERS};
use tracing::instrument;

use super::request::ApiRequest;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// `GET users`
///
/// Every user, in stored order. Query parameters are ignored.
#[instrument(skip_all)]
pub fn list(state: &AppState) -> Response {
    Json(state.store().load(USERS)).into_response()
}

/// `PUT users/{id}`
///
/// # Errors
///
/// - `AppError::NotFound` if no user has this id
/// - a store persistence error if the user cannot be written
#[instrument(skip(state, request))]
pub fn update(state: &AppState, id: &str, request: &ApiRequest) -> Result<Response> {
    let body = request.json_body()?;
    let stored = state
        .store()
        .replace_by_id(USERS, &RecordId::new(id), body)
        .map_err(|e| AppError::not_found_as(e, "User not found."))?;
    Ok(Json(stored).into_response())
}
