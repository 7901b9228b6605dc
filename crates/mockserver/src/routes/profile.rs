//! Profile lookup.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use sneako_core::USERS;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Profile response body.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: &'static str,
    pub profile: Profile,
}

/// The public part of a user record.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub name: Value,
    pub id: Value,
}

/// `GET profile`
///
/// The profile is the first user in the collection. It is not tied to the
/// token the caller holds.
///
/// # Errors
///
/// Returns `AppError::NotFound` if there are no users.
#[instrument(skip_all)]
pub fn show(state: &AppState) -> Result<Response> {
    let user = state
        .store()
        .load(USERS)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let field = |key: &str| user.get(key).cloned().unwrap_or(Value::Null);
    let body = ProfileResponse {
        success: true,
        message: "User profile retrieved successfully",
        profile: Profile {
            name: field("name"),
            id: field("id"),
        },
    };
    Ok(Json(body).into_response())
}
