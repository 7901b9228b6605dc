//! Login and registration.
//!
//! Credentials are compared as plaintext and the token handed out on login
//! is the configured static string. Neither is meant to protect anything.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use sneako_core::{Credentials, NewUser, USERS, without_password};
use tracing::instrument;

use super::request::ApiRequest;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Field carrying the bearer token in a login response.
pub const TOKEN_FIELD: &str = "jwt";

/// Message for a login body that fails validation.
pub const LOGIN_BAD_REQUEST: &str =
    "Name must be longer than 3 characters and password longer than 6 characters";

const REGISTER_MISSING_FIELDS: &str = "All fields are required.";
const REGISTER_CONFLICT: &str = "User already exists.";

/// `POST auth/login`
///
/// Returns the first user whose name and password both match, without its
/// password and with the bearer token added.
///
/// # Errors
///
/// - `AppError::Validation` for a missing, non-string or too short name or
///   password
/// - `AppError::InvalidCredentials` if no user matches
#[instrument(skip_all)]
pub fn login(state: &AppState, request: &ApiRequest) -> Result<Response> {
    let body = request.json_body()?;
    let credentials = Credentials::from_body(&body).map_err(|e| {
        tracing::debug!(error = %e, "login rejected");
        AppError::Validation(LOGIN_BAD_REQUEST.to_string())
    })?;

    let user = state
        .store()
        .load(USERS)
        .into_iter()
        .find(|user| credentials.matches(user))
        .ok_or(AppError::InvalidCredentials)?;

    tracing::info!(name = credentials.name(), "user logged in");

    let mut response = without_password(user);
    response.insert(TOKEN_FIELD, state.config().auth_token.expose_secret());
    Ok(Json(response).into_response())
}

/// `POST auth/register`
///
/// Stores a new user and returns it, without its password, as 201.
///
/// # Errors
///
/// - `AppError::Validation` if name, phone, email, password or address is
///   missing
/// - `AppError::Conflict` if a user with the same email or name exists
/// - a store persistence error if the user cannot be written
#[instrument(skip_all)]
pub fn register(state: &AppState, request: &ApiRequest) -> Result<Response> {
    let body = request.json_body()?;
    let new_user = NewUser::from_body(&body)
        .map_err(|_| AppError::Validation(REGISTER_MISSING_FIELDS.to_string()))?;

    let user = state.store().append_with(USERS, |users| {
        if users.iter().any(|existing| new_user.conflicts_with(existing)) {
            return Err(AppError::Conflict(REGISTER_CONFLICT.to_string()));
        }
        Ok(new_user.into_record())
    })?;

    Ok((StatusCode::CREATED, Json(without_password(user))).into_response())
}
