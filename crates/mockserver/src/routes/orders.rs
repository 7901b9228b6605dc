//! Order listing.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use sneako_core::{ORDERS, Record};
use tracing::instrument;

use super::request::ApiRequest;
use crate::state::AppState;

/// `GET orders[?userId=]`
///
/// With a non-empty `userId`, only orders whose `userId` renders to exactly
/// that string are returned. Numeric and string user ids compare equal when
/// their text matches.
#[instrument(skip_all)]
pub fn list(state: &AppState, request: &ApiRequest) -> Response {
    let orders = state.store().load(ORDERS);
    let user_id = request.query_param("userId").filter(|id| !id.is_empty());
    Json(filter_by_user(orders, user_id)).into_response()
}

fn filter_by_user(orders: Vec<Record>, user_id: Option<&str>) -> Vec<Record> {
    match user_id {
        Some(user_id) => orders
            .into_iter()
            .filter(|order| order.field_equals("userId", user_id))
            .collect(),
        None => orders,
    }
}
