//! Cart item records.

use super::record::{Record, RecordError};

/// Fields a new cart item must carry.
pub const CART_ITEM_FIELDS: [&str; 3] = ["productId", "size", "quantity"];

/// Validate a cart item body and prepare it for storage.
///
/// Caller-supplied fields pass through. Any `id` in the body is discarded,
/// because cart items always receive a freshly allocated id.
///
/// # Errors
///
/// Returns [`RecordError::MissingFields`] if productId, size or quantity is
/// absent.
pub fn new_cart_item(mut body: Record) -> Result<Record, RecordError> {
    let missing = body.missing_fields(&CART_ITEM_FIELDS);
    if !missing.is_empty() {
        return Err(RecordError::MissingFields(missing));
    }
    body.remove(super::record::ID_FIELD);
    Ok(body)
}
