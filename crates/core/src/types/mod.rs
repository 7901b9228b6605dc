//! Core types for Sneako.
//!
//! This module provides the record model shared by the mock server and the
//! CLI: ids, resource names, records, and the per-collection record rules.

pub mod cart;
pub mod id;
pub mod record;
pub mod resource;
pub mod user;

pub use cart::new_cart_item;
pub use id::RecordId;
pub use record::{ID_FIELD, Record, RecordError, display_value, is_truthy};
pub use resource::{CART, DOMAIN_RESOURCES, ORDERS, PRODUCTS, ResourceName, ResourceNameError, USERS};
pub use user::{Credentials, NewUser, without_password};
