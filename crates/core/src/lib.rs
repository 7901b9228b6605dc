//! Sneako Core - Shared types library.
//!
//! This crate provides the types used across the Sneako backend components:
//! - `mockserver` - Development backend serving the storefront's JSON API
//! - `cli` - Command-line tools for seeding and checking data directories
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP, no
//! file access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Record ids, resource names, records, and user/cart rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
