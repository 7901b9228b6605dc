//! Resource (collection) names.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The users collection.
pub const USERS: &str = "users";
/// The cart collection.
pub const CART: &str = "cart";
/// The orders collection.
pub const ORDERS: &str = "orders";
/// The products collection.
pub const PRODUCTS: &str = "products";

/// Collections every deployment has, created empty when their file is missing.
pub const DOMAIN_RESOURCES: [&str; 4] = [USERS, CART, ORDERS, PRODUCTS];

/// Errors that can occur when parsing a [`ResourceName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceNameError {
    /// The input string is empty.
    #[error("resource name cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("resource name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that is not allowed in a file stem.
    #[error("resource name contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Name of a resource collection.
///
/// A resource name doubles as the stem of its backing file, so it is limited
/// to ASCII letters, digits, `-` and `_`, and may not start with `_` (those
/// keys are reserved for file metadata).
///
/// ```
/// use sneako_core::ResourceName;
///
/// assert!(ResourceName::parse("products").is_ok());
/// assert!(ResourceName::parse("order-items").is_ok());
/// assert!(ResourceName::parse("").is_err());
/// assert!(ResourceName::parse("../etc").is_err());
/// assert!(ResourceName::parse("_meta").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Maximum length of a resource name.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `ResourceName` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters,
    /// starts with `_`, or contains anything other than ASCII alphanumerics,
    /// `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, ResourceNameError> {
        if s.is_empty() {
            return Err(ResourceNameError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ResourceNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.starts_with('_') {
            return Err(ResourceNameError::InvalidCharacter('_'));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ResourceNameError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the backing file (`<name>.json`).
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ResourceName {
    type Err = ResourceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::borrow::Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}
