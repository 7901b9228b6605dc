//! User records: login credentials and registration.
//!
//! Passwords are stored and compared as plaintext. This backend exists to
//! drive the storefront during development and makes no security claims.

use serde_json::Value;

use super::record::{Record, RecordError};

/// Role assigned when a registration does not name one.
pub const DEFAULT_ROLE: &str = "customer";

/// Login names must be longer than this many characters.
pub const MIN_NAME_LENGTH: usize = 3;

/// Login passwords must be longer than this many characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Fields a registration must carry.
pub const REGISTRATION_FIELDS: [&str; 5] = ["name", "phone", "email", "password", "address"];

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    name: String,
    password: String,
}

impl Credentials {
    /// Extract credentials from a login body.
    ///
    /// # Errors
    ///
    /// - [`RecordError::MissingFields`] if `name` or `password` is absent
    /// - [`RecordError::NotAString`] if either is not a string
    /// - [`RecordError::TooShort`] if `name` has 3 characters or fewer, or
    ///   `password` has 6 or fewer
    pub fn from_body(body: &Record) -> Result<Self, RecordError> {
        let missing = body.missing_fields(&["name", "password"]);
        if !missing.is_empty() {
            return Err(RecordError::MissingFields(missing));
        }

        let name = body.get_str("name").ok_or(RecordError::NotAString("name"))?;
        let password = body
            .get_str("password")
            .ok_or(RecordError::NotAString("password"))?;

        if name.chars().count() <= MIN_NAME_LENGTH {
            return Err(RecordError::TooShort {
                field: "name",
                min: MIN_NAME_LENGTH,
            });
        }
        if password.chars().count() <= MIN_PASSWORD_LENGTH {
            return Err(RecordError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LENGTH,
            });
        }

        Ok(Self {
            name: name.to_owned(),
            password: password.to_owned(),
        })
    }

    /// The login name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a stored user has exactly this name and password.
    #[must_use]
    pub fn matches(&self, user: &Record) -> bool {
        user.get_str("name") == Some(self.name.as_str())
            && user.get_str("password") == Some(self.password.as_str())
    }
}

/// A validated registration, not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    name: Value,
    phone: Value,
    email: Value,
    password: Value,
    address: Value,
    role: Value,
}

impl NewUser {
    /// Validate a registration body.
    ///
    /// Any field other than the five required ones and `role` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingFields`] if any of name, phone, email,
    /// password or address is absent.
    pub fn from_body(body: &Record) -> Result<Self, RecordError> {
        let missing = body.missing_fields(&REGISTRATION_FIELDS);
        if !missing.is_empty() {
            return Err(RecordError::MissingFields(missing));
        }

        let field = |key: &str| body.get(key).cloned().unwrap_or(Value::Null);
        let role = if body.is_present("role") {
            field("role")
        } else {
            Value::String(DEFAULT_ROLE.to_owned())
        };

        Ok(Self {
            name: field("name"),
            phone: field("phone"),
            email: field("email"),
            password: field("password"),
            address: field("address"),
            role,
        })
    }

    /// Whether an existing user already holds this name or email.
    #[must_use]
    pub fn conflicts_with(&self, existing: &Record) -> bool {
        existing.get("email") == Some(&self.email) || existing.get("name") == Some(&self.name)
    }

    /// Build the record to store. The id is left for the store to allocate.
    #[must_use]
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        record.insert("name", self.name);
        record.insert("phone", self.phone);
        record.insert("email", self.email);
        record.insert("password", self.password);
        record.insert("address", self.address);
        record.insert("role", self.role);
        record
    }
}

/// A user record as it may leave the server: without its password.
#[must_use]
pub fn without_password(mut user: Record) -> Record {
    user.remove("password");
    user
}
