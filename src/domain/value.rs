use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Provider access key (`app_key` / `AccessKeyId` depending on the gateway).
///
/// Invariant: non-empty after trimming.
pub struct AccessKey(String);

impl AccessKey {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "access_key";

    /// Create a validated [`AccessKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Signing secret shared with the gateway.
///
/// Invariant: must not be empty (whitespace is preserved). The value never
/// shows up in `Debug` output.
pub struct Secret(String);

impl Secret {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "secret";

    /// Create a validated [`Secret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Access key + secret pair identifying one provider account.
pub struct Credentials {
    pub key: AccessKey,
    pub secret: Secret,
}

impl Credentials {
    /// Validate both halves of the pair.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            key: AccessKey::new(key)?,
            secret: Secret::new(secret)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Recipient phone number(s) exactly as handed to `send`.
///
/// Multiple numbers are separated by commas. The raw value is preserved
/// because single-recipient wire fields carry it verbatim.
///
/// Invariant: non-empty after trimming.
pub struct Recipients(String);

impl Recipients {
    /// Name used in validation errors.
    pub const FIELD: &'static str = "recipients";

    /// Create validated recipients.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the recipients as provided.
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Individual numbers, trimmed, with blanks dropped.
    pub fn numbers(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }

    /// Comma-joined numbers after trimming each one.
    pub fn joined(&self) -> String {
        self.numbers().collect::<Vec<_>>().join(",")
    }
}
