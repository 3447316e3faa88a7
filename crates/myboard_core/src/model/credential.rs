//! Vault credential entry.
//!
//! The core only stores and round-trips these records; masking and reveal
//! belong to the presentation layer.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CredentialId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub id: CredentialId,
    pub site: String,
    pub username: String,
    pub password: String,
}

/// Vault input rejected at the add boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    MissingField(&'static str),
}

impl Display for CredentialValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "vault field `{field}` is required"),
        }
    }
}

impl Error for CredentialValidationError {}

impl CredentialEntry {
    /// Builds a validated entry.
    ///
    /// `site` and `username` are trimmed; `password` is stored verbatim and
    /// only checked for emptiness.
    pub fn build(
        id: CredentialId,
        site: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let site = site.trim();
        let username = username.trim();
        if site.is_empty() {
            return Err(CredentialValidationError::MissingField("site"));
        }
        if username.is_empty() {
            return Err(CredentialValidationError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(CredentialValidationError::MissingField("password"));
        }
        Ok(Self {
            id,
            site: site.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialEntry, CredentialValidationError};

    #[test]
    fn build_keeps_password_whitespace() {
        let entry = CredentialEntry::build(1, " mail ", " me ", " secret ").unwrap();
        assert_eq!(entry.site, "mail");
        assert_eq!(entry.username, "me");
        assert_eq!(entry.password, " secret ");
    }

    #[test]
    fn build_reports_first_missing_field() {
        assert_eq!(
            CredentialEntry::build(1, "mail", "", "x").unwrap_err(),
            CredentialValidationError::MissingField("username")
        );
        assert_eq!(
            CredentialEntry::build(1, "mail", "me", "").unwrap_err(),
            CredentialValidationError::MissingField("password")
        );
    }
}
