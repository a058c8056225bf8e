//! Account email addresses.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a string was refused as an [`Email`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email is required")]
    Empty,

    #[error("Email must be at most {max} characters")]
    TooLong { max: usize },

    #[error("Email must contain an @")]
    MissingAt,

    #[error("Email must contain a single @")]
    MultipleAt,

    #[error("Email needs a name before the @")]
    EmptyLocalPart,

    #[error("Email needs a domain after the @")]
    EmptyDomain,

    #[error("Email must not contain spaces")]
    Whitespace,
}

/// An email address that passed the client's shape check.
///
/// Form input is trimmed first. Deliverability is the server's concern;
/// this only guarantees `local@domain` with both halves present.
///
/// ```
/// use taskmanager_core::Email;
///
/// let email = Email::parse(" a@x.com ").unwrap();
/// assert_eq!(email.as_str(), "a@x.com");
/// assert!(Email::parse("a@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate `input` as an email address.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] the trimmed input fails.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let address = input.trim();
        if address.is_empty() {
            return Err(EmailError::Empty);
        }
        if address.chars().count() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if address.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (local, domain) = address.split_once('@').ok_or(EmailError::MissingAt)?;
        if domain.contains('@') {
            return Err(EmailError::MultipleAt);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(address.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_registration_addresses() {
        for address in ["a@x.com", "alice.smith+tasks@mail.example.org", "root@localhost"] {
            assert_eq!(Email::parse(address).unwrap().as_str(), address);
        }
    }

    #[test]
    fn test_trims_form_input() {
        assert_eq!(Email::parse("  bob@x.com\n").unwrap().to_string(), "bob@x.com");
    }

    #[test]
    fn test_refusals() {
        let cases = [
            ("", EmailError::Empty),
            ("   ", EmailError::Empty),
            ("alice", EmailError::MissingAt),
            ("a@b@x.com", EmailError::MultipleAt),
            ("@x.com", EmailError::EmptyLocalPart),
            ("alice@", EmailError::EmptyDomain),
            ("al ice@x.com", EmailError::Whitespace),
        ];
        for (input, expected) in cases {
            assert_eq!(Email::parse(input), Err(expected), "input {input:?}");
        }
    }

    #[test]
    fn test_length_limit() {
        let at_limit = format!("{}@x.com", "a".repeat(Email::MAX_LENGTH - 6));
        assert!(Email::parse(&at_limit).is_ok());

        let over = format!("a{at_limit}");
        assert_eq!(
            Email::parse(&over),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_error_text_is_shown_to_users() {
        assert_eq!(EmailError::Empty.to_string(), "Email is required");
    }

    #[test]
    fn test_wire_form_is_validated() {
        let email: Email = serde_json::from_str("\"a@x.com\"").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"a@x.com\"");
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
