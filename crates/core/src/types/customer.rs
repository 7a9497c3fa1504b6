//! Customer value types: email addresses, DNI numbers, and the checkout
//! customer record.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// An email address.
///
/// Basic structural validation only: a non-empty local part and domain
/// around a single `@`, within the RFC 5321 length limit.
///
/// ```
/// use tienda_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@domain.com").is_err());
/// assert!(Email::parse("user@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// missing an @ symbol, or has an empty local part or domain.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An Argentine national identity number.
///
/// Stored as a positive integer; parsed from the free-text form field the
/// checkout receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dni(i64);

impl Dni {
    /// Parse a DNI from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not parse as a positive integer.
    pub fn parse(s: &str) -> Result<Self, CustomerError> {
        let number: i64 = s
            .trim()
            .parse()
            .map_err(|_| CustomerError::InvalidDni(s.to_owned()))?;
        if number <= 0 {
            return Err(CustomerError::InvalidDni(s.to_owned()));
        }
        Ok(Self(number))
    }

    /// Get the underlying number.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Dni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from validating checkout customer data.
#[derive(thiserror::Error, Debug, Clone)]
pub enum CustomerError {
    /// A required field was missing or blank.
    #[error("missing customer field: {0}")]
    MissingField(&'static str),
    /// The DNI did not parse as a positive integer.
    #[error("invalid DNI: {0:?}")]
    InvalidDni(String),
    /// The email address failed validation.
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),
}

/// A validated checkout customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub last_name: String,
    pub dni: Dni,
    pub email: Email,
}

impl Customer {
    /// Validate raw form input into a `Customer`.
    ///
    /// # Errors
    ///
    /// Returns an error for any blank field, a DNI that is not a positive
    /// integer, or a structurally invalid email.
    pub fn parse(
        name: &str,
        last_name: &str,
        dni: &str,
        email: &str,
    ) -> Result<Self, CustomerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CustomerError::MissingField("name"));
        }
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(CustomerError::MissingField("lastName"));
        }
        if dni.trim().is_empty() {
            return Err(CustomerError::MissingField("dni"));
        }
        if email.trim().is_empty() {
            return Err(CustomerError::MissingField("email"));
        }

        Ok(Self {
            name: name.to_owned(),
            last_name: last_name.to_owned(),
            dni: Dni::parse(dni)?,
            email: Email::parse(email.trim())?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
        assert!(matches!(
            Email::parse("nope"),
            Err(EmailError::MissingAtSymbol)
        ));
        assert!(matches!(
            Email::parse("@domain.com"),
            Err(EmailError::EmptyLocalPart)
        ));
        assert!(matches!(Email::parse("user@"), Err(EmailError::EmptyDomain)));
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: 254 })
        ));
    }

    #[test]
    fn test_dni_parses_positive_integer() {
        assert_eq!(Dni::parse("30123456").unwrap().as_i64(), 30_123_456);
        assert_eq!(Dni::parse(" 1 ").unwrap().as_i64(), 1);
    }

    #[test]
    fn test_dni_rejects_garbage() {
        assert!(Dni::parse("").is_err());
        assert!(Dni::parse("12a34").is_err());
        assert!(Dni::parse("-5").is_err());
        assert!(Dni::parse("0").is_err());
    }

    #[test]
    fn test_customer_parse_happy_path() {
        let customer = Customer::parse("Ana", "García", "30123456", "ana@example.com").unwrap();
        assert_eq!(customer.name, "Ana");
        assert_eq!(customer.last_name, "García");
        assert_eq!(customer.dni.as_i64(), 30_123_456);
        assert_eq!(customer.email.as_str(), "ana@example.com");
    }

    #[test]
    fn test_customer_parse_rejects_blank_fields() {
        assert!(matches!(
            Customer::parse("", "García", "30123456", "ana@example.com"),
            Err(CustomerError::MissingField("name"))
        ));
        assert!(matches!(
            Customer::parse("Ana", "  ", "30123456", "ana@example.com"),
            Err(CustomerError::MissingField("lastName"))
        ));
        assert!(matches!(
            Customer::parse("Ana", "García", "", "ana@example.com"),
            Err(CustomerError::MissingField("dni"))
        ));
        assert!(matches!(
            Customer::parse("Ana", "García", "30123456", ""),
            Err(CustomerError::MissingField("email"))
        ));
    }
}
