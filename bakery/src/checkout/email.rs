use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// A contact email for order confirmation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Email(String);

#[derive(Error, Debug, PartialEq)]
pub enum EmailError {
    #[error("'{0}' is not a valid email: must contain exactly one '@'")]
    InvalidFormat(String),
    #[error("'{0}' is not a valid email: contains whitespace")]
    ContainsWhitespace(String),
    #[error("'{0}' is not a valid email: missing local part")]
    MissingLocalPart(String),
    #[error("'{0}' is not a valid email: invalid domain part")]
    InvalidDomainPart(String),
}

impl TryFrom<&str> for Email {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace(value.to_string()));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(EmailError::InvalidFormat(value.to_string()));
        };

        if domain.contains('@') {
            return Err(EmailError::InvalidFormat(value.to_string()));
        }

        if local.is_empty() {
            return Err(EmailError::MissingLocalPart(value.to_string()));
        }

        // Needs something on both sides of at least one dot.
        let has_dotted_domain = domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
        if !has_dotted_domain {
            return Err(EmailError::InvalidDomainPart(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }
}

impl Deref for Email {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
