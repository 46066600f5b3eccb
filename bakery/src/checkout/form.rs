use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;
use time::{Date, Month};

use super::Email;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+1 \(\d{3}\) \d{3}-\d{4}$").unwrap());
static CARD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4} \d{4} \d{4} \d{4}$").unwrap());
static EXPIRY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/(\d{2})$").unwrap());
static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

/// Delivery and payment details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    ZipCode,
    CardNumber,
    ExpiryDate,
    Cvv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid phone number")]
    InvalidPhone,
    #[error("Please enter a valid card number")]
    InvalidCardNumber,
    #[error("Please enter a valid expiry date (MM/YY)")]
    InvalidExpiry,
    #[error("Card has expired")]
    CardExpired,
    #[error("Please enter a valid CVV")]
    InvalidCvv,
    #[error("Please enter a valid ZIP code")]
    InvalidZip,
}

/// Every failing field of a form, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<(Field, FieldError)>);

impl ValidationErrors {
    pub fn fields(&self) -> &[(Field, FieldError)] {
        &self.0
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, error)| *error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl CheckoutForm {
    fn values(&self) -> [(Field, &str); 10] {
        [
            (Field::FirstName, self.first_name.as_str()),
            (Field::LastName, self.last_name.as_str()),
            (Field::Email, self.email.as_str()),
            (Field::Phone, self.phone.as_str()),
            (Field::Address, self.address.as_str()),
            (Field::City, self.city.as_str()),
            (Field::ZipCode, self.zip_code.as_str()),
            (Field::CardNumber, self.card_number.as_str()),
            (Field::ExpiryDate, self.expiry_date.as_str()),
            (Field::Cvv, self.cvv.as_str()),
        ]
    }

    /// Checks every field; `today` decides whether the card has expired.
    pub fn validate(&self, today: Date) -> Result<(), ValidationErrors> {
        let errors: Vec<(Field, FieldError)> = self
            .values()
            .into_iter()
            .filter_map(|(field, value)| {
                validate_field(field, value.trim(), today)
                    .err()
                    .map(|error| (field, error))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Validates one trimmed value. All fields are required.
pub fn validate_field(field: Field, value: &str, today: Date) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required);
    }

    match field {
        Field::Email => Email::try_from(value)
            .map(|_| ())
            .map_err(|_| FieldError::InvalidEmail),
        Field::Phone if !PHONE_PATTERN.is_match(value) => Err(FieldError::InvalidPhone),
        Field::CardNumber if !CARD_PATTERN.is_match(value) => Err(FieldError::InvalidCardNumber),
        Field::ExpiryDate => validate_expiry(value, today),
        Field::Cvv if !(3..=4).contains(&value.chars().count()) => Err(FieldError::InvalidCvv),
        Field::ZipCode if !ZIP_PATTERN.is_match(value) => Err(FieldError::InvalidZip),
        _ => Ok(()),
    }
}

/// A card is expired once the first day of its expiry month is behind `today`.
fn validate_expiry(value: &str, today: Date) -> Result<(), FieldError> {
    let caps = EXPIRY_PATTERN
        .captures(value)
        .ok_or(FieldError::InvalidExpiry)?;

    let month: u8 = caps[1].parse().map_err(|_| FieldError::InvalidExpiry)?;
    let year: i32 = caps[2].parse().map_err(|_| FieldError::InvalidExpiry)?;
    let month = Month::try_from(month).map_err(|_| FieldError::InvalidExpiry)?;
    let expiry =
        Date::from_calendar_date(2000 + year, month, 1).map_err(|_| FieldError::InvalidExpiry)?;

    if expiry < today {
        Err(FieldError::CardExpired)
    } else {
        Ok(())
    }
}
