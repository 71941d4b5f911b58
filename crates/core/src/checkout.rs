//! Checkout forms: billing details and payment card shape checks.
//!
//! Card data is validated for shape only. It is never sent to the backend
//! and never stored, so [`PaymentDetails`] has no `Serialize` impl.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// Per-field validation messages, keyed by form field name.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{} field(s) failed validation", .0.len())]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// An empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn min_len(&mut self, field: &'static str, value: &str, min: usize, message: &str) {
        if value.trim().chars().count() < min {
            self.add(field, message);
        }
    }
}

/// Shipping and contact details collected on checkout step one.
///
/// Kept in the session between the billing and payment steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
}

impl BillingDetails {
    /// Check every field, collecting one message per failing field.
    ///
    /// # Errors
    ///
    /// Returns [`FieldErrors`] naming each invalid field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.min_len(
            "first_name",
            &self.first_name,
            2,
            "First name must be at least 2 characters",
        );
        errors.min_len(
            "last_name",
            &self.last_name,
            2,
            "Last name must be at least 2 characters",
        );
        if Email::parse(&self.email).is_err() {
            errors.add("email", "Please enter a valid email address");
        }
        errors.min_len(
            "address",
            &self.address,
            5,
            "Address must be at least 5 characters",
        );
        errors.min_len("city", &self.city, 2, "City must be at least 2 characters");
        errors.min_len("state", &self.state, 2, "State must be at least 2 characters");
        errors.min_len(
            "zip_code",
            &self.zip_code,
            5,
            "Zip code must be at least 5 characters",
        );
        errors.min_len(
            "phone_number",
            &self.phone_number,
            10,
            "Phone number must be at least 10 digits",
        );
        errors.into_result()
    }

    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Card details from checkout step two.
#[derive(Clone, Default, Deserialize)]
pub struct PaymentDetails {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub name_on_card: String,
}

impl PaymentDetails {
    /// Shape checks only; no Luhn or expiry-in-future check.
    ///
    /// # Errors
    ///
    /// Returns [`FieldErrors`] naming each invalid field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.min_len(
            "card_number",
            &self.card_number,
            16,
            "Card number must be at least 16 digits",
        );
        errors.min_len(
            "expiry_date",
            &self.expiry_date,
            5,
            "Expiry date must be in MM/YY format",
        );
        errors.min_len("cvv", &self.cvv, 3, "CVV must be at least 3 digits");
        errors.min_len(
            "name_on_card",
            &self.name_on_card,
            2,
            "Name must be at least 2 characters",
        );
        errors.into_result()
    }

    /// Last four digits of the card, for confirmation copy.
    #[must_use]
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        digits.iter().skip(digits.len().saturating_sub(4)).collect()
    }
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .field("name_on_card", &self.name_on_card)
            .finish()
    }
}

/// Group card digits in fours: `"4242424242424242"` → `"4242 4242 4242 4242"`.
///
/// Input with fewer than four digits is returned unchanged.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(16).collect();
    if digits.len() < 4 {
        return input.to_owned();
    }

    let mut out = String::with_capacity(digits.len() + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// `"1226"` → `"12/26"`. Needs at least three digits to insert the slash.
#[must_use]
pub fn format_expiry_date(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() < 3 {
        return digits;
    }
    let (month, year) = digits.split_at(2);
    format!("{month}/{year}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_billing() -> BillingDetails {
        BillingDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@arcverse.store".to_string(),
            address: "12 Engine Row".to_string(),
            city: "London".to_string(),
            state: "LN".to_string(),
            zip_code: "10001".to_string(),
            phone_number: "5551234567".to_string(),
        }
    }

    fn valid_payment() -> PaymentDetails {
        PaymentDetails {
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_date: "12/29".to_string(),
            cvv: "123".to_string(),
            name_on_card: "Ada Lovelace".to_string(),
        }
    }

    #[test]
    fn test_valid_billing_passes() {
        assert!(valid_billing().validate().is_ok());
        assert_eq!(valid_billing().full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_billing_reports_each_field() {
        let billing = BillingDetails {
            first_name: "A".to_string(),
            email: "not-an-email".to_string(),
            zip_code: "123".to_string(),
            ..valid_billing()
        };
        let errors = billing.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get("first_name"),
            Some("First name must be at least 2 characters")
        );
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert!(errors.get("zip_code").is_some());
        assert!(errors.get("city").is_none());
    }

    #[test]
    fn test_billing_whitespace_does_not_count() {
        let billing = BillingDetails {
            city: "  a  ".to_string(),
            ..valid_billing()
        };
        assert!(billing.validate().unwrap_err().get("city").is_some());
    }

    #[test]
    fn test_payment_shape_checks() {
        assert!(valid_payment().validate().is_ok());

        let payment = PaymentDetails {
            card_number: "4242".to_string(),
            expiry_date: "12".to_string(),
            cvv: "1".to_string(),
            name_on_card: String::new(),
        };
        let errors = payment.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get("expiry_date"),
            Some("Expiry date must be in MM/YY format")
        );
        assert_eq!(
            errors.get("name_on_card"),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_payment_debug_is_redacted() {
        let debug = format!("{:?}", valid_payment());
        assert!(!debug.contains("4242"));
        assert!(!debug.contains("123"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(valid_payment().last_four(), "4242");
    }

    #[test]
    fn test_format_card_number() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("4242-4242-42"), "4242 4242 42");
        assert_eq!(format_card_number("42"), "42");
    }

    #[test]
    fn test_format_expiry_date() {
        assert_eq!(format_expiry_date("1226"), "12/26");
        assert_eq!(format_expiry_date("12/2"), "12/2");
        assert_eq!(format_expiry_date("1"), "1");
        assert_eq!(format_expiry_date("122699"), "12/26");
    }

    #[test]
    fn test_field_errors_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("cvv", "first");
        errors.add("cvv", "second");
        assert_eq!(errors.get("cvv"), Some("first"));
        assert_eq!(errors.iter().count(), 1);
        assert_eq!(errors.to_string(), "1 field(s) failed validation");
    }
}
