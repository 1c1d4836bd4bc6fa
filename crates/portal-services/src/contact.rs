//! Contact form submissions.
//!
//! Messages are validated and acknowledged; they are logged, not stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RESPONSE_TIME: &str = "24-48 hours";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

impl ContactForm {
    /// Fails on the first blank field, in form order
    pub fn validate(&self) -> Result<(), ContactError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(ContactError::MissingField(*field)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactReceipt {
    pub success: bool,
    pub message: &'static str,
    pub response_time: &'static str,
    pub timestamp: String,
}

pub fn submit(form: &ContactForm, timestamp: String) -> Result<ContactReceipt, ContactError> {
    form.validate()?;
    tracing::info!(subject = %form.subject, "Contact message received");
    Ok(ContactReceipt {
        success: true,
        message: "Message received successfully",
        response_time: RESPONSE_TIME,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: "Zanele".into(),
            email: "zanele@example.co.za".into(),
            subject: "Weather page".into(),
            message: "Durban forecast looks off".into(),
        }
    }

    #[test]
    fn test_first_missing_field_reported() {
        let mut f = form();
        f.subject = String::new();
        f.message = "  ".into();
        assert_eq!(f.validate(), Err(ContactError::MissingField("subject")));
        assert_eq!(
            ContactError::MissingField("subject").to_string(),
            "Missing required field: subject"
        );
    }

    #[test]
    fn test_receipt() {
        let receipt = submit(&form(), "2026-10-19T10:00:00".into()).unwrap();
        assert_eq!(receipt.message, "Message received successfully");
        assert_eq!(receipt.response_time, "24-48 hours");
    }
}
