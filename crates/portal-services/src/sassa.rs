//! SASSA grant helpers: ID number check, the placeholder status checker and
//! the 2026 payment schedule.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use thiserror::Error;

pub const PAYMENT_WINDOW: &str = "1st - 5th of each month";
pub const SCHEDULE_YEAR: i32 = 2026;

/// Official SASSA channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfficialContacts {
    pub helpline: &'static str,
    pub whatsapp: &'static str,
    pub website: &'static str,
    pub email: &'static str,
}

pub const OFFICIAL_CONTACTS: OfficialContacts = OfficialContacts {
    helpline: "0800 60 10 11",
    whatsapp: "082 046 8553",
    website: "https://www.sassa.gov.za",
    email: "GrantEnquiries@sassa.gov.za",
};

pub const MOCK_DISCLAIMER: &str = "This is an unofficial informational service. Always verify \
with official SASSA channels. Never share personal or banking details.";

/// (month, day) of each 2026 grant payment
const PAYMENT_DAYS_2026: [(u32, u32); 12] = [
    (1, 5),
    (2, 2),
    (3, 2),
    (4, 1),
    (5, 5),
    (6, 2),
    (7, 1),
    (8, 4),
    (9, 1),
    (10, 6),
    (11, 3),
    (12, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SassaError {
    #[error("Please enter a valid 13-digit South African ID number")]
    InvalidId,
}

/// Checks the 13-digit ID checksum.
///
/// Digits at even 0-based positions among the first twelve are doubled (less
/// 9 when over 9) and everything is summed; the last digit must equal
/// `(10 - sum % 10) % 10`.
pub fn validate_sa_id(id: &str) -> bool {
    if id.len() != 13 || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = id.bytes().map(|b| u32::from(b - b'0')).collect();
    let sum: u32 = digits[..12]
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    (10 - sum % 10) % 10 == digits[12]
}

/// Formats like `1 April 2026`
pub fn format_payment_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Result of the status checker. Nothing here comes from SASSA: the payment
/// date is derived from the calendar and `is_mock` is always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockStatus {
    pub is_mock: bool,
    pub status: &'static str,
    pub next_payment_date: NaiveDate,
    pub next_payment_label: String,
    pub helpline: &'static str,
    pub disclaimer: &'static str,
}

/// First of next month, pushed past a weekend
pub fn mock_payment_date(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today);
    match first.weekday() {
        Weekday::Sat => first + chrono::Duration::days(2),
        Weekday::Sun => first + chrono::Duration::days(1),
        _ => first,
    }
}

pub fn mock_status(id: &str, today: NaiveDate) -> Result<MockStatus, SassaError> {
    let id = id.trim();
    if !validate_sa_id(id) {
        return Err(SassaError::InvalidId);
    }

    let next = mock_payment_date(today);
    tracing::debug!("Placeholder SASSA status, next payment {}", next);
    Ok(MockStatus {
        is_mock: true,
        status: "Application Processed Successfully",
        next_payment_date: next,
        next_payment_label: format_payment_date(next),
        helpline: OFFICIAL_CONTACTS.helpline,
        disclaimer: MOCK_DISCLAIMER,
    })
}

pub fn payment_dates() -> Vec<NaiveDate> {
    PAYMENT_DAYS_2026
        .iter()
        .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(SCHEDULE_YEAR, month, day))
        .collect()
}

/// First scheduled payment on or after `today`; once the year's schedule is
/// over, the first date of the schedule
pub fn next_payment_date(today: NaiveDate) -> Option<NaiveDate> {
    let dates = payment_dates();
    dates
        .iter()
        .copied()
        .find(|d| *d >= today)
        .or_else(|| dates.first().copied())
}

/// Body of `/api/sassa/payment-dates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentSchedule {
    pub success: bool,
    pub next_payment_date: String,
    pub payment_window: &'static str,
    pub current_year: String,
    pub official_contacts: OfficialContacts,
}

pub fn payment_schedule(today: NaiveDate) -> PaymentSchedule {
    PaymentSchedule {
        success: true,
        next_payment_date: next_payment_date(today)
            .map(format_payment_date)
            .unwrap_or_default(),
        payment_window: PAYMENT_WINDOW,
        current_year: SCHEDULE_YEAR.to_string(),
        official_contacts: OFFICIAL_CONTACTS,
    }
}
