//! Server-side services for SA Daily Portal: football data, SASSA helpers,
//! guides and the contact form.

pub mod contact;
pub mod guides;
pub mod retry;
pub mod sassa;
pub mod sports;

pub use contact::{ContactError, ContactForm, ContactReceipt};
pub use guides::{Guide, GuideList};
pub use retry::{with_retry, RetryError, RetryPolicy};
pub use sassa::{
    mock_status, next_payment_date, payment_schedule, validate_sa_id, MockStatus,
    OfficialContacts, PaymentSchedule, SassaError, OFFICIAL_CONTACTS,
};
pub use sports::{FootballClient, Match, MatchList, MatchStatus, StandingRow, Standings};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Africa::Johannesburg;

/// Local South African time as `YYYY-MM-DDTHH:MM:SS`
pub fn sa_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&Johannesburg)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Calendar date in South Africa
pub fn sa_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Johannesburg).date_naive()
}
