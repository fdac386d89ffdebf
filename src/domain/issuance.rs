use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssuedPassStatus {
    Active,
    Used,
    Expired,
    Cancelled,
    Refunded,
}

impl IssuedPassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuedPassStatus::Active => "active",
            IssuedPassStatus::Used => "used",
            IssuedPassStatus::Expired => "expired",
            IssuedPassStatus::Cancelled => "cancelled",
            IssuedPassStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for IssuedPassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssuedPassStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(IssuedPassStatus::Active),
            "used" => Ok(IssuedPassStatus::Used),
            "expired" => Ok(IssuedPassStatus::Expired),
            "cancelled" => Ok(IssuedPassStatus::Cancelled),
            "refunded" => Ok(IssuedPassStatus::Refunded),
            other => Err(DomainError::Internal(format!(
                "unknown issued pass status '{other}'"
            ))),
        }
    }
}

/// Last day a pass with `validity` entries can be used: one entry per day
/// starting on the sub-event date.
pub fn expiry_date(event_date: NaiveDate, validity: i32) -> NaiveDate {
    let extra_days = u64::try_from(validity.max(1) - 1).unwrap_or(0);
    event_date
        .checked_add_days(Days::new(extra_days))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone)]
pub struct SponsoredPassInput {
    pub pass_id: Uuid,
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct IssuedPassView {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
    pub order_item_id: Option<Uuid>,
    pub sponsored_pass: bool,
    pub status: IssuedPassStatus,
    pub used_count: i32,
    pub expiry_date: NaiveDate,
    pub is_expired: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_entry_pass_expires_on_event_day() {
        let day = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
        assert_eq!(expiry_date(day, 1), day);
    }

    #[test]
    fn multi_entry_pass_covers_consecutive_days() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 29).unwrap();
        assert_eq!(expiry_date(day, 3), NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
    }
}
