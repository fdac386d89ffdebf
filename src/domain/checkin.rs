//! Check-in eligibility and the civil-day window that bounds "once per day".
//!
//! All day arithmetic happens in a single configured timezone
//! (`Asia/Kolkata` by default). The ledger stores the civil day of every
//! check-in and the database refuses a second record for the same pass and
//! day, so the rules here only decide whether a pass may be consumed at all.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::issuance::IssuedPassStatus;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

#[derive(Debug, Clone, Copy)]
pub struct CheckInClock {
    tz: Tz,
}

impl CheckInClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// UTC instants `[start, end)` covering `day` in the check-in timezone.
    pub fn day_bounds(&self, day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let next = day.succ_opt().unwrap_or(day);
        (self.local_midnight(day), self.local_midnight(next))
    }

    fn local_midnight(&self, day: NaiveDate) -> DateTime<Utc> {
        let naive = day.and_time(NaiveTime::MIN);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&naive))
            .with_timezone(&Utc)
    }
}

impl Default for CheckInClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    QrScan,
    Manual,
}

impl CheckInMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInMethod::QrScan => "qr_scan",
            CheckInMethod::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckInCommand {
    pub issued_pass_id: Uuid,
    pub employee_id: Uuid,
    pub method: CheckInMethod,
    pub checked_in_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Expired,
    Used,
    Cancelled,
    Refunded,
    Exhausted,
    AlreadyUsedToday,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::Expired => "Pass has expired",
            Rejection::Used => "Pass has already been fully used",
            Rejection::Cancelled => "Pass has been cancelled",
            Rejection::Refunded => "Pass has been refunded",
            Rejection::Exhausted => "Pass has no remaining uses",
            Rejection::AlreadyUsedToday => "Pass already used today",
        }
    }
}

/// The fields of an issued pass that gate entry.
#[derive(Debug, Clone, Copy)]
pub struct PassState {
    pub status: IssuedPassStatus,
    pub used_count: i32,
    pub expiry_date: NaiveDate,
    pub is_expired: bool,
}

impl PassState {
    /// Whether an active or used pass has outlived its expiry date and
    /// should be persisted as `expired`.
    pub fn lapsed(&self, today: NaiveDate) -> bool {
        matches!(self.status, IssuedPassStatus::Active | IssuedPassStatus::Used)
            && self.expiry_date < today
    }

    pub fn assess(&self, today: NaiveDate) -> Result<(), Rejection> {
        match self.status {
            IssuedPassStatus::Expired => return Err(Rejection::Expired),
            IssuedPassStatus::Used => return Err(Rejection::Used),
            IssuedPassStatus::Cancelled => return Err(Rejection::Cancelled),
            IssuedPassStatus::Refunded => return Err(Rejection::Refunded),
            IssuedPassStatus::Active => {}
        }
        if self.is_expired || self.expiry_date < today {
            return Err(Rejection::Expired);
        }
        if self.used_count <= 0 {
            return Err(Rejection::Exhausted);
        }
        Ok(())
    }

    /// State after one successful entry.
    pub fn consumed(&self) -> PassState {
        let used_count = (self.used_count - 1).max(0);
        if used_count == 0 {
            PassState {
                status: IssuedPassStatus::Used,
                used_count,
                expiry_date: self.expiry_date,
                is_expired: true,
            }
        } else {
            PassState { used_count, ..*self }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    Accepted { record_id: Uuid, remaining_uses: i32 },
    Rejected { reason: Rejection, remaining_uses: i32 },
}

#[derive(Debug, Clone)]
pub struct CheckingRecordView {
    pub id: Uuid,
    pub issued_pass_id: Uuid,
    pub employee_id: Uuid,
    pub sub_event_id: Uuid,
    pub checkin_time: DateTime<Utc>,
    pub checkin_day: NaiveDate,
    pub checkin_method: String,
    pub checked_in_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn active(used_count: i32, expiry_date: NaiveDate) -> PassState {
        PassState {
            status: IssuedPassStatus::Active,
            used_count,
            expiry_date,
            is_expired: false,
        }
    }

    #[test]
    fn today_follows_india_standard_time() {
        let clock = CheckInClock::default();
        // 20:00 UTC is 01:30 the next morning in IST.
        assert_eq!(clock.today(utc("2025-10-01T20:00:00Z")), day(2025, 10, 2));
        assert_eq!(clock.today(utc("2025-10-01T18:29:59Z")), day(2025, 10, 1));
    }

    #[test]
    fn day_bounds_are_ist_midnights_in_utc() {
        let (start, end) = CheckInClock::default().day_bounds(day(2025, 10, 2));
        assert_eq!(start, utc("2025-10-01T18:30:00Z"));
        assert_eq!(end, utc("2025-10-02T18:30:00Z"));
    }

    #[test]
    fn active_pass_with_uses_left_is_admitted() {
        assert_eq!(active(2, day(2025, 10, 2)).assess(day(2025, 10, 2)), Ok(()));
    }

    #[test]
    fn terminal_statuses_are_rejected() {
        let today = day(2025, 10, 2);
        for (status, reason) in [
            (IssuedPassStatus::Used, Rejection::Used),
            (IssuedPassStatus::Expired, Rejection::Expired),
            (IssuedPassStatus::Cancelled, Rejection::Cancelled),
            (IssuedPassStatus::Refunded, Rejection::Refunded),
        ] {
            let state = PassState { status, ..active(1, today) };
            assert_eq!(state.assess(today), Err(reason));
        }
    }

    #[test]
    fn expiry_compares_dates_only() {
        let pass = active(1, day(2025, 10, 2));
        assert_eq!(pass.assess(day(2025, 10, 2)), Ok(()));
        assert_eq!(pass.assess(day(2025, 10, 3)), Err(Rejection::Expired));
        assert!(pass.lapsed(day(2025, 10, 3)));
        assert!(!pass.lapsed(day(2025, 10, 2)));
    }

    #[test]
    fn zero_uses_left_is_exhausted() {
        assert_eq!(
            active(0, day(2025, 10, 2)).assess(day(2025, 10, 1)),
            Err(Rejection::Exhausted)
        );
    }

    #[test]
    fn last_use_marks_pass_used_and_expired() {
        let after = active(1, day(2025, 10, 2)).consumed();
        assert_eq!(after.used_count, 0);
        assert_eq!(after.status, IssuedPassStatus::Used);
        assert!(after.is_expired);

        let after = active(3, day(2025, 10, 4)).consumed();
        assert_eq!(after.used_count, 2);
        assert_eq!(after.status, IssuedPassStatus::Active);
        assert!(!after.is_expired);
    }
}
