use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::checkin::{
    CheckInCommand, CheckInOutcome, CheckingRecordView, Rejection,
};
use crate::domain::errors::DomainError;
use crate::domain::issuance::IssuedPassStatus;
use crate::domain::ports::CheckInRepository;
use crate::schema::{checking_records, issued_passes};

use super::issuance_repo::expire_if_lapsed;
use super::models::{CheckingRecordRow, IssuedPassRow, NewCheckingRecordRow};

pub struct DieselCheckInRepository {
    pool: DbPool,
}

impl DieselCheckInRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CheckInRepository for DieselCheckInRepository {
    fn check_in(
        &self,
        command: CheckInCommand,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<CheckInOutcome, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Scans of the same pass queue up behind this lock.
            let row = issued_passes::table
                .find(command.issued_pass_id)
                .select(IssuedPassRow::as_select())
                .for_update()
                .get_result(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Issued pass"))?;
            let row = expire_if_lapsed(conn, row, today)?;

            let state = row.state()?;
            if let Err(reason) = state.assess(today) {
                log::info!("Issued pass {} rejected: {:?}", row.id, reason);
                return Ok(CheckInOutcome::Rejected {
                    reason,
                    remaining_uses: row.used_count,
                });
            }

            // The ledger admits one record per pass, sub-event and day.
            let record_id = Uuid::new_v4();
            let inserted = diesel::insert_into(checking_records::table)
                .values(&NewCheckingRecordRow {
                    id: record_id,
                    issued_pass_id: row.id,
                    employee_id: command.employee_id,
                    sub_event_id: row.sub_event_id,
                    checkin_time: now,
                    checkin_day: today,
                    checkin_method: command.method.as_str().to_string(),
                    checked_in_by: command.checked_in_by,
                })
                .on_conflict((
                    checking_records::issued_pass_id,
                    checking_records::sub_event_id,
                    checking_records::checkin_day,
                ))
                .do_nothing()
                .execute(conn)?;
            if inserted == 0 {
                return Ok(CheckInOutcome::Rejected {
                    reason: Rejection::AlreadyUsedToday,
                    remaining_uses: row.used_count,
                });
            }

            let next = state.consumed();
            diesel::update(issued_passes::table.find(row.id))
                .set((
                    issued_passes::used_count.eq(next.used_count),
                    issued_passes::status.eq(next.status.as_str()),
                    issued_passes::is_expired.eq(next.is_expired),
                    issued_passes::updated_at.eq(now),
                ))
                .execute(conn)?;

            log::info!(
                "Issued pass {} checked in by {} ({} uses left)",
                row.id,
                command.employee_id,
                next.used_count
            );
            Ok(CheckInOutcome::Accepted {
                record_id,
                remaining_uses: next.used_count,
            })
        })
    }

    fn find_active_pass_for_attendee(
        &self,
        attendee_id: Uuid,
        sub_event_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(issued_passes::table
            .filter(issued_passes::attendee_id.eq(attendee_id))
            .filter(issued_passes::sub_event_id.eq(sub_event_id))
            .filter(issued_passes::status.eq(IssuedPassStatus::Active.as_str()))
            .filter(issued_passes::is_expired.eq(false))
            .filter(issued_passes::used_count.gt(0))
            .filter(issued_passes::expiry_date.ge(today))
            .order(issued_passes::created_at.desc())
            .select(issued_passes::id)
            .first(&mut conn)
            .optional()?)
    }

    fn records_between(
        &self,
        sub_event_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CheckingRecordView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = checking_records::table
            .filter(checking_records::sub_event_id.eq(sub_event_id))
            .filter(checking_records::checkin_time.ge(start))
            .filter(checking_records::checkin_time.lt(end))
            .order(checking_records::checkin_time.asc())
            .select(CheckingRecordRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Days, NaiveDate, Utc};
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselCheckInRepository;
    use crate::db::DbPool;
    use crate::domain::checkin::{
        CheckInClock, CheckInCommand, CheckInMethod, CheckInOutcome, Rejection,
    };
    use crate::domain::errors::DomainError;
    use crate::domain::issuance::IssuedPassStatus;
    use crate::domain::ports::{CheckInRepository, IssuanceRepository};
    use crate::infrastructure::issuance_repo::DieselIssuanceRepository;
    use crate::infrastructure::test_support::{event_day, seed_issued_pass, setup_db};
    use crate::schema::checking_records;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn command(issued_pass_id: Uuid) -> CheckInCommand {
        CheckInCommand {
            issued_pass_id,
            employee_id: Uuid::new_v4(),
            method: CheckInMethod::QrScan,
            checked_in_by: Some("Gate 2".to_string()),
        }
    }

    fn check_in_at(
        repo: &DieselCheckInRepository,
        issued_pass_id: Uuid,
        now: DateTime<Utc>,
    ) -> CheckInOutcome {
        let today = CheckInClock::default().today(now);
        repo.check_in(command(issued_pass_id), now, today)
            .expect("check-in should not error")
    }

    fn record_count(pool: &DbPool, issued_pass_id: Uuid) -> i64 {
        let mut conn = pool.get().expect("Failed to get connection");
        checking_records::table
            .filter(checking_records::issued_pass_id.eq(issued_pass_id))
            .count()
            .get_result(&mut conn)
            .expect("query failed")
    }

    fn far_future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn single_use_pass_is_admitted_once() {
        let (_container, pool) = setup_db().await;
        let seeded = seed_issued_pass(&pool, 1, far_future());
        let repo = DieselCheckInRepository::new(pool.clone());

        let first = check_in_at(&repo, seeded.issued_pass_id, at("2025-10-02T14:00:00Z"));
        assert!(matches!(first, CheckInOutcome::Accepted { remaining_uses: 0, .. }));

        let second = check_in_at(&repo, seeded.issued_pass_id, at("2025-10-02T15:00:00Z"));
        assert_eq!(
            second,
            CheckInOutcome::Rejected {
                reason: Rejection::AlreadyUsedToday,
                remaining_uses: 0
            }
        );
        assert_eq!(record_count(&pool, seeded.issued_pass_id), 1);

        let pass = DieselIssuanceRepository::new(pool.clone())
            .find_issued_pass(seeded.issued_pass_id, NaiveDate::from_ymd_opt(2025, 10, 2).unwrap())
            .expect("find failed")
            .expect("pass exists");
        assert_eq!(pass.status, IssuedPassStatus::Used);
        assert!(pass.is_expired);
    }

    #[tokio::test]
    async fn multi_use_pass_is_exhausted_after_validity_days() {
        let (_container, pool) = setup_db().await;
        let seeded = seed_issued_pass(&pool, 2, far_future());
        let repo = DieselCheckInRepository::new(pool.clone());

        assert!(matches!(
            check_in_at(&repo, seeded.issued_pass_id, at("2025-10-02T14:00:00Z")),
            CheckInOutcome::Accepted { remaining_uses: 1, .. }
        ));
        assert!(matches!(
            check_in_at(&repo, seeded.issued_pass_id, at("2025-10-02T16:00:00Z")),
            CheckInOutcome::Rejected { reason: Rejection::AlreadyUsedToday, remaining_uses: 1 }
        ));
        // 19:00 UTC is already the next civil day in IST.
        assert!(matches!(
            check_in_at(&repo, seeded.issued_pass_id, at("2025-10-02T19:00:00Z")),
            CheckInOutcome::Accepted { remaining_uses: 0, .. }
        ));
        assert!(matches!(
            check_in_at(&repo, seeded.issued_pass_id, at("2025-10-04T14:00:00Z")),
            CheckInOutcome::Rejected { reason: Rejection::Used, remaining_uses: 0 }
        ));
        assert_eq!(record_count(&pool, seeded.issued_pass_id), 2);
    }

    #[tokio::test]
    async fn lapsed_pass_is_rejected_and_marked_expired() {
        let (_container, pool) = setup_db().await;
        let expiry = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
        let seeded = seed_issued_pass(&pool, 1, expiry);
        let repo = DieselCheckInRepository::new(pool.clone());

        let outcome = check_in_at(&repo, seeded.issued_pass_id, at("2025-10-05T10:00:00Z"));
        assert!(matches!(
            outcome,
            CheckInOutcome::Rejected { reason: Rejection::Expired, remaining_uses: 1 }
        ));
        assert_eq!(record_count(&pool, seeded.issued_pass_id), 0);

        let pass = DieselIssuanceRepository::new(pool)
            .find_issued_pass(seeded.issued_pass_id, expiry - Days::new(1))
            .expect("find failed")
            .expect("pass exists");
        assert_eq!(pass.status, IssuedPassStatus::Expired);
        assert!(pass.is_expired);
    }

    #[tokio::test]
    async fn unknown_issued_pass_is_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCheckInRepository::new(pool);
        let now = at("2025-10-02T14:00:00Z");

        let err = repo
            .check_in(command(Uuid::new_v4()), now, CheckInClock::default().today(now))
            .expect_err("unknown pass must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn simultaneous_scans_admit_exactly_one() {
        let (_container, pool) = setup_db().await;
        let seeded = seed_issued_pass(&pool, 3, far_future());
        let repo = Arc::new(DieselCheckInRepository::new(pool.clone()));
        let now = at("2025-10-02T14:00:00Z");
        let today = CheckInClock::default().today(now);

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let id = seeded.issued_pass_id;
                std::thread::spawn(move || repo.check_in(command(id), now, today))
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked").expect("check-in errored"))
            .filter(|o| matches!(o, CheckInOutcome::Accepted { .. }))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(record_count(&pool, seeded.issued_pass_id), 1);
    }

    #[tokio::test]
    async fn records_between_only_returns_the_window() {
        let (_container, pool) = setup_db().await;
        let seeded = seed_issued_pass(&pool, 3, far_future());
        let repo = DieselCheckInRepository::new(pool);
        let clock = CheckInClock::default();

        check_in_at(&repo, seeded.issued_pass_id, at("2025-10-02T14:00:00Z"));
        check_in_at(&repo, seeded.issued_pass_id, at("2025-10-03T14:00:00Z"));

        let (start, end) = clock.day_bounds(NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
        let records = repo
            .records_between(seeded.sub_event_id, start, end)
            .expect("query failed");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].checkin_time, at("2025-10-03T14:00:00Z"));
        assert_eq!(records[0].checkin_method, "qr_scan");
    }

    #[tokio::test]
    async fn attendee_lookup_finds_active_pass() {
        let (_container, pool) = setup_db().await;
        let seeded = seed_issued_pass(&pool, 1, far_future());
        let repo = DieselCheckInRepository::new(pool);

        let found = repo
            .find_active_pass_for_attendee(seeded.attendee_id, seeded.sub_event_id, event_day())
            .expect("query failed");
        assert_eq!(found, Some(seeded.issued_pass_id));

        let none = repo
            .find_active_pass_for_attendee(Uuid::new_v4(), seeded.sub_event_id, event_day())
            .expect("query failed");
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn attendee_lookup_skips_a_newer_lapsed_pass() {
        use crate::infrastructure::models::NewIssuedPassRow;
        use crate::schema::issued_passes;

        let (_container, pool) = setup_db().await;
        // Three-day pass bought for the festival.
        let bought = seed_issued_pass(&pool, 3, event_day() + Days::new(2));
        let pass_id: Uuid = {
            let mut conn = pool.get().expect("Failed to get connection");
            issued_passes::table
                .find(bought.issued_pass_id)
                .select(issued_passes::pass_id)
                .first(&mut conn)
                .expect("query failed")
        };

        // One-day comp handed out later, valid on the first day only.
        let comp_id = Uuid::new_v4();
        {
            let mut conn = pool.get().expect("Failed to get connection");
            diesel::insert_into(issued_passes::table)
                .values(&NewIssuedPassRow {
                    id: comp_id,
                    pass_id,
                    attendee_id: bought.attendee_id,
                    sub_event_id: bought.sub_event_id,
                    order_item_id: None,
                    sponsored_pass: true,
                    status: "active".to_string(),
                    used_count: 1,
                    expiry_date: event_day(),
                })
                .execute(&mut conn)
                .expect("insert comp pass");
            diesel::update(issued_passes::table.find(comp_id))
                .set(issued_passes::created_at.eq(Utc::now() + chrono::Duration::hours(1)))
                .execute(&mut conn)
                .expect("bump created_at");
        }
        let repo = DieselCheckInRepository::new(pool);

        let first_day = repo
            .find_active_pass_for_attendee(bought.attendee_id, bought.sub_event_id, event_day())
            .expect("query failed");
        assert_eq!(first_day, Some(comp_id));

        let second_day = event_day() + Days::new(1);
        let found = repo
            .find_active_pass_for_attendee(bought.attendee_id, bought.sub_event_id, second_day)
            .expect("query failed");
        assert_eq!(found, Some(bought.issued_pass_id));

        let outcome = check_in_at(&repo, bought.issued_pass_id, at("2025-10-03T14:00:00Z"));
        assert!(matches!(outcome, CheckInOutcome::Accepted { remaining_uses: 2, .. }));
    }
}
