use chrono::{NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::issuance::{expiry_date, IssuedPassStatus, IssuedPassView, SponsoredPassInput};
use crate::domain::ports::IssuanceRepository;
use crate::schema::{
    attendees, issued_passes, order_item_attendees, order_items, orders, pass_sub_events, passes,
    sub_events,
};

use super::models::{IssuedPassRow, NewIssuedPassRow};

/// Creates one active issued pass per purchased `(order item, attendee)`
/// link of a confirmed order. Links that already have a pass are skipped, so
/// calling this again for the same order issues nothing new.
pub(crate) fn issue_for_order(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> Result<usize, DomainError> {
    let sub_event_id: Uuid = orders::table
        .find(order_id)
        .select(orders::sub_event_id)
        .first(conn)?;
    let event_date: NaiveDate = sub_events::table
        .find(sub_event_id)
        .select(sub_events::event_date)
        .first(conn)?;

    let purchased: Vec<(Uuid, Uuid, Uuid, i32)> = order_item_attendees::table
        .inner_join(order_items::table.inner_join(passes::table))
        .filter(order_items::order_id.eq(order_id))
        .select((
            order_items::id,
            order_items::pass_id,
            order_item_attendees::attendee_id,
            passes::validity,
        ))
        .load(conn)?;

    let rows: Vec<NewIssuedPassRow> = purchased
        .into_iter()
        .map(|(order_item_id, pass_id, attendee_id, validity)| NewIssuedPassRow {
            id: Uuid::new_v4(),
            pass_id,
            attendee_id,
            sub_event_id,
            order_item_id: Some(order_item_id),
            sponsored_pass: false,
            status: IssuedPassStatus::Active.as_str().to_string(),
            used_count: validity,
            expiry_date: expiry_date(event_date, validity),
        })
        .collect();
    if rows.is_empty() {
        return Ok(0);
    }

    let issued = diesel::insert_into(issued_passes::table)
        .values(&rows)
        .on_conflict((issued_passes::order_item_id, issued_passes::attendee_id))
        .do_nothing()
        .execute(conn)?;
    if issued > 0 {
        log::info!("Issued {} passes for order {}", issued, order_id);
    }
    Ok(issued)
}

/// Persists `expired` on a pass whose expiry date is before `today`.
pub(crate) fn expire_if_lapsed(
    conn: &mut PgConnection,
    row: IssuedPassRow,
    today: NaiveDate,
) -> Result<IssuedPassRow, DomainError> {
    if !row.state()?.lapsed(today) {
        return Ok(row);
    }
    log::info!("Issued pass {} lapsed on {}, marking expired", row.id, row.expiry_date);
    Ok(diesel::update(issued_passes::table.find(row.id))
        .set((
            issued_passes::status.eq(IssuedPassStatus::Expired.as_str()),
            issued_passes::is_expired.eq(true),
            issued_passes::updated_at.eq(Utc::now()),
        ))
        .returning(IssuedPassRow::as_returning())
        .get_result(conn)?)
}

pub struct DieselIssuanceRepository {
    pool: DbPool,
}

impl DieselIssuanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl IssuanceRepository for DieselIssuanceRepository {
    fn issue_sponsored(&self, input: SponsoredPassInput) -> Result<IssuedPassView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let validity: i32 = passes::table
                .inner_join(pass_sub_events::table)
                .filter(passes::id.eq(input.pass_id))
                .filter(pass_sub_events::sub_event_id.eq(input.sub_event_id))
                .filter(passes::is_active.eq(true))
                .select(passes::validity)
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Pass for this sub-event"))?;

            let attendee_in_sub_event: bool = diesel::select(diesel::dsl::exists(
                attendees::table
                    .filter(attendees::id.eq(input.attendee_id))
                    .filter(attendees::sub_event_id.eq(input.sub_event_id)),
            ))
            .get_result(conn)?;
            if !attendee_in_sub_event {
                return Err(DomainError::not_found("Attendee for this sub-event"));
            }

            let event_date: NaiveDate = sub_events::table
                .find(input.sub_event_id)
                .select(sub_events::event_date)
                .first(conn)?;

            let row = diesel::insert_into(issued_passes::table)
                .values(&NewIssuedPassRow {
                    id: Uuid::new_v4(),
                    pass_id: input.pass_id,
                    attendee_id: input.attendee_id,
                    sub_event_id: input.sub_event_id,
                    order_item_id: None,
                    sponsored_pass: true,
                    status: IssuedPassStatus::Active.as_str().to_string(),
                    used_count: validity,
                    expiry_date: expiry_date(event_date, validity),
                })
                .returning(IssuedPassRow::as_returning())
                .get_result(conn)?;
            row.try_into()
        })
    }

    fn find_issued_pass(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<IssuedPassView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = issued_passes::table
                .find(id)
                .select(IssuedPassRow::as_select())
                .for_update()
                .get_result(conn)
                .optional()?;
            match row {
                Some(row) => Ok(Some(expire_if_lapsed(conn, row, today)?.try_into()?)),
                None => Ok(None),
            }
        })
    }
}
