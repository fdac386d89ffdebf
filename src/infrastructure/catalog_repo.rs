use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::{
    resize_capacity, EventView, NewEvent, NewPass, NewSubEvent, PassView, SubEventView,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{events, pass_sub_events, passes, sub_events};

use super::models::{
    EventRow, NewEventRow, NewPassRow, NewPassSubEventRow, NewSubEventRow, PassRow, SubEventRow,
};
use super::violated_constraint;

const CATEGORY_PER_SUB_EVENT: &str = "pass_sub_events_category_unique";

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn create_event(&self, admin_id: Uuid, event: NewEvent) -> Result<EventView, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(events::table)
            .values(&NewEventRow {
                id: Uuid::new_v4(),
                admin_id,
                name: event.name,
                description: event.description,
                venue: event.venue,
            })
            .returning(EventRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn create_sub_event(
        &self,
        sub_event: NewSubEvent,
        available_quantity: i32,
    ) -> Result<SubEventView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let event_exists: bool =
                diesel::select(diesel::dsl::exists(events::table.find(sub_event.event_id)))
                    .get_result(conn)?;
            if !event_exists {
                return Err(DomainError::not_found("Event"));
            }

            let row = diesel::insert_into(sub_events::table)
                .values(&NewSubEventRow {
                    id: Uuid::new_v4(),
                    event_id: sub_event.event_id,
                    name: sub_event.name,
                    event_date: sub_event.event_date,
                    start_time: sub_event.start_time,
                    end_time: sub_event.end_time,
                    quantity: sub_event.quantity,
                    available_quantity,
                })
                .returning(SubEventRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
    }

    fn find_sub_event(&self, id: Uuid) -> Result<Option<SubEventView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = sub_events::table
            .find(id)
            .select(SubEventRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn resize_sub_event(&self, id: Uuid, quantity: i32) -> Result<SubEventView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let current = sub_events::table
                .find(id)
                .select(SubEventRow::as_select())
                .for_update()
                .get_result(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Sub-event"))?;

            let (quantity, available_quantity) =
                resize_capacity(current.quantity, current.available_quantity, quantity)?;

            let row = diesel::update(sub_events::table.find(id))
                .set((
                    sub_events::quantity.eq(quantity),
                    sub_events::available_quantity.eq(available_quantity),
                    sub_events::updated_at.eq(Utc::now()),
                ))
                .returning(SubEventRow::as_returning())
                .get_result(conn)?;
            Ok(row.into())
        })
    }

    fn set_sub_event_active(&self, id: Uuid, active: bool) -> Result<SubEventView, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(sub_events::table.find(id))
            .set((
                sub_events::is_active.eq(active),
                sub_events::updated_at.eq(Utc::now()),
            ))
            .returning(SubEventRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("Sub-event"))
    }

    fn create_pass(
        &self,
        admin_id: Uuid,
        pass: NewPass,
        final_price: BigDecimal,
    ) -> Result<PassView, DomainError> {
        let mut conn = self.pool.get()?;

        let mut sub_event_ids = pass.sub_event_ids.clone();
        sub_event_ids.sort();
        sub_event_ids.dedup();

        conn.transaction::<_, DomainError, _>(|conn| {
            let found: i64 = sub_events::table
                .filter(sub_events::id.eq_any(&sub_event_ids))
                .count()
                .get_result(conn)?;
            if found != sub_event_ids.len() as i64 {
                return Err(DomainError::not_found("Sub-event"));
            }

            let row = diesel::insert_into(passes::table)
                .values(&NewPassRow {
                    id: Uuid::new_v4(),
                    admin_id,
                    category: pass.category.as_str().to_string(),
                    total_price: pass.total_price,
                    discount_percentage: pass.discount_percentage,
                    final_price,
                    validity: pass.validity,
                })
                .returning(PassRow::as_returning())
                .get_result(conn)?;

            let links: Vec<NewPassSubEventRow> = sub_event_ids
                .iter()
                .map(|&sub_event_id| NewPassSubEventRow {
                    pass_id: row.id,
                    sub_event_id,
                    category: pass.category.as_str().to_string(),
                })
                .collect();
            diesel::insert_into(pass_sub_events::table)
                .values(&links)
                .execute(conn)
                .map_err(|e| match violated_constraint(&e) {
                    Some(CATEGORY_PER_SUB_EVENT) => DomainError::Conflict(format!(
                        "a {} pass already exists for this sub-event",
                        pass.category
                    )),
                    _ => DomainError::from(e),
                })?;

            row.try_into()
        })
    }

    fn list_passes(&self, sub_event_id: Uuid) -> Result<Vec<PassView>, DomainError> {
        let mut conn = self.pool.get()?;
        passes::table
            .inner_join(pass_sub_events::table)
            .filter(pass_sub_events::sub_event_id.eq(sub_event_id))
            .select(PassRow::as_select())
            .order(passes::final_price.asc())
            .load(&mut conn)?
            .into_iter()
            .map(PassView::try_from)
            .collect()
    }
}
