use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    group_by_pass, price_order, CreateOrderInput, ListResult, OrderItemView, OrderStatus,
    OrderView, PassQuote,
};
use crate::domain::party::AttendeeContact;
use crate::domain::ports::OrderRepository;
use crate::schema::{
    attendees, billing_users, order_item_attendees, order_items, orders, pass_sub_events, passes,
    sub_events,
};

use super::models::{
    NewAttendeeRow, NewOrderItemRow, NewOrderRow, OrderItemAttendeeRow, OrderItemRow, OrderRow,
    SubEventRow,
};

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, admin_id: Uuid, input: CreateOrderInput) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the sub-event row until commit so concurrent orders
            //    serialize on its capacity.
            let sub_event = sub_events::table
                .find(input.sub_event_id)
                .select(SubEventRow::as_select())
                .for_update()
                .get_result(conn)
                .optional()?
                .filter(|s| s.is_active)
                .ok_or_else(|| DomainError::not_found("Sub-event"))?;

            // 2. Capacity
            let requested = i32::try_from(input.attendees.len())
                .map_err(|_| DomainError::invalid("too many attendees"))?;
            if sub_event.available_quantity < requested {
                return Err(DomainError::Conflict(format!(
                    "only {} passes left for this sub-event, {} requested",
                    sub_event.available_quantity, requested
                )));
            }

            // 3. Quantities per pass
            let grouped = group_by_pass(&input.attendees)?;

            let billing_user_exists: bool = diesel::select(diesel::dsl::exists(
                billing_users::table.find(input.billing_user_id),
            ))
            .get_result(conn)?;
            if !billing_user_exists {
                return Err(DomainError::not_found("Billing user"));
            }

            // 4. Active passes offered for this sub-event
            let pass_ids: Vec<Uuid> = grouped.iter().map(|g| g.pass_id).collect();
            let quotes: Vec<PassQuote> = passes::table
                .inner_join(pass_sub_events::table)
                .filter(pass_sub_events::sub_event_id.eq(sub_event.id))
                .filter(passes::id.eq_any(&pass_ids))
                .filter(passes::is_active.eq(true))
                .select((passes::id, passes::final_price))
                .load::<(Uuid, BigDecimal)>(conn)?
                .into_iter()
                .map(|(pass_id, final_price)| PassQuote { pass_id, final_price })
                .collect();

            // 5–6. Per-pass cap and declared total
            let priced = price_order(&grouped, &quotes, &input.total_amount)?;

            // 7. Order
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    billing_user_id: input.billing_user_id,
                    sub_event_id: sub_event.id,
                    admin_id,
                    total_amount: priced.total.clone(),
                    status: OrderStatus::Pending.as_str().to_string(),
                })
                .execute(conn)?;

            // 8. One item per pass with the price snapshot
            let items: Vec<NewOrderItemRow> = priced
                .lines
                .iter()
                .map(|l| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    pass_id: l.pass_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.clone(),
                    total_price: l.total_price.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            // 9. Attendees, deduplicated per sub-event, linked to their item
            for (idx, attendee) in input.attendees.into_iter().enumerate() {
                let item_id = attendee
                    .pass_id
                    .and_then(|pass_id| items.iter().find(|i| i.pass_id == pass_id))
                    .map(|i| i.id)
                    .ok_or_else(|| {
                        DomainError::invalid(format!("attendees[{idx}] matches no order item"))
                    })?;
                let attendee_id =
                    upsert_attendee(conn, admin_id, sub_event.id, attendee.contact.normalized())?;
                diesel::insert_into(order_item_attendees::table)
                    .values(&OrderItemAttendeeRow {
                        order_item_id: item_id,
                        attendee_id,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)?;
            }

            // 10. Inventory
            diesel::update(sub_events::table.find(sub_event.id))
                .set((
                    sub_events::available_quantity.eq(sub_events::available_quantity - requested),
                    sub_events::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

            log::info!(
                "Order {} created for sub-event {}: {} attendees, total {}",
                order_id,
                sub_event.id,
                requested,
                priced.total
            );
            Ok(order_id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_order_view(&mut conn, id)
    }

    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| DomainError::invalid("page is out of range"))?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| order_view(o, vec![]))
                    .collect::<Result<_, _>>()?,
                total,
            })
        })
    }
}

/// Finds the attendee by its normalized `(whatsapp_no, email)` within the
/// sub-event, creating it if absent.
fn upsert_attendee(
    conn: &mut PgConnection,
    admin_id: Uuid,
    sub_event_id: Uuid,
    contact: AttendeeContact,
) -> Result<Uuid, DomainError> {
    diesel::insert_into(attendees::table)
        .values(&NewAttendeeRow {
            id: Uuid::new_v4(),
            admin_id,
            sub_event_id,
            name: contact.name,
            whatsapp_no: contact.whatsapp_no.clone(),
            email: contact.email.clone(),
            dob: contact.dob,
            gender: contact.gender,
        })
        .on_conflict((
            attendees::whatsapp_no,
            attendees::email,
            attendees::sub_event_id,
        ))
        .do_nothing()
        .execute(conn)?;

    Ok(attendees::table
        .filter(attendees::whatsapp_no.eq(&contact.whatsapp_no))
        .filter(attendees::email.eq(&contact.email))
        .filter(attendees::sub_event_id.eq(sub_event_id))
        .select(attendees::id)
        .first(conn)?)
}

fn order_view(row: OrderRow, items: Vec<OrderItemView>) -> Result<OrderView, DomainError> {
    Ok(OrderView {
        id: row.id,
        billing_user_id: row.billing_user_id,
        sub_event_id: row.sub_event_id,
        admin_id: row.admin_id,
        total_amount: row.total_amount,
        status: row.status.parse()?,
        gateway_order_id: row.gateway_order_id,
        created_at: row.created_at,
        items,
    })
}

/// Loads an order with its items and linked attendees.
pub(crate) fn load_order_view(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<OrderView>, DomainError> {
    let order = orders::table
        .filter(orders::id.eq(id))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    let Some(order) = order else {
        return Ok(None);
    };

    let items = order_items::table
        .filter(order_items::order_id.eq(order.id))
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?;
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let links = order_item_attendees::table
        .filter(order_item_attendees::order_item_id.eq_any(&item_ids))
        .select(OrderItemAttendeeRow::as_select())
        .load(conn)?;

    let items = items
        .into_iter()
        .map(|i| OrderItemView {
            attendee_ids: links
                .iter()
                .filter(|l| l.order_item_id == i.id)
                .map(|l| l.attendee_id)
                .collect(),
            id: i.id,
            pass_id: i.pass_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
            total_price: i.total_price,
        })
        .collect();

    Ok(Some(order_view(order, items)?))
}
