use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{EventView, PassView, SubEventView};
use crate::domain::checkin::{CheckingRecordView, PassState};
use crate::domain::errors::DomainError;
use crate::domain::issuance::IssuedPassView;
use crate::domain::payment::TransactionView;
use crate::schema::{
    attendees, billing_users, checking_records, events, issued_passes, order_item_attendees,
    order_items, orders, pass_sub_events, passes, sub_events, transactions,
};

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for EventView {
    fn from(row: EventRow) -> Self {
        EventView {
            id: row.id,
            admin_id: row.admin_id,
            name: row.name,
            description: row.description,
            venue: row.venue,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEventRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sub_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubEventRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub quantity: i32,
    pub available_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubEventRow> for SubEventView {
    fn from(row: SubEventRow) -> Self {
        SubEventView {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            event_date: row.event_date,
            start_time: row.start_time,
            end_time: row.end_time,
            quantity: row.quantity,
            available_quantity: row.available_quantity,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sub_events)]
pub struct NewSubEventRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub quantity: i32,
    pub available_quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = passes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PassRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub category: String,
    pub total_price: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
    pub validity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PassRow> for PassView {
    type Error = DomainError;

    fn try_from(row: PassRow) -> Result<Self, Self::Error> {
        Ok(PassView {
            id: row.id,
            category: row.category.parse()?,
            total_price: row.total_price,
            discount_percentage: row.discount_percentage,
            final_price: row.final_price,
            validity: row.validity,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = passes)]
pub struct NewPassRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub category: String,
    pub total_price: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
    pub validity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pass_sub_events)]
pub struct NewPassSubEventRow {
    pub pass_id: Uuid,
    pub sub_event_id: Uuid,
    pub category: String,
}

// ── Parties ──────────────────────────────────────────────────────────────────

#[derive(Debug, Insertable)]
#[diesel(table_name = billing_users)]
pub struct NewBillingUserRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub mobile_no: String,
    pub whatsapp_no: String,
    pub email: String,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = attendees)]
pub struct NewAttendeeRow {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub sub_event_id: Uuid,
    pub name: String,
    pub whatsapp_no: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub billing_user_id: Uuid,
    pub sub_event_id: Uuid,
    pub admin_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: String,
    pub gateway_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub billing_user_id: Uuid,
    pub sub_event_id: Uuid,
    pub admin_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub pass_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub pass_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = order_item_attendees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemAttendeeRow {
    pub order_item_id: Uuid,
    pub attendee_id: Uuid,
}

// ── Payments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub merchant_order_id: String,
    pub amount: BigDecimal,
    pub status: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_response: Option<Value>,
    pub refund_amount: BigDecimal,
    pub callback_received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionView {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(TransactionView {
            id: row.id,
            order_id: row.order_id,
            merchant_order_id: row.merchant_order_id,
            amount: row.amount,
            status: row.status.parse()?,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            refund_amount: row.refund_amount,
            callback_received_at: row.callback_received_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransactionRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub merchant_order_id: String,
    pub amount: BigDecimal,
    pub status: String,
}

// ── Issuance & check-in ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = issued_passes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IssuedPassRow {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
    pub order_item_id: Option<Uuid>,
    pub sponsored_pass: bool,
    pub status: String,
    pub used_count: i32,
    pub expiry_date: NaiveDate,
    pub is_expired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IssuedPassRow {
    pub fn state(&self) -> Result<PassState, DomainError> {
        Ok(PassState {
            status: self.status.parse()?,
            used_count: self.used_count,
            expiry_date: self.expiry_date,
            is_expired: self.is_expired,
        })
    }
}

impl TryFrom<IssuedPassRow> for IssuedPassView {
    type Error = DomainError;

    fn try_from(row: IssuedPassRow) -> Result<Self, Self::Error> {
        Ok(IssuedPassView {
            id: row.id,
            pass_id: row.pass_id,
            attendee_id: row.attendee_id,
            sub_event_id: row.sub_event_id,
            order_item_id: row.order_item_id,
            sponsored_pass: row.sponsored_pass,
            status: row.status.parse()?,
            used_count: row.used_count,
            expiry_date: row.expiry_date,
            is_expired: row.is_expired,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = issued_passes)]
pub struct NewIssuedPassRow {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
    pub order_item_id: Option<Uuid>,
    pub sponsored_pass: bool,
    pub status: String,
    pub used_count: i32,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = checking_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CheckingRecordRow {
    pub id: Uuid,
    pub issued_pass_id: Uuid,
    pub employee_id: Uuid,
    pub sub_event_id: Uuid,
    pub checkin_time: DateTime<Utc>,
    pub checkin_day: NaiveDate,
    pub checkin_method: String,
    pub checked_in_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CheckingRecordRow> for CheckingRecordView {
    fn from(row: CheckingRecordRow) -> Self {
        CheckingRecordView {
            id: row.id,
            issued_pass_id: row.issued_pass_id,
            employee_id: row.employee_id,
            sub_event_id: row.sub_event_id,
            checkin_time: row.checkin_time,
            checkin_day: row.checkin_day,
            checkin_method: row.checkin_method,
            checked_in_by: row.checked_in_by,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = checking_records)]
pub struct NewCheckingRecordRow {
    pub id: Uuid,
    pub issued_pass_id: Uuid,
    pub employee_id: Uuid,
    pub sub_event_id: Uuid,
    pub checkin_time: DateTime<Utc>,
    pub checkin_day: NaiveDate,
    pub checkin_method: String,
    pub checked_in_by: Option<String>,
}
