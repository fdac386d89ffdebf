use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::money::round2;
use super::party::AttendeeContact;

/// Per-pass cap within a single order.
pub const MAX_QUANTITY_PER_PASS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "expired" => Ok(OrderStatus::Expired),
            other => Err(DomainError::Internal(format!("unknown order status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttendeeInput {
    pub pass_id: Option<Uuid>,
    pub contact: AttendeeContact,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub sub_event_id: Uuid,
    pub billing_user_id: Uuid,
    /// Client-declared total, checked against the catalog at cent precision.
    pub total_amount: BigDecimal,
    pub attendees: Vec<AttendeeInput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassQuantity {
    pub pass_id: Uuid,
    pub quantity: i32,
}

/// Groups attendees by pass, in first-seen order.
pub fn group_by_pass(attendees: &[AttendeeInput]) -> Result<Vec<PassQuantity>, DomainError> {
    if attendees.is_empty() {
        return Err(DomainError::invalid("an order needs at least one attendee"));
    }
    let mut grouped: Vec<PassQuantity> = Vec::new();
    for (idx, attendee) in attendees.iter().enumerate() {
        let pass_id = attendee
            .pass_id
            .ok_or_else(|| DomainError::invalid(format!("attendees[{idx}] has no pass_id")))?;
        match grouped.iter_mut().find(|g| g.pass_id == pass_id) {
            Some(group) => group.quantity += 1,
            None => grouped.push(PassQuantity { pass_id, quantity: 1 }),
        }
    }
    Ok(grouped)
}

/// Catalog price of an active pass at the moment of purchase.
#[derive(Debug, Clone)]
pub struct PassQuote {
    pub pass_id: Uuid,
    pub final_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub pass_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub lines: Vec<OrderLineInput>,
    pub total: BigDecimal,
}

/// Prices the requested quantities against the loaded catalog quotes and
/// verifies the client-declared total.
pub fn price_order(
    requested: &[PassQuantity],
    quotes: &[PassQuote],
    declared_total: &BigDecimal,
) -> Result<PricedOrder, DomainError> {
    if quotes.len() != requested.len() {
        return Err(DomainError::invalid("one or more passes are invalid or inactive"));
    }

    let mut lines = Vec::with_capacity(requested.len());
    let mut total = BigDecimal::from(0);
    for wanted in requested {
        let quote = quotes
            .iter()
            .find(|q| q.pass_id == wanted.pass_id)
            .ok_or_else(|| {
                DomainError::invalid(format!("pass {} is invalid or inactive", wanted.pass_id))
            })?;
        if wanted.quantity > MAX_QUANTITY_PER_PASS {
            return Err(DomainError::invalid(format!(
                "at most {MAX_QUANTITY_PER_PASS} attendees per pass, got {} for pass {}",
                wanted.quantity, wanted.pass_id
            )));
        }
        let unit_price = round2(&quote.final_price);
        let line_total = round2(&(unit_price.clone() * BigDecimal::from(wanted.quantity)));
        total += line_total.clone();
        lines.push(OrderLineInput {
            pass_id: wanted.pass_id,
            quantity: wanted.quantity,
            unit_price,
            total_price: line_total,
        });
    }

    let total = round2(&total);
    if round2(declared_total) != total {
        return Err(DomainError::invalid(format!(
            "total_amount {} does not match calculated total {}",
            round2(declared_total),
            total
        )));
    }
    Ok(PricedOrder { lines, total })
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
    pub attendee_ids: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub billing_user_id: Uuid,
    pub sub_event_id: Uuid,
    pub admin_id: Uuid,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub gateway_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}
