use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::money;

/// The five ticket categories a sub-event can offer, at most one pass each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PassCategory {
    General,
    Vip,
    Vvip,
    Couple,
    Group,
}

impl PassCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassCategory::General => "general",
            PassCategory::Vip => "vip",
            PassCategory::Vvip => "vvip",
            PassCategory::Couple => "couple",
            PassCategory::Group => "group",
        }
    }
}

impl fmt::Display for PassCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(PassCategory::General),
            "vip" => Ok(PassCategory::Vip),
            "vvip" => Ok(PassCategory::Vvip),
            "couple" => Ok(PassCategory::Couple),
            "group" => Ok(PassCategory::Group),
            other => Err(DomainError::Internal(format!("unknown pass category '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventView {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubEvent {
    pub event_id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub quantity: i32,
}

impl NewSubEvent {
    /// Checks the schedule window and capacity, returning the initial
    /// `available_quantity`.
    pub fn initial_availability(&self) -> Result<i32, DomainError> {
        if self.quantity < 1 {
            return Err(DomainError::invalid("quantity must be at least 1"));
        }
        if self.end_time <= self.start_time {
            return Err(DomainError::invalid("end_time must be after start_time"));
        }
        Ok(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct SubEventView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub quantity: i32,
    pub available_quantity: i32,
    pub is_active: bool,
}

/// New `(quantity, available_quantity)` after an admin changes capacity.
///
/// Units already sold stay sold, so shrinking below the sold count is a
/// conflict.
pub fn resize_capacity(
    quantity: i32,
    available_quantity: i32,
    new_quantity: i32,
) -> Result<(i32, i32), DomainError> {
    if new_quantity < 1 {
        return Err(DomainError::invalid("quantity must be at least 1"));
    }
    let sold = quantity - available_quantity;
    if new_quantity < sold {
        return Err(DomainError::Conflict(format!(
            "{sold} passes already sold, capacity cannot drop to {new_quantity}"
        )));
    }
    Ok((new_quantity, new_quantity - sold))
}

#[derive(Debug, Clone)]
pub struct NewPass {
    pub category: PassCategory,
    pub total_price: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub validity: i32,
    pub sub_event_ids: Vec<Uuid>,
}

impl NewPass {
    pub fn final_price(&self) -> Result<BigDecimal, DomainError> {
        if self.validity < 1 {
            return Err(DomainError::invalid("validity must be at least 1"));
        }
        if self.sub_event_ids.is_empty() {
            return Err(DomainError::invalid("a pass must be offered for at least one sub-event"));
        }
        money::final_price(&self.total_price, &self.discount_percentage)
    }
}

#[derive(Debug, Clone)]
pub struct PassView {
    pub id: Uuid,
    pub category: PassCategory,
    pub total_price: BigDecimal,
    pub discount_percentage: BigDecimal,
    pub final_price: BigDecimal,
    pub validity: i32,
    pub is_active: bool,
}
