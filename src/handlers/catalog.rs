use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{money_field, Catalog};
use crate::domain::catalog::{
    EventView, NewEvent, NewPass, NewSubEvent, PassCategory, PassView, SubEventView,
};
use crate::domain::principal::AdminPrincipal;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<EventView> for EventResponse {
    fn from(e: EventView) -> Self {
        Self {
            id: e.id,
            admin_id: e.admin_id,
            name: e.name,
            description: e.description,
            venue: e.venue,
            is_active: e.is_active,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubEventRequest {
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubEventResponse {
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

impl From<SubEventView> for SubEventResponse {
    fn from(s: SubEventView) -> Self {
        Self {
            id: s.id,
            event_id: s.event_id,
            name: s.name,
            event_date: s.event_date,
            start_time: s.start_time,
            end_time: s.end_time,
            quantity: s.quantity,
            available_quantity: s.available_quantity,
            is_active: s.is_active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResizeSubEventRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePassRequest {
    pub category: PassCategory,
    /// Decimal price as a string, e.g. "999.00"
    pub total_price: String,
    /// Percentage between 0 and 100. Defaults to 0.
    pub discount_percentage: Option<String>,
    /// Number of entries, at most one per day.
    pub validity: i32,
    pub sub_event_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassResponse {
    pub id: Uuid,
    pub category: PassCategory,
    pub total_price: String,
    pub discount_percentage: String,
    pub final_price: String,
    pub validity: i32,
    pub is_active: bool,
}

impl From<PassView> for PassResponse {
    fn from(p: PassView) -> Self {
        Self {
            id: p.id,
            category: p.category,
            total_price: p.total_price.to_string(),
            discount_percentage: p.discount_percentage.to_string(),
            final_price: p.final_price.to_string(),
            validity: p.validity,
            is_active: p.is_active,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing admin identity"),
    ),
    tag = "catalog"
)]
pub async fn create_event(
    service: web::Data<Catalog>,
    principal: AdminPrincipal,
    body: web::Json<CreateEventRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let event = NewEvent {
        name: body.name,
        description: body.description,
        venue: body.venue,
    };
    let created = web::block(move || service.create_event(principal, event)).await??;
    Ok(HttpResponse::Created().json(EventResponse::from(created)))
}

/// POST /events/{id}/sub-events
///
/// Adds a dated session to an event. All places start available.
#[utoipa::path(
    post,
    path = "/events/{id}/sub-events",
    params(("id" = Uuid, Path, description = "Event UUID")),
    request_body = CreateSubEventRequest,
    responses(
        (status = 201, description = "Sub-event created", body = SubEventResponse),
        (status = 400, description = "Invalid capacity or schedule"),
        (status = 404, description = "Event not found"),
    ),
    tag = "catalog"
)]
pub async fn create_sub_event(
    service: web::Data<Catalog>,
    principal: AdminPrincipal,
    path: web::Path<Uuid>,
    body: web::Json<CreateSubEventRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let sub_event = NewSubEvent {
        event_id: path.into_inner(),
        name: body.name,
        event_date: body.event_date,
        start_time: body.start_time,
        end_time: body.end_time,
        quantity: body.quantity,
    };
    let created = web::block(move || service.create_sub_event(principal, sub_event)).await??;
    Ok(HttpResponse::Created().json(SubEventResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/sub-events/{id}",
    params(("id" = Uuid, Path, description = "Sub-event UUID")),
    responses(
        (status = 200, description = "Sub-event found", body = SubEventResponse),
        (status = 404, description = "Sub-event not found"),
    ),
    tag = "catalog"
)]
pub async fn get_sub_event(
    service: web::Data<Catalog>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let sub_event = web::block(move || service.get_sub_event(id)).await??;
    Ok(HttpResponse::Ok().json(SubEventResponse::from(sub_event)))
}

/// PUT /sub-events/{id}/capacity
///
/// Changes total capacity while keeping sold places sold.
#[utoipa::path(
    put,
    path = "/sub-events/{id}/capacity",
    params(("id" = Uuid, Path, description = "Sub-event UUID")),
    request_body = ResizeSubEventRequest,
    responses(
        (status = 200, description = "Capacity updated", body = SubEventResponse),
        (status = 404, description = "Sub-event not found"),
        (status = 409, description = "More places already sold than the new capacity"),
    ),
    tag = "catalog"
)]
pub async fn resize_sub_event(
    service: web::Data<Catalog>,
    principal: AdminPrincipal,
    path: web::Path<Uuid>,
    body: web::Json<ResizeSubEventRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let quantity = body.quantity;
    let sub_event =
        web::block(move || service.resize_sub_event(principal, id, quantity)).await??;
    Ok(HttpResponse::Ok().json(SubEventResponse::from(sub_event)))
}

#[utoipa::path(
    put,
    path = "/sub-events/{id}/active",
    params(("id" = Uuid, Path, description = "Sub-event UUID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Sub-event updated", body = SubEventResponse),
        (status = 404, description = "Sub-event not found"),
    ),
    tag = "catalog"
)]
pub async fn set_sub_event_active(
    service: web::Data<Catalog>,
    principal: AdminPrincipal,
    path: web::Path<Uuid>,
    body: web::Json<SetActiveRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let active = body.is_active;
    let sub_event =
        web::block(move || service.set_sub_event_active(principal, id, active)).await??;
    Ok(HttpResponse::Ok().json(SubEventResponse::from(sub_event)))
}

#[utoipa::path(
    get,
    path = "/sub-events/{id}/passes",
    params(("id" = Uuid, Path, description = "Sub-event UUID")),
    responses(
        (status = 200, description = "Passes offered for the sub-event", body = [PassResponse]),
    ),
    tag = "catalog"
)]
pub async fn list_passes(
    service: web::Data<Catalog>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let passes = web::block(move || service.list_passes(id)).await??;
    let body: Vec<PassResponse> = passes.into_iter().map(PassResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /passes
///
/// Creates a pass and offers it for each listed sub-event. A sub-event
/// offers at most one pass per category.
#[utoipa::path(
    post,
    path = "/passes",
    request_body = CreatePassRequest,
    responses(
        (status = 201, description = "Pass created", body = PassResponse),
        (status = 400, description = "Invalid price, discount or validity"),
        (status = 404, description = "Sub-event not found"),
        (status = 409, description = "Category already offered for a sub-event"),
    ),
    tag = "catalog"
)]
pub async fn create_pass(
    service: web::Data<Catalog>,
    principal: AdminPrincipal,
    body: web::Json<CreatePassRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let pass = NewPass {
        category: body.category,
        total_price: money_field("total_price", &body.total_price)?,
        discount_percentage: money_field(
            "discount_percentage",
            body.discount_percentage.as_deref().unwrap_or("0"),
        )?,
        validity: body.validity,
        sub_event_ids: body.sub_event_ids,
    };
    let created = web::block(move || service.create_pass(principal, pass)).await??;
    Ok(HttpResponse::Created().json(PassResponse::from(created)))
}
