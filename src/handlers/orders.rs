use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{money_field, Orders};
use crate::application::order_service::DEFAULT_PAGE_SIZE;
use crate::domain::order::{AttendeeInput, CreateOrderInput, OrderStatus, OrderView};
use crate::domain::party::AttendeeContact;
use crate::domain::principal::AdminPrincipal;
use crate::errors::{AppError, FieldErrors};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendeeRequest {
    pub pass_id: Option<Uuid>,
    pub name: String,
    pub whatsapp_no: String,
    pub email: String,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub sub_event_id: Uuid,
    pub billing_user_id: Uuid,
    /// Client-computed total as a decimal string, e.g. "1998.00"
    pub total_amount: String,
    pub attendees: Vec<AttendeeRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    pub total_price: String,
    pub attendee_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub billing_user_id: Uuid,
    pub sub_event_id: Uuid,
    pub admin_id: Uuid,
    pub total_amount: String,
    pub status: OrderStatus,
    pub gateway_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            billing_user_id: o.billing_user_id,
            sub_event_id: o.sub_event_id,
            admin_id: o.admin_id,
            total_amount: o.total_amount.to_string(),
            status: o.status,
            gateway_order_id: o.gateway_order_id,
            created_at: o.created_at,
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    pass_id: i.pass_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.to_string(),
                    total_price: i.total_price.to_string(),
                    attendee_ids: i.attendee_ids,
                })
                .collect(),
        }
    }
}

impl CreateOrderRequest {
    fn into_input(self) -> Result<CreateOrderInput, AppError> {
        let mut fields = FieldErrors::new();
        if self.attendees.is_empty() {
            fields.insert(
                "attendees".to_string(),
                "at least one attendee is required".to_string(),
            );
        }
        for (i, a) in self.attendees.iter().enumerate() {
            if a.pass_id.is_none() {
                fields.insert(format!("attendees[{i}].pass_id"), "is required".to_string());
            }
            if a.name.trim().is_empty() {
                fields.insert(format!("attendees[{i}].name"), "is required".to_string());
            }
            if a.whatsapp_no.trim().is_empty() {
                fields.insert(
                    format!("attendees[{i}].whatsapp_no"),
                    "is required".to_string(),
                );
            }
            if !a.email.contains('@') {
                fields.insert(
                    format!("attendees[{i}].email"),
                    "is not an email address".to_string(),
                );
            }
        }
        if !fields.is_empty() {
            return Err(AppError::BadRequest {
                message: "invalid order request".to_string(),
                fields,
            });
        }

        Ok(CreateOrderInput {
            sub_event_id: self.sub_event_id,
            billing_user_id: self.billing_user_id,
            total_amount: money_field("total_amount", &self.total_amount)?,
            attendees: self
                .attendees
                .into_iter()
                .map(|a| AttendeeInput {
                    pass_id: a.pass_id,
                    contact: AttendeeContact {
                        name: a.name,
                        whatsapp_no: a.whatsapp_no,
                        email: a.email,
                        dob: a.dob,
                        gender: a.gender,
                    },
                })
                .collect(),
        })
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /order/create
///
/// Reserves places on a sub-event and records a pending order. The order,
/// its items, attendee links and the capacity decrement commit together or
/// not at all.
#[utoipa::path(
    post,
    path = "/order/create",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid request or price mismatch"),
        (status = 404, description = "Sub-event or billing user not found"),
        (status = 409, description = "Not enough places left"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<Orders>,
    principal: AdminPrincipal,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_input()?;
    let id = web::block(move || service.create_order(principal, input)).await??;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /orders/{id}
///
/// Returns the order together with its items and attendee links.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<Orders>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || service.get_order(order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their items).
/// Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<Orders>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || service.list_orders(page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}
