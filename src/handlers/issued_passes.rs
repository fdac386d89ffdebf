use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Issuance;
use crate::domain::issuance::{IssuedPassStatus, IssuedPassView, SponsoredPassInput};
use crate::domain::principal::AdminPrincipal;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SponsoredPassRequest {
    pub pass_id: Uuid,
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedPassResponse {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
    pub order_item_id: Option<Uuid>,
    pub sponsored_pass: bool,
    pub status: IssuedPassStatus,
    /// Entries left.
    pub used_count: i32,
    pub expiry_date: NaiveDate,
    pub is_expired: bool,
}

impl From<IssuedPassView> for IssuedPassResponse {
    fn from(p: IssuedPassView) -> Self {
        Self {
            id: p.id,
            pass_id: p.pass_id,
            attendee_id: p.attendee_id,
            sub_event_id: p.sub_event_id,
            order_item_id: p.order_item_id,
            sponsored_pass: p.sponsored_pass,
            status: p.status,
            used_count: p.used_count,
            expiry_date: p.expiry_date,
            is_expired: p.is_expired,
        }
    }
}

/// POST /issued-passes/sponsored
///
/// Issues a complimentary pass without an order.
#[utoipa::path(
    post,
    path = "/issued-passes/sponsored",
    request_body = SponsoredPassRequest,
    responses(
        (status = 201, description = "Pass issued", body = IssuedPassResponse),
        (status = 404, description = "Pass or attendee not found for the sub-event"),
    ),
    tag = "issued-passes"
)]
pub async fn issue_sponsored(
    service: web::Data<Issuance>,
    principal: AdminPrincipal,
    body: web::Json<SponsoredPassRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = SponsoredPassInput {
        pass_id: body.pass_id,
        attendee_id: body.attendee_id,
        sub_event_id: body.sub_event_id,
    };
    let issued = web::block(move || service.issue_sponsored(principal, input)).await??;
    Ok(HttpResponse::Created().json(IssuedPassResponse::from(issued)))
}

#[utoipa::path(
    get,
    path = "/issued-passes/{id}",
    params(("id" = Uuid, Path, description = "Issued pass UUID")),
    responses(
        (status = 200, description = "Issued pass found", body = IssuedPassResponse),
        (status = 404, description = "Issued pass not found"),
    ),
    tag = "issued-passes"
)]
pub async fn get_issued_pass(
    service: web::Data<Issuance>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let pass = web::block(move || service.get_issued_pass(id)).await??;
    Ok(HttpResponse::Ok().json(IssuedPassResponse::from(pass)))
}
