use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Billing;
use crate::domain::party::BillingContact;
use crate::domain::principal::AdminPrincipal;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterBillingUserRequest {
    pub name: String,
    pub mobile_no: String,
    /// Defaults to `mobile_no`.
    pub whatsapp_no: Option<String>,
    pub email: String,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillingUserResponse {
    pub id: Uuid,
    /// False when an existing user with the same mobile number and email was returned.
    pub created: bool,
}

#[utoipa::path(
    post,
    path = "/billing-users",
    request_body = RegisterBillingUserRequest,
    responses(
        (status = 201, description = "Billing user registered", body = BillingUserResponse),
        (status = 200, description = "Existing billing user returned", body = BillingUserResponse),
        (status = 400, description = "Missing contact details"),
    ),
    tag = "billing"
)]
pub async fn register_billing_user(
    service: web::Data<Billing>,
    principal: AdminPrincipal,
    body: web::Json<RegisterBillingUserRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let contact = BillingContact {
        whatsapp_no: body.whatsapp_no.unwrap_or_else(|| body.mobile_no.clone()),
        name: body.name,
        mobile_no: body.mobile_no,
        email: body.email,
        address: body.address,
        dob: body.dob,
        gender: body.gender,
    };
    let user = web::block(move || service.register(principal, contact)).await??;
    let response = BillingUserResponse {
        id: user.id,
        created: user.created,
    };
    if user.created {
        Ok(HttpResponse::Created().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}
