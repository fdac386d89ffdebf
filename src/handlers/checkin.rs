use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::CheckIns;
use crate::domain::checkin::{CheckInMethod, CheckInOutcome, CheckingRecordView, Rejection};
use crate::domain::principal::EmployeePrincipal;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub issued_pass_id: Uuid,
    #[serde(default = "default_method")]
    pub method: CheckInMethod,
    /// Gate or device label.
    pub checked_in_by: Option<String>,
}

fn default_method() -> CheckInMethod {
    CheckInMethod::QrScan
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    pub attendee_id: Uuid,
    pub sub_event_id: Uuid,
}

/// An entry decision. A refused pass is a normal outcome, not an error.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    pub valid: bool,
    pub message: String,
    pub reason: Option<Rejection>,
    pub record_id: Option<Uuid>,
    /// Entries left after this attempt.
    pub used_count: i32,
}

impl From<CheckInOutcome> for CheckInResponse {
    fn from(outcome: CheckInOutcome) -> Self {
        match outcome {
            CheckInOutcome::Accepted {
                record_id,
                remaining_uses,
            } => Self {
                valid: true,
                message: "Check-in successful".to_string(),
                reason: None,
                record_id: Some(record_id),
                used_count: remaining_uses,
            },
            CheckInOutcome::Rejected {
                reason,
                remaining_uses,
            } => Self {
                valid: false,
                message: reason.message().to_string(),
                reason: Some(reason),
                record_id: None,
                used_count: remaining_uses,
            },
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TodayParams {
    pub sub_event_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckingRecordResponse {
    pub id: Uuid,
    pub issued_pass_id: Uuid,
    pub employee_id: Uuid,
    pub sub_event_id: Uuid,
    pub checkin_time: DateTime<Utc>,
    pub checkin_day: NaiveDate,
    pub checkin_method: String,
    pub checked_in_by: Option<String>,
}

impl From<CheckingRecordView> for CheckingRecordResponse {
    fn from(r: CheckingRecordView) -> Self {
        Self {
            id: r.id,
            issued_pass_id: r.issued_pass_id,
            employee_id: r.employee_id,
            sub_event_id: r.sub_event_id,
            checkin_time: r.checkin_time,
            checkin_day: r.checkin_day,
            checkin_method: r.checkin_method,
            checked_in_by: r.checked_in_by,
        }
    }
}

/// POST /checkin/issued-pass
///
/// Admits the holder of an issued pass, at most once per day.
#[utoipa::path(
    post,
    path = "/checkin/issued-pass",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Entry decision", body = CheckInResponse),
        (status = 401, description = "Missing employee identity"),
        (status = 404, description = "Issued pass not found"),
    ),
    tag = "checkin"
)]
pub async fn check_in(
    service: web::Data<CheckIns>,
    employee: EmployeePrincipal,
    body: web::Json<CheckInRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let outcome = web::block(move || {
        service.check_in(employee, body.issued_pass_id, body.method, body.checked_in_by)
    })
    .await??;
    Ok(HttpResponse::Ok().json(CheckInResponse::from(outcome)))
}

/// POST /checkin/scan
///
/// Admits an attendee on their most recent active pass for the sub-event.
#[utoipa::path(
    post,
    path = "/checkin/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Entry decision", body = CheckInResponse),
        (status = 404, description = "No active pass for the attendee"),
    ),
    tag = "checkin"
)]
pub async fn scan(
    service: web::Data<CheckIns>,
    employee: EmployeePrincipal,
    body: web::Json<ScanRequest>,
) -> Result<HttpResponse, AppError> {
    let ScanRequest {
        attendee_id,
        sub_event_id,
    } = body.into_inner();
    let outcome = web::block(move || service.scan(employee, attendee_id, sub_event_id)).await??;
    Ok(HttpResponse::Ok().json(CheckInResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/checkin/today",
    params(("sub_event_id" = Uuid, Query, description = "Sub-event UUID")),
    responses(
        (status = 200, description = "Check-ins recorded today", body = [CheckingRecordResponse]),
    ),
    tag = "checkin"
)]
pub async fn todays_check_ins(
    service: web::Data<CheckIns>,
    _employee: EmployeePrincipal,
    query: web::Query<TodayParams>,
) -> Result<HttpResponse, AppError> {
    let sub_event_id = query.sub_event_id;
    let records = web::block(move || service.todays_check_ins(sub_event_id)).await??;
    let body: Vec<CheckingRecordResponse> =
        records.into_iter().map(CheckingRecordResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
