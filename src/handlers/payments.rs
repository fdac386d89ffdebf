use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::orders::OrderResponse;
use super::Payments;
use crate::domain::order::OrderStatus;
use crate::domain::payment::{ReconcileOutcome, TransactionStatus, TransactionView};
use crate::domain::principal::AdminPrincipal;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiatePaymentRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InitiatePaymentResponse {
    pub transaction_id: Uuid,
    pub merchant_order_id: String,
    pub amount: String,
    /// Gateway checkout page to send the payer to.
    pub redirect_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub merchant_order_id: String,
    pub amount: String,
    pub status: TransactionStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub refund_amount: String,
    pub callback_received_at: Option<DateTime<Utc>>,
}

impl From<TransactionView> for TransactionResponse {
    fn from(t: TransactionView) -> Self {
        Self {
            id: t.id,
            order_id: t.order_id,
            merchant_order_id: t.merchant_order_id,
            amount: t.amount.to_string(),
            status: t.status,
            gateway_order_id: t.gateway_order_id,
            gateway_payment_id: t.gateway_payment_id,
            refund_amount: t.refund_amount.to_string(),
            callback_received_at: t.callback_received_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileResponse {
    pub transaction: TransactionResponse,
    pub order_status: OrderStatus,
    pub issued_passes: usize,
}

impl From<ReconcileOutcome> for ReconcileResponse {
    fn from(o: ReconcileOutcome) -> Self {
        Self {
            transaction: o.transaction.into(),
            order_status: o.order_status,
            issued_passes: o.issued_passes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForceConfirmParams {
    pub transaction_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForceConfirmResponse {
    pub transaction: TransactionResponse,
    pub order: OrderResponse,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /payment/initiate
///
/// Opens (or reuses) the pending transaction of an order and starts a
/// gateway checkout for it.
#[utoipa::path(
    post,
    path = "/payment/initiate",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Checkout started", body = InitiatePaymentResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not pending"),
        (status = 502, description = "Payment gateway failure"),
    ),
    tag = "payments"
)]
pub async fn initiate_payment(
    service: web::Data<Payments>,
    principal: AdminPrincipal,
    body: web::Json<InitiatePaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let started = service.initiate(principal, body.order_id).await?;
    Ok(HttpResponse::Ok().json(InitiatePaymentResponse {
        transaction_id: started.transaction_id,
        merchant_order_id: started.merchant_order_id,
        amount: started.amount.to_string(),
        redirect_url: started.redirect_url,
    }))
}

/// POST /payment/phonepe/callback
///
/// Gateway server-to-server notification. Always acknowledged with 200 so
/// the gateway does not retry; failures are only logged.
#[utoipa::path(
    post,
    path = "/payment/phonepe/callback",
    request_body(content = String, description = "Raw PhonePe callback JSON"),
    responses(
        (status = 200, description = "Callback acknowledged"),
    ),
    tag = "payments"
)]
pub async fn phonepe_callback(
    service: web::Data<Payments>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match service.handle_callback(authorization, &body).await {
        Ok(outcome) => log::info!(
            "Callback for {} handled: transaction {}, order {}",
            outcome.transaction.merchant_order_id,
            outcome.transaction.status,
            outcome.order_status
        ),
        Err(e) => log::error!("PhonePe callback failed: {}", e),
    }
    HttpResponse::Ok().json(json!({ "success": true }))
}

/// POST /payment/{merchant_order_id}/sync
///
/// Polls the gateway for the order status and reconciles it, for
/// transactions whose callback never arrived.
#[utoipa::path(
    post,
    path = "/payment/{merchant_order_id}/sync",
    params(
        ("merchant_order_id" = String, Path, description = "Merchant order id sent to the gateway")
    ),
    responses(
        (status = 200, description = "Transaction reconciled", body = ReconcileResponse),
        (status = 404, description = "Transaction not found"),
        (status = 502, description = "Payment gateway failure"),
    ),
    tag = "payments"
)]
pub async fn sync_payment(
    service: web::Data<Payments>,
    principal: AdminPrincipal,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.sync_status(principal, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ReconcileResponse::from(outcome)))
}

/// GET /payment/status?transactionId=
///
/// Manually marks a transaction successful and confirms its order.
#[utoipa::path(
    get,
    path = "/payment/status",
    params(("transactionId" = Uuid, Query, description = "Transaction UUID")),
    responses(
        (status = 200, description = "Transaction confirmed", body = ForceConfirmResponse),
        (status = 404, description = "Transaction not found"),
    ),
    tag = "payments"
)]
pub async fn force_confirm(
    service: web::Data<Payments>,
    principal: AdminPrincipal,
    query: web::Query<ForceConfirmParams>,
) -> Result<HttpResponse, AppError> {
    let confirmed = service
        .force_confirm(principal, query.transaction_id)
        .await?;
    Ok(HttpResponse::Ok().json(ForceConfirmResponse {
        transaction: confirmed.transaction.into(),
        order: confirmed.order.into(),
    }))
}
