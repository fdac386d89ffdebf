//! Payment gateway state mapping and reconciliation rules.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{OrderStatus, OrderView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failure,
    Refund,
    PartialRefund,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failure => "failure",
            TransactionStatus::Refund => "refund",
            TransactionStatus::PartialRefund => "partial_refund",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failure" => Ok(TransactionStatus::Failure),
            "refund" => Ok(TransactionStatus::Refund),
            "partial_refund" => Ok(TransactionStatus::PartialRefund),
            other => Err(DomainError::Internal(format!(
                "unknown transaction status '{other}'"
            ))),
        }
    }
}

/// Order state as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayState {
    Completed,
    Failed,
    Pending,
    Unrecognized(String),
}

impl GatewayState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" | "success" => GatewayState::Completed,
            "failed" | "cancelled" | "timeout" => GatewayState::Failed,
            "pending" | "in_progress" => GatewayState::Pending,
            _ => GatewayState::Unrecognized(raw.to_string()),
        }
    }

    /// Internal transaction status and, for terminal states, the order status.
    pub fn reconciliation(&self) -> Reconciliation {
        match self {
            GatewayState::Completed => Reconciliation {
                transaction_status: TransactionStatus::Success,
                order_status: Some(OrderStatus::Confirmed),
            },
            GatewayState::Failed => Reconciliation {
                transaction_status: TransactionStatus::Failure,
                order_status: Some(OrderStatus::Cancelled),
            },
            GatewayState::Pending | GatewayState::Unrecognized(_) => Reconciliation {
                transaction_status: TransactionStatus::Pending,
                order_status: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub transaction_status: TransactionStatus,
    pub order_status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileDecision {
    /// First arrival of this state.
    Apply,
    /// Duplicate delivery of the terminal state already stored.
    Reapply,
    /// The stored state is terminal and the incoming one disagrees.
    Ignore,
}

/// Terminal transaction states are sticky.
pub fn decide(current: TransactionStatus, incoming: &Reconciliation) -> ReconcileDecision {
    if !current.is_terminal() {
        ReconcileDecision::Apply
    } else if current == incoming.transaction_status {
        ReconcileDecision::Reapply
    } else {
        ReconcileDecision::Ignore
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub merchant_order_id: String,
    pub amount_minor_units: i64,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    pub gateway_order_id: Option<String>,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct GatewayOrderStatus {
    pub state: GatewayState,
    pub gateway_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct CallbackPayload {
    pub merchant_order_id: String,
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct GatewayStatusUpdate {
    pub reconciliation: Reconciliation,
    pub payment_id: Option<String>,
    pub raw_response: Value,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TransactionView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub merchant_order_id: String,
    pub amount: BigDecimal,
    pub status: TransactionStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub refund_amount: BigDecimal,
    pub callback_received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PendingPayment {
    pub transaction: TransactionView,
    pub order_status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub transaction: TransactionView,
    pub order_status: OrderStatus,
    pub decision: ReconcileDecision,
    /// The order moved to `confirmed` in this call.
    pub newly_confirmed: bool,
    pub issued_passes: usize,
    pub billing_email: String,
}

#[derive(Debug, Clone)]
pub struct ForcedConfirmation {
    pub transaction: TransactionView,
    pub order: OrderView,
    pub issued_passes: usize,
    pub billing_email: String,
    pub newly_confirmed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_states_map_per_reconciliation_table() {
        let completed = GatewayState::parse("COMPLETED").reconciliation();
        assert_eq!(completed.transaction_status, TransactionStatus::Success);
        assert_eq!(completed.order_status, Some(OrderStatus::Confirmed));

        for raw in ["FAILED", "cancelled", "TIMEOUT"] {
            let failed = GatewayState::parse(raw).reconciliation();
            assert_eq!(failed.transaction_status, TransactionStatus::Failure);
            assert_eq!(failed.order_status, Some(OrderStatus::Cancelled));
        }

        let pending = GatewayState::parse("in_progress").reconciliation();
        assert_eq!(pending.transaction_status, TransactionStatus::Pending);
        assert_eq!(pending.order_status, None);
    }

    #[test]
    fn unrecognized_state_stays_pending() {
        let state = GatewayState::parse("AUTHORIZED_MAYBE");
        assert_eq!(state, GatewayState::Unrecognized("AUTHORIZED_MAYBE".to_string()));
        assert_eq!(state.reconciliation().order_status, None);
        assert_eq!(
            state.reconciliation().transaction_status,
            TransactionStatus::Pending
        );
    }

    #[test]
    fn terminal_states_are_sticky() {
        let success = GatewayState::Completed.reconciliation();
        let failure = GatewayState::Failed.reconciliation();
        let pending = GatewayState::Pending.reconciliation();

        assert_eq!(decide(TransactionStatus::Pending, &success), ReconcileDecision::Apply);
        assert_eq!(decide(TransactionStatus::Success, &success), ReconcileDecision::Reapply);
        assert_eq!(decide(TransactionStatus::Success, &failure), ReconcileDecision::Ignore);
        assert_eq!(decide(TransactionStatus::Success, &pending), ReconcileDecision::Ignore);
        assert_eq!(decide(TransactionStatus::Pending, &pending), ReconcileDecision::Apply);
    }
}
