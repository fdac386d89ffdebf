use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::catalog::{EventView, NewEvent, NewPass, NewSubEvent, PassView, SubEventView};
use super::checkin::{CheckInCommand, CheckInOutcome, CheckingRecordView};
use super::errors::DomainError;
use super::issuance::{IssuedPassView, SponsoredPassInput};
use super::order::{CreateOrderInput, ListResult, OrderView};
use super::party::{BillingContact, BillingUserRef};
use super::payment::{
    CallbackPayload, ForcedConfirmation, GatewayOrderStatus, GatewayStatusUpdate, PaymentRedirect,
    PaymentRequest, PendingPayment, ReconcileOutcome, TransactionView,
};

pub trait CatalogRepository: Send + Sync + 'static {
    fn create_event(&self, admin_id: Uuid, event: NewEvent) -> Result<EventView, DomainError>;
    fn create_sub_event(
        &self,
        sub_event: NewSubEvent,
        available_quantity: i32,
    ) -> Result<SubEventView, DomainError>;
    fn find_sub_event(&self, id: Uuid) -> Result<Option<SubEventView>, DomainError>;
    fn resize_sub_event(&self, id: Uuid, quantity: i32) -> Result<SubEventView, DomainError>;
    fn set_sub_event_active(&self, id: Uuid, active: bool) -> Result<SubEventView, DomainError>;
    fn create_pass(
        &self,
        admin_id: Uuid,
        pass: NewPass,
        final_price: bigdecimal::BigDecimal,
    ) -> Result<PassView, DomainError>;
    fn list_passes(&self, sub_event_id: Uuid) -> Result<Vec<PassView>, DomainError>;
}

pub trait BillingRepository: Send + Sync + 'static {
    fn register(&self, admin_id: Uuid, contact: BillingContact)
        -> Result<BillingUserRef, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, admin_id: Uuid, input: CreateOrderInput) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: i64, limit: i64) -> Result<ListResult, DomainError>;
}

pub trait PaymentRepository: Send + Sync + 'static {
    /// Returns the order's pending transaction, creating it on first use.
    fn open_transaction(&self, order_id: Uuid) -> Result<PendingPayment, DomainError>;
    fn record_gateway_order(
        &self,
        transaction_id: Uuid,
        gateway_order_id: Option<String>,
    ) -> Result<(), DomainError>;
    fn find_by_merchant_order_id(
        &self,
        merchant_order_id: &str,
    ) -> Result<Option<TransactionView>, DomainError>;
    fn apply_gateway_status(
        &self,
        merchant_order_id: &str,
        update: GatewayStatusUpdate,
    ) -> Result<ReconcileOutcome, DomainError>;
    fn force_confirm(&self, transaction_id: Uuid) -> Result<ForcedConfirmation, DomainError>;
}

pub trait IssuanceRepository: Send + Sync + 'static {
    fn issue_sponsored(&self, input: SponsoredPassInput) -> Result<IssuedPassView, DomainError>;
    /// Loads an issued pass, persisting `expired` first if it lapsed before `today`.
    fn find_issued_pass(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<IssuedPassView>, DomainError>;
}

pub trait CheckInRepository: Send + Sync + 'static {
    fn check_in(
        &self,
        command: CheckInCommand,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<CheckInOutcome, DomainError>;
    /// Newest pass for the attendee that can still be used on `today`.
    fn find_active_pass_for_attendee(
        &self,
        attendee_id: Uuid,
        sub_event_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Uuid>, DomainError>;
    fn records_between(
        &self,
        sub_event_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CheckingRecordView>, DomainError>;
}

/// Payment gateway client, injected with its own configuration.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentRedirect, DomainError>;

    async fn get_order_status(
        &self,
        merchant_order_id: &str,
    ) -> Result<GatewayOrderStatus, DomainError>;

    /// Authenticates a callback. `raw_body` must be the exact bytes received.
    fn validate_callback(
        &self,
        authorization: Option<&str>,
        raw_body: &[u8],
    ) -> Result<CallbackPayload, DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    OrderConfirmation,
}

impl NotificationKind {
    pub fn template(&self) -> &'static str {
        match self {
            NotificationKind::OrderConfirmation => "order_confirmation",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationReceipt {
    pub id: String,
}

/// Outbound message delivery, typically over the network.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        to: &str,
        kind: NotificationKind,
        data: &Value,
    ) -> Result<NotificationReceipt, DomainError>;
}
