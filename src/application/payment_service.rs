//! Payment initiation and reconciliation against the gateway.
//!
//! The gateway is only ever trusted through its status API: a callback
//! identifies which transaction to reconcile, then the live order status is
//! fetched and applied. Repository calls run on the blocking pool.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::money::to_minor_units;
use crate::domain::payment::{
    ForcedConfirmation, GatewayStatusUpdate, PaymentRequest, ReconcileOutcome,
};
use crate::domain::ports::{NotificationKind, Notifier, PaymentGateway, PaymentRepository};
use crate::domain::principal::AdminPrincipal;

#[derive(Debug, Clone)]
pub struct PaymentInitiation {
    pub transaction_id: Uuid,
    pub merchant_order_id: String,
    pub amount: BigDecimal,
    pub redirect_url: String,
}

pub struct PaymentService<R> {
    repo: Arc<R>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    redirect_url: String,
}

impl<R: PaymentRepository> PaymentService<R> {
    pub fn new(
        repo: R,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        redirect_url: String,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            gateway,
            notifier,
            redirect_url,
        }
    }

    pub async fn initiate(
        &self,
        principal: AdminPrincipal,
        order_id: Uuid,
    ) -> Result<PaymentInitiation, DomainError> {
        let pending = self.run(move |repo| repo.open_transaction(order_id)).await?;
        let transaction = pending.transaction;

        let redirect = self
            .gateway
            .create_payment(PaymentRequest {
                merchant_order_id: transaction.merchant_order_id.clone(),
                amount_minor_units: to_minor_units(&transaction.amount)?,
                redirect_url: self.redirect_url.clone(),
            })
            .await?;

        let transaction_id = transaction.id;
        let gateway_order_id = redirect.gateway_order_id.clone();
        self.run(move |repo| repo.record_gateway_order(transaction_id, gateway_order_id))
            .await?;
        log::info!(
            "Payment {} initiated for order {} by {}",
            transaction.merchant_order_id,
            order_id,
            principal.admin_id
        );

        Ok(PaymentInitiation {
            transaction_id,
            merchant_order_id: transaction.merchant_order_id,
            amount: transaction.amount,
            redirect_url: redirect.redirect_url,
        })
    }

    /// Authenticates a gateway callback and reconciles the transaction it
    /// names. Unknown transactions are never created.
    pub async fn handle_callback(
        &self,
        authorization: Option<&str>,
        raw_body: &[u8],
    ) -> Result<ReconcileOutcome, DomainError> {
        let callback = self.gateway.validate_callback(authorization, raw_body)?;
        let merchant_order_id = callback.merchant_order_id.clone();
        let lookup = merchant_order_id.clone();
        self.run(move |repo| repo.find_by_merchant_order_id(&lookup))
            .await?
            .ok_or_else(|| DomainError::not_found("Transaction"))?;

        self.reconcile(&merchant_order_id, Some(callback.raw)).await
    }

    /// Operator-triggered status poll, for callbacks that never arrived.
    pub async fn sync_status(
        &self,
        principal: AdminPrincipal,
        merchant_order_id: &str,
    ) -> Result<ReconcileOutcome, DomainError> {
        log::info!(
            "Status sync for {} requested by {}",
            merchant_order_id,
            principal.admin_id
        );
        self.reconcile(merchant_order_id, None).await
    }

    pub async fn force_confirm(
        &self,
        principal: AdminPrincipal,
        transaction_id: Uuid,
    ) -> Result<ForcedConfirmation, DomainError> {
        let confirmed = self.run(move |repo| repo.force_confirm(transaction_id)).await?;
        log::warn!(
            "Transaction {} manually confirmed by {}",
            transaction_id,
            principal.admin_id
        );
        if confirmed.newly_confirmed {
            self.notify_confirmed(
                &confirmed.billing_email,
                confirmed.order.id,
                &confirmed.order.total_amount,
                confirmed.issued_passes,
            )
            .await;
        }
        Ok(confirmed)
    }

    async fn reconcile(
        &self,
        merchant_order_id: &str,
        callback: Option<Value>,
    ) -> Result<ReconcileOutcome, DomainError> {
        let status = self.gateway.get_order_status(merchant_order_id).await?;
        let raw_response = match callback {
            Some(callback) => json!({ "callback": callback, "status": status.raw }),
            None => status.raw,
        };
        let update = GatewayStatusUpdate {
            reconciliation: status.state.reconciliation(),
            payment_id: status.payment_id,
            raw_response,
            received_at: Utc::now(),
        };

        let key = merchant_order_id.to_string();
        let outcome = self
            .run(move |repo| repo.apply_gateway_status(&key, update))
            .await?;
        log::info!(
            "Transaction {} reconciled: {} ({:?}), order {}",
            merchant_order_id,
            outcome.transaction.status,
            outcome.decision,
            outcome.order_status
        );

        if outcome.newly_confirmed {
            self.notify_confirmed(
                &outcome.billing_email,
                outcome.transaction.order_id,
                &outcome.transaction.amount,
                outcome.issued_passes,
            )
            .await;
        }
        Ok(outcome)
    }

    /// Failures are logged; the order is already committed.
    async fn notify_confirmed(
        &self,
        to: &str,
        order_id: Uuid,
        amount: &BigDecimal,
        passes: usize,
    ) {
        let data = json!({
            "order_id": order_id,
            "amount": amount.to_string(),
            "passes": passes,
        });
        match self
            .notifier
            .send(to, NotificationKind::OrderConfirmation, &data)
            .await
        {
            Ok(receipt) => log::info!(
                "Order {} confirmation sent ({})",
                order_id,
                receipt.id
            ),
            Err(e) => log::error!(
                "Order {} confirmation to {} failed: {}",
                order_id,
                to,
                e
            ),
        }
    }

    async fn run<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&R) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(&repo))
            .await
            .map_err(|e| DomainError::Internal(format!("blocking task failed: {e}")))?
    }
}
