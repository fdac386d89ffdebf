use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::OrderStatus;
use crate::domain::payment::{
    decide, ForcedConfirmation, GatewayStatusUpdate, PendingPayment, ReconcileDecision,
    ReconcileOutcome, TransactionStatus, TransactionView,
};
use crate::domain::ports::PaymentRepository;
use crate::schema::{billing_users, orders, transactions};

use super::issuance_repo::issue_for_order;
use super::models::{NewTransactionRow, OrderRow, TransactionRow};
use super::order_repo::load_order_view;

pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PaymentRepository for DieselPaymentRepository {
    fn open_transaction(&self, order_id: Uuid) -> Result<PendingPayment, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = lock_order(conn, order_id)?;
            let order_status: OrderStatus = order.status.parse()?;
            if order_status != OrderStatus::Pending {
                return Err(DomainError::Conflict(format!(
                    "order {} is {}, only pending orders can be paid",
                    order_id, order_status
                )));
            }

            let existing = transactions::table
                .filter(transactions::order_id.eq(order_id))
                .select(TransactionRow::as_select())
                .first(conn)
                .optional()?;
            let row = match existing {
                Some(row) => row,
                None => {
                    let id = Uuid::new_v4();
                    diesel::insert_into(transactions::table)
                        .values(&NewTransactionRow {
                            id,
                            order_id,
                            merchant_order_id: id.simple().to_string(),
                            amount: order.total_amount.clone(),
                            status: TransactionStatus::Pending.as_str().to_string(),
                        })
                        .returning(TransactionRow::as_returning())
                        .get_result(conn)?
                }
            };

            Ok(PendingPayment {
                transaction: row.try_into()?,
                order_status,
            })
        })
    }

    fn record_gateway_order(
        &self,
        transaction_id: Uuid,
        gateway_order_id: Option<String>,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let now = Utc::now();
            let order_id: Uuid = diesel::update(transactions::table.find(transaction_id))
                .set((
                    transactions::gateway_order_id.eq(gateway_order_id.clone()),
                    transactions::updated_at.eq(now),
                ))
                .returning(transactions::order_id)
                .get_result(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Transaction"))?;
            diesel::update(orders::table.find(order_id))
                .set((
                    orders::gateway_order_id.eq(gateway_order_id),
                    orders::updated_at.eq(now),
                ))
                .execute(conn)?;
            Ok(())
        })
    }

    fn find_by_merchant_order_id(
        &self,
        merchant_order_id: &str,
    ) -> Result<Option<TransactionView>, DomainError> {
        let mut conn = self.pool.get()?;
        transactions::table
            .filter(transactions::merchant_order_id.eq(merchant_order_id))
            .select(TransactionRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(TransactionView::try_from)
            .transpose()
    }

    fn apply_gateway_status(
        &self,
        merchant_order_id: &str,
        update: GatewayStatusUpdate,
    ) -> Result<ReconcileOutcome, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = transactions::table
                .filter(transactions::merchant_order_id.eq(merchant_order_id))
                .select(TransactionRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Transaction"))?;
            let order = lock_order(conn, row.order_id)?;
            let before: OrderStatus = order.status.parse()?;

            let incoming = update.reconciliation;
            let decision = decide(row.status.parse()?, &incoming);
            let mut order_status = before;
            let mut issued_passes = 0;

            if decision == ReconcileDecision::Ignore {
                log::warn!(
                    "Transaction {} is already {}, ignoring gateway state {}",
                    merchant_order_id,
                    row.status,
                    incoming.transaction_status
                );
            } else {
                let payment_id = update.payment_id.or(row.gateway_payment_id);
                diesel::update(transactions::table.find(row.id))
                    .set((
                        transactions::status.eq(incoming.transaction_status.as_str()),
                        transactions::gateway_response.eq(Some(update.raw_response)),
                        transactions::gateway_payment_id.eq(payment_id),
                        transactions::callback_received_at.eq(Some(update.received_at)),
                        transactions::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;

                if let Some(target) = incoming.order_status {
                    if target != before {
                        set_order_status(conn, order.id, target)?;
                        order_status = target;
                    }
                    if target == OrderStatus::Confirmed {
                        issued_passes = issue_for_order(conn, order.id)?;
                    }
                }
            }

            let transaction: TransactionView = transactions::table
                .find(row.id)
                .select(TransactionRow::as_select())
                .first(conn)?
                .try_into()?;
            Ok(ReconcileOutcome {
                transaction,
                order_status,
                decision,
                newly_confirmed: before != OrderStatus::Confirmed
                    && order_status == OrderStatus::Confirmed,
                issued_passes,
                billing_email: billing_email(conn, order.billing_user_id)?,
            })
        })
    }

    fn force_confirm(&self, transaction_id: Uuid) -> Result<ForcedConfirmation, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = transactions::table
                .find(transaction_id)
                .select(TransactionRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Transaction"))?;
            let order = lock_order(conn, row.order_id)?;
            let before: OrderStatus = order.status.parse()?;

            let transaction: TransactionView = diesel::update(transactions::table.find(row.id))
                .set((
                    transactions::status.eq(TransactionStatus::Success.as_str()),
                    transactions::updated_at.eq(Utc::now()),
                ))
                .returning(TransactionRow::as_returning())
                .get_result(conn)?
                .try_into()?;
            if before != OrderStatus::Confirmed {
                set_order_status(conn, order.id, OrderStatus::Confirmed)?;
            }
            let issued_passes = issue_for_order(conn, order.id)?;
            log::info!(
                "Transaction {} force-confirmed (order {}, {} passes issued)",
                transaction_id,
                order.id,
                issued_passes
            );

            let view = load_order_view(conn, order.id)?
                .ok_or_else(|| DomainError::Internal(format!("order {} vanished", order.id)))?;
            Ok(ForcedConfirmation {
                transaction,
                order: view,
                issued_passes,
                billing_email: billing_email(conn, order.billing_user_id)?,
                newly_confirmed: before != OrderStatus::Confirmed,
            })
        })
    }
}

fn lock_order(conn: &mut PgConnection, order_id: Uuid) -> Result<OrderRow, DomainError> {
    orders::table
        .find(order_id)
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Order"))
}

fn set_order_status(
    conn: &mut PgConnection,
    order_id: Uuid,
    status: OrderStatus,
) -> Result<(), DomainError> {
    diesel::update(orders::table.find(order_id))
        .set((
            orders::status.eq(status.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    log::info!("Order {} is now {}", order_id, status);
    Ok(())
}

fn billing_email(conn: &mut PgConnection, billing_user_id: Uuid) -> Result<String, DomainError> {
    Ok(billing_users::table
        .find(billing_user_id)
        .select(billing_users::email)
        .first(conn)?)
}
