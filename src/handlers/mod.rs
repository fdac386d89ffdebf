pub mod billing;
pub mod catalog;
pub mod checkin;
pub mod issued_passes;
pub mod orders;
pub mod payments;
pub mod principal;

use bigdecimal::BigDecimal;

use crate::application::{
    billing_service::BillingService, catalog_service::CatalogService,
    checkin_service::CheckInService, issuance_service::IssuanceService,
    order_service::OrderService, payment_service::PaymentService,
};
use crate::domain::money::parse_amount;
use crate::errors::AppError;
use crate::infrastructure::{
    billing_repo::DieselBillingRepository, catalog_repo::DieselCatalogRepository,
    checkin_repo::DieselCheckInRepository, issuance_repo::DieselIssuanceRepository,
    order_repo::DieselOrderRepository, payment_repo::DieselPaymentRepository,
};

pub type Catalog = CatalogService<DieselCatalogRepository>;
pub type Billing = BillingService<DieselBillingRepository>;
pub type Orders = OrderService<DieselOrderRepository>;
pub type Payments = PaymentService<DieselPaymentRepository>;
pub type Issuance = IssuanceService<DieselIssuanceRepository>;
pub type CheckIns = CheckInService<DieselCheckInRepository>;

/// Parses a decimal money string, reporting failures against `field`.
pub(crate) fn money_field(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    parse_amount(field, raw).map_err(|e| AppError::invalid_field(field, e.to_string()))
}
