pub mod billing_service;
pub mod catalog_service;
pub mod checkin_service;
pub mod issuance_service;
pub mod order_service;
pub mod payment_service;
