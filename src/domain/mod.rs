pub mod catalog;
pub mod checkin;
pub mod errors;
pub mod issuance;
pub mod money;
pub mod order;
pub mod party;
pub mod payment;
pub mod ports;
pub mod principal;
