pub mod enums;
pub mod games;
pub mod payment_webhook;
pub mod reconciliation;
