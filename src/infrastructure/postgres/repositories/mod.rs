pub mod games;
pub mod payments;
pub mod subscriptions;
