pub mod games;
pub mod invoice_backfill;
pub mod payment_webhook;
pub mod reconcile_subscriptions;
