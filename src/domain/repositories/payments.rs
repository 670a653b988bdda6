use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payments::{NewPaymentEntity, PaymentEntity};

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn record_payment(&self, new_payment: NewPaymentEntity) -> Result<Uuid>;

    /// Payments that carry a provider invoice id but no hosted invoice URL yet.
    async fn list_missing_invoice_url(&self) -> Result<Vec<PaymentEntity>>;

    async fn set_invoice_url(&self, payment_id: Uuid, invoice_url: &str) -> Result<()>;
}
