use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::repositories::payments::PaymentRepository;
use crate::domain::value_objects::reconciliation::InvoiceBackfillReport;
use crate::payments::stripe_client::{StripeClient, StripeInvoice};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StripeInvoiceGateway: Send + Sync {
    async fn retrieve_invoice(&self, invoice_id: &str) -> AnyResult<StripeInvoice>;
}

#[async_trait]
impl StripeInvoiceGateway for StripeClient {
    async fn retrieve_invoice(&self, invoice_id: &str) -> AnyResult<StripeInvoice> {
        self.retrieve_invoice(invoice_id).await
    }
}

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BackfillError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            BackfillError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BackfillError>;

pub struct InvoiceBackfillUseCase<P, Stripe>
where
    P: PaymentRepository + Send + Sync + 'static,
    Stripe: StripeInvoiceGateway + Send + Sync + 'static,
{
    payment_repo: Arc<P>,
    stripe_client: Arc<Stripe>,
}

impl<P, Stripe> InvoiceBackfillUseCase<P, Stripe>
where
    P: PaymentRepository + Send + Sync + 'static,
    Stripe: StripeInvoiceGateway + Send + Sync + 'static,
{
    pub fn new(payment_repo: Arc<P>, stripe_client: Arc<Stripe>) -> Self {
        Self {
            payment_repo,
            stripe_client,
        }
    }

    /// Fills in the hosted invoice URL for payments recorded before the URL was
    /// known. Best-effort batch: a failed lookup or write is counted and the
    /// next payment is processed. Re-running only touches rows still missing a
    /// URL.
    pub async fn backfill_all(&self) -> UseCaseResult<InvoiceBackfillReport> {
        let payments = self
            .payment_repo
            .list_missing_invoice_url()
            .await
            .map_err(|err| {
                error!(
                    db_error = ?err,
                    "invoice_backfill: failed to list payments missing an invoice url"
                );
                BackfillError::Internal(err)
            })?;

        let mut report = InvoiceBackfillReport {
            scanned: payments.len(),
            ..Default::default()
        };

        for payment in payments {
            let Some(invoice_id) = payment.provider_invoice_id.clone() else {
                continue;
            };

            let invoice = match self.stripe_client.retrieve_invoice(&invoice_id).await {
                Ok(invoice) => invoice,
                Err(err) => {
                    error!(
                        payment_id = %payment.id,
                        %invoice_id,
                        error = ?err,
                        "invoice_backfill: failed to retrieve invoice; continuing"
                    );
                    report.failures += 1;
                    continue;
                }
            };

            let Some(invoice_url) = invoice.hosted_url() else {
                warn!(
                    payment_id = %payment.id,
                    %invoice_id,
                    "invoice_backfill: invoice has no hosted url yet; skipping"
                );
                report.skipped_no_url += 1;
                continue;
            };

            match self
                .payment_repo
                .set_invoice_url(payment.id, &invoice_url)
                .await
            {
                Ok(()) => report.backfilled += 1,
                Err(err) => {
                    error!(
                        payment_id = %payment.id,
                        %invoice_id,
                        db_error = ?err,
                        "invoice_backfill: failed to store invoice url; continuing"
                    );
                    report.failures += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            backfilled = report.backfilled,
            skipped_no_url = report.skipped_no_url,
            failures = report.failures,
            "invoice_backfill: completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::domain::entities::payments::PaymentEntity;
    use crate::domain::repositories::payments::MockPaymentRepository;

    fn pending_payment(invoice_id: &str) -> PaymentEntity {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        PaymentEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider: "stripe".to_string(),
            provider_payment_id: Some("pi_1".to_string()),
            provider_invoice_id: Some(invoice_id.to_string()),
            amount: Decimal::new(349, 2),
            currency: "eur".to_string(),
            status: "succeeded".to_string(),
            invoice_url: None,
            created_at: now,
        }
    }

    fn invoice_with_url(url: Option<&str>) -> StripeInvoice {
        StripeInvoice {
            id: Some("in_1".to_string()),
            status: Some("paid".to_string()),
            hosted_invoice_url: url.map(str::to_string),
            invoice_pdf: None,
        }
    }

    #[tokio::test]
    async fn backfills_the_hosted_url() {
        let payment = pending_payment("in_1");
        let payment_id = payment.id;

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_list_missing_invoice_url()
            .times(1)
            .returning(move || {
                let payments = vec![payment.clone()];
                Box::pin(async move { Ok(payments) })
            });
        payment_repo
            .expect_set_invoice_url()
            .withf(move |id, url| *id == payment_id && url == "https://pay.stripe.com/in_1")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut gateway = MockStripeInvoiceGateway::new();
        gateway
            .expect_retrieve_invoice()
            .times(1)
            .returning(|_| Box::pin(async { Ok(invoice_with_url(Some("https://pay.stripe.com/in_1"))) }));

        let usecase = InvoiceBackfillUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let report = usecase.backfill_all().await.unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(report.backfilled, 1);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test]
    async fn a_failed_lookup_does_not_abort_the_batch() {
        let broken = pending_payment("in_broken");
        let healthy = pending_payment("in_ok");
        let healthy_id = healthy.id;

        let mut payment_repo = MockPaymentRepository::new();
        let payments = vec![broken, healthy];
        payment_repo
            .expect_list_missing_invoice_url()
            .times(1)
            .returning(move || {
                let payments = payments.clone();
                Box::pin(async move { Ok(payments) })
            });
        payment_repo
            .expect_set_invoice_url()
            .withf(move |id, _| *id == healthy_id)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut gateway = MockStripeInvoiceGateway::new();
        gateway
            .expect_retrieve_invoice()
            .withf(|id| id == "in_broken")
            .times(1)
            .returning(|_| Box::pin(async { Err(anyhow!("status 500")) }));
        gateway
            .expect_retrieve_invoice()
            .withf(|id| id == "in_ok")
            .times(1)
            .returning(|_| Box::pin(async { Ok(invoice_with_url(Some("https://pay.stripe.com/in_ok"))) }));

        let usecase = InvoiceBackfillUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let report = usecase.backfill_all().await.unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.backfilled, 1);
        assert_eq!(report.failures, 1);
    }

    #[tokio::test]
    async fn an_invoice_without_a_url_is_skipped_not_failed() {
        let payment = pending_payment("in_draft");

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_list_missing_invoice_url()
            .times(1)
            .returning(move || {
                let payments = vec![payment.clone()];
                Box::pin(async move { Ok(payments) })
            });
        payment_repo.expect_set_invoice_url().never();

        let mut gateway = MockStripeInvoiceGateway::new();
        gateway
            .expect_retrieve_invoice()
            .times(1)
            .returning(|_| Box::pin(async { Ok(invoice_with_url(None)) }));

        let usecase = InvoiceBackfillUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let report = usecase.backfill_all().await.unwrap();

        assert_eq!(report.skipped_no_url, 1);
        assert_eq!(report.backfilled, 0);
        assert_eq!(report.failures, 0);
    }

    #[tokio::test]
    async fn nothing_to_backfill_is_a_zero_effect_success() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_list_missing_invoice_url()
            .times(1)
            .returning(|| Box::pin(async { Ok(Vec::new()) }));
        payment_repo.expect_set_invoice_url().never();

        let mut gateway = MockStripeInvoiceGateway::new();
        gateway.expect_retrieve_invoice().never();

        let usecase = InvoiceBackfillUseCase::new(Arc::new(payment_repo), Arc::new(gateway));

        let report = usecase.backfill_all().await.unwrap();

        assert_eq!(report.scanned, 0);
        assert_eq!(report.backfilled, 0);
    }
}
