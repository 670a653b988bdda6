use std::sync::Arc;

use anyhow::Result as AnyResult;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::entities::payments::NewPaymentEntity;
use crate::domain::repositories::payments::PaymentRepository;
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;
use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;
use crate::domain::value_objects::payment_webhook::{
    extract_amount_paid, extract_currency, extract_plan_type, extract_provider_invoice_id,
    extract_provider_payment_id, extract_provider_subscription_id, extract_user_id,
};
use crate::payments::stripe_client::{StripeClient, StripeEvent};

const PROVIDER: &str = "stripe";

#[cfg_attr(test, mockall::automock)]
pub trait StripeWebhookGateway: Send + Sync {
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent>;
}

impl StripeWebhookGateway for StripeClient {
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<StripeEvent> {
        self.verify_webhook_signature(payload, signature)
    }
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            WebhookError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

pub struct PaymentWebhookUseCase<S, P, Stripe>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Stripe: StripeWebhookGateway + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    payment_repo: Arc<P>,
    stripe_client: Arc<Stripe>,
}

impl<S, P, Stripe> PaymentWebhookUseCase<S, P, Stripe>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Stripe: StripeWebhookGateway + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, payment_repo: Arc<P>, stripe_client: Arc<Stripe>) -> Self {
        Self {
            subscription_repo,
            payment_repo,
            stripe_client,
        }
    }

    pub async fn handle_stripe_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> UseCaseResult<()> {
        let event = self
            .stripe_client
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "payment_webhook: signature verification failed");
                WebhookError::InvalidWebhook("signature verification failed".into())
            })?;

        let event_type = event.type_.clone();
        info!(event_type = %event_type, "payment_webhook: stripe webhook verified");

        match event_type.as_str() {
            "checkout.session.completed" => {
                self.handle_checkout_completed(&event.data.object).await?;
            }
            "invoice.payment_succeeded" => {
                self.handle_invoice_paid(&event.data.object).await?;
            }
            "invoice.payment_failed" => {
                self.handle_subscription_status_change(
                    &event.data.object,
                    SubscriptionStatus::PastDue,
                )
                .await?;
            }
            "customer.subscription.deleted" => {
                self.handle_subscription_status_change(
                    &event.data.object,
                    SubscriptionStatus::Canceled,
                )
                .await?;
            }
            _ => {
                debug!("unhandled stripe event type: {:?}", event.type_);
            }
        }

        Ok(())
    }

    async fn handle_checkout_completed(&self, object: &Value) -> UseCaseResult<()> {
        let user_id = extract_user_id(object).ok_or_else(|| {
            let err = WebhookError::InvalidWebhook("missing user id".to_string());
            warn!(
                status = err.status_code().as_u16(),
                "payment_webhook: checkout session carries no user id"
            );
            err
        })?;

        let amount_paid = extract_amount_paid(object).ok_or_else(|| {
            let err = WebhookError::InvalidWebhook("missing amount".to_string());
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "payment_webhook: checkout session carries no amount"
            );
            err
        })?;

        let plan_type = extract_plan_type(object);
        let currency = extract_currency(object);
        let provider_subscription_id = extract_provider_subscription_id(object);

        let subscription_id = self
            .subscription_repo
            .create_or_update_after_checkout(
                user_id,
                &plan_type,
                SubscriptionStatus::Active,
                &currency,
                amount_paid,
                provider_subscription_id.clone(),
            )
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "payment_webhook: failed to upsert subscription after checkout"
                );
                WebhookError::Internal(err)
            })?;

        self.payment_repo
            .record_payment(NewPaymentEntity {
                user_id,
                provider: PROVIDER.to_string(),
                provider_payment_id: extract_provider_payment_id(object),
                provider_invoice_id: extract_provider_invoice_id(object),
                amount: amount_paid,
                currency,
                status: PaymentStatus::Succeeded.to_string(),
                invoice_url: None,
            })
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %subscription_id,
                    db_error = ?err,
                    "payment_webhook: failed to record payment after checkout"
                );
                WebhookError::Internal(err)
            })?;

        info!(
            %user_id,
            %subscription_id,
            provider_subscription_id = ?provider_subscription_id,
            "payment_webhook: processed checkout completed webhook"
        );

        Ok(())
    }

    async fn handle_invoice_paid(&self, object: &Value) -> UseCaseResult<()> {
        let provider_subscription_id = require_subscription_id(object)?;

        self.subscription_repo
            .update_status_by_provider_subscription_id(
                &provider_subscription_id,
                SubscriptionStatus::Active,
            )
            .await
            .map_err(|err| {
                error!(
                    %provider_subscription_id,
                    db_error = ?err,
                    "payment_webhook: failed to mark subscription active"
                );
                WebhookError::Internal(err)
            })?;

        let subscription = self
            .subscription_repo
            .find_by_provider_subscription_id(&provider_subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %provider_subscription_id,
                    db_error = ?err,
                    "payment_webhook: failed to load subscription for invoice"
                );
                WebhookError::Internal(err)
            })?;

        let Some(subscription) = subscription else {
            warn!(
                %provider_subscription_id,
                "payment_webhook: invoice for an unknown subscription; nothing to record"
            );
            return Ok(());
        };

        let Some(amount_paid) = extract_amount_paid(object) else {
            warn!(
                %provider_subscription_id,
                "payment_webhook: invoice carries no amount; status updated only"
            );
            return Ok(());
        };

        self.payment_repo
            .record_payment(NewPaymentEntity {
                user_id: subscription.user_id,
                provider: PROVIDER.to_string(),
                provider_payment_id: extract_provider_payment_id(object),
                provider_invoice_id: extract_provider_invoice_id(object),
                amount: amount_paid,
                currency: extract_currency(object),
                status: PaymentStatus::Succeeded.to_string(),
                invoice_url: None,
            })
            .await
            .map_err(|err| {
                error!(
                    user_id = %subscription.user_id,
                    %provider_subscription_id,
                    db_error = ?err,
                    "payment_webhook: failed to record invoice payment"
                );
                WebhookError::Internal(err)
            })?;

        info!(
            user_id = %subscription.user_id,
            %provider_subscription_id,
            "payment_webhook: processed invoice payment webhook"
        );

        Ok(())
    }

    async fn handle_subscription_status_change(
        &self,
        object: &Value,
        status: SubscriptionStatus,
    ) -> UseCaseResult<()> {
        let provider_subscription_id = require_subscription_id(object)?;

        info!(
            %provider_subscription_id,
            status = %status,
            "payment_webhook: updating subscription status from webhook"
        );

        self.subscription_repo
            .update_status_by_provider_subscription_id(&provider_subscription_id, status)
            .await
            .map_err(|err| {
                error!(
                    %provider_subscription_id,
                    db_error = ?err,
                    "payment_webhook: failed to update subscription status"
                );
                WebhookError::Internal(err)
            })?;

        Ok(())
    }
}

fn require_subscription_id(object: &Value) -> UseCaseResult<String> {
    extract_provider_subscription_id(object).ok_or_else(|| {
        let err = WebhookError::InvalidWebhook("missing subscription id".to_string());
        warn!(
            status = err.status_code().as_u16(),
            "payment_webhook: event carries no subscription id"
        );
        err
    })
}
