use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::info;

use crate::{
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{payments::PaymentRepository, subscriptions::SubscriptionRepository},
        value_objects::reconciliation::RecognizedAmounts,
    },
    infrastructure::{
        axum_http::error_responses::ErrorResponse,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{payments::PaymentPostgres, subscriptions::SubscriptionPostgres},
        },
    },
    payments::stripe_client::StripeClient,
    usecases::{
        invoice_backfill::{InvoiceBackfillUseCase, StripeInvoiceGateway},
        reconcile_subscriptions::ReconcileSubscriptionsUseCase,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let reconcile_usecase = ReconcileSubscriptionsUseCase::new(
        Arc::new(subscription_repository),
        RecognizedAmounts::new(config.billing.recognized_amounts.clone()),
    );

    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
    );
    let backfill_usecase =
        InvoiceBackfillUseCase::new(Arc::new(payment_repository), Arc::new(stripe_client));

    Router::new()
        .route("/reconcile-subscriptions", post(reconcile_subscriptions))
        .with_state(Arc::new(reconcile_usecase))
        .merge(
            Router::new()
                .route("/backfill-invoice-urls", post(backfill_invoice_urls))
                .with_state(Arc::new(backfill_usecase)),
        )
}

pub async fn reconcile_subscriptions<S>(
    State(usecase): State<Arc<ReconcileSubscriptionsUseCase<S>>>,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    info!("admin: subscription reconciliation requested");
    match usecase.reconcile_all().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => internal_error(err.status_code()),
    }
}

pub async fn backfill_invoice_urls<P, Stripe>(
    State(usecase): State<Arc<InvoiceBackfillUseCase<P, Stripe>>>,
) -> Response
where
    P: PaymentRepository + Send + Sync + 'static,
    Stripe: StripeInvoiceGateway + Send + Sync + 'static,
{
    info!("admin: invoice url backfill requested");
    match usecase.backfill_all().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => internal_error(err.status_code()),
    }
}

fn internal_error(status: StatusCode) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            // Don't leak internal error detail to client
            message: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
