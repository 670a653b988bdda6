use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::warn;

use crate::{
    config::config_model::DotEnvyConfig,
    domain::repositories::{payments::PaymentRepository, subscriptions::SubscriptionRepository},
    infrastructure::{
        axum_http::error_responses::ErrorResponse,
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{payments::PaymentPostgres, subscriptions::SubscriptionPostgres},
        },
    },
    payments::stripe_client::StripeClient,
    usecases::payment_webhook::{PaymentWebhookUseCase, StripeWebhookGateway, WebhookError},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let stripe_client = StripeClient::new(
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
    );

    let webhook_usecase = PaymentWebhookUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(payment_repository),
        Arc::new(stripe_client),
    );

    Router::new()
        .route("/stripe", post(stripe_webhook))
        .with_state(Arc::new(webhook_usecase))
}

pub async fn stripe_webhook<S, P, Stripe>(
    State(usecase): State<Arc<PaymentWebhookUseCase<S, P, Stripe>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Stripe: StripeWebhookGateway + Send + Sync + 'static,
{
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        warn!("payment_webhook: request without a stripe-signature header");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                code: StatusCode::BAD_REQUEST.as_u16(),
                message: "missing stripe-signature header".to_string(),
            }),
        )
            .into_response();
    };

    match usecase.handle_stripe_webhook(&body, signature).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => map_error(err),
    }
}

fn map_error(err: WebhookError) -> Response {
    let status = err.status_code();
    let message = match &err {
        // Don't leak internal error detail to client
        WebhookError::Internal(_) => "Internal server error".to_string(),
        other => other.to_string(),
    };

    (
        status,
        Json(ErrorResponse {
            code: status.as_u16(),
            message,
        }),
    )
        .into_response()
}
