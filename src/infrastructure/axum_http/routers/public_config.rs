use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::config::config_model::DotEnvyConfig;

/// Browser-safe subset of the configuration. Secrets stay in the config struct.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigDto {
    pub stripe_publishable_key: String,
    pub app_base_url: String,
}

pub fn routes(config: Arc<DotEnvyConfig>) -> Router {
    Router::new()
        .route("/", get(show_public_config))
        .with_state(config)
}

pub async fn show_public_config(State(config): State<Arc<DotEnvyConfig>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PublicConfigDto {
            stripe_publishable_key: config.stripe.publishable_key.clone(),
            app_base_url: config.billing.app_base_url.clone(),
        }),
    )
}
