pub mod admin;
pub mod games;
pub mod public_config;
pub mod stripe_webhook;
