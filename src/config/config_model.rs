use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub stripe: Stripe,
    pub billing: Billing,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub secret_key: String,
    pub webhook_secret: String,
    pub publishable_key: String,
}

/// Billing knobs that are data, not logic: the recognized plan amounts feed the
/// duplicate-subscription reconciliation policy, so a new price point is an env
/// change rather than a deploy.
#[derive(Debug, Clone)]
pub struct Billing {
    pub recognized_amounts: Vec<Decimal>,
    pub app_base_url: String,
}
