use anyhow::{Context, Result, ensure};
use rust_decimal::Decimal;

use super::config_model::{Billing, Database, DotEnvyConfig, Server, Stripe};

const DEFAULT_RECOGNIZED_PLAN_AMOUNTS: &str = "3.49,3.50,8.90";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: required("SERVER_PORT")?
            .parse()
            .context("SERVER_PORT is not a valid port")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is not a valid number")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is not a valid number")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let stripe = Stripe {
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
        publishable_key: required("STRIPE_PUBLISHABLE_KEY")?,
    };

    let recognized_amounts_raw = std::env::var("RECOGNIZED_PLAN_AMOUNTS")
        .unwrap_or_else(|_| DEFAULT_RECOGNIZED_PLAN_AMOUNTS.to_string());

    let billing = Billing {
        recognized_amounts: parse_recognized_amounts(&recognized_amounts_raw)?,
        app_base_url: required("APP_BASE_URL")?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        stripe,
        billing,
    })
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} is not set", name))
}

fn parse_recognized_amounts(raw: &str) -> Result<Vec<Decimal>> {
    let amounts = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<Decimal>()
                .with_context(|| format!("RECOGNIZED_PLAN_AMOUNTS contains an invalid amount: {}", value))
        })
        .collect::<Result<Vec<Decimal>>>()?;

    ensure!(
        !amounts.is_empty(),
        "RECOGNIZED_PLAN_AMOUNTS must contain at least one amount"
    );

    Ok(amounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_amounts() {
        let amounts = parse_recognized_amounts(DEFAULT_RECOGNIZED_PLAN_AMOUNTS).unwrap();

        assert_eq!(
            amounts,
            vec![
                Decimal::new(349, 2),
                Decimal::new(350, 2),
                Decimal::new(890, 2),
            ]
        );
    }

    #[test]
    fn tolerates_whitespace_and_trailing_commas() {
        let amounts = parse_recognized_amounts(" 3.49 , 8.90 ,").unwrap();

        assert_eq!(amounts, vec![Decimal::new(349, 2), Decimal::new(890, 2)]);
    }

    #[test]
    fn rejects_non_decimal_amounts() {
        let result = parse_recognized_amounts("3.49,free");

        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_whitelist() {
        let result = parse_recognized_amounts(" , ");

        assert!(result.is_err());
    }
}
