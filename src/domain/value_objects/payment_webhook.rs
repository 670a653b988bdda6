//! Tolerant readers for Stripe webhook objects.
//!
//! Webhook payloads are duck-typed: the same logical value shows up under
//! different field names depending on the event family and API version. Each
//! reader walks a prioritized alias list and takes the first usable value, so
//! the usecases never touch raw JSON themselves.

use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

/// Stripe subscription identifiers carry this prefix; anything else in an
/// id-shaped field is some other object kind.
pub const PROVIDER_SUBSCRIPTION_ID_PREFIX: &str = "sub_";

const PROVIDER_INVOICE_ID_PREFIX: &str = "in_";

pub const UNKNOWN_SENTINEL: &str = "unknown";

const AMOUNT_ALIASES: [&str; 3] = ["amount_total", "amount_paid", "amount"];
const SUBSCRIPTION_ID_ALIASES: [&str; 3] = ["subscription", "subscription_id", "id"];
const INVOICE_ID_ALIASES: [&str; 3] = ["invoice", "invoice_id", "id"];
const PLAN_TYPE_ALIASES: [&str; 2] = ["plan_type", "plan"];

/// Amounts arrive in minor units; convert to a decimal at the boundary.
pub fn extract_amount_paid(object: &Value) -> Option<Decimal> {
    AMOUNT_ALIASES
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_i64))
        .map(|minor| Decimal::new(minor, 2))
}

pub fn extract_user_id(object: &Value) -> Option<Uuid> {
    object
        .get("metadata")
        .and_then(|metadata| metadata.get("user_id"))
        .and_then(Value::as_str)
        .or_else(|| object.get("client_reference_id").and_then(Value::as_str))
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

pub fn extract_provider_subscription_id(object: &Value) -> Option<String> {
    extract_prefixed_id(
        object,
        &SUBSCRIPTION_ID_ALIASES,
        PROVIDER_SUBSCRIPTION_ID_PREFIX,
    )
}

pub fn extract_provider_invoice_id(object: &Value) -> Option<String> {
    extract_prefixed_id(object, &INVOICE_ID_ALIASES, PROVIDER_INVOICE_ID_PREFIX)
}

pub fn extract_provider_payment_id(object: &Value) -> Option<String> {
    ["payment_intent", "charge"]
        .iter()
        .find_map(|key| id_like(object.get(*key)?))
}

pub fn extract_plan_type(object: &Value) -> String {
    object
        .get("metadata")
        .and_then(|metadata| {
            PLAN_TYPE_ALIASES
                .iter()
                .find_map(|key| metadata.get(*key).and_then(Value::as_str))
        })
        .unwrap_or(UNKNOWN_SENTINEL)
        .to_string()
}

pub fn extract_currency(object: &Value) -> String {
    object
        .get("currency")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_SENTINEL)
        .to_string()
}

fn extract_prefixed_id(object: &Value, aliases: &[&str], prefix: &str) -> Option<String> {
    aliases.iter().find_map(|key| {
        let candidate = id_like(object.get(*key)?)?;
        candidate.starts_with(prefix).then_some(candidate)
    })
}

/// Stripe expands some id fields into full objects; accept both forms.
fn id_like(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(fields) => fields
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_prefers_amount_total() {
        let object = json!({ "amount_total": 349, "amount": 9999 });

        assert_eq!(extract_amount_paid(&object), Some(Decimal::new(349, 2)));
    }

    #[test]
    fn amount_skips_null_aliases() {
        let object = json!({ "amount_total": null, "amount_paid": 890 });

        assert_eq!(extract_amount_paid(&object), Some(Decimal::new(890, 2)));
    }

    #[test]
    fn amount_missing_everywhere_is_none() {
        let object = json!({ "currency": "eur" });

        assert_eq!(extract_amount_paid(&object), None);
    }

    #[test]
    fn user_id_prefers_metadata_over_client_reference() {
        let metadata_id = Uuid::new_v4();
        let reference_id = Uuid::new_v4();
        let object = json!({
            "metadata": { "user_id": metadata_id.to_string() },
            "client_reference_id": reference_id.to_string(),
        });

        assert_eq!(extract_user_id(&object), Some(metadata_id));
    }

    #[test]
    fn user_id_falls_back_to_client_reference() {
        let reference_id = Uuid::new_v4();
        let object = json!({ "client_reference_id": reference_id.to_string() });

        assert_eq!(extract_user_id(&object), Some(reference_id));
    }

    #[test]
    fn non_uuid_user_id_is_none() {
        let object = json!({ "metadata": { "user_id": "customer-42" } });

        assert_eq!(extract_user_id(&object), None);
    }

    #[test]
    fn subscription_id_accepts_expanded_object_form() {
        let object = json!({ "subscription": { "id": "sub_123" } });

        assert_eq!(
            extract_provider_subscription_id(&object),
            Some("sub_123".to_string())
        );
    }

    #[test]
    fn subscription_id_rejects_foreign_prefix_and_keeps_looking() {
        // "id" here is the checkout session's own id, not a subscription.
        let object = json!({ "subscription_id": "sub_9", "id": "cs_777" });

        assert_eq!(
            extract_provider_subscription_id(&object),
            Some("sub_9".to_string())
        );

        let session_only = json!({ "id": "cs_777" });
        assert_eq!(extract_provider_subscription_id(&session_only), None);
    }

    #[test]
    fn invoice_object_resolves_its_own_id() {
        let object = json!({ "id": "in_42", "subscription": "sub_9" });

        assert_eq!(
            extract_provider_invoice_id(&object),
            Some("in_42".to_string())
        );
    }

    #[test]
    fn plan_type_falls_back_to_sentinel() {
        let object = json!({ "metadata": {} });

        assert_eq!(extract_plan_type(&object), UNKNOWN_SENTINEL);

        let aliased = json!({ "metadata": { "plan": "monthly" } });
        assert_eq!(extract_plan_type(&aliased), "monthly");
    }

    #[test]
    fn currency_falls_back_to_sentinel() {
        assert_eq!(extract_currency(&json!({})), UNKNOWN_SENTINEL);
        assert_eq!(extract_currency(&json!({ "currency": "eur" })), "eur");
    }
}
