use anyhow::Result;
use hmac::{Hmac, Mac};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub livemode: Option<bool>,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct StripeInvoice {
    pub id: Option<String>,
    pub status: Option<String>,
    pub hosted_invoice_url: Option<String>,
    pub invoice_pdf: Option<String>,
}

impl StripeInvoice {
    /// Returns the shareable invoice URL, falling back to the PDF link when the
    /// hosted page is absent.
    pub fn hosted_url(&self) -> Option<String> {
        self.hosted_invoice_url
            .clone()
            .or_else(|| self.invoice_pdf.clone())
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            webhook_secret,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .or_else(|| resp.headers().get("stripe-request-id"))
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (stripe_error_type, stripe_error_code, stripe_error_param, stripe_error_message) =
            match serde_json::from_str::<StripeErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (details.type_, details.code, details.param, details.message)
                }
                Err(_) => (None, None, None, None),
            };

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?stripe_error_type,
            stripe_error_code = ?stripe_error_code,
            stripe_error_param = ?stripe_error_param,
            stripe_error_message = ?stripe_error_message,
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Verifies the webhook signature. https://stripe.com/docs/webhooks/signatures
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent> {
        let mut timestamp: Option<String> = None;
        let mut signature: Option<String> = None;

        for part in signature_header.split(',') {
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest.to_string());
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signature = Some(rest.to_string());
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in stripe-signature"))?;
        let signature =
            signature.ok_or_else(|| anyhow::anyhow!("missing v1 in stripe-signature"))?;

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())?;
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();
        let provided = hex::decode(signature)?;

        if expected[..] != provided[..] {
            anyhow::bail!("invalid webhook signature");
        }

        let event: StripeEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }

    pub async fn retrieve_invoice(&self, invoice_id: &str) -> Result<StripeInvoice> {
        // https://stripe.com/docs/api/invoices/retrieve
        let resp = self
            .http
            .get(format!("https://api.stripe.com/v1/invoices/{}", invoice_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve invoice").await?;

        let invoice: StripeInvoice = resp.json().await?;
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_header(secret: &str, timestamp: &str, payload: &[u8]) -> String {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("t={},v1={}", timestamp, signature)
    }

    #[test]
    fn accepts_a_correctly_signed_payload() {
        let client = StripeClient::new("sk_test_x".to_string(), "whsec_test".to_string());
        let payload = br#"{"id":"evt_1","type":"invoice.payment_succeeded","data":{"object":{}}}"#;
        let header = signed_header("whsec_test", "1700000000", payload);

        let event = client.verify_webhook_signature(payload, &header).unwrap();

        assert_eq!(event.type_, "invoice.payment_succeeded");
        assert_eq!(event.id.as_deref(), Some("evt_1"));
    }

    #[test]
    fn rejects_a_payload_signed_with_another_secret() {
        let client = StripeClient::new("sk_test_x".to_string(), "whsec_test".to_string());
        let payload = br#"{"id":"evt_1","type":"noop","data":{"object":{}}}"#;
        let header = signed_header("whsec_other", "1700000000", payload);

        assert!(client.verify_webhook_signature(payload, &header).is_err());
    }

    #[test]
    fn rejects_a_header_without_signature_parts() {
        let client = StripeClient::new("sk_test_x".to_string(), "whsec_test".to_string());

        assert!(
            client
                .verify_webhook_signature(b"{}", "t=1700000000")
                .is_err()
        );
        assert!(client.verify_webhook_signature(b"{}", "v1=abcd").is_err());
    }

    #[test]
    fn hosted_url_falls_back_to_pdf() {
        let invoice = StripeInvoice {
            id: Some("in_1".to_string()),
            status: Some("paid".to_string()),
            hosted_invoice_url: None,
            invoice_pdf: Some("https://files.stripe.com/in_1.pdf".to_string()),
        };

        assert_eq!(
            invoice.hosted_url().as_deref(),
            Some("https://files.stripe.com/in_1.pdf")
        );
    }
}
