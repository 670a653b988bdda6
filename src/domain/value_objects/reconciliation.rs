use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Whitelist of amounts the product actually charges. Records whose
/// `amount_paid` falls outside this set are deprioritized during duplicate
/// reconciliation but never treated as errors.
#[derive(Debug, Clone)]
pub struct RecognizedAmounts(Vec<Decimal>);

impl RecognizedAmounts {
    pub fn new(amounts: Vec<Decimal>) -> Self {
        Self(amounts)
    }

    pub fn contains(&self, amount: Decimal) -> bool {
        self.0.iter().any(|recognized| *recognized == amount)
    }
}

/// Summary of one reconciliation batch. Field names are a wire contract with
/// the admin front-end.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub groups_with_duplicates: usize,
    pub kept: usize,
    pub deleted: usize,
    pub deleted_ids: Vec<Uuid>,
    pub kept_ids: Vec<Uuid>,
    pub failures: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceBackfillReport {
    pub scanned: usize,
    pub backfilled: usize,
    pub skipped_no_url: usize,
    pub failures: usize,
}
