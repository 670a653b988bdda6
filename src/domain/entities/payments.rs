use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub provider_payment_id: Option<String>,
    pub provider_invoice_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPaymentEntity {
    pub user_id: Uuid,
    pub provider: String,
    pub provider_payment_id: Option<String>,
    pub provider_invoice_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub invoice_url: Option<String>,
}
