use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::domain::entities::payments::{NewPaymentEntity, PaymentEntity};
use crate::domain::repositories::payments::PaymentRepository;
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn record_payment(&self, new_payment: NewPaymentEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(payments::table)
            .values(&new_payment)
            .returning(payments::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn list_missing_invoice_url(&self) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::invoice_url.is_null())
            .filter(payments::provider_invoice_id.is_not_null())
            .order(payments::created_at.desc())
            .select(PaymentEntity::as_select())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn set_invoice_url(&self, payment_id: Uuid, invoice_url: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(payments::table.filter(payments::id.eq(payment_id)))
            .set(payments::invoice_url.eq(invoice_url))
            .execute(&mut conn)?;

        Ok(())
    }
}
