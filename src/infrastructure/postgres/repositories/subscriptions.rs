use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{NewSubscriptionEntity, SubscriptionEntity};
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad, schema::subscriptions,
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn list_all_ordered_by_updated_at_desc(&self) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .order(subscriptions::updated_at.desc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn delete_by_id(&self, subscription_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::delete(subscriptions::table.filter(subscriptions::id.eq(subscription_id)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn find_by_provider_subscription_id(
        &self,
        provider_subscription_id: &str,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscriptions::table
            .filter(subscriptions::provider_subscription_id.eq(provider_subscription_id))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_status_by_provider_subscription_id(
        &self,
        provider_subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(
            subscriptions::table
                .filter(subscriptions::provider_subscription_id.eq(provider_subscription_id)),
        )
        .set((
            subscriptions::status.eq(status.to_string()),
            subscriptions::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    async fn create_or_update_after_checkout(
        &self,
        user_id: Uuid,
        plan_type: &str,
        status: SubscriptionStatus,
        currency: &str,
        amount_paid: Decimal,
        provider_subscription_id: Option<String>,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // No uniqueness constraint on user_id; concurrent deliveries can still
        // race this read and leave duplicates for the reconciliation batch.
        let existing = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::updated_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        match existing {
            Some(subscription) => {
                update(subscriptions::table.filter(subscriptions::id.eq(subscription.id)))
                    .set((
                        subscriptions::plan_type.eq(plan_type),
                        subscriptions::status.eq(status.to_string()),
                        subscriptions::currency.eq(currency),
                        subscriptions::amount_paid.eq(amount_paid),
                        subscriptions::provider_subscription_id.eq(provider_subscription_id),
                        subscriptions::updated_at.eq(Utc::now()),
                    ))
                    .execute(&mut conn)?;

                Ok(subscription.id)
            }
            None => {
                let result = insert_into(subscriptions::table)
                    .values(&NewSubscriptionEntity {
                        user_id,
                        plan_type: plan_type.to_string(),
                        status: status.to_string(),
                        currency: currency.to_string(),
                        amount_paid,
                        provider_subscription_id,
                    })
                    .returning(subscriptions::id)
                    .get_result::<Uuid>(&mut conn)?;

                Ok(result)
            }
        }
    }
}
