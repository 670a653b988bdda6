use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;
use crate::domain::value_objects::enums::subscription_statuses::SubscriptionStatus;

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn list_all_ordered_by_updated_at_desc(&self) -> Result<Vec<SubscriptionEntity>>;

    async fn delete_by_id(&self, subscription_id: Uuid) -> Result<()>;

    async fn find_by_provider_subscription_id(
        &self,
        provider_subscription_id: &str,
    ) -> Result<Option<SubscriptionEntity>>;

    async fn update_status_by_provider_subscription_id(
        &self,
        provider_subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<()>;

    async fn create_or_update_after_checkout(
        &self,
        user_id: Uuid,
        plan_type: &str,
        status: SubscriptionStatus,
        currency: &str,
        amount_paid: Decimal,
        provider_subscription_id: Option<String>,
    ) -> Result<Uuid>;
}
