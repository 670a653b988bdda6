use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;
use crate::domain::repositories::subscriptions::SubscriptionRepository;
use crate::domain::value_objects::payment_webhook::PROVIDER_SUBSCRIPTION_ID_PREFIX;
use crate::domain::value_objects::reconciliation::{RecognizedAmounts, ReconciliationReport};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            ReconcileError::Internal(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReconcileError>;

/// Picks the record worth keeping out of a group of duplicates for one user.
///
/// Pure: deletion is the driver's business. Returns `None` for an empty group.
pub fn select_canonical(
    mut records: Vec<SubscriptionEntity>,
    recognized_amounts: &RecognizedAmounts,
) -> Option<(SubscriptionEntity, Vec<SubscriptionEntity>)> {
    // Vec::sort_by is stable, so fully tied records keep their load order.
    records.sort_by(|a, b| compare_desirability(a, b, recognized_amounts));

    let mut records = records.into_iter();
    let canonical = records.next()?;
    Some((canonical, records.collect()))
}

/// Orders two records by desirability, most desirable first.
///
/// Priority: recognized amount, then a provider-linked id (the kept record must
/// stay manageable through the provider API), then the higher of two recognized
/// amounts (tax-adjusted charge), then recency.
fn compare_desirability(
    a: &SubscriptionEntity,
    b: &SubscriptionEntity,
    recognized_amounts: &RecognizedAmounts,
) -> Ordering {
    let a_recognized = recognized_amounts.contains(a.amount_paid);
    let b_recognized = recognized_amounts.contains(b.amount_paid);

    b_recognized
        .cmp(&a_recognized)
        .then_with(|| has_provider_link(b).cmp(&has_provider_link(a)))
        .then_with(|| {
            if a_recognized && b_recognized {
                b.amount_paid.cmp(&a.amount_paid)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

fn has_provider_link(record: &SubscriptionEntity) -> bool {
    record
        .provider_subscription_id
        .as_deref()
        .is_some_and(|id| id.starts_with(PROVIDER_SUBSCRIPTION_ID_PREFIX))
}

pub struct ReconcileSubscriptionsUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    recognized_amounts: RecognizedAmounts,
}

impl<S> ReconcileSubscriptionsUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, recognized_amounts: RecognizedAmounts) -> Self {
        Self {
            subscription_repo,
            recognized_amounts,
        }
    }

    /// Collapses duplicated subscription rows down to one canonical row per
    /// user. Best-effort batch: a delete failure is counted and the batch
    /// moves on. Safe to re-run; a second pass with no new duplicates deletes
    /// nothing.
    pub async fn reconcile_all(&self) -> UseCaseResult<ReconciliationReport> {
        let records = self
            .subscription_repo
            .list_all_ordered_by_updated_at_desc()
            .await
            .map_err(|err| {
                error!(
                    db_error = ?err,
                    "reconcile_subscriptions: failed to load subscriptions"
                );
                ReconcileError::Internal(err)
            })?;

        let record_count = records.len();

        let mut order: Vec<Uuid> = Vec::new();
        let mut groups: HashMap<Uuid, Vec<SubscriptionEntity>> = HashMap::new();
        for record in records {
            if !groups.contains_key(&record.user_id) {
                order.push(record.user_id);
            }
            groups.entry(record.user_id).or_default().push(record);
        }

        let mut report = ReconciliationReport::default();

        for user_id in order {
            let Some(group) = groups.remove(&user_id) else {
                continue;
            };
            if group.len() < 2 {
                continue;
            }

            let Some((canonical, rejected)) = select_canonical(group, &self.recognized_amounts)
            else {
                continue;
            };

            info!(
                %user_id,
                canonical_id = %canonical.id,
                duplicates = rejected.len(),
                "reconcile_subscriptions: duplicate group resolved"
            );

            report.groups_with_duplicates += 1;
            report.kept += 1;
            report.kept_ids.push(canonical.id);

            for duplicate in rejected {
                match self.subscription_repo.delete_by_id(duplicate.id).await {
                    Ok(()) => {
                        report.deleted += 1;
                        report.deleted_ids.push(duplicate.id);
                    }
                    Err(err) => {
                        error!(
                            %user_id,
                            subscription_id = %duplicate.id,
                            db_error = ?err,
                            "reconcile_subscriptions: failed to delete duplicate; continuing"
                        );
                        report.failures += 1;
                    }
                }
            }
        }

        info!(
            scanned = record_count,
            groups_with_duplicates = report.groups_with_duplicates,
            kept = report.kept,
            deleted = report.deleted,
            failures = report.failures,
            "reconcile_subscriptions: completed"
        );

        Ok(report)
    }
}
