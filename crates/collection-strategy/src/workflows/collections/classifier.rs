use super::domain::{ClassifiedRecord, CollectionStrategy, Executor, NormalizedDebt};
use super::policy::PolicyTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Full answer for one (segment, days) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub strategy: CollectionStrategy,
    pub executor: Executor,
    pub policy_segment: String,
    pub fallback: bool,
}

/// Stateless evaluator over a shared, read-only policy table.
#[derive(Debug, Clone)]
pub struct Classifier {
    policy: Arc<PolicyTable>,
}

impl Classifier {
    pub fn new(policy: Arc<PolicyTable>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Strategy for a canonical segment and a positive day count.
    pub fn classify(&self, segment: &str, days_past_due: NonZeroU32) -> CollectionStrategy {
        let (policy, _) = self.policy.policy_for(segment);
        policy.resolve(days_past_due).strategy
    }

    pub fn assign(&self, segment: &str, days_past_due: NonZeroU32) -> Assignment {
        let (policy, fallback) = self.policy.policy_for(segment);
        let rule = policy.resolve(days_past_due);

        Assignment {
            strategy: rule.strategy,
            executor: rule.executor,
            policy_segment: policy.segment().to_string(),
            fallback,
        }
    }

    pub(crate) fn classify_debt(
        &self,
        debt: NormalizedDebt,
        assigned_at: DateTime<Utc>,
    ) -> (ClassifiedRecord, bool) {
        let (policy, fallback) = self.policy.policy_for(&debt.segment);
        let rule = policy.resolve(debt.days_past_due);

        let record = ClassifiedRecord {
            debtor_id: debt.debtor_id,
            name: debt.name,
            surname: debt.surname,
            segment: debt.segment,
            days_past_due: debt.days_past_due.get(),
            current_amount: debt.current_amount,
            status: debt.status,
            collection_strategy: rule.strategy,
            executor: rule.executor,
            assignment_timestamp: assigned_at,
        };

        (record, fallback)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(PolicyTable::standard()))
    }
}
