use super::super::domain::{ClassifiedRecord, CollectionStrategy, DebtorId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyShareEntry {
    pub strategy: CollectionStrategy,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyTotalsEntry {
    pub strategy: CollectionStrategy,
    pub record_count: usize,
    pub total_amount: f64,
    pub average_days_past_due: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDebtEntry {
    pub strategy: CollectionStrategy,
    pub rank: usize,
    pub debtor_id: DebtorId,
    pub name: String,
    pub surname: String,
    pub segment: String,
    pub days_past_due: u32,
    pub current_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalAlertView {
    pub debtor_id: DebtorId,
    pub display_name: String,
    pub segment: String,
    pub days_past_due: u32,
    pub current_amount: f64,
    pub strategy: CollectionStrategy,
    pub executor_label: &'static str,
}

impl From<&ClassifiedRecord> for CriticalAlertView {
    fn from(record: &ClassifiedRecord) -> Self {
        Self {
            debtor_id: record.debtor_id.clone(),
            display_name: record.display_name(),
            segment: record.segment.clone(),
            days_past_due: record.days_past_due,
            current_amount: record.current_amount,
            strategy: record.collection_strategy,
            executor_label: record.executor.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MalformedRowView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debtor_id: Option<DebtorId>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExclusionSummaryView {
    pub out_of_scope: usize,
    pub malformed: usize,
    pub unknown_segments: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub malformed_rows: Vec<MalformedRowView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReportSummary {
    pub total_records: usize,
    pub strategy_counts: Vec<StrategyShareEntry>,
    pub strategy_totals: Vec<StrategyTotalsEntry>,
    pub top_debts: Vec<RankedDebtEntry>,
    pub critical_alerts: Vec<CriticalAlertView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub as_of: DateTime<Utc>,
    pub policy_version: String,
    pub critical_filter_segment: String,
    #[serde(flatten)]
    pub summary: StrategyReportSummary,
    pub exclusions: ExclusionSummaryView,
}
