use super::super::domain::{ClassifiedRecord, CollectionStrategy};
use super::super::normalizer::normalize_label;
use super::views::{
    CriticalAlertView, RankedDebtEntry, StrategyReportSummary, StrategyShareEntry,
    StrategyTotalsEntry,
};
use std::collections::BTreeMap;

/// Thresholds for the critical-account alert list. Both bounds are exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalFilter {
    pub segment: String,
    pub min_days: u32,
    pub min_amount: f64,
}

impl Default for CriticalFilter {
    fn default() -> Self {
        Self {
            segment: "PREMIUM".to_string(),
            min_days: 60,
            min_amount: 5_000_000.0,
        }
    }
}

/// Read-only reporting queries over one run's classified records.
#[derive(Debug, Clone, Copy)]
pub struct StrategyReport<'a> {
    records: &'a [ClassifiedRecord],
}

impl<'a> StrategyReport<'a> {
    pub fn new(records: &'a [ClassifiedRecord]) -> Self {
        Self { records }
    }

    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    /// Records per strategy with their share of the whole set, largest group first.
    pub fn group_count(&self) -> Vec<StrategyShareEntry> {
        let total = self.records.len();
        let mut counts: BTreeMap<CollectionStrategy, usize> = BTreeMap::new();
        for record in self.records {
            *counts.entry(record.collection_strategy).or_default() += 1;
        }

        let mut entries: Vec<StrategyShareEntry> = counts
            .into_iter()
            .map(|(strategy, count)| StrategyShareEntry {
                strategy,
                count,
                percentage: percentage(count, total),
            })
            .collect();
        entries.sort_by(|left, right| right.count.cmp(&left.count));
        entries
    }

    /// Amount and ageing per strategy, highest total amount first.
    pub fn group_summary(&self) -> Vec<StrategyTotalsEntry> {
        #[derive(Default)]
        struct Totals {
            count: usize,
            amount: f64,
            days: u64,
        }

        let mut groups: BTreeMap<CollectionStrategy, Totals> = BTreeMap::new();
        for record in self.records {
            let totals = groups.entry(record.collection_strategy).or_default();
            totals.count += 1;
            totals.amount += record.current_amount;
            totals.days += u64::from(record.days_past_due);
        }

        let mut entries: Vec<StrategyTotalsEntry> = groups
            .into_iter()
            .map(|(strategy, totals)| StrategyTotalsEntry {
                strategy,
                record_count: totals.count,
                total_amount: totals.amount,
                average_days_past_due: totals.days as f64 / totals.count as f64,
            })
            .collect();
        entries.sort_by(|left, right| right.total_amount.total_cmp(&left.total_amount));
        entries
    }

    /// Ranks `1..=n` by amount within each strategy. Equal amounts keep input order.
    pub fn top_n_by_strategy(&self, n: usize) -> Vec<RankedDebtEntry> {
        if n == 0 {
            return Vec::new();
        }

        let mut partitions: BTreeMap<CollectionStrategy, Vec<&ClassifiedRecord>> =
            BTreeMap::new();
        for record in self.records {
            partitions
                .entry(record.collection_strategy)
                .or_default()
                .push(record);
        }

        let mut ranked = Vec::new();
        for (strategy, mut records) in partitions {
            records.sort_by(|left, right| right.current_amount.total_cmp(&left.current_amount));
            ranked.extend(
                records
                    .into_iter()
                    .take(n)
                    .enumerate()
                    .map(|(index, record)| RankedDebtEntry {
                        strategy,
                        rank: index + 1,
                        debtor_id: record.debtor_id.clone(),
                        name: record.name.clone(),
                        surname: record.surname.clone(),
                        segment: record.segment.clone(),
                        days_past_due: record.days_past_due,
                        current_amount: record.current_amount,
                    }),
            );
        }
        ranked
    }

    pub fn filter_critical(&self, filter: &CriticalFilter) -> Vec<&'a ClassifiedRecord> {
        let segment = normalize_label(&filter.segment);
        self.records
            .iter()
            .filter(|record| {
                record.segment == segment
                    && record.days_past_due > filter.min_days
                    && record.current_amount > filter.min_amount
            })
            .collect()
    }

    pub fn summary(&self, top_n: usize, filter: &CriticalFilter) -> StrategyReportSummary {
        StrategyReportSummary {
            total_records: self.total_records(),
            strategy_counts: self.group_count(),
            strategy_totals: self.group_summary(),
            top_debts: self.top_n_by_strategy(top_n),
            critical_alerts: self
                .filter_critical(filter)
                .into_iter()
                .map(CriticalAlertView::from)
                .collect(),
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
