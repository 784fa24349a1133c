use super::classifier::Classifier;
use super::pipeline::{CollectionPipeline, PipelineError, PipelineRun};
use super::policy::{PolicyDocument, PolicyError, PolicyTable};
use super::report::views::CollectionReport;
use super::report::{CriticalFilter, StrategyReport};
use crate::config::CollectionsConfig;
use crate::workflows::ledger::{LedgerRow, MemorySink, MemorySource};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::info;

/// Partial critical-alert thresholds; unset fields keep the configured value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CriticalOverride {
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub min_days: Option<u32>,
    #[serde(default)]
    pub min_amount: Option<f64>,
}

/// Optional per-request overrides for the reporting queries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportOptions {
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub critical: CriticalOverride,
}

/// Pipeline plus the configured reporting defaults, shared by the HTTP and CLI surfaces.
#[derive(Debug, Clone)]
pub struct CollectionService {
    pipeline: CollectionPipeline,
    top_n: usize,
    critical: CriticalFilter,
}

impl CollectionService {
    pub fn new(pipeline: CollectionPipeline, top_n: usize, critical: CriticalFilter) -> Self {
        Self {
            pipeline,
            top_n,
            critical,
        }
    }

    pub fn from_config(config: &CollectionsConfig) -> Result<Self, PolicyError> {
        let policy = match &config.policy_path {
            Some(path) => PolicyTable::from_path(path)?,
            None => PolicyTable::standard(),
        };
        info!(
            policy_version = policy.version(),
            segments = policy.segments().len(),
            "collection policy loaded"
        );

        let pipeline = CollectionPipeline::new(Classifier::new(Arc::new(policy)))
            .with_parallel_threshold(config.parallel_threshold);
        Ok(Self::new(pipeline, config.top_n, config.critical.clone()))
    }

    pub fn pipeline(&self) -> &CollectionPipeline {
        &self.pipeline
    }

    pub fn policy_document(&self) -> PolicyDocument {
        self.pipeline.classifier().policy().to_document()
    }

    /// Classifies request rows in memory; the returned run carries the sink-ordered set.
    pub fn classify(
        &self,
        rows: Vec<LedgerRow>,
        as_of: DateTime<Utc>,
    ) -> Result<PipelineRun, PipelineError> {
        let mut source = MemorySource::from_ledger_rows(rows);
        let mut sink = MemorySink::default();
        self.pipeline.run(&mut source, &mut sink, as_of)
    }

    pub fn report(
        &self,
        rows: Vec<LedgerRow>,
        as_of: DateTime<Utc>,
        options: &ReportOptions,
    ) -> Result<CollectionReport, PipelineError> {
        let run = self.classify(rows, as_of)?;
        Ok(self.report_for_run(&run, options))
    }

    pub fn report_for_run(&self, run: &PipelineRun, options: &ReportOptions) -> CollectionReport {
        let top_n = options.top_n.unwrap_or(self.top_n);
        let critical = self.critical_filter(options);
        let summary = StrategyReport::new(&run.records).summary(top_n, &critical);

        CollectionReport {
            as_of: run.as_of,
            policy_version: self.pipeline.classifier().policy().version().to_string(),
            critical_filter_segment: critical.segment,
            summary,
            exclusions: run.tally.to_view(),
        }
    }

    fn critical_filter(&self, options: &ReportOptions) -> CriticalFilter {
        let overrides = &options.critical;
        CriticalFilter {
            segment: overrides
                .segment
                .clone()
                .unwrap_or_else(|| self.critical.segment.clone()),
            min_days: overrides.min_days.unwrap_or(self.critical.min_days),
            min_amount: overrides.min_amount.unwrap_or(self.critical.min_amount),
        }
    }
}

impl Default for CollectionService {
    fn default() -> Self {
        Self::new(CollectionPipeline::default(), 5, CriticalFilter::default())
    }
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or RFC 3339"))
}

pub(crate) fn deserialize_optional_as_of<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_as_of(&value).map_err(serde::de::Error::custom))
        .transpose()
}
