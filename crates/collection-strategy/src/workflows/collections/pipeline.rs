use super::classifier::Classifier;
use super::domain::{ClassifiedRecord, DebtRecord};
use super::normalizer::{screen, MalformedInput, Screening};
use super::report::views::{ExclusionSummaryView, MalformedRowView};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Batch size at which classification switches to the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// A ledger row as delivered by a source. Rows the source could not decode arrive as
/// `Err` so the run can count them without aborting.
pub type SourceRow = Result<DebtRecord, MalformedInput>;

/// Read side of the ledger (database table, export file, queue).
pub trait DebtSource {
    fn fetch(&mut self) -> Result<Vec<SourceRow>, SourceError>;
}

/// Write side of the ledger. Receives the whole classified set once per run, already
/// in output order.
pub trait ClassificationSink {
    fn write(&mut self, records: &[ClassifiedRecord]) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("debt source unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read debt source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read ledger csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("classification sink unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write classification sink: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write ledger csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Collaborator failure. Aborts the run; retries belong to whoever scheduled it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Counters for everything a run did not classify, plus default-policy fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTally {
    pub fetched: usize,
    pub out_of_scope: usize,
    pub fallback_segments: usize,
    pub malformed: Vec<MalformedInput>,
}

impl RunTally {
    pub fn excluded(&self) -> usize {
        self.out_of_scope + self.malformed.len()
    }

    pub fn to_view(&self) -> ExclusionSummaryView {
        ExclusionSummaryView {
            out_of_scope: self.out_of_scope,
            malformed: self.malformed.len(),
            unknown_segments: self.fallback_segments,
            malformed_rows: self
                .malformed
                .iter()
                .map(|input| MalformedRowView {
                    line: input.line,
                    debtor_id: input.debtor_id.clone(),
                    reason: input.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// Result of one run: the classified set in sink order plus the tally.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub as_of: DateTime<Utc>,
    pub records: Vec<ClassifiedRecord>,
    pub tally: RunTally,
}

enum RowOutcome {
    Classified {
        record: ClassifiedRecord,
        fallback: bool,
    },
    OutOfScope,
    Malformed(MalformedInput),
}

/// Pulls, screens, classifies, sorts, then writes in a single call to the sink.
#[derive(Debug, Clone)]
pub struct CollectionPipeline {
    classifier: Classifier,
    parallel_threshold: usize,
}

impl CollectionPipeline {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn run<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        as_of: DateTime<Utc>,
    ) -> Result<PipelineRun, PipelineError>
    where
        S: DebtSource + ?Sized,
        K: ClassificationSink + ?Sized,
    {
        let rows = source.fetch()?;
        let fetched = rows.len();

        let outcomes: Vec<RowOutcome> = if fetched >= self.parallel_threshold {
            rows.into_par_iter()
                .map(|row| self.evaluate(row, as_of))
                .collect()
        } else {
            rows.into_iter()
                .map(|row| self.evaluate(row, as_of))
                .collect()
        };

        let mut tally = RunTally {
            fetched,
            ..RunTally::default()
        };
        let mut records = Vec::with_capacity(fetched);
        for outcome in outcomes {
            match outcome {
                RowOutcome::Classified { record, fallback } => {
                    if fallback {
                        debug!(
                            debtor_id = %record.debtor_id,
                            segment = %record.segment,
                            "unrecognized segment routed to default policy"
                        );
                        tally.fallback_segments += 1;
                    }
                    records.push(record);
                }
                RowOutcome::OutOfScope => tally.out_of_scope += 1,
                RowOutcome::Malformed(input) => {
                    warn!(%input, "skipping malformed ledger row");
                    tally.malformed.push(input);
                }
            }
        }

        records.sort_by(sink_order);
        sink.write(&records)?;

        info!(
            fetched,
            classified = records.len(),
            out_of_scope = tally.out_of_scope,
            malformed = tally.malformed.len(),
            fallback_segments = tally.fallback_segments,
            policy_version = self.classifier.policy().version(),
            "collection run complete"
        );

        Ok(PipelineRun {
            as_of,
            records,
            tally,
        })
    }

    fn evaluate(&self, row: SourceRow, as_of: DateTime<Utc>) -> RowOutcome {
        let record = match row {
            Ok(record) => record,
            Err(input) => return RowOutcome::Malformed(input),
        };

        match screen(&record) {
            Screening::InScope(debt) => {
                let (record, fallback) = self.classifier.classify_debt(debt, as_of);
                RowOutcome::Classified { record, fallback }
            }
            Screening::OutOfScope(_) => RowOutcome::OutOfScope,
            Screening::Malformed(input) => RowOutcome::Malformed(input),
        }
    }
}

impl Default for CollectionPipeline {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

/// `days_past_due` descending, then `current_amount` descending.
fn sink_order(left: &ClassifiedRecord, right: &ClassifiedRecord) -> Ordering {
    right
        .days_past_due
        .cmp(&left.days_past_due)
        .then_with(|| right.current_amount.total_cmp(&left.current_amount))
}
