//! Collection strategy assignment for past-due debt.
//!
//! Ledger rows are screened (scope plus validity), classified against an immutable
//! segment policy table and written to a sink in priority order. The report module
//! exposes the read-only queries run over a classified set.

pub mod classifier;
pub mod domain;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{Assignment, Classifier};
pub use domain::{
    ClassifiedRecord, CollectionStrategy, DebtRecord, DebtorId, Executor, NormalizedDebt,
    PAST_DUE_STATUS,
};
pub use normalizer::{MalformedInput, MalformedReason, ScopeExclusion, Screening};
pub use pipeline::{
    ClassificationSink, CollectionPipeline, DebtSource, PipelineError, PipelineRun, RunTally,
    SinkError, SourceError, SourceRow, DEFAULT_PARALLEL_THRESHOLD,
};
pub use policy::{PolicyDocument, PolicyError, PolicyRule, PolicyTable, SegmentPolicy};
pub use report::{CriticalFilter, StrategyReport};
pub use router::collections_router;
pub use service::{parse_as_of, CollectionService, CriticalOverride, ReportOptions};
