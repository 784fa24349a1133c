use chrono::{DateTime, Utc};
use clap::Args;
use collection_strategy::config::AppConfig;
use collection_strategy::error::AppError;
use collection_strategy::telemetry;
use collection_strategy::workflows::collections::report::views::CollectionReport;
use collection_strategy::workflows::collections::{
    parse_as_of, CollectionService, CriticalOverride, PipelineError, ReportOptions, RunTally,
};
use collection_strategy::workflows::ledger::{LedgerCsvSink, LedgerCsvSource, MemorySink};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Ledger CSV export to classify
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Assignment timestamp, YYYY-MM-DD or RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_as_of)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Ledger CSV export to classify and summarize
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Assignment timestamp, YYYY-MM-DD or RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_as_of)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Debts listed per strategy in the ranking
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Segment for critical alerts
    #[arg(long)]
    pub(crate) segment: Option<String>,
    /// Critical alerts require more days past due than this
    #[arg(long)]
    pub(crate) min_days: Option<u32>,
    /// Critical alerts require a larger amount than this
    #[arg(long)]
    pub(crate) min_amount: Option<f64>,
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl ReportArgs {
    fn options(&self) -> ReportOptions {
        ReportOptions {
            top_n: self.top,
            critical: CriticalOverride {
                segment: self.segment.clone(),
                min_days: self.min_days,
                min_amount: self.min_amount,
            },
        }
    }
}

fn load_service() -> Result<CollectionService, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(CollectionService::from_config(&config.collections)?)
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);
    let mut source = LedgerCsvSource::from_path(&args.input).map_err(PipelineError::from)?;

    let run = match &args.output {
        Some(path) => {
            let mut sink = LedgerCsvSink::from_path(path).map_err(PipelineError::from)?;
            service.pipeline().run(&mut source, &mut sink, as_of)?
        }
        None => {
            let mut sink = LedgerCsvSink::from_writer(std::io::stdout().lock());
            service.pipeline().run(&mut source, &mut sink, as_of)?
        }
    };

    render_tally(run.records.len(), &run.tally);
    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);
    let mut source = LedgerCsvSource::from_path(&args.input).map_err(PipelineError::from)?;
    let mut sink = MemorySink::default();

    let run = service.pipeline().run(&mut source, &mut sink, as_of)?;
    let report = service.report_for_run(&run, &args.options());

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("report serialization unavailable: {err}"),
        }
    } else {
        render_report(&report);
    }
    Ok(())
}

fn render_tally(classified: usize, tally: &RunTally) {
    eprintln!(
        "Classified {} of {} rows ({} out of scope, {} malformed, {} routed to default policy)",
        classified,
        tally.fetched,
        tally.out_of_scope,
        tally.malformed.len(),
        tally.fallback_segments
    );
    for input in &tally.malformed {
        eprintln!("  - {input}");
    }
}

pub(crate) fn render_report(report: &CollectionReport) {
    let summary = &report.summary;
    println!("Collection strategy report");
    println!(
        "As of {} | policy {} | {} classified debts",
        report.as_of.to_rfc3339(),
        report.policy_version,
        summary.total_records
    );

    println!("\nStrategy distribution");
    for entry in &summary.strategy_counts {
        println!(
            "- {}: {} ({:.1}%)",
            entry.strategy, entry.count, entry.percentage
        );
    }

    println!("\nStrategy totals");
    for entry in &summary.strategy_totals {
        println!(
            "- {}: {} debts, {:.2} outstanding, {:.1} avg days past due",
            entry.strategy, entry.record_count, entry.total_amount, entry.average_days_past_due
        );
    }

    println!("\nLargest debts per strategy");
    for entry in &summary.top_debts {
        println!(
            "- {} #{}: {} {} {} ({}, {} days, {:.2})",
            entry.strategy,
            entry.rank,
            entry.debtor_id,
            entry.name,
            entry.surname,
            entry.segment,
            entry.days_past_due,
            entry.current_amount
        );
    }

    if summary.critical_alerts.is_empty() {
        println!(
            "\nCritical {} accounts: none",
            report.critical_filter_segment
        );
    } else {
        println!("\nCritical {} accounts", report.critical_filter_segment);
        for alert in &summary.critical_alerts {
            println!(
                "- {} {}: {} days, {:.2} -> {} ({})",
                alert.debtor_id,
                alert.display_name,
                alert.days_past_due,
                alert.current_amount,
                alert.strategy,
                alert.executor_label
            );
        }
    }

    let exclusions = &report.exclusions;
    println!(
        "\nExcluded: {} out of scope, {} malformed | {} unrecognized segments sent to the default policy",
        exclusions.out_of_scope, exclusions.malformed, exclusions.unknown_segments
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        report: ReportArgs,
    }

    #[test]
    fn report_flags_become_overrides() {
        let harness = Harness::parse_from([
            "report",
            "--input",
            "ledger.csv",
            "--as-of",
            "2025-01-31",
            "--top",
            "3",
            "--min-amount",
            "1000",
        ]);

        let options = harness.report.options();
        assert_eq!(options.top_n, Some(3));
        assert_eq!(options.critical.min_amount, Some(1000.0));
        assert!(options.critical.segment.is_none());
        assert_eq!(
            harness.report.as_of.map(|value| value.to_rfc3339()),
            Some("2025-01-31T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn rejects_unparseable_as_of() {
        let result = Harness::try_parse_from([
            "report",
            "--input",
            "ledger.csv",
            "--as-of",
            "soon",
        ]);
        assert!(result.is_err());
    }
}
