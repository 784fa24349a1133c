use crate::batch::{run_classify, run_report, ClassifyArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use collection_strategy::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Collection Strategy Engine",
    about = "Assign collection strategies to past-due debt and serve them over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify a ledger CSV export and write the assignments as CSV
    Classify(ClassifyArgs),
    /// Classify a ledger CSV export and print the strategy reports
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Classify(args) => run_classify(args),
        Command::Report(args) => run_report(args),
    }
}
