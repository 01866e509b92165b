use crate::demo::{run_demo, run_report, run_rules, DemoArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dossier_flow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "dossier-flow",
    about = "Track company-formation dossiers through their workflow stages",
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
    /// Print the status rule table
    Rules,
    /// Report stage progress for a checklist export
    Report(ReportArgs),
    /// Walk a sample dossier from intake to filing
    Demo(DemoArgs),
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
        Command::Rules => {
            run_rules();
            Ok(())
        }
        Command::Report(args) => run_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
