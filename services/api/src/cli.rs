use crate::demo::{run_calculate, run_demo, CalculateArgs, DemoArgs};
use crate::infra::EngineArgs;
use crate::server;
use clap::{Args, Parser, Subcommand};
use reimbursement_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Travel Reimbursement Engine",
    about = "Serve or run the travel reimbursement engine from the command line",
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
    /// Calculate the reimbursement for a single trip and print the amount
    Calculate(CalculateArgs),
    /// Evaluate a handful of representative trips
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
    #[command(flatten)]
    pub(crate) engine: EngineArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculate(args),
        Command::Demo(args) => run_demo(args),
    }
}
