use crate::demo::{run_demo, DemoArgs};
use crate::server;
use campus_hr::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Campus HR",
    about = "Run the campus HR approval service or walk through its workflows from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the approvals API over HTTP (used when no subcommand is given)
    Serve(ServeArgs),
    /// Seed an in-memory roster and print leave, promotion, and resignation walkthroughs
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Bind address, overriding APP_HOST
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Listen port, overriding APP_PORT
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override APP_DATA_PATH for the JSON records document
    #[arg(long)]
    pub(crate) data_path: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    match Cli::parse().command {
        None => server::run(ServeArgs::default()).await,
        Some(command) => dispatch(command).await,
    }
}

async fn dispatch(command: Command) -> Result<(), AppError> {
    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
    }
}
