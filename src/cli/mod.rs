use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::types::Report;
use clap::{Parser, Subcommand, ValueEnum};

pub mod commands;

/// Legacy address field gate for decoderawtransaction
#[derive(Parser)]
#[command(name = "addresses-deprecation")]
#[command(about = "Check reqSigs/addresses gating of decoderawtransaction across two nodes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the gate against two live nodes (flag off / flag on)
    Run(commands::run::RunCommand),
    /// Run the gate against two in-process simulated nodes
    Simulate(commands::simulate::SimulateCommand),
    /// Print the script catalog, expected derivations and probe transaction
    Catalog(commands::catalog::CatalogCommand),
    /// Test RPC connectivity to both configured nodes
    TestRpc(commands::test_rpc::TestRpcCommand),
    /// Print the effective configuration as TOML
    ShowConfig,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Render a report in the requested format
pub fn format_report(report: &Report, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Console => Ok(report.to_console()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Parse arguments and dispatch; `Ok(false)` means the gate failed
pub async fn run() -> AppResult<bool> {
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(command) => command.run().await,
        Commands::Simulate(command) => command.run().await,
        Commands::Catalog(command) => command.run().map(|()| true),
        Commands::TestRpc(command) => command.run().await.map(|()| true),
        Commands::ShowConfig => {
            let config = AppConfig::load()?;
            println!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}
