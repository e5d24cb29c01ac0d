use clap::{Parser, Subcommand};

mod commands;

use commands::{AnalyzeArgs, FetchArgs, ForecastArgs, SimulateArgs};

#[derive(Parser)]
#[command(name = "flarewatch")]
#[command(about = "Solar flare activity vs. market volatility dashboard", long_about = None)]
struct Cli {
    /// Config file path (default: config/Config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Config profile layered over config/Config.toml (ignored with --config)
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard HTTP API
    Serve {
        /// Server address (default: server.host:server.port from config)
        #[arg(short, long)]
        addr: Option<String>,
    },
    /// Summarize a flare / market CSV pair
    Analyze(AnalyzeArgs),
    /// Project flare intensity and volatility forward
    Forecast(ForecastArgs),
    /// Run a solar activity scenario over historical baselines
    Simulate(SimulateArgs),
    /// Download flares and market data to CSV
    Fetch(FetchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { addr } => {
            let config = commands::load_config(cli.config.as_deref(), cli.profile.as_deref())?;
            let addr = addr.unwrap_or_else(|| config.server.addr());
            run_server(&addr, &config).await?;
        }
        Commands::Analyze(args) => {
            commands::run_analyze(args).await?;
        }
        Commands::Forecast(args) => {
            commands::run_forecast(args).await?;
        }
        Commands::Simulate(args) => {
            commands::run_simulate(args).await?;
        }
        Commands::Fetch(args) => {
            let config = commands::load_config(cli.config.as_deref(), cli.profile.as_deref())?;
            commands::run_fetch(args, &config).await?;
        }
    }

    Ok(())
}

async fn run_server(addr: &str, config: &flarewatch_core::AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting dashboard API on {}", addr);

    let service = flarewatch_web_api::DashboardService::from_config(config)?;
    let server = flarewatch_web_api::ApiServer::new(std::sync::Arc::new(service));

    server.serve(addr).await?;

    Ok(())
}
