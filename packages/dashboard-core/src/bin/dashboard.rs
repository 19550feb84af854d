//! Dashboard CLI - builds the equity dashboard for a set of tickers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_core::{
    dashboard, AlignmentPolicy, DashboardConfig, DashboardRequest, HtmlRenderer, JsonFileProvider,
    JsonRenderer, MarketDataProvider, YahooProvider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Equity dashboard - relative performance and risk/return against IBOV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices and render the dashboard
    Run(RunArgs),
    /// Print the effective configuration
    Config {
        /// Config file (defaults to the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Comma-separated tickers, e.g. PETR4,VALE3
    #[arg(short, long, default_value = "")]
    tickers: String,
    /// First date (YYYY-MM-DD), defaults to the configured start
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "dashboard.html")]
    output: PathBuf,
    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,
    /// Read prices from a JSON file instead of Yahoo Finance
    #[arg(long)]
    prices_file: Option<PathBuf>,
    /// Fail instead of dropping dates missing from some series
    #[arg(long)]
    strict_dates: bool,
    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args),
        Commands::Config { config } => handle_config(config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<DashboardConfig> {
    let path = path.unwrap_or_else(DashboardConfig::default_path);
    DashboardConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn handle_config(path: Option<PathBuf>) -> Result<()> {
    let config = load_config(path)?;
    println!("{}", config.to_toml()?);
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config)?;
    if args.strict_dates {
        config.alignment = AlignmentPolicy::Strict;
    }

    let request = DashboardRequest::new(
        DashboardRequest::parse_tickers(&args.tickers),
        args.from.unwrap_or(config.default_start),
        args.to.unwrap_or_else(|| Local::now().date_naive()),
    );

    let provider: Box<dyn MarketDataProvider> = match &args.prices_file {
        Some(path) => Box::new(
            JsonFileProvider::open(path)
                .with_context(|| format!("Failed to read prices from {}", path.display()))?,
        ),
        None => Box::new(YahooProvider::from_config(&config)?),
    };

    let view = match args.format {
        Format::Html => {
            let mut renderer = HtmlRenderer::new(&args.output);
            dashboard::run_and_render(&request, provider.as_ref(), &mut renderer, &config)
        }
        Format::Json => {
            let mut renderer = JsonRenderer::new(&args.output);
            dashboard::run_and_render_json(&request, provider.as_ref(), &mut renderer, &config)
        }
    }
    .context("Dashboard failed")?;

    if view.is_none() {
        eprintln!("Select at least one ticker with --tickers to build the dashboard.");
    }

    Ok(())
}
