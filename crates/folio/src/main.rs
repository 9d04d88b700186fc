//! folio - Portfolio site backend

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folio_core::analytics::{compute_dashboard, DashboardQuery};
use folio_core::masonry::{compute_layout, LayoutInput};
use folio_core::{FolioConfig, PortfolioStore};
use folio_web::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Portfolio site backend",
    long_about = "Backend for a photography / design portfolio site.\n\
                  \n\
                  Stores portfolio items, categories, inquiries and tracking events in SQLite,\n\
                  aggregates them into an analytics dashboard and computes masonry gallery layouts.\n\
                  \n\
                  Examples:\n\
                    folio seed                         # Populate a demo database\n\
                    folio serve --port 8080            # Run the HTTP API\n\
                    folio dashboard --period 7d        # Print last week's dashboard\n\
                    folio dashboard --start 2024-01-01 --end 2024-01-31 --json\n\
                    folio layout --width 900 1.5 0.66 16:9\n\
                  \n\
                  Environment Variables:\n\
                    FOLIO_CONFIG                       # Config file path\n\
                    FOLIO_DATABASE                     # Database file path\n\
                    FOLIO_NO_COLOR                     # Disable ANSI colors\n\
                    RUST_LOG                           # Log filter (default: info)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: <config dir>/folio/config.toml)
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the config
    #[arg(long, global = true, env = "FOLIO_DATABASE")]
    database: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "FOLIO_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on (default from config)
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind (default from config)
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the analytics dashboard and exit
    Dashboard {
        /// Named period: 7d, 30d, 90d, 1y
        #[arg(long, short = 'p')]
        period: Option<String>,
        /// Window start: YYYY-MM-DD or RFC 3339
        #[arg(long)]
        start: Option<String>,
        /// Window end: YYYY-MM-DD or RFC 3339
        #[arg(long)]
        end: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute a masonry layout for the given aspect ratios
    Layout {
        /// Container width in pixels
        #[arg(long, short = 'w')]
        width: f64,
        /// Aspect ratios as 1.5, 3:2 or 1200x800
        #[arg(required = true)]
        ratios: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Populate the database with demo content
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    let no_color = cli.no_color;

    match cli.command {
        Command::Serve { port, host } => {
            run_serve(config, host, port).await?;
        }
        Command::Dashboard {
            period,
            start,
            end,
            json,
        } => {
            let query = DashboardQuery {
                start_date: start,
                end_date: end,
                period,
            };
            run_dashboard(config, query, json, no_color).await?;
        }
        Command::Layout {
            width,
            ratios,
            json,
        } => {
            run_layout(&config, width, &ratios, json, no_color)?;
        }
        Command::Seed => {
            run_seed(config).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` directives when present and valid, `info` otherwise
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn load_config(explicit: Option<&PathBuf>) -> Result<FolioConfig> {
    let path = match explicit.cloned().or_else(FolioConfig::default_path) {
        Some(path) => path,
        None => {
            debug!("No config directory available, using defaults");
            return Ok(FolioConfig::default());
        }
    };

    let config = FolioConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn open_store(config: &FolioConfig) -> Result<PortfolioStore> {
    PortfolioStore::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database {}",
            config.database_path.display()
        )
    })
}

async fn run_serve(config: FolioConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let store = Arc::new(open_store(&config)?);
    info!(
        database = %config.database_path.display(),
        "Starting folio API"
    );

    folio_web::run(AppState::new(store, config), &host, port).await
}

async fn run_dashboard(
    config: FolioConfig,
    query: DashboardQuery,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let snapshot = tokio::task::spawn_blocking(move || -> Result<_> {
        let store = open_store(&config)?;
        Ok(compute_dashboard(&store, &query, &config.analytics)?)
    })
    .await
    .context("Dashboard task failed")??;

    println!("{}", cli::format_dashboard(&snapshot, json, no_color));
    Ok(())
}

fn run_layout(
    config: &FolioConfig,
    width: f64,
    ratios: &[String],
    json: bool,
    no_color: bool,
) -> Result<()> {
    let items = ratios
        .iter()
        .enumerate()
        .map(|(i, raw)| Ok(LayoutInput::new((i + 1).to_string(), cli::parse_ratio(raw)?)))
        .collect::<Result<Vec<_>>>()?;

    let outcome = compute_layout(&items, width, &config.masonry);
    println!("{}", cli::format_layout(&outcome, json, no_color));
    Ok(())
}

async fn run_seed(config: FolioConfig) -> Result<()> {
    let report = tokio::task::spawn_blocking(move || -> Result<_> {
        let store = open_store(&config)?;
        cli::seed_demo(&store, chrono::Utc::now())
    })
    .await
    .context("Seed task failed")??;

    println!(
        "Seeded {} categories, {} items, {} events, {} inquiries",
        report.categories, report.items, report.events, report.inquiries
    );
    Ok(())
}
