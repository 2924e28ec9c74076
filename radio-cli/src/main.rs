//! Radio Browser CLI
//!
//! Discovers the Radio Browser API servers and issues simple requests
//! against them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use radio_browser::{Config, DiscoveryClient};

/// Radio Browser - server discovery over DNS SRV and DNS-over-HTTPS
#[derive(Parser)]
#[command(name = "radio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the discovered servers in ranked order
    Discover,

    /// Print the server the next request would use
    Pick,

    /// Search stations by name and print the raw response
    Search {
        /// Station name to search for
        query: String,
    },

    /// Print statistics of one server
    Stats,

    /// Generate a sample configuration file
    GenConfig {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "radio-browser.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::GenConfig { output } = &cli.command {
        init_logging(cli.log_level.as_deref().unwrap_or("info"));
        return generate_config(output);
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let client = DiscoveryClient::from_config(&config)
        .context("Failed to create discovery client")?;

    match cli.command {
        Commands::Discover => discover(&client).await,
        Commands::Pick => pick(&client).await,
        Commands::Search { query } => search(&client, &query).await,
        Commands::Stats => stats(&client).await,
        Commands::GenConfig { .. } => Ok(()),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?;
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

async fn initialize(client: &DiscoveryClient) -> Result<()> {
    let servers = client
        .initialize()
        .await
        .with_context(|| format!("Failed to discover servers for {}", client.service_name()))?;

    if servers.is_empty() {
        warn!("Discovery returned no servers");
    } else {
        info!("Using {} servers ({})", servers.len(), client.strategy().description());
    }
    Ok(())
}

async fn discover(client: &DiscoveryClient) -> Result<()> {
    initialize(client).await?;

    let servers = client.servers().unwrap_or_default();
    if servers.is_empty() {
        println!("No servers found for {}", client.service_name());
        return Ok(());
    }

    println!("{:<4} {:<9} {:<7} {:<6} URL", "#", "PRIORITY", "WEIGHT", "PORT");
    for (i, entry) in servers.iter().enumerate() {
        println!(
            "{:<4} {:<9} {:<7} {:<6} {}",
            i + 1,
            entry.priority,
            entry.weight,
            entry.port,
            entry.url
        );
    }
    Ok(())
}

async fn pick(client: &DiscoveryClient) -> Result<()> {
    initialize(client).await?;

    let server = client.select_server().context("No server to pick")?;
    println!("{}", server);
    Ok(())
}

async fn search(client: &DiscoveryClient, query: &str) -> Result<()> {
    initialize(client).await?;

    let body = client
        .search_stations(query)
        .await
        .with_context(|| format!("Station search for {:?} failed", query))?;

    // Pretty-print when the body is JSON, otherwise pass it through
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", String::from_utf8_lossy(&body)),
    }
    Ok(())
}

async fn stats(client: &DiscoveryClient) -> Result<()> {
    initialize(client).await?;

    let stats = client
        .server_stats()
        .await
        .context("Failed to fetch server statistics")?;

    println!("Software version:  {}", stats.software_version);
    println!("Status:            {}", stats.status);
    println!("Stations:          {}", stats.stations);
    println!("Broken stations:   {}", stats.station_broken);
    println!("Tags:              {}", stats.tags);
    println!("Languages:         {}", stats.languages);
    println!("Countries:         {}", stats.countries);
    println!("Clicks last hour:  {}", stats.click_last_hour);
    println!("Clicks last day:   {}", stats.click_last_day);
    Ok(())
}

fn generate_config(output: &Path) -> Result<()> {
    let sample = Config::sample();

    std::fs::write(output, sample)
        .with_context(|| format!("Failed to write configuration to {:?}", output))?;

    info!("Generated sample configuration at {:?}", output);
    println!("Sample configuration written to {:?}", output);

    Ok(())
}
