//! price-compare - Concurrent multi-retailer product price comparison.

use anyhow::Result;
use clap::{Parser, Subcommand};
use price_compare::commands::{list_retailers, SearchCommand};
use price_compare::config::{Config, OutputFormat};
use price_compare::retail::{PriceSearch, Registry};
use price_compare::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-compare",
    version,
    about = "Compare product prices across online retailers",
    long_about = "Searches every retailer serving a country concurrently and lists the offers sorted by price."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "PRICE_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all retailers for a product
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Country code (e.g. us, in)
        #[arg(short = 'C', long)]
        country: Option<String>,

        /// Maximum results per retailer
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// List configured retailers
    Retailers,

    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Search { query, country, max } => {
            if let Some(country) = country {
                config.country = country;
            }
            if let Some(max) = max {
                config.max_results = max;
            }

            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&query).await?;
            println!("{}", output);
        }

        Commands::Retailers => {
            let registry = Registry::with_extra(config.retailers.clone())?;
            println!("{}", list_retailers(&registry));
        }

        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }

            let search = PriceSearch::from_config(&config)?;
            server::serve(Arc::new(search), &config.bind).await?;
        }
    }

    Ok(())
}
