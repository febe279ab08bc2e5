mod display;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use innlookup_service::{Enricher, EnricherConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "innlookup", version, about = "Legal-entity details by INN")]
struct Cli {
    /// Base URL of the EGRUL registry mirror
    #[arg(long, env = "INNLOOKUP_REGISTRY_URL", global = true)]
    registry_url: Option<String>,

    /// Base URL of the classification code search service
    #[arg(long, env = "INNLOOKUP_CODES_URL", global = true)]
    codes_url: Option<String>,

    /// Per-upstream request timeout in seconds
    #[arg(long, env = "INNLOOKUP_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Maximum number of cached records
    #[arg(long, env = "INNLOOKUP_CACHE_CAPACITY", global = true)]
    cache_capacity: Option<usize>,

    /// Cache retention in seconds
    #[arg(long, env = "INNLOOKUP_CACHE_TTL_SECS", global = true)]
    cache_ttl_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up one or more INNs
    Lookup {
        /// 10-digit legal-entity INNs
        #[arg(required = true)]
        inns: Vec<String>,

        /// Print records as JSON instead of cards
        #[arg(long)]
        json: bool,

        /// Query the upstreams even when a record is cached
        #[arg(long)]
        refresh: bool,

        /// Print Prometheus metrics after the lookups
        #[arg(long)]
        metrics: bool,
    },
}

impl Cli {
    fn config(&self) -> EnricherConfig {
        let mut config = EnricherConfig::default();
        if let Some(url) = &self.registry_url {
            config.registry_url = url.clone();
        }
        if let Some(url) = &self.codes_url {
            config.codes_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if let Some(secs) = self.cache_ttl_secs {
            config.cache_ttl = Duration::from_secs(secs);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    tracing::info!("innlookup v{}", env!("CARGO_PKG_VERSION"));

    let enricher = Arc::new(Enricher::from_config(&config).context("building enricher")?);
    let sweeper = enricher.spawn_sweeper(config.sweep_interval);

    match cli.command {
        Command::Lookup {
            inns,
            json,
            refresh,
            metrics,
        } => {
            for inn in &inns {
                let record = if refresh {
                    enricher.refresh(inn).await
                } else {
                    enricher.fetch_enrichment(inn).await
                };
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&record).context("serialising record")?
                    );
                } else {
                    print!("{}", display::render_card(inn, &record));
                    println!();
                }
            }
            if metrics {
                print!("{}", enricher.render_metrics());
            }
        }
    }

    sweeper.abort();
    Ok(())
}
