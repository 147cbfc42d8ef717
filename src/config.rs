use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// clusterx - Bitcoin address-cluster explorer
///
/// Command-line front end for the clustering analytics API.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug, Clone)]
#[command(name = "clusterx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bitcoin address-cluster explorer", long_about = None)]
pub struct CliArgs {
    /// Analytics API root, e.g. http://localhost:8000/api/v1
    #[arg(long, env = "API_URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in milliseconds (1000-120000)
    #[arg(long, env = "REQUEST_TIMEOUT_MS", global = true)]
    pub request_timeout_ms: Option<u64>,

    /// Rows per page in an address's transaction list (1-100)
    #[arg(long, env = "TX_PAGE_SIZE", global = true)]
    pub tx_page_size: Option<u64>,

    /// Rows per page in the cluster list (1-100)
    #[arg(long, env = "CLUSTERS_PAGE_SIZE", global = true)]
    pub clusters_page_size: Option<u64>,

    /// Hide clusters with fewer addresses than this
    #[arg(long, env = "MIN_CLUSTER_SIZE", global = true)]
    pub min_cluster_size: Option<u64>,

    /// Print the effective configuration to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search like the search bar (an address jumps straight to its view)
    Search { query: Vec<String> },
    /// Address detail with balance, cluster and transactions
    Address {
        address: String,
        /// Transaction page (1-based)
        #[arg(long)]
        page: Option<u64>,
    },
    /// Cluster detail with member addresses
    Cluster { id: String },
    /// Cluster list
    Clusters {
        /// Page (1-based)
        #[arg(long)]
        page: Option<u64>,
    },
    /// Aggregate statistics and cluster-size distribution
    Analytics,
    /// Headline statistics
    Dashboard,
    /// Open a route such as /clusters?page=2 or /address/<addr>
    Open { path: String },
    /// Interactive navigation shell
    Shell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub tx_page_size: u64,
    pub clusters_page_size: u64,
    pub min_cluster_size: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: 30_000,
            tx_page_size: 10,
            clusters_page_size: 20,
            min_cluster_size: None,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    resolve(&CliArgs::parse())
}

/// Apply defaults and validation to already-parsed arguments
pub fn resolve(args: &CliArgs) -> Result<Config> {
    let defaults = Config::default();

    let api_url = args
        .api_url
        .clone()
        .unwrap_or(defaults.api_url);
    validate_url(&api_url, "API_URL")?;

    let request_timeout_ms = validate_in_range(
        args.request_timeout_ms.unwrap_or(defaults.request_timeout_ms),
        1000,
        120_000,
        "REQUEST_TIMEOUT_MS",
    )?;

    let tx_page_size = validate_in_range(
        args.tx_page_size.unwrap_or(defaults.tx_page_size),
        1,
        100,
        "TX_PAGE_SIZE",
    )?;

    let clusters_page_size = validate_in_range(
        args.clusters_page_size.unwrap_or(defaults.clusters_page_size),
        1,
        100,
        "CLUSTERS_PAGE_SIZE",
    )?;

    let min_cluster_size = match args.min_cluster_size {
        Some(n) => Some(validate_in_range(n, 1, u64::MAX, "MIN_CLUSTER_SIZE")?),
        None => None,
    };

    Ok(Config {
        api_url,
        request_timeout_ms,
        tx_page_size,
        clusters_page_size,
        min_cluster_size,
    })
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

impl Config {
    /// Print current configuration (useful for debugging)
    pub fn print_summary(&self) {
        eprintln!("clusterx configuration:");
        eprintln!("  API URL: {}", self.api_url);
        eprintln!("  Request Timeout: {}ms", self.request_timeout_ms);
        eprintln!("  Tx Page Size: {}", self.tx_page_size);
        eprintln!("  Clusters Page Size: {}", self.clusters_page_size);
        if let Some(min) = self.min_cluster_size {
            eprintln!("  Min Cluster Size: {min}");
        }
    }
}
