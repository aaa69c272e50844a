use std::time::Duration;

use clap::Args;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Settings shared by every subcommand. Flags win over the environment.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Students per roster page
    #[arg(long, env = "EDUTRACK_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    pub page_size: usize,
    /// Artificial "analyzing" delay before results are shown, in milliseconds
    #[arg(long, env = "EDUTRACK_LATENCY_MS", default_value_t = 0, global = true)]
    pub latency_ms: u64,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub page_size: usize,
    pub latency: Duration,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            page_size: DEFAULT_PAGE_SIZE,
            latency: Duration::ZERO,
            verbose: false,
        }
    }
}

impl From<ConfigArgs> for AppConfig {
    fn from(args: ConfigArgs) -> Self {
        AppConfig {
            page_size: args.page_size.max(1),
            latency: Duration::from_millis(args.latency_ms),
            verbose: args.verbose,
        }
    }
}

impl AppConfig {
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
