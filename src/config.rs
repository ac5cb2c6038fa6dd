//! Configuration for the sync CLI.
//!
//! CLI arguments and environment variable handling using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Offline-first sync client for the Accredify compliance tracker.
#[derive(Parser, Debug, Clone)]
#[command(name = "accredify-sync")]
#[command(about = "Offline-first sync core for the Accredify compliance tracker")]
pub struct Args {
    /// Base URL of the compliance API
    #[arg(long, env = "ACCREDIFY_API_URL", default_value = "http://localhost:8000/api")]
    pub api_url: String,

    /// Bearer token for authenticated requests
    #[arg(long, env = "ACCREDIFY_TOKEN")]
    pub token: Option<String>,

    /// Directory holding the durable offline store
    #[arg(long, env = "ACCREDIFY_DATA_DIR", default_value = ".accredify")]
    pub data_dir: PathBuf,

    /// Reachability check interval in seconds
    #[arg(long, env = "CHECK_INTERVAL_SECS", default_value = "30")]
    pub check_interval_secs: u64,

    /// Reachability probe timeout in milliseconds
    #[arg(long, env = "PROBE_TIMEOUT_MS", default_value = "5000")]
    pub probe_timeout_ms: u64,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show reachability, queue depth and last snapshot time
    Status,
    /// Fetch the project listing and refresh the offline snapshot
    Fetch,
    /// Replay queued offline edits against the server
    Sync,
    /// Discard all queued offline edits without syncing
    Discard,
    /// Show upcoming recurring tasks, as grouped by the server
    Upcoming,
    /// Record a quick compliance log for one indicator
    QuickLog {
        /// Indicator id
        id: String,
    },
    /// Run the connectivity monitor and print transitions until interrupted
    Watch,
}

impl Args {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.trim().is_empty() {
            return Err("ACCREDIFY_API_URL must not be empty".to_string());
        }
        if self.check_interval_secs == 0 {
            return Err("CHECK_INTERVAL_SECS must be at least 1".to_string());
        }
        if self.probe_timeout_ms == 0 {
            return Err("PROBE_TIMEOUT_MS must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &str) -> Args {
        Args::parse_from(["accredify-sync", cmd])
    }

    #[test]
    fn test_defaults_are_valid() {
        let args = args("status");
        assert!(args.validate().is_ok());
        assert_eq!(args.check_interval(), Duration::from_secs(30));
        assert_eq!(args.probe_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut args = args("sync");
        args.check_interval_secs = 0;
        assert!(args.validate().is_err());
    }
}
