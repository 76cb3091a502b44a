use std::path::PathBuf;

use clap::Parser;

use crate::core::limits::DEFAULT_PAGE_SIZE;

#[derive(Parser, Debug, Clone)]
#[command(name = "sqlite-browser")]
pub struct Args {
    /// Database file to open on startup.
    pub db_path: Option<PathBuf>,

    /// Logging level (stderr). Also supports RUST_LOG.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Initial rows per page, clamped to 10..=1000.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u64,

    /// How long a background query waits on a locked database file.
    #[arg(long, default_value_t = 2_000)]
    pub busy_timeout_ms: u64,
}
