use attend_core::infrastructure::config::{CONFIG_PATH_ENV, DATA_DIR_ENV, LEDGER_MODE_ENV, LISTEN_ADDR_ENV};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LedgerArg {
    Http,
    DryRun,
}

#[derive(Parser, Debug)]
#[command(name = "attend-mint-service")]
#[command(about = "Turns event check-ins into attendance tokens on the ledger", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Logger filter, e.g. `info` or `info,attend_core=debug`; overrides service.log_filters
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override api.listen_addr
    #[arg(long)]
    pub listen: Option<String>,

    /// Override ledger.mode
    #[arg(long, value_enum)]
    pub ledger: Option<LedgerArg>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn apply_to_env(&self) {
        if let Some(config_path) = &self.config {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }

        if let Some(data_dir) = &self.data_dir {
            std::env::set_var(DATA_DIR_ENV, data_dir);
        }

        if let Some(listen) = &self.listen {
            std::env::set_var(LISTEN_ADDR_ENV, listen);
        }

        if let Some(ledger) = self.ledger {
            let mode = match ledger {
                LedgerArg::Http => "http",
                LedgerArg::DryRun => "dry_run",
            };
            std::env::set_var(LEDGER_MODE_ENV, mode);
        }
    }
}
