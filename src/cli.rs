use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::installer::SERVER_PACKAGE;
use crate::logs::DEFAULT_LOG_ROOT;

/// Acceptance harness for Quarry Server
#[derive(Parser)]
#[command(name = "quarry-acceptance")]
#[command(about = "Test configuration and host orchestration for Quarry Server acceptance runs")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON options file with explicit per-setting values
    #[arg(long, global = true)]
    pub options: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the run configuration and print it
    Config,
    /// Install the server on a host using the configured strategy
    Install {
        /// Host name ssh can resolve
        #[arg(long)]
        host: String,
        /// Platform descriptor, e.g. el-7-x86_64-server
        #[arg(long)]
        platform: String,
        /// Override the configured strategy (package or git)
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Collect server logs from a host
    CollectLogs {
        #[arg(long)]
        host: String,
        #[arg(long)]
        platform: String,
        /// Destination path relative to the log root
        #[arg(long)]
        dest: String,
        /// Local log root directory
        #[arg(long, default_value = DEFAULT_LOG_ROOT)]
        log_root: PathBuf,
    },
    /// Read one variable from the server package's defaults file on a host
    DefaultsVar {
        #[arg(long)]
        host: String,
        #[arg(long)]
        platform: String,
        /// Package whose defaults file to source
        #[arg(long, default_value = SERVER_PACKAGE)]
        package: String,
        /// Variable name to echo
        #[arg(long)]
        var: String,
    },
    /// Bootstrap TLS trust material for agent hosts against the server
    InitTls {
        /// Server host name
        #[arg(long)]
        server: String,
        /// Server platform descriptor
        #[arg(long)]
        platform: String,
        /// Agent hosts as name=platform pairs (repeatable)
        #[arg(long)]
        agent: Vec<String>,
    },
}
