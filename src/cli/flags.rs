use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "intel-fusion",
    version,
    about = "Threat-intelligence fusion core: feed validation, IOC correlation, advisory scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML); built-in defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (info, debug, trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a feed document; prints OK or a bullet list of errors
    ValidateFeed {
        /// Feed JSON path
        path: PathBuf,
    },
    /// Correlate a feed's IOCs; one correlation record JSON per line
    Correlate {
        /// Feed JSON path
        path: PathBuf,
    },
    /// Score a feed's IOCs; one {value, score} JSON per line
    Score {
        /// Feed JSON path
        path: PathBuf,
    },
}
