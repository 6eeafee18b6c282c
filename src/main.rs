use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use intel_fusion::cli::{commands, flags::Cli};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!("{err:#}");
            std::process::exit(commands::EXIT_INVALID);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout stays machine-readable JSON lines.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
