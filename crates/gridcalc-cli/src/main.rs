use std::fs;
use std::io::{self, Read, Write};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gridcalc_cli::Config;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let (filter, filter_error) = match EnvFilter::try_new(&config.log_level) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("warn"), Some(err)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    if let Some(err) = filter_error {
        tracing::warn!("ignoring log filter '{}': {}", config.log_level, err);
    }

    let input = match &config.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    gridcalc_cli::run(&config, &input, &mut out)?;
    out.flush()?;

    Ok(())
}
