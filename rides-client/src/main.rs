//! Ride sharing client

use clap::Parser;
use color_eyre::Result;
use std::io::read_to_string;
use tracing::info;

use crate::config::{Config, LogFormat};
use crate::context::Context;
use crate::opt::Opt;

mod api;
mod command;
mod config;
pub mod context;
mod opt;
mod view;

/// Initializes tracing collection
fn setup_tracing(config: config::Logging) {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fmt_layer = match config.format {
        LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).pretty().boxed(),
        LogFormat::Compact => fmt::layer().with_writer(std::io::stderr).compact().boxed(),
    };

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let filter_layer = config
        .filters
        .into_iter()
        .fold(filter_layer, |layer, filter| layer.add_directive(filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Opt {
        config: mut config_file,
        command,
    } = Opt::parse();

    let config = read_to_string(&mut config_file)?;
    let config: Config = toml::from_str(&config)?;

    setup_tracing(config.logging.clone());
    color_eyre::install()?;

    info!(
        config = ?config_file.path().path(),
        "Tracing initialized, opening the session"
    );

    let mut context = Context::open(&config).await?;
    command.run(&mut context).await?;

    info!("Done");
    Ok(())
}
