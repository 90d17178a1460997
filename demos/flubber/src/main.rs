//! # formspec Flubber demo
//!
//! A small HTTP server that decodes a POSTed form into a typed record:
//!
//! - `variant`: required string of exactly 4 letters
//! - `size`: required integer from 1 to 4
//! - `strength`: optional float
//!
//! ## Running
//!
//! ```bash
//! cargo run --package flubber-demo -- --port 8080
//! curl -i http://localhost:8080/ -d size=2 -d variant=foop -d strength=3.4
//! ```

mod flubber;

use std::path::PathBuf;

use clap::Parser;

use formspec_core::logging::setup_logging;
use formspec_core::settings_loader;
use formspec_core::FORM_SETTINGS;

/// Serve the Flubber form.
#[derive(Debug, Parser)]
#[command(name = "flubber", version, about)]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// TOML settings file; `FORMSPEC_*` environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => settings_loader::from_toml_file_with_env(path)?,
        None => settings_loader::from_env()?,
    };
    setup_logging(&settings);
    FORM_SETTINGS.configure(settings)?;

    let app = flubber::router(flubber::AppState::new()?);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port)).await?;
    tracing::info!(port = cli.port, "listening for POST such as:");
    tracing::info!(
        "curl -i http://localhost:{}/ -d size=2 -d variant=foop -d strength=3.4",
        cli.port
    );

    axum::serve(listener, app).await?;
    Ok(())
}
