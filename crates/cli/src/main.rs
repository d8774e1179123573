//! `jyotish` -- Vedic astrology charts from the terminal.
//!
//! Talks to the astrology backend over HTTP and keeps the session token
//! and the last fetched chart in a local data directory.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                 | Description                     |
//! |--------------------------------|----------|-------------------------|---------------------------------|
//! | `JYOTISH_API_URL`              | no       | `http://localhost:8000` | Backend base URL                |
//! | `JYOTISH_REQUEST_TIMEOUT_SECS` | no       | `30`                    | Per-request timeout in seconds  |
//! | `JYOTISH_DATA_DIR`             | no       | platform data dir       | Session and chart cache storage |

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jyotish_cli::args::Cli;
use jyotish_cli::commands::{self, App};
use jyotish_client::config::ClientConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jyotish_cli=info,jyotish_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(
        api_url = %config.api_url,
        data_dir = %config.data_dir.display(),
        "Loaded client configuration",
    );

    let result = match App::from_config(&config, cli.json) {
        Ok(app) => commands::run(cli, &app).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
