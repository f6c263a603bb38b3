#![forbid(unsafe_code)]

//! ShelterLink ETL
//!
//! Imports winter shelter records from an ArcGIS feature service (or the
//! local snapshot) into a Firestore collection.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use shelter_adapter_arcgis::ArcGisClient;
use shelter_pipeline::{EtlPipeline, RunSummary};
use shelter_sink_firestore::FirestoreConnector;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(summary) => {
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                written = summary.remote.written,
                "ETL process completed successfully"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %error_chain(&e), "ETL process failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let config = cli.etl_config();
    config.validate()?;

    let http = reqwest::Client::new();
    let credentials = cli.credentials.credential_config();
    let connector = FirestoreConnector::with_http(credentials, http.clone());
    let store = connector.connect().await?;

    let summary = EtlPipeline::new(config, store)
        .with_fetcher(ArcGisClient::with_http(http))
        .run()
        .await?;
    Ok(summary)
}

/// Every cause, outermost first, joined with `: `.
fn error_chain(error: &anyhow::Error) -> String {
    format!("{error:#}")
}

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_target(verbose >= 2)
        .init();

    tracing::debug!(verbose, "Logging initialised");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_chain_includes_every_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "winter_shelters.json missing");
        let error = Err::<(), _>(io)
            .context("failed to load local snapshot")
            .context("ETL run aborted")
            .unwrap_err();

        assert_eq!(
            error_chain(&error),
            "ETL run aborted: failed to load local snapshot: winter_shelters.json missing"
        );
    }
}
