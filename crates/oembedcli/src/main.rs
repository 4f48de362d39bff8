use std::process::ExitCode;

use anyhow::{Context, Result};
use futures::future::join_all;
use oembed_service::logging;
use oembed_service::metrics;
use oembed_service::service::OembedService;

use settings::{OutputFormat, Settings};

mod output;
mod settings;

fn main() -> ExitCode {
    match execute() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            logging::ensure_log_error(&error);
            ExitCode::from(2)
        }
    }
}

/// Runs all lookups and returns whether all of them succeeded.
fn execute() -> Result<bool> {
    let settings = Settings::get()?;
    let config = &settings.config;

    // SAFETY: The runtime is not started yet, so this is still single-threaded.
    unsafe { logging::init_logging(config) };
    if let Some(ref statsd) = config.metrics.statsd {
        metrics::configure_statsd(
            &config.metrics.prefix,
            statsd,
            config.metrics.custom_tags.clone(),
        )?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create the runtime")?;

    runtime.block_on(run(settings))
}

async fn run(settings: Settings) -> Result<bool> {
    let service = OembedService::new(&settings.config)?;

    let lookups = settings.urls.iter().map(|url| service.lookup(url));
    let results = join_all(lookups).await;

    let mut all_succeeded = true;
    for (url, result) in settings.urls.iter().zip(&results) {
        if let Err(error) = result {
            tracing::warn!(url, error = error as &dyn std::error::Error, "Lookup failed");
            all_succeeded = false;
        }
        match settings.output_format {
            OutputFormat::Json => output::print_json(url, result),
            OutputFormat::Pretty => output::print_pretty(url, result),
        }
    }

    Ok(all_succeeded)
}
