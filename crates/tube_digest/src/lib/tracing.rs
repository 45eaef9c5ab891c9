use std::{fs::OpenOptions, path::Path, sync::Mutex};

use anyhow::Context;
use chrono::Utc;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

const APP_NAME: &str = "tube-digest";

/// Installs the global subscriber: bunyan JSON to stdout, to a daily file
/// under `log_dir` when given, plus sentry breadcrumbs/events.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing_subscriber(log_dir: Option<&Path>, level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_ascii_lowercase()));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
            let path = dir.join(format!("tube_digest_{}.log", Utc::now().format("%Y%m%d")));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            Some(BunyanFormattingLayer::new(APP_NAME.into(), Mutex::new(file)))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(APP_NAME.into(), std::io::stdout))
        .with(file_layer)
        .with(sentry_tracing::layer());

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global tracing subscriber")?;

    Ok(())
}
