use std::{path::PathBuf, str::FromStr};

use anyhow::Context;
use apalis::{layers::sentry::SentryLayer, prelude::*};
use apalis_cron::{CronStream, Tick};
use clap::Parser;
use cron::Schedule;
use tube_digest::{
    config::{AppConfig, Settings, DEFAULT_ENV_PATH, DEFAULT_SETTINGS_PATH},
    delivery::EmailSender,
    openrouter::{ChatParams, OpenRouterClient},
    report::pdf::PdfRenderer,
    tracing::init_tracing_subscriber,
    yt::{captions::WatchPageCaptions, data_api::YouTubeDataClient},
    DigestProcessorBuilder, RunSummary,
};

#[derive(Parser)]
#[command(
    name = "tube-digest",
    about = "Daily digest of YouTube subscription videos, summarized and emailed as a PDF"
)]
struct Cli {
    /// Run the pipeline once and exit instead of waiting for the daily schedule
    #[arg(long)]
    once: bool,

    /// Path to the JSON settings file
    #[arg(long, env = "TUBE_DIGEST_SETTINGS", default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// Path to a .env file with credentials
    #[arg(long)]
    env_file: Option<PathBuf>,
}

async fn run_pipeline(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let settings = &config.settings;
    let http = config
        .http_client()
        .context("Failed to build HTTP client")?;

    let youtube = YouTubeDataClient::new(http.clone(), &config.youtube.access_token)
        .with_api_key(config.youtube.api_key.clone());
    let chat = OpenRouterClient::new(
        http.clone(),
        &config.openrouter.api_key,
        ChatParams {
            model: config.openrouter.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        },
    );
    let email = EmailSender::new(&config.email, settings.request_timeout())?;

    let processor = DigestProcessorBuilder::new(&settings.pdf_output_dir, &config.email.to)
        .video_source(youtube.clone())
        .transcripts(WatchPageCaptions::new(http))
        .metadata(youtube)
        .chat(chat)
        .renderer(PdfRenderer::new(
            settings.font_path.clone(),
            settings.page_break_between_sections,
        ))
        .delivery(email)
        .with_settings(settings)
        .build();

    processor.run().await
}

async fn handle_tick(_tick: Tick, config: Data<AppConfig>) -> anyhow::Result<()> {
    tracing::info!(
        schedule_time = %config.settings.schedule_time,
        "Running scheduled digest..."
    );
    let summary = run_pipeline(&config)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Scheduled run failed"))?;
    tracing::info!(?summary, "Scheduled run complete");
    Ok(())
}

fn load_env(env_file: Option<&PathBuf>) {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(path).is_ok(),
        None => dotenvy::from_path(DEFAULT_ENV_PATH).is_ok() || dotenvy::dotenv().is_ok(),
    };
    if !loaded {
        eprintln!("No .env file loaded; relying on the process environment");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    load_env(cli.env_file.as_ref());

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let loaded = Settings::load(&cli.settings)?;
    let settings_found = loaded.is_some();
    let config =
        AppConfig::from_env(loaded.unwrap_or_default()).context("Invalid configuration")?;

    init_tracing_subscriber(Some(&config.settings.log_dir), config.log_level())?;
    if !settings_found {
        tracing::info!(path = %cli.settings.display(), "Settings file not found, using defaults");
    }

    if cli.once {
        tracing::info!("Running digest once...");
        let summary = run_pipeline(&config).await?;
        tracing::info!(?summary, "Digest complete");
        return Ok(());
    }

    let expression = config.settings.cron_expression()?;
    tracing::info!(%expression, "Starting daily scheduler (UTC)...");
    let schedule = Schedule::from_str(&expression)?;

    let worker = WorkerBuilder::new("tube-digest-cron")
        .backend(CronStream::new(schedule))
        .layer(SentryLayer::new())
        .data(config)
        .build(handle_tick);

    tokio::select! {
        result = worker.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C, stopping scheduler"),
    }

    Ok(())
}
