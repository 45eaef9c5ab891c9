pub mod builder;

use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;

use crate::{
    delivery::Delivery,
    dispatcher::ParallelDispatcher,
    llm::{summarizer::VideoSummarizer, ChatCompletion},
    report::{ReportBuilder, ReportRenderer},
    yt::{FetchWindow, MetadataSource, TranscriptSource, VideoSource},
};

/// What a single run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub videos: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub report_path: Option<PathBuf>,
    pub delivered: bool,
}

/// Fetch → summarize (in parallel) → render → deliver
pub struct DigestProcessor<V, T, M, C, R, D>
where
    V: VideoSource + Send + Sync + 'static,
    T: TranscriptSource + Send + Sync + 'static,
    M: MetadataSource + Send + Sync + 'static,
    C: ChatCompletion + Send + Sync + 'static,
    R: ReportRenderer + Send + Sync + 'static,
    D: Delivery + Send + Sync + 'static,
{
    video_source: V,
    summarizer: Arc<VideoSummarizer<T, M, C>>,
    renderer: R,
    delivery: D,
    dispatcher: ParallelDispatcher,
    report_builder: ReportBuilder,
    window: FetchWindow,
    output_dir: PathBuf,
    recipient: String,
}

impl<V, T, M, C, R, D> DigestProcessor<V, T, M, C, R, D>
where
    V: VideoSource + Send + Sync + 'static,
    T: TranscriptSource + Send + Sync + 'static,
    M: MetadataSource + Send + Sync + 'static,
    C: ChatCompletion + Send + Sync + 'static,
    R: ReportRenderer + Send + Sync + 'static,
    D: Delivery + Send + Sync + 'static,
{
    /// Runs the pipeline once.
    ///
    /// Source errors and render errors abort the run; per-video failures end
    /// up in the report and a failed delivery is only logged.
    #[tracing::instrument(skip(self), fields(window = ?self.window))]
    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let started = Instant::now();

        let videos = self
            .video_source
            .fetch_recent_videos(self.window)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch videos"))
            .context("Failed to fetch recent videos")?;
        tracing::info!(count = videos.len(), "Fetched recent videos");

        if videos.is_empty() {
            tracing::info!("No new videos to process at this time");
            return Ok(RunSummary {
                videos: 0,
                succeeded: 0,
                failed: 0,
                report_path: None,
                delivered: false,
            });
        }

        let total = videos.len();
        let summarizer = Arc::clone(&self.summarizer);
        let results = self
            .dispatcher
            .dispatch(videos, move |video| {
                let summarizer = Arc::clone(&summarizer);
                async move { summarizer.process(video).await }
            })
            .await;

        let succeeded = results.iter().filter(|r| r.success()).count();
        let failed = results.len() - succeeded;
        tracing::info!(total, succeeded, failed, "Summaries collected");

        let document = self.report_builder.build(&results);
        let report_path = self
            .renderer
            .render(&document, &self.output_dir)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to render report"))
            .context("Failed to render report")?;

        let delivered = self
            .delivery
            .send_report(&report_path, &self.recipient, results.len())
            .await;
        if !delivered {
            tracing::warn!(path = %report_path.display(), "Report was not delivered");
        }

        tracing::info!(
            total,
            succeeded,
            failed,
            delivered,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Run finished"
        );

        Ok(RunSummary {
            videos: total,
            succeeded,
            failed,
            report_path: Some(report_path),
            delivered,
        })
    }
}
