use crate::{
    llm::{
        prompt::{PromptInput, SummaryTemplate},
        ChatCompletion,
    },
    resolver::ContentResolver,
    types::{Provenance, SummaryResult, SummaryStatus, VideoItem},
    yt::{MetadataSource, TranscriptSource},
};

/// Summaries shorter than this are kept but flagged as suspect
pub const MIN_SUMMARY_CHARS: usize = 100;

/// Resolves a video's content and summarizes it; never fails outward.
pub struct VideoSummarizer<T, M, C> {
    resolver: ContentResolver<T, M>,
    chat: C,
    template: SummaryTemplate,
    language: String,
}

impl<T, M, C> VideoSummarizer<T, M, C>
where
    T: TranscriptSource + Send + Sync,
    M: MetadataSource + Send + Sync,
    C: ChatCompletion + Send + Sync,
{
    pub fn new(
        resolver: ContentResolver<T, M>,
        chat: C,
        template: SummaryTemplate,
        language: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            chat,
            template,
            language: language.into(),
        }
    }

    #[tracing::instrument(skip(self, video), fields(video_id = %video.video_id, title = %video.title))]
    pub async fn process(&self, video: VideoItem) -> SummaryResult {
        if !self.template.needs_content() {
            let prompt = self.prompt(&video, &Provenance::DirectLink, None);
            return self.summarize(video, &prompt, Provenance::DirectLink).await;
        }

        let Some(content) = self.resolver.resolve(&video.video_id).await else {
            return SummaryResult::unavailable(video);
        };

        let provenance = content.provenance().clone();
        let prompt = self.prompt(&video, &provenance, Some(content.text()));
        self.summarize(video, &prompt, provenance).await
    }

    fn prompt(&self, video: &VideoItem, provenance: &Provenance, content: Option<&str>) -> String {
        let url = video.url();
        let input = PromptInput {
            title: &video.title,
            channel: &video.channel,
            url: &url,
            provenance,
            content,
        };
        self.template.render(&input, &self.language)
    }

    async fn summarize(
        &self,
        video: VideoItem,
        prompt: &str,
        provenance: Provenance,
    ) -> SummaryResult {
        match self.chat.complete(prompt).await {
            Ok(text) => {
                let summary = text.trim().to_string();
                let status = classify(&provenance, &summary);
                if let SummaryStatus::Suspect { reason } = &status {
                    tracing::warn!(%reason, "Summary looks suspect");
                }
                tracing::info!(status = status.label(), chars = summary.len(), "Summary generated");

                SummaryResult {
                    video,
                    summary,
                    provenance,
                    status,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Summary generation failed");
                SummaryResult::failed(video, provenance, e.to_string())
            }
        }
    }
}

fn classify(provenance: &Provenance, summary: &str) -> SummaryStatus {
    let chars = summary.chars().count();
    if chars < MIN_SUMMARY_CHARS {
        return SummaryStatus::Suspect {
            reason: format!("summary is only {chars} characters long"),
        };
    }

    match provenance {
        Provenance::DirectLink => SummaryStatus::Unverified,
        _ => SummaryStatus::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_output_is_suspect_regardless_of_provenance() {
        assert!(matches!(
            classify(&Provenance::Manual, "Too short."),
            SummaryStatus::Suspect { .. }
        ));
        assert!(matches!(
            classify(&Provenance::DirectLink, ""),
            SummaryStatus::Suspect { .. }
        ));
    }

    #[test]
    fn direct_link_output_is_unverified() {
        let long = "word ".repeat(40);
        assert_eq!(
            classify(&Provenance::DirectLink, &long),
            SummaryStatus::Unverified
        );
        assert_eq!(
            classify(&Provenance::Description, &long),
            SummaryStatus::Success
        );
    }
}
