//! Domain types shared by every pipeline stage.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";

/// A candidate video returned by the video source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub published_at: DateTime<Utc>,
}

impl VideoItem {
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        channel: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            channel: channel.into(),
            published_at,
        }
    }

    pub fn url(&self) -> String {
        format!("{}?v={}", YOUTUBE_WATCH_URL, self.video_id)
    }
}

/// Metadata returned by the metadata source for a single video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub published_at: Option<DateTime<Utc>>,
    pub description: String,
}

/// One entry of a video's caption track listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub name: String,
    pub is_generated: bool,
    pub base_url: String,
}

/// Which acquisition strategy produced a piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    PrimaryTranscript(String),
    FallbackTranscript(String),
    AutoGenerated,
    Manual,
    Description,
    DirectLink,
    None,
}

impl Provenance {
    pub fn tag(&self) -> String {
        match self {
            Provenance::PrimaryTranscript(lang) => format!("transcript_{lang}"),
            Provenance::FallbackTranscript(lang) => format!("fallback_transcript_{lang}"),
            Provenance::AutoGenerated => "auto_generated".into(),
            Provenance::Manual => "manual".into(),
            Provenance::Description => "description".into(),
            Provenance::DirectLink => "direct_link".into(),
            Provenance::None => "none".into(),
        }
    }

    pub fn is_transcript(&self) -> bool {
        matches!(
            self,
            Provenance::PrimaryTranscript(_)
                | Provenance::FallbackTranscript(_)
                | Provenance::AutoGenerated
                | Provenance::Manual
        )
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

/// Text obtained for a video, tagged with its provenance.
///
/// Never empty and never tagged `Provenance::None`; absence of content is
/// expressed as `Option::None` by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    text: String,
    provenance: Provenance,
}

impl ResolvedContent {
    /// Returns `None` for an empty body or a `Provenance::None` tag
    pub fn new(text: impl Into<String>, provenance: Provenance) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() || provenance == Provenance::None {
            return None;
        }
        Some(Self { text, provenance })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryStatus {
    Success,
    /// The model was only given a locator; nothing guarantees it read the video
    Unverified,
    /// The model answered but the answer looks wrong; the text is kept as-is
    Suspect { reason: String },
    Failed { reason: String },
    Unavailable,
}

impl SummaryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SummaryStatus::Success => "ok",
            SummaryStatus::Unverified => "unverified",
            SummaryStatus::Suspect { .. } => "suspect",
            SummaryStatus::Failed { .. } => "failed",
            SummaryStatus::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub video: VideoItem,
    pub summary: String,
    pub provenance: Provenance,
    pub status: SummaryStatus,
}

impl SummaryResult {
    pub const UNAVAILABLE_MESSAGE: &'static str =
        "Content unavailable: no transcript or description could be retrieved for this video.";

    pub fn unavailable(video: VideoItem) -> Self {
        Self {
            video,
            summary: Self::UNAVAILABLE_MESSAGE.to_string(),
            provenance: Provenance::None,
            status: SummaryStatus::Unavailable,
        }
    }

    pub fn failed(video: VideoItem, provenance: Provenance, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            video,
            summary: format!("Summary generation failed: {reason}"),
            provenance,
            status: SummaryStatus::Failed { reason },
        }
    }

    pub fn success(&self) -> bool {
        matches!(
            self.status,
            SummaryStatus::Success | SummaryStatus::Unverified | SummaryStatus::Suspect { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoItem {
        VideoItem::new("abc123", "Write Things Down", "Channel", Utc::now())
    }

    #[test]
    fn url_is_derived_from_video_id() {
        assert_eq!(video().url(), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn provenance_tags_are_stable() {
        assert_eq!(
            Provenance::PrimaryTranscript("en".into()).tag(),
            "transcript_en"
        );
        assert_eq!(
            Provenance::FallbackTranscript("en-GB".into()).tag(),
            "fallback_transcript_en-GB"
        );
        assert_eq!(Provenance::AutoGenerated.tag(), "auto_generated");
        assert_eq!(Provenance::Description.to_string(), "description");
        assert_eq!(Provenance::None.tag(), "none");
    }

    #[test]
    fn resolved_content_rejects_empty_or_none() {
        assert!(ResolvedContent::new("   ", Provenance::Manual).is_none());
        assert!(ResolvedContent::new("text", Provenance::None).is_none());

        let content = ResolvedContent::new("text", Provenance::Manual).unwrap();
        assert_eq!(content.text(), "text");
        assert_eq!(content.provenance(), &Provenance::Manual);
    }

    #[test]
    fn failed_result_embeds_reason_and_is_not_success() {
        let result = SummaryResult::failed(video(), Provenance::Manual, "timed out");
        assert!(!result.success());
        assert!(result.summary.contains("timed out"));
        assert_eq!(result.status.label(), "failed");
    }

    #[test]
    fn unavailable_result_uses_fixed_message() {
        let result = SummaryResult::unavailable(video());
        assert!(!result.success());
        assert_eq!(result.summary, SummaryResult::UNAVAILABLE_MESSAGE);
        assert_eq!(result.provenance, Provenance::None);
    }
}
