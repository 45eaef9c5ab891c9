//! # Content Resolver
//!
//! Turns a video id into text worth summarizing. Strategies are tried in a
//! fixed order and the first one yielding enough text wins:
//!
//! 1. a transcript in each preferred language, in preference order
//! 2. any listed transcript, auto-generated tracks before manual ones
//! 3. the video description, wrapped with its title, channel and publish time
//!
//! Every fetch error is logged and treated as "try the next strategy".

use crate::{
    types::{Provenance, ResolvedContent, TranscriptTrack, VideoDetails},
    yt::{MetadataSource, TranscriptSource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverPolicy {
    pub languages: Vec<String>,
    /// A transcript must be strictly longer than this many characters
    pub min_transcript_chars: usize,
    /// A description must be strictly longer than this many characters
    pub min_description_chars: usize,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            languages: ["en", "en-US", "en-GB", "en-CA", "en-AU"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_transcript_chars: 100,
            min_description_chars: 100,
        }
    }
}

#[derive(Debug)]
pub struct ContentResolver<T, M> {
    transcripts: T,
    metadata: M,
    policy: ResolverPolicy,
}

impl<T, M> ContentResolver<T, M>
where
    T: TranscriptSource + Send + Sync,
    M: MetadataSource + Send + Sync,
{
    pub fn new(transcripts: T, metadata: M, policy: ResolverPolicy) -> Self {
        Self {
            transcripts,
            metadata,
            policy,
        }
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    /// Returns `None` when no strategy produced usable text
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str) -> Option<ResolvedContent> {
        if let Some(content) = self.preferred_language_transcript(video_id).await {
            return Some(content);
        }
        if let Some(content) = self.any_listed_transcript(video_id).await {
            return Some(content);
        }
        if let Some(content) = self.description(video_id).await {
            return Some(content);
        }

        tracing::info!("No transcript or description available");
        None
    }

    fn long_enough(text: &str, threshold: usize) -> bool {
        text.chars().count() > threshold
    }

    async fn preferred_language_transcript(&self, video_id: &str) -> Option<ResolvedContent> {
        for (idx, language) in self.policy.languages.iter().enumerate() {
            match self.transcripts.fetch_transcript(video_id, language).await {
                Ok(text) if Self::long_enough(&text, self.policy.min_transcript_chars) => {
                    let provenance = if idx == 0 {
                        Provenance::PrimaryTranscript(language.clone())
                    } else {
                        Provenance::FallbackTranscript(language.clone())
                    };
                    if let Some(content) = ResolvedContent::new(text, provenance) {
                        tracing::info!(provenance = %content.provenance(), chars = content.text().len(), "Resolved transcript");
                        return Some(content);
                    }
                    tracing::debug!(%language, "Transcript is blank");
                }
                Ok(text) => {
                    tracing::debug!(%language, chars = text.len(), "Transcript too short");
                }
                Err(e) => {
                    tracing::debug!(%language, error = %e, "Transcript not available");
                }
            }
        }
        None
    }

    async fn any_listed_transcript(&self, video_id: &str) -> Option<ResolvedContent> {
        let tracks = match self.transcripts.list_transcripts(video_id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list transcripts");
                return None;
            }
        };

        let (generated, manual): (Vec<&TranscriptTrack>, Vec<&TranscriptTrack>) =
            tracks.iter().partition(|t| t.is_generated);

        for track in generated.into_iter().chain(manual) {
            match self.transcripts.fetch_track(track).await {
                Ok(text) if Self::long_enough(&text, self.policy.min_transcript_chars) => {
                    let provenance = if track.is_generated {
                        Provenance::AutoGenerated
                    } else {
                        Provenance::Manual
                    };
                    if let Some(content) = ResolvedContent::new(text, provenance) {
                        tracing::info!(provenance = %content.provenance(), language = %track.language_code, chars = content.text().len(), "Resolved listed transcript");
                        return Some(content);
                    }
                    tracing::debug!(language = %track.language_code, "Listed transcript is blank");
                }
                Ok(_) => {
                    tracing::debug!(language = %track.language_code, "Listed transcript too short");
                }
                Err(e) => {
                    tracing::debug!(language = %track.language_code, error = %e, "Failed to fetch listed transcript");
                }
            }
        }
        None
    }

    async fn description(&self, video_id: &str) -> Option<ResolvedContent> {
        let details = match self.metadata.video_details(video_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                tracing::warn!("Video metadata not found");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch video metadata");
                return None;
            }
        };

        if !Self::long_enough(&details.description, self.policy.min_description_chars) {
            tracing::debug!(
                chars = details.description.chars().count(),
                "Description too short"
            );
            return None;
        }

        let text = description_block(&details);
        tracing::info!(chars = text.len(), "Resolved description");
        ResolvedContent::new(text, Provenance::Description)
    }
}

fn description_block(details: &VideoDetails) -> String {
    let published = details
        .published_at
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default();

    format!(
        "Video Title: {}\nChannel: {}\nPublished: {}\n\nVideo Description:\n{}",
        details.title,
        details.channel,
        published,
        details.description.trim()
    )
}
