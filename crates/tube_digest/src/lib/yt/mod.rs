pub mod captions;
pub mod data_api;

use std::future::Future;

use crate::{
    error::Error,
    types::{TranscriptTrack, VideoDetails, VideoItem},
};

/// How far back and how wide to look for new uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub max_channels: u32,
    pub max_videos_per_channel: u32,
    pub days_back: u32,
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self {
            max_channels: 20,
            max_videos_per_channel: 3,
            days_back: 1,
        }
    }
}

pub trait VideoSource {
    /// Lists recent uploads from the user's subscriptions.
    ///
    /// Errors returned here abort the run.
    fn fetch_recent_videos(
        &self,
        window: FetchWindow,
    ) -> impl Future<Output = Result<Vec<VideoItem>, Error>> + Send;
}

pub trait TranscriptSource {
    /// Fetches the transcript in exactly `language`
    fn fetch_transcript(
        &self,
        video_id: &str,
        language: &str,
    ) -> impl Future<Output = Result<String, Error>> + Send;

    fn list_transcripts(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<TranscriptTrack>, Error>> + Send;

    fn fetch_track(
        &self,
        track: &TranscriptTrack,
    ) -> impl Future<Output = Result<String, Error>> + Send;
}

pub trait MetadataSource {
    /// `Ok(None)` when the video does not exist or is not visible to the caller
    fn video_details(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Option<VideoDetails>, Error>> + Send;
}
