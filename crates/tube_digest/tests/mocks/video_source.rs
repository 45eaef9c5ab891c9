use std::sync::{Arc, Mutex};

use chrono::Utc;
use tube_digest::{
    error::Error,
    types::VideoItem,
    yt::{FetchWindow, VideoSource},
};

#[derive(Clone, Default)]
pub struct MockVideoSource {
    pub videos: Vec<VideoItem>,
    pub calls: Arc<Mutex<Vec<FetchWindow>>>,
    pub fail_with: Option<String>,
}

impl MockVideoSource {
    pub fn new(videos: Vec<VideoItem>) -> Self {
        Self {
            videos,
            ..Default::default()
        }
    }

    /// One video per title, id `vid-<title>`
    pub fn with_titles(titles: &[&str]) -> Self {
        Self::new(
            titles
                .iter()
                .map(|t| VideoItem::new(format!("vid-{t}"), *t, "Mock Channel", Utc::now()))
                .collect(),
        )
    }

    /// Fails like an exhausted API quota
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl VideoSource for MockVideoSource {
    async fn fetch_recent_videos(&self, window: FetchWindow) -> Result<Vec<VideoItem>, Error> {
        self.calls.lock().unwrap().push(window);
        if let Some(ref msg) = self.fail_with {
            return Err(Error::YouTubeApi {
                status: 403,
                message: msg.clone(),
            });
        }
        Ok(self.videos.clone())
    }
}
