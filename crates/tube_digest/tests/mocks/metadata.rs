use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};
use tube_digest::{error::Error, types::VideoDetails, yt::MetadataSource};

#[derive(Clone, Default)]
pub struct MockMetadata {
    pub details: HashMap<String, VideoDetails>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, video_id: &str, description: &str) -> Self {
        self.details.insert(
            video_id.to_string(),
            VideoDetails {
                video_id: video_id.to_string(),
                title: format!("Title of {video_id}"),
                channel: "Mock Channel".to_string(),
                published_at: Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).single(),
                description: description.to_string(),
            },
        );
        self
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl MetadataSource for MockMetadata {
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, Error> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(Error::YouTubeApi {
                status: 500,
                message: msg.clone(),
            });
        }
        Ok(self.details.get(video_id).cloned())
    }
}
