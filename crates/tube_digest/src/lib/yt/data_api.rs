use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::Error,
    types::{VideoDetails, VideoItem},
    yt::{FetchWindow, MetadataSource, VideoSource},
};

/// Thin client over the YouTube Data API v3 endpoints the digest needs
#[derive(Debug, Clone)]
pub struct YouTubeDataClient {
    client: Client,
    base_url: String,
    access_token: String,
    api_key: Option<String>,
}

impl YouTubeDataClient {
    /// The API caps `maxResults` at 50 for every list endpoint used here
    const MAX_RESULTS_CAP: u32 = 50;

    pub fn new(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: "https://www.googleapis.com/youtube/v3".into(),
            access_token: access_token.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let mut request = self
            .client
            .get(format!("{}/{}", self.base_url, resource))
            .bearer_auth(&self.access_token)
            .query(query);

        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let resp = request
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, resource, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::YouTubeApi { status, message });
        }

        Ok(resp.json::<T>().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn subscribed_channels(&self, max_channels: u32) -> Result<Vec<Channel>, Error> {
        let response = self
            .get::<ListResponse<SubscriptionItem>>(
                "subscriptions",
                &[
                    ("part", "snippet".into()),
                    ("mine", "true".into()),
                    ("maxResults", max_channels.min(Self::MAX_RESULTS_CAP).to_string()),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| Channel {
                id: item.snippet.resource_id.channel_id,
                title: item.snippet.title,
            })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn channel_uploads(
        &self,
        channel_id: &str,
        max_results: u32,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<VideoItem>, Error> {
        let response = self
            .get::<ListResponse<SearchItem>>(
                "search",
                &[
                    ("part", "snippet".into()),
                    ("channelId", channel_id.into()),
                    ("type", "video".into()),
                    ("order", "date".into()),
                    ("maxResults", max_results.min(Self::MAX_RESULTS_CAP).to_string()),
                    (
                        "publishedAfter",
                        published_after.to_rfc3339_opts(SecondsFormat::Secs, true),
                    ),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(SearchItem::into_video_item)
            .collect())
    }
}

impl VideoSource for YouTubeDataClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_recent_videos(&self, window: FetchWindow) -> Result<Vec<VideoItem>, Error> {
        let channels = self
            .subscribed_channels(window.max_channels)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list subscriptions"))?;
        tracing::info!(count = channels.len(), "Fetched subscribed channels");

        let published_after = Utc::now() - chrono::Duration::days(window.days_back.into());
        let mut videos = Vec::new();

        for channel in &channels {
            match self
                .channel_uploads(&channel.id, window.max_videos_per_channel, published_after)
                .await
            {
                Ok(items) => {
                    tracing::debug!(channel = %channel.title, count = items.len(), "Fetched channel uploads");
                    videos.extend(items);
                }
                Err(e) if e.is_fatal_source_error() => {
                    tracing::error!(error = %e, channel = %channel.title, "Source API rejected request");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(error = %e, channel = %channel.title, "Skipping channel");
                }
            }
        }

        Ok(dedupe_videos(videos))
    }
}

/// A video can surface under more than one subscription; first occurrence wins
fn dedupe_videos(videos: Vec<VideoItem>) -> Vec<VideoItem> {
    videos
        .into_iter()
        .unique_by(|v| v.video_id.clone())
        .collect()
}

impl MetadataSource for YouTubeDataClient {
    #[tracing::instrument(skip(self))]
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, Error> {
        let response = self
            .get::<ListResponse<VideoResource>>(
                "videos",
                &[("part", "snippet".into()), ("id", video_id.into())],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .map(VideoResource::into_details))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionSnippet {
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    description: String,
}

impl SearchItem {
    fn into_video_item(self) -> Option<VideoItem> {
        let Snippet {
            title,
            channel_title,
            published_at,
            ..
        } = self.snippet;

        self.id
            .video_id
            .map(|id| VideoItem::new(id, title, channel_title, published_at))
    }
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    snippet: Snippet,
}

impl VideoResource {
    fn into_details(self) -> VideoDetails {
        VideoDetails {
            video_id: self.id,
            title: self.snippet.title,
            channel: self.snippet.channel_title,
            published_at: Some(self.snippet.published_at),
            description: self.snippet.description,
        }
    }
}
