use std::{collections::HashMap, sync::Mutex};

use reqwest::Client;

use crate::{
    error::Error,
    parser::{parse_json3_transcript, YtHtmlDocument},
    types::TranscriptTrack,
    yt::TranscriptSource,
};

/// Reads caption tracks from a video's watch page.
///
/// The track listing of each video is cached for the lifetime of the value,
/// so the per-language probes of a single resolution hit the page once.
#[derive(Debug)]
pub struct WatchPageCaptions {
    client: Client,
    watch_url: String,
    tracks: Mutex<HashMap<String, Vec<TranscriptTrack>>>,
}

impl WatchPageCaptions {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            watch_url: crate::types::YOUTUBE_WATCH_URL.into(),
            tracks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_watch_url(mut self, url: impl Into<String>) -> Self {
        self.watch_url = url.into();
        self
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<YtHtmlDocument, Error> {
        let doc = self
            .client
            .get(&self.watch_url)
            .query(&[("v", video_id)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(doc.into())
    }

    fn cached_tracks(&self, video_id: &str) -> Option<Vec<TranscriptTrack>> {
        self.tracks
            .lock()
            .ok()
            .and_then(|cache| cache.get(video_id).cloned())
    }
}

impl TranscriptSource for WatchPageCaptions {
    #[tracing::instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<String, Error> {
        let tracks = self.list_transcripts(video_id).await?;

        // manual captions are the better text when both exist in the same language
        let track = tracks
            .iter()
            .filter(|t| t.language_code == language)
            .min_by_key(|t| t.is_generated)
            .ok_or_else(|| Error::TranscriptUnavailable {
                language: language.to_string(),
            })?;

        self.fetch_track(track).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_transcripts(&self, video_id: &str) -> Result<Vec<TranscriptTrack>, Error> {
        if let Some(tracks) = self.cached_tracks(video_id) {
            return Ok(tracks);
        }

        let listed = self
            .fetch_watch_page(video_id)
            .await
            .and_then(|doc| doc.caption_tracks());

        // a page that failed once is remembered as having no tracks
        let tracks = listed.as_ref().cloned().unwrap_or_default();
        if let Ok(mut cache) = self.tracks.lock() {
            cache.insert(video_id.to_string(), tracks);
        }

        let tracks = listed?;
        tracing::debug!(count = tracks.len(), "Listed caption tracks");
        Ok(tracks)
    }

    #[tracing::instrument(skip(self, track), fields(language = %track.language_code, generated = track.is_generated))]
    async fn fetch_track(&self, track: &TranscriptTrack) -> Result<String, Error> {
        let body = self
            .client
            .get(&track.base_url)
            .query(&[("fmt", "json3")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_json3_transcript(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Serves a page without a player response and counts requests
    async fn serve_broken_watch_page() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let body = "<html><body>no player here</body></html>";
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/watch"), hits)
    }

    #[tokio::test]
    async fn unparsable_watch_page_is_fetched_once() {
        let (url, hits) = serve_broken_watch_page().await;
        let captions = WatchPageCaptions::new(Client::builder().no_proxy().build().unwrap()).with_watch_url(url);

        assert!(matches!(
            captions.list_transcripts("vid-1").await,
            Err(Error::ParseError(_))
        ));
        for language in ["en", "en-US", "en-GB"] {
            assert!(matches!(
                captions.fetch_transcript("vid-1", language).await,
                Err(Error::TranscriptUnavailable { .. })
            ));
        }
        assert!(captions.list_transcripts("vid-1").await.unwrap().is_empty());

        assert_eq!(hits.load(Ordering::SeqCst), 1, "the page must only be requested once");
    }
}
