use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tube_digest::{error::Error, types::TranscriptTrack, yt::TranscriptSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptCall {
    Fetch { video_id: String, language: String },
    List { video_id: String },
    Track { language: String, generated: bool },
}

#[derive(Clone, Default)]
pub struct MockTranscripts {
    /// (video id, language) -> text
    pub by_language: HashMap<(String, String), String>,
    /// video id -> listed tracks and their text
    pub listed: HashMap<String, Vec<(TranscriptTrack, String)>>,
    pub calls: Arc<Mutex<Vec<TranscriptCall>>>,
    pub fail_with: Option<String>,
}

impl MockTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript(mut self, video_id: &str, language: &str, text: &str) -> Self {
        self.by_language
            .insert((video_id.to_string(), language.to_string()), text.to_string());
        self
    }

    pub fn with_track(mut self, video_id: &str, language: &str, generated: bool, text: &str) -> Self {
        let track = TranscriptTrack {
            language_code: language.to_string(),
            name: language.to_string(),
            is_generated: generated,
            base_url: format!("https://mock/timedtext?v={video_id}&lang={language}&asr={generated}"),
        };
        self.listed
            .entry(video_id.to_string())
            .or_default()
            .push((track, text.to_string()));
        self
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl TranscriptSource for MockTranscripts {
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<String, Error> {
        self.calls.lock().unwrap().push(TranscriptCall::Fetch {
            video_id: video_id.to_string(),
            language: language.to_string(),
        });
        if self.fail_with.is_some() {
            return Err(Error::ParseError("mock transcript failure"));
        }
        self.by_language
            .get(&(video_id.to_string(), language.to_string()))
            .cloned()
            .ok_or_else(|| Error::TranscriptUnavailable {
                language: language.to_string(),
            })
    }

    async fn list_transcripts(&self, video_id: &str) -> Result<Vec<TranscriptTrack>, Error> {
        self.calls.lock().unwrap().push(TranscriptCall::List {
            video_id: video_id.to_string(),
        });
        if self.fail_with.is_some() {
            return Err(Error::ParseError("mock listing failure"));
        }
        Ok(self
            .listed
            .get(video_id)
            .map(|tracks| tracks.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default())
    }

    async fn fetch_track(&self, track: &TranscriptTrack) -> Result<String, Error> {
        self.calls.lock().unwrap().push(TranscriptCall::Track {
            language: track.language_code.clone(),
            generated: track.is_generated,
        });
        self.listed
            .values()
            .flatten()
            .find(|(t, _)| t == track)
            .map(|(_, text)| text.clone())
            .ok_or(Error::ParseError("unknown mock track"))
    }
}
