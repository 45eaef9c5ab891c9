//! # Yt Parser
//!
//! Extracts the embedded `ytInitialPlayerResponse` object from a YouTube watch
//! page and turns its caption listing and `json3` caption bodies into the
//! crate's own types.

use std::{ops::Deref, sync::LazyLock};

use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{error::Error, types::TranscriptTrack};

static YT_PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)").unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Default, Deserialize)]
pub struct PlayerResponse {
    #[serde(default)]
    pub captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
pub struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    pub tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTracklist {
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    pub kind: Option<String>,
    pub name: Option<TextRuns>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRuns {
    pub simple_text: Option<String>,
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
pub struct TextRun {
    pub text: String,
}

impl TextRuns {
    fn text(&self) -> String {
        match &self.simple_text {
            Some(text) => text.clone(),
            None => self.runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }
}

impl From<CaptionTrack> for TranscriptTrack {
    fn from(
        CaptionTrack {
            base_url,
            language_code,
            kind,
            name,
        }: CaptionTrack,
    ) -> Self {
        TranscriptTrack {
            name: name.map(|n| n.text()).unwrap_or_else(|| language_code.clone()),
            is_generated: kind.as_deref() == Some("asr"),
            language_code,
            base_url,
        }
    }
}

/// Returns every caption track listed in the player response, in page order.
/// A video without captions yields an empty list.
pub fn parse_caption_tracks(player: PlayerResponse) -> Vec<TranscriptTrack> {
    player
        .captions
        .and_then(|c| c.tracklist)
        .map(|t| t.caption_tracks)
        .unwrap_or_default()
        .into_iter()
        .map(TranscriptTrack::from)
        .collect()
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Flattens a `fmt=json3` caption body into a single line of text
#[tracing::instrument(skip(body))]
pub fn parse_json3_transcript(body: &str) -> Result<String, Error> {
    let transcript = serde_json::from_str::<Json3Transcript>(body)?;

    // segments already carry their own leading spaces
    let joined = transcript
        .events
        .iter()
        .filter(|event| !event.segs.is_empty())
        .map(|event| event.segs.iter().map(|seg| seg.utf8.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(WHITESPACE_RE.replace_all(&joined, " ").trim().to_string())
}

pub struct YtHtmlDocument(String);

impl Deref for YtHtmlDocument {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl YtHtmlDocument {
    pub fn new(doc: String) -> Self {
        YtHtmlDocument(doc)
    }

    pub fn to_json<T>(&self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        YT_PLAYER_RESPONSE_RE
            .captures(self)
            .and_then(|cap| cap.get(1))
            .and_then(|m| serde_json::from_str(m.as_str()).ok())
            .ok_or(Error::ParseError(
                "Failed to extract ytInitialPlayerResponse from the page's script tag",
            ))
    }

    pub fn caption_tracks(&self) -> Result<Vec<TranscriptTrack>, Error> {
        self.to_json::<PlayerResponse>().map(parse_caption_tracks)
    }
}

impl From<String> for YtHtmlDocument {
    fn from(value: String) -> Self {
        YtHtmlDocument(value)
    }
}
