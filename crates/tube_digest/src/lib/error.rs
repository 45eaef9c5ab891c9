#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(&'static str),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YouTube API error: {status} - {message}")]
    YouTubeApi { status: u16, message: String },
    #[error("No transcript available in language '{language}'")]
    TranscriptUnavailable { language: String },
    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// Auth and quota failures on the source API invalidate the whole run
    pub fn is_fatal_source_error(&self) -> bool {
        matches!(self, Error::YouTubeApi { status: 401 | 403, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_quota_errors_are_fatal() {
        let unauthorized = Error::YouTubeApi {
            status: 401,
            message: "Invalid Credentials".into(),
        };
        let quota = Error::YouTubeApi {
            status: 403,
            message: "quotaExceeded".into(),
        };
        let not_found = Error::YouTubeApi {
            status: 404,
            message: "channelNotFound".into(),
        };

        assert!(unauthorized.is_fatal_source_error());
        assert!(quota.is_fatal_source_error());
        assert!(!not_found.is_fatal_source_error());
        assert!(!Error::ParseError("boom").is_fatal_source_error());
    }
}
