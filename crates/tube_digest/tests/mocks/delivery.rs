use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tube_digest::delivery::Delivery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReport {
    pub path: PathBuf,
    pub recipient: String,
    pub video_count: usize,
}

#[derive(Clone)]
pub struct MockDelivery {
    pub sent: Arc<Mutex<Vec<SentReport>>>,
    pub succeed: bool,
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            succeed: true,
        }
    }
}

impl MockDelivery {
    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Default::default()
        }
    }
}

impl Delivery for MockDelivery {
    async fn send_report(&self, path: &Path, recipient: &str, video_count: usize) -> bool {
        self.sent.lock().unwrap().push(SentReport {
            path: path.to_path_buf(),
            recipient: recipient.to_string(),
            video_count,
        });
        self.succeed
    }
}
