use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tube_digest::ChatCompletion;

/// Answers every prompt with `reply`, specialised per video title
#[derive(Clone, Default)]
pub struct MockChat {
    pub reply: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    /// title -> error message
    pub fail_for: HashMap<String, String>,
    /// titles whose call panics
    pub panic_for: Vec<String>,
    /// title -> artificial latency
    pub delays: HashMap<String, Duration>,
}

impl MockChat {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn fail_for(mut self, title: &str, msg: &str) -> Self {
        self.fail_for.insert(title.to_string(), msg.to_string());
        self
    }

    pub fn panic_for(mut self, title: &str) -> Self {
        self.panic_for.push(title.to_string());
        self
    }

    pub fn delay_for(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    fn title_of(prompt: &str) -> String {
        prompt
            .lines()
            .find_map(|line| line.strip_prefix("Title: "))
            .unwrap_or_default()
            .to_string()
    }
}

impl ChatCompletion for MockChat {
    type Error = anyhow::Error;

    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.calls.lock().unwrap().push(prompt.to_string());
        let title = Self::title_of(prompt);

        if let Some(delay) = self.delays.get(&title) {
            tokio::time::sleep(*delay).await;
        }
        if self.panic_for.contains(&title) {
            panic!("mock chat panicked for {title}");
        }
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        if let Some(msg) = self.fail_for.get(&title) {
            return Err(anyhow::anyhow!("{}", msg));
        }

        Ok(format!("{}\n\nAbout: {title}", self.reply))
    }
}
