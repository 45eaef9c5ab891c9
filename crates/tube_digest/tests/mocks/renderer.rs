use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tube_digest::{
    error::Error,
    report::{ReportDocument, ReportRenderer},
};

/// Records documents instead of writing files
#[derive(Clone, Default)]
pub struct MockRenderer {
    pub rendered: Arc<Mutex<Vec<ReportDocument>>>,
    pub fail_with: Option<String>,
}

impl MockRenderer {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl ReportRenderer for MockRenderer {
    fn render(&self, document: &ReportDocument, output_dir: &Path) -> Result<PathBuf, Error> {
        if let Some(ref msg) = self.fail_with {
            return Err(Error::Render(msg.clone()));
        }
        self.rendered.lock().unwrap().push(document.clone());
        Ok(output_dir.join(document.file_name()))
    }
}
