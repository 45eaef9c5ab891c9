//! # Report
//!
//! Building a report is pure: [`ReportBuilder`] turns summary results into a
//! [`ReportDocument`] of typed blocks. Writing it out is the job of a
//! [`ReportRenderer`].

pub mod markup;
pub mod pdf;
pub mod titles;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{
    error::Error,
    report::{
        markup::{Block, MarkupStyle, Span},
        titles::TitleTranslator,
    },
    types::SummaryResult,
};

pub const EMPTY_BODY_PLACEHOLDER: &str = "No summary content available.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    /// 1-based position in the report
    pub index: usize,
    pub title: String,
    pub translated_title: Option<String>,
    pub channel: String,
    pub link: String,
    pub provenance: String,
    pub status: &'static str,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    /// `podcast_summary_<YYYYmmdd_HHMMSS>.pdf`
    pub fn file_name(&self) -> String {
        format!(
            "podcast_summary_{}.pdf",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

pub trait ReportRenderer {
    /// Writes `document` into `output_dir` and returns the written file's path
    fn render(&self, document: &ReportDocument, output_dir: &Path) -> Result<PathBuf, Error>;
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    markup: MarkupStyle,
    translator: TitleTranslator,
}

impl ReportBuilder {
    pub fn new(markup: MarkupStyle, translator: TitleTranslator) -> Self {
        Self { markup, translator }
    }

    pub fn build(&self, results: &[SummaryResult]) -> ReportDocument {
        self.build_at(results, Utc::now())
    }

    /// One section per result, in input order
    pub fn build_at(&self, results: &[SummaryResult], generated_at: DateTime<Utc>) -> ReportDocument {
        let sections = results
            .iter()
            .enumerate()
            .map(|(idx, result)| self.section(idx + 1, result))
            .collect();

        ReportDocument {
            generated_at,
            sections,
        }
    }

    fn section(&self, index: usize, result: &SummaryResult) -> ReportSection {
        let video = &result.video;

        let mut blocks = self.markup.parse(&result.summary);
        if blocks.is_empty() {
            blocks.push(Block::Paragraph(vec![Span::plain(EMPTY_BODY_PLACEHOLDER)]));
        }

        ReportSection {
            index,
            title: video.title.clone(),
            translated_title: self.translator.translate(&video.title).map(String::from),
            channel: video.channel.clone(),
            link: video.url(),
            provenance: result.provenance.tag(),
            status: result.status.label(),
            blocks,
        }
    }
}
