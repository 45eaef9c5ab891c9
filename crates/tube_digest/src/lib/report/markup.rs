//! Maps summary text onto typed blocks the renderer can lay out.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupStyle {
    /// Headings, bullets, numbered items and `**bold**` spans
    #[default]
    Markdown,
    /// Every non-empty line is a literal paragraph
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Bullet(Vec<Span>),
    Numbered { marker: String, spans: Vec<Span> },
    BoldLine(String),
    Paragraph(Vec<Span>),
    Spacer,
}

impl MarkupStyle {
    pub fn parse(&self, body: &str) -> Vec<Block> {
        match self {
            MarkupStyle::Markdown => parse_markdown(body),
            MarkupStyle::Plain => body
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Block::Paragraph(vec![Span::plain(line)]))
                .collect(),
        }
    }
}

fn parse_markdown(body: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for line in body.lines().map(str::trim) {
        if line.is_empty() {
            // collapse runs of blank lines; never lead with a spacer
            if !matches!(blocks.last(), None | Some(Block::Spacer)) {
                blocks.push(Block::Spacer);
            }
            continue;
        }
        blocks.push(parse_line(line));
    }

    if matches!(blocks.last(), Some(Block::Spacer)) {
        blocks.pop();
    }
    blocks
}

fn parse_line(line: &str) -> Block {
    if let Some(caps) = HEADING_RE.captures(line) {
        return Block::Heading {
            level: caps[1].len() as u8,
            spans: parse_spans(&caps[2]),
        };
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::Bullet(parse_spans(rest.trim_start()));
    }

    if let Some(caps) = NUMBERED_RE.captures(line) {
        return Block::Numbered {
            marker: caps[1].to_string(),
            spans: parse_spans(&caps[2]),
        };
    }

    if let Some(inner) = whole_line_bold(line) {
        return Block::BoldLine(inner.to_string());
    }

    Block::Paragraph(parse_spans(line))
}

fn whole_line_bold(line: &str) -> Option<&str> {
    let inner = line.strip_prefix("**")?.strip_suffix("**")?;
    (!inner.is_empty() && !inner.contains("**")).then_some(inner)
}

/// Splits `text` into plain and bold spans; unmatched markers stay literal
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::plain(&text[last..whole.start()]));
        }
        spans.push(Span::bold(inner.as_str()));
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::plain(&text[last..]));
    }
    spans
}
