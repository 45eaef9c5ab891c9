use serde::{Deserialize, Serialize};

use crate::types::Provenance;

/// Content beyond this many characters is cut before prompting
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Which prompt the summarizer sends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTemplate {
    /// Structured five-part analysis of the fetched content
    #[default]
    Analysis,
    /// Two-paragraph digest of the fetched content
    Brief,
    /// No content is fetched; the model is handed the video URL
    DirectUrl,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub title: &'a str,
    pub channel: &'a str,
    pub url: &'a str,
    pub provenance: &'a Provenance,
    pub content: Option<&'a str>,
}

impl SummaryTemplate {
    pub fn needs_content(&self) -> bool {
        !matches!(self, SummaryTemplate::DirectUrl)
    }

    pub fn render(&self, input: &PromptInput<'_>, language: &str) -> String {
        match self {
            SummaryTemplate::Analysis => analysis_prompt(input, language),
            SummaryTemplate::Brief => brief_prompt(input, language),
            SummaryTemplate::DirectUrl => direct_url_prompt(input, language),
        }
    }
}

fn instruction(provenance: &Provenance) -> String {
    match provenance {
        Provenance::PrimaryTranscript(lang) | Provenance::FallbackTranscript(lang) => {
            format!("Based on the following complete video transcript (language: {lang})")
        }
        Provenance::AutoGenerated => "Based on the following auto-generated video captions".into(),
        Provenance::Manual => "Based on the following manually authored video captions".into(),
        Provenance::Description => "Based on the following video details and description".into(),
        Provenance::DirectLink | Provenance::None => "Based on the following video content".into(),
    }
}

/// Cuts `text` to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn content_block<'a>(input: &PromptInput<'a>) -> &'a str {
    truncate_chars(input.content.unwrap_or_default(), MAX_CONTENT_CHARS)
}

fn analysis_prompt(input: &PromptInput<'_>, language: &str) -> String {
    format!(
        "{instruction}, write a professional analysis of this tech/AI podcast episode in {language}.

Title: {title}
Channel: {channel}
Content source: {source}

Content:
{content}

Provide a detailed analysis:
1. **Core points** (3-5 main arguments, with concrete details)
2. **Key technologies/concepts** (explain the technical terms mentioned)
3. **Practical insights** (actionable advice and conclusions)
4. **Industry impact** (potential effect on related industries)
5. **Recommendation** (1-5 stars, with reasons)

Requirements:
- Be concise and professional
- Emphasise technical innovation and business value
- If the content is limited, give the best analysis the available information allows
- Stay objective and accurate",
        instruction = instruction(input.provenance),
        title = input.title,
        channel = input.channel,
        source = input.provenance.tag(),
        content = content_block(input),
    )
}

fn brief_prompt(input: &PromptInput<'_>, language: &str) -> String {
    format!(
        "{instruction}, summarise this video in {language}.

Title: {title}
Channel: {channel}

Content:
{content}

Requirements:
1. Exactly two paragraphs of 100-200 words each
2. The first paragraph states the topic, the second covers the key points
3. Output the two paragraphs only, without headings or lists",
        instruction = instruction(input.provenance),
        title = input.title,
        channel = input.channel,
        content = content_block(input),
    )
}

fn direct_url_prompt(input: &PromptInput<'_>, language: &str) -> String {
    format!(
        "Watch this YouTube video and write detailed, complete notes on its content in {language}.

Video link: {url}
Title: {title}
Channel: {channel}

Requirements:
1. Write full notes rather than a bullet summary
2. Record the important information, arguments and line of reasoning
3. Include concrete details, data, examples and quotes
4. Keep the logical structure and order of the video
5. Markdown may be used to organise the notes",
        url = input.url,
        title = input.title,
        channel = input.channel,
    )
}
