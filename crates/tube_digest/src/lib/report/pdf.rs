use std::{
    borrow::Cow,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::{
    error::Error,
    report::{
        markup::{Block, Span},
        ReportDocument, ReportRenderer, ReportSection,
    },
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const FOOTER_HEIGHT: f32 = 12.0;
const PT_TO_MM: f32 = 0.352_778;
const LAYER: &str = "Layer 1";

/// A4 PDF writer built on `printpdf`.
///
/// Without `font_path` the built-in Helvetica faces are used, which only
/// cover Latin-1; pass a TTF covering the summary language otherwise.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    font_path: Option<PathBuf>,
    page_break_between_sections: bool,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            font_path: None,
            page_break_between_sections: true,
        }
    }
}

impl PdfRenderer {
    pub fn new(font_path: Option<PathBuf>, page_break_between_sections: bool) -> Self {
        Self {
            font_path,
            page_break_between_sections,
        }
    }

    /// Lays out the whole document and returns the serialized PDF
    pub fn to_bytes(&self, document: &ReportDocument) -> Result<Vec<u8>, Error> {
        let (doc, page, layer) = PdfDocument::new(
            "YouTube Podcast Digest",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            LAYER,
        );
        let fonts = self.load_fonts(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut writer = PageWriter::new(&doc, &fonts, layer);
        writer.cover(document);

        let last = document.sections.len().saturating_sub(1);
        for (idx, section) in document.sections.iter().enumerate() {
            writer.section(section);
            if idx < last {
                if self.page_break_between_sections {
                    writer.new_page();
                } else {
                    writer.space(4.0);
                }
            }
        }

        doc.save_to_bytes().map_err(render_error)
    }

    fn load_fonts(&self, doc: &PdfDocumentReference) -> Result<Fonts, Error> {
        match &self.font_path {
            Some(path) => {
                let font = doc
                    .add_external_font(BufReader::new(File::open(path)?))
                    .map_err(render_error)?;
                Ok(Fonts {
                    regular: font.clone(),
                    bold: font,
                    builtin: false,
                })
            }
            None => Ok(Fonts {
                regular: doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(render_error)?,
                bold: doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(render_error)?,
                builtin: true,
            }),
        }
    }
}

impl ReportRenderer for PdfRenderer {
    #[tracing::instrument(skip_all, fields(sections = document.sections.len()))]
    fn render(&self, document: &ReportDocument, output_dir: &Path) -> Result<PathBuf, Error> {
        let bytes = self.to_bytes(document)?;

        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(document.file_name());
        std::fs::write(&path, bytes)?;

        tracing::info!(path = %path.display(), "Report written");
        Ok(path)
    }
}

fn render_error(e: printpdf::Error) -> Error {
    Error::Render(format!("{e:?}"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    builtin: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Word {
    text: String,
    bold: bool,
}

impl Word {
    fn new(text: impl Into<String>, bold: bool) -> Self {
        Self {
            text: text.into(),
            bold,
        }
    }
}

fn words_of(spans: &[Span]) -> Vec<Word> {
    spans
        .iter()
        .flat_map(|span| {
            span.text
                .split_whitespace()
                .map(move |w| Word::new(w, span.bold))
        })
        .collect()
}

fn plain_words(text: &str, bold: bool) -> Vec<Word> {
    text.split_whitespace().map(|w| Word::new(w, bold)).collect()
}

/// Approximate advance width in mm; metrics are not read from the font
fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let ems: f32 = text
        .chars()
        .map(|c| match (c.is_ascii(), bold) {
            (true, false) => 0.5,
            (true, true) => 0.56,
            (false, _) => 1.0,
        })
        .sum();
    ems * size * PT_TO_MM
}

/// Splits a word wider than `max_width` into pieces that fit
fn split_to_fit(word: &Word, size: f32, max_width: f32) -> Vec<Word> {
    if text_width(&word.text, size, word.bold) <= max_width {
        return vec![word.clone()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.text.chars() {
        current.push(c);
        if text_width(&current, size, word.bold) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(Word::new(std::mem::take(&mut current), word.bold));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(Word::new(current, word.bold));
    }
    pieces
}

/// Greedy line filling
fn wrap(words: &[Word], size: f32, max_width: f32) -> Vec<Vec<Word>> {
    let space = text_width(" ", size, false);
    let mut lines = Vec::new();
    let mut line: Vec<Word> = Vec::new();
    let mut width = 0.0;

    for piece in words.iter().flat_map(|w| split_to_fit(w, size, max_width)) {
        let w = text_width(&piece.text, size, piece.bold);
        if !line.is_empty() && width + space + w > max_width {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
        }
        width += if line.is_empty() { w } else { space + w };
        line.push(piece);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Built-in fonts only carry Latin-1; anything else becomes `?`
fn latin1(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| (c as u32) <= 0xFF) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| match c {
                c if (c as u32) <= 0xFF => c,
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{2013}' | '\u{2014}' | '\u{2022}' => '-',
                _ => '?',
            })
            .collect(),
    )
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.4, 0.4, 0.4, None))
}

fn link_blue() -> Color {
    Color::Rgb(Rgb::new(0.1, 0.3, 0.8, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    fonts: &'a Fonts,
    layer: PdfLayerReference,
    page: usize,
    y: f32,
}

impl<'a> PageWriter<'a> {
    fn new(doc: &'a PdfDocumentReference, fonts: &'a Fonts, layer: PdfLayerReference) -> Self {
        let writer = Self {
            doc,
            fonts,
            layer,
            page: 1,
            y: PAGE_HEIGHT - MARGIN,
        };
        writer.footer();
        writer
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page += 1;
        self.y = PAGE_HEIGHT - MARGIN;
        self.footer();
    }

    fn footer(&self) {
        self.layer.set_fill_color(grey());
        self.layer.use_text(
            format!("Generated by tube-digest | page {}", self.page),
            8.0,
            Mm(MARGIN),
            Mm(MARGIN / 2.0),
            &self.fonts.regular,
        );
        self.layer.set_fill_color(black());
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN + FOOTER_HEIGHT {
            self.new_page();
        }
    }

    fn space(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn font(&self, bold: bool) -> &'a IndirectFontRef {
        if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        }
    }

    fn write(&mut self, words: &[Word], size: f32, indent: f32, color: Option<Color>) {
        let line_height = size * PT_TO_MM * 1.45;
        let max_width = PAGE_WIDTH - 2.0 * MARGIN - indent;
        let space = text_width(" ", size, false);

        for line in wrap(words, size, max_width) {
            self.ensure(line_height);
            // set per line; a page break starts a fresh layer
            if let Some(color) = &color {
                self.layer.set_fill_color(color.clone());
            }
            self.y -= line_height;

            let mut x = MARGIN + indent;
            for word in &line {
                let text = if self.fonts.builtin {
                    latin1(&word.text)
                } else {
                    Cow::Borrowed(word.text.as_str())
                };
                self.layer
                    .use_text(text.as_ref(), size, Mm(x), Mm(self.y), self.font(word.bold));
                x += text_width(&word.text, size, word.bold) + space;
            }
        }

        if color.is_some() {
            self.layer.set_fill_color(black());
        }
    }

    fn divider(&mut self) {
        self.ensure(4.0);
        self.y -= 2.0;
        self.layer.set_outline_color(grey());
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(self.y)), false),
                (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(self.y)), false),
            ],
            is_closed: false,
        });
        self.y -= 3.0;
    }

    fn cover(&mut self, document: &ReportDocument) {
        let date = document.generated_at.format("%Y-%m-%d");
        let time = document.generated_at.format("%H:%M:%S");

        self.write(&plain_words("YouTube Podcast Digest", true), 20.0, 0.0, None);
        self.space(2.0);
        self.write(
            &plain_words(
                &format!("{date} | {} videos", document.sections.len()),
                false,
            ),
            11.0,
            0.0,
            None,
        );
        self.write(
            &plain_words(&format!("Generated at {time} UTC"), false),
            9.0,
            0.0,
            Some(grey()),
        );
        self.divider();
        self.space(4.0);
    }

    fn section(&mut self, section: &ReportSection) {
        self.write(
            &plain_words(&format!("{}. {}", section.index, section.title), true),
            14.0,
            0.0,
            None,
        );

        if let Some(translated) = &section.translated_title {
            // skip rather than print a line of `?`
            if !self.fonts.builtin || matches!(latin1(translated), Cow::Borrowed(_)) {
                self.write(&plain_words(&format!("({translated})"), false), 11.0, 0.0, None);
            }
        }

        self.space(1.5);
        self.write(
            &plain_words(&format!("Channel: {}", section.channel), false),
            9.5,
            0.0,
            None,
        );
        self.write(&plain_words(&section.link, false), 9.5, 0.0, Some(link_blue()));
        self.write(
            &plain_words(
                &format!("Source: {} | Status: {}", section.provenance, section.status),
                false,
            ),
            8.5,
            0.0,
            Some(grey()),
        );
        self.space(3.0);

        for block in &section.blocks {
            self.block(block);
        }

        self.space(2.0);
        self.divider();
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, spans } => {
                let size = match level {
                    1 => 14.0,
                    2 => 12.5,
                    _ => 11.0,
                };
                self.space(2.0);
                let words = words_of(spans)
                    .into_iter()
                    .map(|w| Word::new(w.text, true))
                    .collect::<Vec<_>>();
                self.write(&words, size, 0.0, None);
                self.space(1.0);
            }
            Block::Bullet(spans) => {
                let mut words = vec![Word::new("-", false)];
                words.extend(words_of(spans));
                self.write(&words, 10.0, 4.0, None);
            }
            Block::Numbered { marker, spans } => {
                let mut words = vec![Word::new(format!("{marker}."), false)];
                words.extend(words_of(spans));
                self.write(&words, 10.0, 2.0, None);
            }
            Block::BoldLine(text) => self.write(&plain_words(text, true), 10.0, 0.0, None),
            Block::Paragraph(spans) => self.write(&words_of(spans), 10.0, 0.0, None),
            Block::Spacer => self.space(2.5),
        }
    }
}
