//! PDF document generation.
//!
//! Generates minimal but valid PDF 1.4 files using raw PDF format
//! construction. Content is laid out top to bottom with word wrapping and
//! automatic page breaks. Uses the built-in Helvetica family with
//! WinAnsi encoding, so no font files are required.

use anyhow::{Result, bail};
use docsmith_markup::inline::{self, Span};
use docsmith_markup::parser::{Block, ListKind, TableBlock};
use docsmith_markup::line::RuleMark;
use serde::{Deserialize, Serialize};
use tracing::debug;

const INCH: f64 = 72.0;
const MARGIN_X: f64 = 1.25 * INCH;
const MARGIN_Y: f64 = 1.0 * INCH;

type Rgb = (f64, f64, f64);

const BLACK: Rgb = (0.0, 0.0, 0.0);
const WHITE: Rgb = (1.0, 1.0, 1.0);
const NAVY: Rgb = hex(0x1F4E79);
const BLUE: Rgb = hex(0x2E75B6);
const DARK_GREY: Rgb = hex(0x404040);
const RULE_GREY: Rgb = hex(0xCCCCCC);
const GRID_GREY: Rgb = hex(0xAAAAAA);
const ROW_TINT: Rgb = hex(0xEBF3FB);

const fn hex(rgb: u32) -> Rgb {
    (
        ((rgb >> 16) & 0xFF) as f64 / 255.0,
        ((rgb >> 8) & 0xFF) as f64 / 255.0,
        (rgb & 0xFF) as f64 / 255.0,
    )
}

/// Paper size for generated PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    /// `"LETTER"` (any case) is Letter; every other value is A4.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("LETTER") {
            Self::Letter
        } else {
            Self::A4
        }
    }

    /// Width and height in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.0, 842.0),
        }
    }
}

/// Generate a PDF document from a title and parsed markup blocks.
pub fn generate_pdf(title: &str, blocks: &[Block], page_size: PageSize) -> Result<Vec<u8>> {
    let mut layout = Layout::new(page_size);

    layout.title(title);
    for block in blocks {
        match block {
            Block::Heading { level, text } => layout.heading(*level, text),
            Block::List { kind, start, items } => layout.list(*kind, *start, items),
            Block::Table(table) => layout.table(table),
            Block::Rule {
                mark: RuleMark::Equals,
            } => layout.page_break(),
            Block::Rule { .. } => layout.divider(),
            Block::Paragraph { text } => {
                let spans = inline::parse_spans(text);
                layout.paragraph(&spans, &BODY, 0.0);
                layout.space(BODY.space_after);
            }
        }
    }

    let pages = layout.finish();
    if pages.is_empty() {
        bail!("PDF layout produced no pages");
    }
    debug!(pages = pages.len(), ?page_size, "laid out PDF");

    let (width, height) = page_size.dimensions();
    Ok(PdfBuilder::new(width, height).build(title, &pages))
}

// ---------------------------------------------------------------------------
// Fonts & text metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl Font {
    fn for_span(span: &Span) -> Self {
        match (span.bold, span.italic) {
            (true, true) => Self::BoldItalic,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (false, false) => Self::Regular,
        }
    }

    fn resource(&self) -> &'static str {
        match self {
            Self::Regular => "/F1",
            Self::Bold => "/F2",
            Self::Italic => "/F3",
            Self::BoldItalic => "/F4",
        }
    }

    fn is_bold(&self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }
}

/// Approximate Helvetica advance width, in thousandths of an em.
fn char_units(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '\'' | '|' => 222.0,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' => 278.0,
        'r' | '-' => 333.0,
        'm' | 'M' => 833.0,
        'w' | 'W' => 778.0,
        'A'..='Z' => 667.0,
        _ => 556.0,
    }
}

fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: f64 = text.chars().map(char_units).sum();
    let scale = if font.is_bold() { 1.05 } else { 1.0 };
    units * scale * size / 1000.0
}

/// Escape special characters for PDF string literals and map text to
/// WinAnsi. Characters outside the encoding become `?`.
fn pdf_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(ch),
            '\t' => out.push(' '),
            _ => match winansi_byte(ch) {
                Some(byte) => out.push_str(&format!("\\{byte:03o}")),
                None => out.push('?'),
            },
        }
    }
    out
}

fn winansi_byte(ch: char) -> Option<u8> {
    match ch {
        '€' => Some(0x80),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        '\u{A0}'..='\u{FF}' => Some(ch as u32 as u8),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Paragraph styles
// ---------------------------------------------------------------------------

struct Style {
    size: f64,
    leading: f64,
    color: Rgb,
    bold: bool,
    space_before: f64,
    space_after: f64,
}

const TITLE: Style = Style {
    size: 24.0,
    leading: 29.0,
    color: NAVY,
    bold: true,
    space_before: 0.0,
    space_after: 20.0,
};

const H1: Style = Style {
    size: 16.0,
    leading: 19.0,
    color: NAVY,
    bold: true,
    space_before: 16.0,
    space_after: 6.0,
};

const H2: Style = Style {
    size: 13.0,
    leading: 16.0,
    color: BLUE,
    bold: true,
    space_before: 12.0,
    space_after: 4.0,
};

const H3: Style = Style {
    size: 11.0,
    leading: 14.0,
    color: DARK_GREY,
    bold: true,
    space_before: 8.0,
    space_after: 2.0,
};

const BODY: Style = Style {
    size: 10.0,
    leading: 14.0,
    color: BLACK,
    bold: false,
    space_before: 0.0,
    space_after: 6.0,
};

const LIST_INDENT: f64 = 20.0;
const LIST_MARKER_INDENT: f64 = 10.0;
const LIST_ITEM_SPACE: f64 = 3.0;

const TABLE_FONT_SIZE: f64 = 9.0;
const TABLE_LEADING: f64 = 11.0;
const CELL_PAD_X: f64 = 6.0;
const CELL_PAD_Y: f64 = 4.0;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// A word plus the font it is drawn in.
#[derive(Debug, Clone)]
struct Token {
    text: String,
    font: Font,
    space_before: bool,
}

/// Split spans into words, remembering where whitespace separated them.
fn tokenize(spans: &[Span], force_bold: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut saw_space = false;

    for span in spans {
        let mut font = Font::for_span(span);
        if force_bold {
            font = if font == Font::Italic {
                Font::BoldItalic
            } else if font == Font::Regular {
                Font::Bold
            } else {
                font
            };
        }

        let mut word = String::new();
        let mut word_space = false;
        for ch in span.text.chars() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut word),
                        font,
                        space_before: word_space,
                    });
                }
                saw_space = true;
            } else {
                if word.is_empty() {
                    word_space = saw_space;
                    saw_space = false;
                }
                word.push(ch);
            }
        }
        if !word.is_empty() {
            tokens.push(Token {
                text: word,
                font,
                space_before: word_space,
            });
        }
    }
    tokens
}

/// Greedy line filling. Words wider than `max_width` are broken between
/// characters so nothing is drawn past the right edge.
fn wrap(tokens: Vec<Token>, size: f64, max_width: f64) -> Vec<Vec<Token>> {
    let mut lines = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut width = 0.0;

    for mut token in tokens.into_iter().flat_map(|t| split_oversized(t, size, max_width)) {
        let word_width = text_width(&token.text, token.font, size);
        let gap = if current.is_empty() || !token.space_before {
            0.0
        } else {
            text_width(" ", token.font, size)
        };
        if !current.is_empty() && width + gap + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
            token.space_before = false;
            width += word_width;
        } else {
            width += gap + word_width;
        }
        current.push(token);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut a token into pieces no wider than `max_width`. Every piece holds at
/// least one character.
fn split_oversized(token: Token, size: f64, max_width: f64) -> Vec<Token> {
    if text_width(&token.text, token.font, size) <= max_width {
        return vec![token];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0.0;
    for ch in token.text.chars() {
        let ch_width = text_width(ch.encode_utf8(&mut [0; 4]), token.font, size);
        if !piece.is_empty() && piece_width + ch_width > max_width {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0.0;
        }
        piece.push(ch);
        piece_width += ch_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Token {
            text,
            font: token.font,
            // Continuation pieces always start a fresh line.
            space_before: i == 0 && token.space_before,
        })
        .collect()
}

struct Layout {
    width: f64,
    height: f64,
    y: f64,
    pages: Vec<String>,
    current: String,
    dirty: bool,
}

impl Layout {
    fn new(page_size: PageSize) -> Self {
        let (width, height) = page_size.dimensions();
        Self {
            width,
            height,
            y: height - MARGIN_Y,
            pages: Vec::new(),
            current: String::new(),
            dirty: false,
        }
    }

    fn content_width(&self) -> f64 {
        self.width - 2.0 * MARGIN_X
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.height - MARGIN_Y;
        self.dirty = false;
    }

    fn ensure_space(&mut self, needed: f64) {
        if self.dirty && self.y - needed < MARGIN_Y {
            self.new_page();
        }
    }

    fn space(&mut self, amount: f64) {
        self.y -= amount;
    }

    fn page_break(&mut self) {
        if self.dirty {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<String> {
        if self.dirty || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.pages
    }

    // -- drawing primitives --------------------------------------------------

    fn draw_text(&mut self, x: f64, y: f64, font: Font, size: f64, color: Rgb, text: &str) {
        let (r, g, b) = color;
        self.current.push_str(&format!("{r:.3} {g:.3} {b:.3} rg\n"));
        self.current.push_str("BT\n");
        self.current
            .push_str(&format!("{} {size:.1} Tf\n", font.resource()));
        self.current.push_str(&format!("{x:.2} {y:.2} Td\n"));
        self.current
            .push_str(&format!("({}) Tj\n", pdf_escape(text)));
        self.current.push_str("ET\n");
        self.dirty = true;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let (r, g, b) = color;
        self.current.push_str(&format!("{r:.3} {g:.3} {b:.3} rg\n"));
        self.current
            .push_str(&format!("{x:.2} {y:.2} {w:.2} {h:.2} re f\n"));
        self.dirty = true;
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb, line_width: f64) {
        let (r, g, b) = color;
        self.current.push_str(&format!("{r:.3} {g:.3} {b:.3} RG\n"));
        self.current.push_str(&format!("{line_width:.2} w\n"));
        self.current
            .push_str(&format!("{x:.2} {y:.2} {w:.2} {h:.2} re S\n"));
        self.dirty = true;
    }

    fn hline(&mut self, y: f64, color: Rgb, thickness: f64) {
        let (r, g, b) = color;
        let (x0, x1) = (MARGIN_X, self.width - MARGIN_X);
        self.current.push_str(&format!("{r:.3} {g:.3} {b:.3} RG\n"));
        self.current.push_str(&format!("{thickness:.2} w\n"));
        self.current
            .push_str(&format!("{x0:.2} {y:.2} m {x1:.2} {y:.2} l S\n"));
        self.dirty = true;
    }

    /// Draw one wrapped line starting at `x`; consecutive tokens in the same
    /// font share a text object.
    fn draw_line(&mut self, x: f64, y: f64, line: &[Token], size: f64, color: Rgb) {
        let mut cursor = x;
        let mut run = String::new();
        let mut run_font = None;
        let mut run_x = x;

        for token in line {
            let gap = if token.space_before { " " } else { "" };
            if run_font != Some(token.font) {
                if let Some(font) = run_font {
                    self.draw_text(run_x, y, font, size, color, &run);
                }
                cursor += text_width(gap, token.font, size);
                run.clear();
                run_x = cursor;
                run_font = Some(token.font);
            } else {
                run.push_str(gap);
                cursor += text_width(gap, token.font, size);
            }
            run.push_str(&token.text);
            cursor += text_width(&token.text, token.font, size);
        }
        if let Some(font) = run_font {
            self.draw_text(run_x, y, font, size, color, &run);
        }
    }

    // -- blocks --------------------------------------------------------------

    fn title(&mut self, title: &str) {
        let tokens = tokenize(&[Span::plain(title)], true);
        let lines = wrap(tokens, TITLE.size, self.content_width());
        for line in &lines {
            let line_width: f64 = line_width(line, TITLE.size);
            let x = (self.width - line_width) / 2.0;
            self.y -= TITLE.leading;
            let y = self.y;
            self.draw_line(x, y, line, TITLE.size, TITLE.color);
        }
        self.space(TITLE.space_after / 2.0);
        let y = self.y;
        self.hline(y, NAVY, 2.0);
        self.space(TITLE.space_after / 2.0 + 0.2 * INCH);
    }

    fn heading(&mut self, level: u8, text: &str) {
        let style = match level {
            1 => &H1,
            2 => &H2,
            _ => &H3,
        };
        self.ensure_space(style.space_before + style.leading * 2.0);
        if self.dirty {
            self.space(style.space_before);
        }
        self.paragraph(&[Span::plain(text)], style, 0.0);
        self.space(style.space_after);
    }

    /// Wrap and draw spans, breaking pages between lines as needed.
    fn paragraph(&mut self, spans: &[Span], style: &Style, indent: f64) {
        let tokens = tokenize(spans, style.bold);
        let lines = wrap(tokens, style.size, self.content_width() - indent);
        for line in &lines {
            self.ensure_space(style.leading);
            self.y -= style.leading;
            let y = self.y;
            self.draw_line(MARGIN_X + indent, y, line, style.size, style.color);
        }
    }

    fn list(&mut self, kind: ListKind, start: u32, items: &[String]) {
        let mut number = start;
        for item in items {
            let marker = match kind {
                ListKind::Bullet => "•".to_string(),
                ListKind::Numbered => format!("{number}."),
            };
            number = number.saturating_add(1);
            self.ensure_space(BODY.leading);
            let marker_y = self.y - BODY.leading;
            self.draw_text(
                MARGIN_X + LIST_MARKER_INDENT,
                marker_y,
                Font::Regular,
                BODY.size,
                BODY.color,
                &marker,
            );
            let spans = inline::parse_spans(item);
            if spans.is_empty() {
                self.space(BODY.leading);
            } else {
                self.paragraph(&spans, &BODY, LIST_INDENT);
            }
            self.space(LIST_ITEM_SPACE);
        }
        self.space(0.05 * INCH);
    }

    fn divider(&mut self) {
        self.ensure_space(0.1 * INCH);
        self.space(2.0);
        let y = self.y;
        self.hline(y, RULE_GREY, 0.5);
        self.space(0.1 * INCH);
    }

    fn table(&mut self, table: &TableBlock) {
        let columns = table.width().max(1);
        let total_width = self.content_width();
        let col_width = total_width / columns as f64;
        let cell_width = (col_width - 2.0 * CELL_PAD_X).max(1.0);

        for (row_idx, row) in table.rows().iter().enumerate() {
            let is_header = row_idx == 0;

            let wrapped: Vec<Vec<Vec<Token>>> = row
                .iter()
                .map(|cell| {
                    let tokens = tokenize(&[Span::plain(cell.as_str())], is_header);
                    wrap(tokens, TABLE_FONT_SIZE, cell_width)
                })
                .collect();
            let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let row_height = line_count as f64 * TABLE_LEADING + 2.0 * CELL_PAD_Y;

            let fill = if is_header {
                Some(NAVY)
            } else if row_idx % 2 == 1 {
                Some(ROW_TINT)
            } else {
                None
            };
            let text_color = if is_header { WHITE } else { BLACK };

            // Rows that fit on a page move whole; taller rows continue on the
            // following pages.
            self.ensure_space(row_height);
            let mut offset = 0;
            while offset < line_count {
                if offset > 0 {
                    self.new_page();
                }
                let room = self.y - MARGIN_Y - 2.0 * CELL_PAD_Y;
                let capacity = (((room + 1e-6) / TABLE_LEADING).floor() as usize).max(1);
                let take = capacity.min(line_count - offset);
                let height = take as f64 * TABLE_LEADING + 2.0 * CELL_PAD_Y;
                let bottom = self.y - height;

                if let Some(color) = fill {
                    self.fill_rect(MARGIN_X, bottom, total_width, height, color);
                }
                for (col_idx, lines) in wrapped.iter().enumerate() {
                    let x = MARGIN_X + col_idx as f64 * col_width + CELL_PAD_X;
                    let mut y = self.y - CELL_PAD_Y;
                    for line in lines.iter().skip(offset).take(take) {
                        y -= TABLE_LEADING;
                        self.draw_line(x, y + 2.0, line, TABLE_FONT_SIZE, text_color);
                    }
                    self.stroke_rect(
                        MARGIN_X + col_idx as f64 * col_width,
                        bottom,
                        col_width,
                        height,
                        GRID_GREY,
                        0.5,
                    );
                }
                self.y = bottom;
                offset += take;
            }
        }
        self.space(0.15 * INCH);
    }
}

fn line_width(line: &[Token], size: f64) -> f64 {
    line.iter()
        .map(|t| {
            let gap = if t.space_before {
                text_width(" ", t.font, size)
            } else {
                0.0
            };
            gap + text_width(&t.text, t.font, size)
        })
        .sum()
}

// ---------------------------------------------------------------------------
// File assembly
// ---------------------------------------------------------------------------

/// Minimal PDF file builder. Constructs valid PDF 1.4 files.
struct PdfBuilder {
    width: f64,
    height: f64,
}

/// Objects 1-7 are fixed; each page then adds a page and a content object.
const FIRST_PAGE_OBJECT: usize = 8;

impl PdfBuilder {
    fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Build the complete PDF file as bytes.
    fn build(&self, title: &str, pages: &[String]) -> Vec<u8> {
        let mut pdf = String::new();
        let mut offsets: Vec<usize> = Vec::new();

        // Header
        pdf.push_str("%PDF-1.4\n");

        // Obj 1: Catalog
        offsets.push(pdf.len());
        pdf.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        // Obj 2: Pages
        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", FIRST_PAGE_OBJECT + 2 * i))
            .collect();
        offsets.push(pdf.len());
        pdf.push_str(&format!(
            "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
            kids.join(" "),
            pages.len()
        ));

        // Obj 3-6: Helvetica family
        for (num, base) in [
            (3, "Helvetica"),
            (4, "Helvetica-Bold"),
            (5, "Helvetica-Oblique"),
            (6, "Helvetica-BoldOblique"),
        ] {
            offsets.push(pdf.len());
            pdf.push_str(&format!(
                "{num} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>\nendobj\n"
            ));
        }

        // Obj 7: Info
        offsets.push(pdf.len());
        let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ");
        pdf.push_str(&format!(
            "7 0 obj\n<< /Title ({}) /Producer (docsmith) /CreationDate ({created}) >>\nendobj\n",
            pdf_escape(title)
        ));

        // Pages and their content streams
        for (i, content) in pages.iter().enumerate() {
            let page_obj = FIRST_PAGE_OBJECT + 2 * i;
            offsets.push(pdf.len());
            pdf.push_str(&format!(
                "{page_obj} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.0} {:.0}] ",
                self.width, self.height
            ));
            pdf.push_str(&format!("/Contents {} 0 R /Resources << /Font << ", page_obj + 1));
            pdf.push_str("/F1 3 0 R /F2 4 0 R /F3 5 0 R /F4 6 0 R >> >> >>\nendobj\n");

            offsets.push(pdf.len());
            pdf.push_str(&format!(
                "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
                page_obj + 1,
                content.len(),
                content
            ));
        }

        // Cross-reference table
        let xref_offset = pdf.len();
        let num_objects = offsets.len() + 1; // +1 for free entry
        pdf.push_str(&format!("xref\n0 {num_objects}\n"));
        pdf.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            pdf.push_str(&format!("{:010} 00000 n \n", offset));
        }

        // Trailer
        pdf.push_str(&format!(
            "trailer\n<< /Size {num_objects} /Root 1 0 R /Info 7 0 R >>\n"
        ));
        pdf.push_str(&format!("startxref\n{xref_offset}\n%%EOF\n"));

        pdf.into_bytes()
    }
}
