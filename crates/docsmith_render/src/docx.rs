use anyhow::Result;
use docsmith_markup::inline::{self, Span};
use docsmith_markup::parser::{Block, ListKind, TableBlock};
use docx_rs::*;
use std::io::Cursor;
use tracing::debug;

/// Letter width minus 1.25" margins, in twentieths of a point.
const TEXT_WIDTH_TWIPS: usize = 12240 - 2 * MARGIN_SIDE as usize;
const MARGIN_TOP_BOTTOM: i32 = 1440; // 1"
const MARGIN_SIDE: i32 = 1800; // 1.25"

const BULLET_NUMBERING: usize = 1;
const TOC_HINT: &str =
    "[Update table of contents after opening in Word: References → Update Table]";

/// Options for Word output.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordOptions {
    /// Insert a "Table of Contents" heading, a hint paragraph and a page break
    /// after the title.
    pub include_toc: bool,
}

/// Generate a DOCX document with a centered title followed by parsed blocks.
///
/// Headings use the Heading1-3 styles, lists use numbering definitions, tables
/// get a bold header row, and every rule marker becomes a page break.
pub fn generate_docx(title: &str, blocks: &[Block], options: WordOptions) -> Result<Vec<u8>> {
    let mut docx = base_document();

    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Title")
            .align(AlignmentType::Center)
            .add_run(Run::new().add_text(title)),
    );

    if options.include_toc {
        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .style("Heading2")
                    .add_run(Run::new().add_text("Table of Contents")),
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(TOC_HINT)))
            .add_paragraph(page_break());
    }

    // Numbering ids above the bullet definition, one per numbered list so
    // each list counts from the number written on its first item.
    let mut next_numbering = BULLET_NUMBERING + 1;

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let style = format!("Heading{}", (*level).clamp(1, 3));
                docx = docx.add_paragraph(
                    Paragraph::new()
                        .style(&style)
                        .add_run(Run::new().add_text(text)),
                );
            }
            Block::List { kind, start, items } => {
                let numbering = match kind {
                    ListKind::Bullet => BULLET_NUMBERING,
                    ListKind::Numbered => {
                        let id = next_numbering;
                        next_numbering += 1;
                        docx = docx
                            .add_abstract_numbering(decimal_numbering(id, *start))
                            .add_numbering(Numbering::new(id, id));
                        id
                    }
                };
                for item in items {
                    let paragraph = formatted(Paragraph::new(), &inline::parse_spans(item))
                        .numbering(NumberingId::new(numbering), IndentLevel::new(0));
                    docx = docx.add_paragraph(paragraph);
                }
            }
            Block::Table(table) => {
                docx = docx.add_table(build_table(table)).add_paragraph(Paragraph::new());
            }
            Block::Rule { .. } => {
                docx = docx.add_paragraph(page_break());
            }
            Block::Paragraph { text } => {
                docx = docx.add_paragraph(formatted(Paragraph::new(), &inline::parse_spans(text)));
            }
        }
    }

    debug!(blocks = blocks.len(), toc = options.include_toc, "assembled DOCX");

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| anyhow::anyhow!("Failed to pack DOCX: {}", e))?;

    Ok(buf.into_inner())
}

/// Document with margins, heading styles and the shared bullet definition.
fn base_document() -> Docx {
    Docx::new()
        .page_margin(
            PageMargin::new()
                .top(MARGIN_TOP_BOTTOM)
                .bottom(MARGIN_TOP_BOTTOM)
                .left(MARGIN_SIDE)
                .right(MARGIN_SIDE),
        )
        // size is in half-points, so 52 = 26pt
        .add_style(heading_style("Title", "Title", 52, "1F4E79"))
        .add_style(heading_style("Heading1", "Heading 1", 32, "1F4E79"))
        .add_style(heading_style("Heading2", "Heading 2", 26, "2E75B6"))
        .add_style(heading_style("Heading3", "Heading 3", 24, "404040"))
        .add_abstract_numbering(
            AbstractNumbering::new(BULLET_NUMBERING).add_level(
                Level::new(
                    0,
                    Start::new(1),
                    NumberFormat::new("bullet"),
                    LevelText::new("•"),
                    LevelJc::new("left"),
                )
                .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
            ),
        )
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
}

fn heading_style(id: &str, name: &str, size: usize, color: &str) -> Style {
    Style::new(id, StyleType::Paragraph)
        .name(name)
        .size(size)
        .bold()
        .color(color)
}

/// Decimal list definition counting from `start`.
fn decimal_numbering(id: usize, start: u32) -> AbstractNumbering {
    AbstractNumbering::new(id).add_level(
        Level::new(
            0,
            Start::new(start as usize),
            NumberFormat::new("decimal"),
            LevelText::new("%1."),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    )
}

fn page_break() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
}

/// Append one run per emphasis span.
fn formatted(mut paragraph: Paragraph, spans: &[Span]) -> Paragraph {
    for span in spans {
        let mut run = Run::new().add_text(&span.text);
        if span.bold {
            run = run.bold();
        }
        if span.italic {
            run = run.italic();
        }
        paragraph = paragraph.add_run(run);
    }
    paragraph
}

/// Table with a bold header row and evenly distributed columns.
fn build_table(table: &TableBlock) -> Table {
    let columns = table.width().max(1);

    let rows: Vec<TableRow> = table
        .rows()
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cells: Vec<TableCell> = row
                .iter()
                .map(|cell_text| {
                    let mut run = Run::new().add_text(cell_text).size(22);
                    if row_idx == 0 {
                        run = run.bold();
                    }
                    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();

    Table::new(rows).set_grid(vec![TEXT_WIDTH_TWIPS / columns; columns])
}
