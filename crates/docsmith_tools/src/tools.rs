//! The three document tools: build a file from markup, upload it, and hand
//! back a download link.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use docsmith_markup::filename::with_extension;
use docsmith_markup::{parse, parse_sheets};
use docsmith_render::{
    PageSize, WordOptions, WorkbookOptions, generate_docx, generate_pdf, generate_workbook,
};
use docsmith_upload::events::emit;
use docsmith_upload::{
    EventEmitter, FileStorageClient, HostRequest, ToolEvent, bearer_token, download_path,
};

use crate::config::ToolsConfig;
use crate::error::ToolError;

/// Result of one tool invocation.
pub type ToolOutcome = Result<Delivered, ToolError>;

/// A document that was built and stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivered {
    pub filename: String,
    pub download_url: String,
    pub file_id: String,
    /// One-sentence description for the assistant, e.g. "PDF created and uploaded."
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Spreadsheet,
    Pdf,
    Word,
}

impl ToolKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Pdf => "pdf",
            Self::Word => "docx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Pdf => "application/pdf",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Name used in failure replies.
    pub fn label(self) -> &'static str {
        match self {
            Self::Spreadsheet => "Spreadsheet",
            Self::Pdf => "PDF",
            Self::Word => "Document",
        }
    }

    fn building_status(self) -> &'static str {
        match self {
            Self::Spreadsheet => "Building spreadsheet...",
            Self::Pdf => "Building PDF...",
            Self::Word => "Creating Word document...",
        }
    }

    /// Render an outcome as the single string returned to the assistant.
    pub fn reply(self, outcome: &ToolOutcome) -> String {
        match outcome {
            Ok(d) => format!(
                "📥 [Download {}]({})\n\n{} Include this exact download link verbatim in your response.",
                d.filename, d.download_url, d.summary
            ),
            Err(e) => format!("❌ {} creation failed: {e}", self.label()),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> String {
    "LETTER".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetRequest {
    /// Output name without extension.
    pub filename: String,
    /// One or more `===SHEET:Name===` blocks of `|` or `,` delimited rows.
    pub sheets: String,
    #[serde(default = "default_true")]
    pub include_totals: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfRequest {
    pub filename: String,
    pub title: String,
    pub content: String,
    /// `LETTER` or `A4`.
    #[serde(default = "default_page_size")]
    pub page_size: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordRequest {
    pub filename: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub include_toc: bool,
}

/// Bytes of a finished document plus the summary sentence for the reply.
struct Built {
    bytes: Vec<u8>,
    summary: String,
}

/// Entry point for the document tools. Read-only after construction.
#[derive(Debug, Clone)]
pub struct DocumentTools {
    config: ToolsConfig,
    storage: FileStorageClient,
}

impl DocumentTools {
    pub fn new(config: ToolsConfig) -> Self {
        let storage = FileStorageClient::new(&config.internal_base_url, config.upload_timeout());
        Self { config, storage }
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Build a multi-sheet `.xlsx` workbook from sheet blocks.
    pub async fn create_spreadsheet(
        &self,
        request: SpreadsheetRequest,
        host: Option<&dyn HostRequest>,
        events: Option<&dyn EventEmitter>,
    ) -> ToolOutcome {
        self.run(ToolKind::Spreadsheet, &request.filename, host, events, || {
            let sheets = parse_sheets(&request.sheets)?;
            let options = WorkbookOptions {
                include_totals: request.include_totals,
            };
            let bytes = generate_workbook(&sheets, options)?;
            let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
            Ok(Built {
                bytes,
                summary: format!(
                    "Spreadsheet created and uploaded (sheets: {}).",
                    names.join(", ")
                ),
            })
        })
        .await
    }

    /// Build a `.pdf` from markdown-like content.
    pub async fn create_pdf(
        &self,
        request: PdfRequest,
        host: Option<&dyn HostRequest>,
        events: Option<&dyn EventEmitter>,
    ) -> ToolOutcome {
        self.run(ToolKind::Pdf, &request.filename, host, events, || {
            let blocks = parse(&request.content);
            let page_size = PageSize::from_name(&request.page_size);
            let bytes = generate_pdf(&request.title, &blocks, page_size)?;
            Ok(Built {
                bytes,
                summary: "PDF created and uploaded.".into(),
            })
        })
        .await
    }

    /// Build a `.docx` from markdown-like content.
    pub async fn create_word_document(
        &self,
        request: WordRequest,
        host: Option<&dyn HostRequest>,
        events: Option<&dyn EventEmitter>,
    ) -> ToolOutcome {
        self.run(ToolKind::Word, &request.filename, host, events, || {
            let blocks = parse(&request.content);
            let options = WordOptions {
                include_toc: request.include_toc,
            };
            let bytes = generate_docx(&request.title, &blocks, options)?;
            Ok(Built {
                bytes,
                summary: "Word document created and uploaded.".into(),
            })
        })
        .await
    }

    /// Shared pipeline. Failures end with an `Error: ...` status event.
    async fn run<F>(
        &self,
        kind: ToolKind,
        name: &str,
        host: Option<&dyn HostRequest>,
        events: Option<&dyn EventEmitter>,
        build: F,
    ) -> ToolOutcome
    where
        F: FnOnce() -> anyhow::Result<Built>,
    {
        let outcome = self.deliver(kind, name, host, events, build).await;
        match &outcome {
            Ok(d) => info!(kind = kind.label(), file_id = %d.file_id, url = %d.download_url, "document delivered"),
            Err(e) => {
                warn!(kind = kind.label(), "document creation failed: {e}");
                emit(events, ToolEvent::status(format!("Error: {e}"), true)).await;
            }
        }
        outcome
    }

    async fn deliver<F>(
        &self,
        kind: ToolKind,
        name: &str,
        host: Option<&dyn HostRequest>,
        events: Option<&dyn EventEmitter>,
        build: F,
    ) -> ToolOutcome
    where
        F: FnOnce() -> anyhow::Result<Built>,
    {
        emit(events, ToolEvent::status(kind.building_status(), false)).await;

        let token = bearer_token(host).ok_or(ToolError::MissingAuth)?;
        let filename = with_extension(name, kind.extension());

        let built = build().map_err(ToolError::BuildFailed)?;
        debug!(%filename, size = built.bytes.len(), "document built");

        let file = tempfile::Builder::new()
            .prefix("docsmith-")
            .suffix(&format!(".{}", kind.extension()))
            .tempfile()
            .context("Failed to create temporary file")
            .map_err(ToolError::BuildFailed)?;
        write_file(file.path(), &built.bytes)
            .await
            .map_err(ToolError::BuildFailed)?;

        emit(events, ToolEvent::status("Uploading...", false)).await;
        let file_id = self
            .storage
            .upload(file.path(), &filename, kind.mime(), Some(&token))
            .await?;
        drop(file);

        let download_url = format!(
            "{}{}",
            self.config.public_base_url(host),
            download_path(&file_id, &filename)
        );

        emit(events, ToolEvent::status("Done", true)).await;
        emit(
            events,
            ToolEvent::message(format!("📥 **[Download {filename}]({download_url})**")),
        )
        .await;

        Ok(Delivered {
            filename,
            download_url,
            file_id,
            summary: built.summary,
        })
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write temporary file: {}", path.display()))
}
