use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use docsmith_tools::{
    DocumentTools, PdfRequest, SpreadsheetRequest, ToolKind, ToolsConfig, WordRequest, logging,
};
use docsmith_upload::{StaticRequest, TracingEmitter};

/// Environment variable holding the bearer token when `--token` is absent.
const ENV_TOKEN: &str = "DOCSMITH_TOKEN";

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Turn markdown-like text into XLSX, PDF and DOCX files and upload them")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.docsmith/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token for the storage API (falls back to DOCSMITH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Base URL the request is treated as arriving on
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and upload a spreadsheet from ===SHEET:Name=== blocks
    Xlsx {
        #[arg(short, long)]
        filename: String,
        /// Skip the SUM row under numeric columns
        #[arg(long)]
        no_totals: bool,
        /// Input file; stdin when omitted or "-"
        input: Option<PathBuf>,
    },
    /// Build and upload a PDF
    Pdf {
        #[arg(short, long)]
        filename: String,
        #[arg(short, long)]
        title: String,
        /// LETTER or A4
        #[arg(long, default_value = "LETTER")]
        page_size: String,
        input: Option<PathBuf>,
    },
    /// Build and upload a Word document
    Docx {
        #[arg(short, long)]
        filename: String,
        #[arg(short, long)]
        title: String,
        /// Add a table-of-contents placeholder after the title
        #[arg(long)]
        toc: bool,
        input: Option<PathBuf>,
    },
    /// Print the parsed markup as JSON without building anything
    Parse {
        /// Read the input as sheet blocks instead of document content
        #[arg(long)]
        sheets: bool,
        input: Option<PathBuf>,
    },
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Load the config before logging exists. A problem with the file is
/// handed back so it can be logged once logging is up.
fn load_config(path: Option<&PathBuf>) -> Result<(ToolsConfig, Option<anyhow::Error>)> {
    let path = match path {
        Some(p) => p.clone(),
        None => ToolsConfig::config_path()?,
    };
    let (config, problem) = match ToolsConfig::load(&path) {
        Ok(config) => (config, None),
        Err(e) => (ToolsConfig::default(), Some(e)),
    };
    Ok((config.apply_env(), problem))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_problem) = load_config(cli.config.as_ref())?;

    let guard = match logging::init_logging(&config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e:#}");
            None
        }
    };

    if let Some(e) = config_problem {
        warn!("{e:#}; using defaults");
    }
    debug!(internal = %config.internal_base_url, "configuration loaded");

    let token = cli
        .token
        .clone()
        .or_else(|| std::env::var(ENV_TOKEN).ok())
        .filter(|t| !t.is_empty());
    let mut request = StaticRequest::new(cli.base_url.clone().unwrap_or_default());
    match &token {
        Some(token) => request = request.with_bearer(token),
        None => warn!("no bearer token given; uploads will be refused"),
    }

    let tools = DocumentTools::new(config);
    let events = TracingEmitter;

    let (kind, outcome) = match cli.command {
        Commands::Parse { sheets, input } => {
            let text = read_input(input.as_ref())?;
            let json = if sheets {
                serde_json::to_string_pretty(&docsmith_markup::parse_sheets(&text)?)?
            } else {
                serde_json::to_string_pretty(&docsmith_markup::parse(&text))?
            };
            println!("{json}");
            return Ok(());
        }
        Commands::Xlsx {
            filename,
            no_totals,
            input,
        } => {
            let request_body = SpreadsheetRequest {
                filename,
                sheets: read_input(input.as_ref())?,
                include_totals: !no_totals,
            };
            let outcome = tools
                .create_spreadsheet(request_body, Some(&request), Some(&events))
                .await;
            (ToolKind::Spreadsheet, outcome)
        }
        Commands::Pdf {
            filename,
            title,
            page_size,
            input,
        } => {
            let request_body = PdfRequest {
                filename,
                title,
                content: read_input(input.as_ref())?,
                page_size,
            };
            let outcome = tools
                .create_pdf(request_body, Some(&request), Some(&events))
                .await;
            (ToolKind::Pdf, outcome)
        }
        Commands::Docx {
            filename,
            title,
            toc,
            input,
        } => {
            let request_body = WordRequest {
                filename,
                title,
                content: read_input(input.as_ref())?,
                include_toc: toc,
            };
            let outcome = tools
                .create_word_document(request_body, Some(&request), Some(&events))
                .await;
            (ToolKind::Word, outcome)
        }
    };

    println!("{}", kind.reply(&outcome));
    if outcome.is_err() {
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
