//! # cardsheet CLI
//!
//! Usage:
//!   cardsheet cards.json -o cards.pdf
//!   echo '{ "records": [...] }' | cardsheet
//!   cardsheet cards.json --template ward.json
//!   cardsheet --csv-header --template ward.json > upload.csv
//!   cardsheet --qr HH-000123 -o hh.png
//!   cardsheet --example > cards.json
//!
//! Set `RUST_LOG=debug` for per-page and per-card logging.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cardsheet::encoder::{CodeEncoder, QrEncoder};
use cardsheet::layout::card::CODE_RESOLUTION;
use cardsheet::layout::LayoutEngine;
use cardsheet::model::CardDocument;
use cardsheet::progress::{LogProgress, NoProgress};
use cardsheet::template::Template;
use cardsheet::GenerationRun;

#[derive(Debug, Parser)]
#[command(name = "cardsheet", version, about = "Render QR ID card sheets to PDF")]
struct Cli {
    /// JSON card document. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output path. Defaults to QR_ID_Cards_<timestamp>.pdf
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON template overriding the document's template.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Print the CSV header row for the active template and exit.
    #[arg(long)]
    csv_header: bool,

    /// Print an example card document and exit.
    #[arg(long)]
    example: bool,

    /// Write the QR code for TEXT as a PNG instead of rendering cards.
    #[arg(long, value_name = "TEXT")]
    qr: Option<String>,

    /// Print the page layout as JSON instead of writing a PDF.
    #[arg(long)]
    layout_json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.example {
        print!("{}", example_document_json());
        return Ok(());
    }

    let template_override = cli
        .template
        .as_deref()
        .map(read_template)
        .transpose()?;

    if cli.csv_header {
        println!("{}", csv_header_line(cli.input.as_deref(), template_override)?);
        return Ok(());
    }

    if let Some(text) = cli.qr {
        let output = cli.output.unwrap_or_else(|| PathBuf::from("qr.png"));
        let png = QrEncoder::new()
            .encode(&text, CODE_RESOLUTION)
            .with_context(|| format!("Cannot encode '{}'", text))?
            .to_png()
            .context("Failed to encode PNG")?;
        write_output(&output, &png)?;
        return Ok(());
    }

    let mut document = read_document(cli.input.as_deref())?;
    document.template = active_template(template_override, Some(&document));

    if cli.layout_json {
        let run = GenerationRun::new(&document.records, &document.template)?;
        let pages = LayoutEngine::new().paginate(&run, &QrEncoder::new(), &mut NoProgress);
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    let output = cli.output.unwrap_or_else(default_output_name);
    let pdf = cardsheet::render_with_progress(&document, &mut LogProgress)?;
    write_output(&output, &pdf)
}

/// `--template` wins, then the document's own template, then the default.
fn active_template(template_override: Option<Template>, document: Option<&CardDocument>) -> Template {
    template_override
        .or_else(|| document.map(|d| d.template.clone()))
        .unwrap_or_default()
}

/// CSV header row of the active template for `input`, if any.
fn csv_header_line(input: Option<&Path>, template_override: Option<Template>) -> Result<String> {
    let document = match input {
        Some(path) => Some(read_document(Some(path))?),
        None => None,
    };
    let template = active_template(template_override, document.as_ref());
    template.validate().context("Template is invalid")?;
    Ok(template.csv_header())
}

fn read_document(path: Option<&Path>) -> Result<CardDocument> {
    let input = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    let document: CardDocument =
        serde_json::from_str(&input).map_err(cardsheet::CardError::from)?;
    Ok(document)
}

fn read_template(path: &Path) -> Result<Template> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let template: Template = serde_json::from_str(&json)
        .with_context(|| format!("Template {} is not valid JSON", path.display()))?;
    Ok(template)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("✓ Written {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn default_output_name() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y-%m-%dT%H-%M-%S");
    PathBuf::from(format!("QR_ID_Cards_{}.pdf", timestamp))
}

fn example_document_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Household ID Cards",
    "author": "Field Office"
  },
  "template": {
    "columns": ["HH ID", "Name", "Gender", "Mobile", "Union"],
    "primaryKey": "HH ID"
  },
  "records": [
    { "HH ID": "HH000101", "Name": "Rahima Begum", "Gender": "Female", "Mobile": "01712345678", "Union": "Char Fasson" },
    { "HH ID": "HH000102", "Name": "Abdul Karim", "Gender": "Male", "Mobile": "01812345678", "Union": "Char Fasson" },
    { "HH ID": "HH000103", "Name": "Nasrin Akter", "Gender": "Female", "Mobile": "01912345678", "Union": "Northwestmostdistrictofthecountry" }
  ]
}
"##
}
