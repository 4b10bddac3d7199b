use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::error::{AllerscanError, Result};
use crate::matching::render_bracketed;
use crate::models::ScanResult;
use crate::services::ScanService;

#[derive(Parser, Debug)]
#[command(name = "allerscan")]
#[command(about = "Scan a photo of an ingredients label for your allergens")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve(ServeArgs),
    /// Scan one image file and print the result
    Scan(ScanArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Bind address, overrides ALLERSCAN_HOST
    #[arg(long)]
    pub host: Option<String>,
    /// Bind port, overrides ALLERSCAN_PORT
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the label photo
    #[arg(short, long)]
    pub image: PathBuf,
    /// Comma-separated allergens, e.g. "peanut, milk, soy"
    #[arg(short, long)]
    pub allergens: String,
    /// Also print the normalized label text with matches bracketed
    #[arg(long)]
    pub preview: bool,
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    detected: Vec<&'a str>,
    #[serde(flatten)]
    result: &'a ScanResult,
}

/// Read the image, scan it and render the result for a terminal.
pub async fn run_scan(scanner: &ScanService, args: &ScanArgs) -> Result<String> {
    let image = tokio::fs::read(&args.image).await?;
    let result = scanner
        .scan(Some(image.as_slice()), &args.allergens, args.preview)
        .await?;

    if args.json {
        render_json(&result)
    } else {
        Ok(render_text(&result, args.preview))
    }
}

/// Log the full failure and return the short message shown to the user.
///
/// Per-strategy diagnostics can carry provider response bodies, so they only
/// go to the log.
pub fn failure_message(err: &AllerscanError) -> String {
    for diagnostic in err.diagnostics() {
        tracing::warn!(%diagnostic, "OCR attempt failed");
    }
    tracing::error!(error = %err, "Scan failed");
    err.user_message()
}

pub fn render_json(result: &ScanResult) -> Result<String> {
    let output = ScanOutput {
        detected: result.detected(),
        result,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

pub fn render_text(result: &ScanResult, with_preview: bool) -> String {
    let mut out = String::new();
    let detected = result.detected();

    if detected.is_empty() {
        out.push_str("No listed allergens detected.\n");
    } else {
        out.push_str(&format!("Detected: {}\n", detected.join(", ")));
    }

    let width = result
        .matches
        .iter()
        .map(|m| m.term.chars().count())
        .max()
        .unwrap_or(0);

    for record in &result.matches {
        if record.matched {
            let evidence = record.evidence.as_deref().unwrap_or(&record.term);
            out.push_str(&format!(
                "  {:<width$}  {} ({})\n",
                record.term, record.matched_via, evidence
            ));
        } else {
            out.push_str(&format!("  {:<width$}  not found\n", record.term));
        }
    }

    if with_preview {
        out.push_str(&format!(
            "\n{}\n",
            render_bracketed(&result.text_preview, &result.highlight_spans)
        ));
    }

    out
}
