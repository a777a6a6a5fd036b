// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — photographed documents to print-ready PDF
//
// Entry point. Parses the command line, initialises logging, scans each photo
// in order, and writes the assembled PDF.

mod services;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{PaperSize, StatusLevel};
use tracing::{error, info, warn};

use services::{ScanService, load_config};
use session::{PageSequence, ScannedPage};

/// Turn photos of paper documents into a clean, printable PDF.
#[derive(Parser)]
#[command(name = "scanwerk", version)]
struct Cli {
    /// Photos to scan, in page order (PNG or JPEG)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Where to write the PDF
    #[arg(short, long, default_value = "scanned_document.pdf")]
    output: PathBuf,

    /// Paper size: a4, a3, a5, letter, legal or tabloid
    #[arg(long, value_parser = parse_paper)]
    paper: Option<PaperSize>,

    /// Also write every processed page as PNG into this directory
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn parse_paper(value: &str) -> std::result::Result<PaperSize, String> {
    PaperSize::from_keyword(value).ok_or_else(|| format!("unknown paper size `{value}`"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Scanwerk starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "scan failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(paper) = cli.paper {
        config.paper_size = paper;
    }
    let service = ScanService::new(config);
    info!(paper = ?service.config().paper_size, inputs = cli.images.len(), "Scanning");

    let mut pages = PageSequence::new();
    for path in &cli.images {
        match service.ingest_new(&pages, path) {
            Ok(Some(page)) => {
                print_reports(&page);
                pages.push(page);
            }
            Ok(None) => eprintln!("{}: already added, skipping", path.display()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "input skipped");
                let human = humanize_error(&err);
                eprintln!("{}: {} {}", path.display(), human.message, human.suggestion);
            }
        }
    }

    if pages.is_empty() {
        return Err(ScanwerkError::EmptySequence);
    }

    if let Some(dir) = &cli.pages_dir {
        let written = service.save_pages(&pages, dir)?;
        println!("Saved {} page image(s) to {}", written.len(), dir.display());
    }

    service.export_pdf(&pages, &cli.output)?;
    println!("Wrote {} page(s) to {}", pages.len(), cli.output.display());
    Ok(())
}

fn print_reports(page: &ScannedPage) {
    info!(
        id = %page.id,
        label = %page.label,
        added_at = %page.added_at,
        photo_w = page.original.width(),
        photo_h = page.original.height(),
        page_w = page.processed.width(),
        page_h = page.processed.height(),
        summary = ?page.summary,
        "Page scanned"
    );
    println!("[{}] {}", level_tag(page.summary), page.label);
    for report in &page.reports {
        println!("  [{}] {}: {}", level_tag(report.level), report.stage, report.message);
    }
}

fn level_tag(level: StatusLevel) -> &'static str {
    match level {
        StatusLevel::Info => "info",
        StatusLevel::Warning => "warn",
        StatusLevel::Success => " ok ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_keywords_parse() {
        assert_eq!(parse_paper("Letter"), Ok(PaperSize::Letter));
        assert!(parse_paper("b5").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["scanwerk", "a.jpg", "b.png"]).expect("parse");
        assert_eq!(cli.images.len(), 2);
        assert_eq!(cli.output, PathBuf::from("scanned_document.pdf"));
        assert!(cli.paper.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn level_tags_are_fixed_width() {
        let tags = [StatusLevel::Info, StatusLevel::Warning, StatusLevel::Success].map(level_tag);
        assert_eq!(tags, ["info", "warn", " ok "]);
    }

    #[test]
    fn cli_requires_an_image() {
        assert!(Cli::try_parse_from(["scanwerk"]).is_err());
    }

    #[test]
    fn cli_accepts_all_options() {
        let cli = Cli::try_parse_from([
            "scanwerk", "-o", "out.pdf", "--paper", "a5", "--pages-dir", "pages", "--config",
            "scan.json", "-v", "page.jpg",
        ])
        .expect("parse");
        assert_eq!(cli.paper, Some(PaperSize::A5));
        assert_eq!(cli.pages_dir, Some(PathBuf::from("pages")));
        assert!(cli.verbose);
    }
}
