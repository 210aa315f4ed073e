//! Search a zip archive of newspaper pages for a keyword and collect the
//! faces printed on every page that mentions it.
//!
//! Usage:
//!   newsfaces small_img.zip Christopher
//!   newsfaces images.zip Mark --out-dir sheets/

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use newsfaces::{
    CascadeParams, FaceSearch, PageArchive, PageOutcome, PageReport, RustfaceDetector,
    TesseractCli,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newsfaces")]
#[command(version, about = "Find faces on newspaper pages that mention a keyword", long_about = None)]
struct Args {
    /// Zip archive of page images
    archive: PathBuf,

    /// Keyword to search for (case-insensitive)
    keyword: String,

    /// SeetaFace frontal face model
    #[arg(long, default_value = "seeta_fd_frontal_v1.0.bin")]
    model: PathBuf,

    /// tesseract executable
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// OCR language
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Thumbnail cell size in pixels
    #[arg(long, default_value_t = 72, value_parser = clap::value_parser!(u32).range(1..))]
    cell_size: u32,

    /// Write each contact sheet as <page>_faces.png into this directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Show per-page debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn sheet_path(out_dir: &Path, page: &str) -> PathBuf {
    let stem = Path::new(page)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| page.replace('/', "_"));
    out_dir.join(format!("{stem}_faces.png"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let detector = RustfaceDetector::from_path(&args.model, CascadeParams::default())
        .with_context(|| format!("Failed to load face model: {}", args.model.display()))?;
    let ocr = TesseractCli::new()
        .binary(&args.tesseract)
        .language(&args.lang);
    let search = FaceSearch::new(Box::new(ocr), Box::new(detector)).cell_size(args.cell_size);

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let archive = PageArchive::open(&args.archive)
        .with_context(|| format!("Failed to load archive: {}", args.archive.display()))?;

    let failed = report_pages(
        search.reports(&archive, &args.keyword),
        args.out_dir.as_deref(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .context("Failed to write results")?;

    check_failures(failed)
}

/// Print each page's result as it arrives, saving sheets into `out_dir`.
///
/// Returns the number of pages that failed, counting sheets that could not
/// be written.
fn report_pages(
    reports: impl IntoIterator<Item = PageReport>,
    out_dir: Option<&Path>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<usize> {
    let mut failed = 0;
    for report in reports {
        match report.outcome {
            Ok(PageOutcome::Skipped) => {}
            Ok(PageOutcome::NoFaces) => {
                writeln!(out, "Results found in file {}", report.name)?;
                writeln!(out, "But there were no faces in that file!")?;
            }
            Ok(PageOutcome::Sheet(sheet)) => {
                writeln!(out, "Results found in file {}", report.name)?;
                match out_dir {
                    Some(dir) => {
                        let path = sheet_path(dir, &report.name);
                        match sheet.save(&path) {
                            Ok(()) => {
                                writeln!(out, "  {} face(s) -> {}", sheet.count, path.display())?
                            }
                            Err(e) => {
                                writeln!(err, "[!] {}: {}: {e}", report.name, path.display())?;
                                failed += 1;
                            }
                        }
                    }
                    None => writeln!(
                        out,
                        "  {} face(s), contact sheet {}x{}",
                        sheet.count,
                        sheet.width(),
                        sheet.height()
                    )?,
                }
            }
            Err(e) => {
                writeln!(err, "[!] {}: {e}", report.name)?;
                failed += 1;
            }
        }
    }
    Ok(failed)
}

fn check_failures(failed: usize) -> Result<()> {
    if failed > 0 {
        anyhow::bail!("{} page(s) failed to process", failed);
    }
    Ok(())
}
