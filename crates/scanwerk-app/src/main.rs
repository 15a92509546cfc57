// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — receipt capture from the command line.
//
// Entry point. Initialises logging, loads configuration, and runs the
// requested subcommand.

mod args;
mod config_dir;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use scanwerk_core::error::Result;
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{OutputFormat, ScanConfig};
use scanwerk_document::image::codec;
use scanwerk_document::{DetectionReport, ReceiptScanner};

use args::{Args, Command, CornerEdit};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "scanwerk failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let default_path = config_dir::default_config_path();
    let config = config_dir::load_config(args.config.as_deref(), default_path.as_deref())?;

    match args.command {
        Command::Detect { input, json } => detect(&input, config, json),
        Command::Crop {
            input,
            output,
            corners,
            width,
            height,
        } => crop(&input, &output, config, &corners, width, height),
    }
}

fn detect(input: &Path, config: ScanConfig, json: bool) -> Result<()> {
    let margin = config.detection.fallback_margin;
    let scanner = ReceiptScanner::open(input)?.with_config(config);
    let report = scanner.detect()?.report(margin);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &DetectionReport) {
    println!("image:      {}x{}", report.width, report.height);
    if report.detected {
        println!("receipt:    detected");
    } else {
        println!("receipt:    not found (showing inset fallback)");
    }
    for (name, p) in ["top-left", "top-right", "bottom-right", "bottom-left"]
        .iter()
        .zip(report.corners.iter())
    {
        println!("{:<12}{:.1}, {:.1}", format!("{name}:"), p.x, p.y);
    }
    println!(
        "confidence: {:.0} (aspect {:.2}, size {:.2})",
        report.confidence.total, report.confidence.aspect_score, report.confidence.size_score
    );
}

fn crop(
    input: &Path,
    output: &Path,
    mut config: ScanConfig,
    corners: &[CornerEdit],
    width: Option<u32>,
    height: Option<u32>,
) -> Result<()> {
    // Refuse an unusable output name before doing any work.
    let ext = output
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    OutputFormat::from_extension(ext)?;

    if let Some(width) = width {
        config.output.width = width;
    }
    if let Some(height) = height {
        config.output.height = height;
    }
    let quality = config.output.jpeg_quality;

    let mut session = ReceiptScanner::open(input)?.with_config(config).begin_crop()?;
    if session.is_fallback() {
        tracing::warn!("No receipt outline detected; cropping the inset rectangle");
    }
    for edit in corners {
        session.update_corner(edit.index, edit.point)?;
    }

    let cropped = session.accept()?;
    let format = codec::save(&cropped, output, quality)?;
    println!(
        "wrote {} ({}x{}, {})",
        output.display(),
        cropped.width(),
        cropped.height(),
        format.mime_type()
    );
    Ok(())
}
