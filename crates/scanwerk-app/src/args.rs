// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scanwerk_core::Point;

/// Detect receipts in photos and crop them upright.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (JSON). Defaults to $XDG_CONFIG_HOME/scanwerk/config.json.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find the receipt outline and print its corners and confidence.
    Detect {
        /// Photo to analyse (JPEG, PNG, ...).
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Detect, optionally adjust corners, and write the rectified receipt.
    Crop {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output image; the extension (png, jpg, jpeg) selects the format.
        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,

        /// Override one corner, e.g. `--corner 0=12.5,40`.
        /// Index order: 0 top-left, 1 top-right, 2 bottom-right, 3 bottom-left.
        #[arg(long = "corner", value_name = "IDX=X,Y", value_parser = parse_corner)]
        corners: Vec<CornerEdit>,

        /// Output width in pixels (overrides the config).
        #[arg(long, value_name = "PIXELS")]
        width: Option<u32>,

        /// Output height in pixels (overrides the config).
        #[arg(long, value_name = "PIXELS")]
        height: Option<u32>,
    },
}

/// A single `--corner` override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerEdit {
    pub index: usize,
    pub point: Point,
}

fn parse_corner(s: &str) -> Result<CornerEdit, String> {
    let (index, coords) = s
        .split_once('=')
        .ok_or_else(|| format!("expected IDX=X,Y, got `{s}`"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y after `=`, got `{coords}`"))?;

    let index: usize = index
        .trim()
        .parse()
        .map_err(|e| format!("bad corner index `{index}`: {e}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("corner coordinates must be finite, got {x},{y}"));
    }

    Ok(CornerEdit {
        index,
        point: Point::new(x, y),
    })
}
