// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Input --
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    // -- Processing --
    #[error("image processing failed: {0}")]
    Processing(String),

    #[error("corner index {0} is out of range (expected 0-3)")]
    InvalidCorner(usize),

    #[error("corner position ({0}, {1}) is not a finite point")]
    InvalidPoint(f32, f32),

    #[error("perspective transform failed: {0}")]
    Homography(String),

    // -- Output --
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
