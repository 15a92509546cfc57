// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Receipt photo processing for Scanwerk.
//
// Provides image filters (grayscale, Gaussian blur, Sobel), encode/decode,
// and the scanning pipeline that finds a receipt's corners, lets the user
// adjust them, and rectifies the result to an upright raster.

pub mod image;
pub mod scan;

// Re-export the primary entry points so callers can use `scanwerk_document::detect` etc.
pub use scan::{
    Confidence, CropSession, DetectionReport, ProcessedImage, ReceiptScanner, detect, rectify,
    update_corner,
};
