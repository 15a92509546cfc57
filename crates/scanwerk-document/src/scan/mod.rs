// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipt scanning pipeline — contour tracing, polygon simplification,
// rectangle selection, confidence scoring, corner editing, and perspective
// rectification.

pub mod confidence;
pub mod contour;
pub mod detect;
pub mod rectify;
pub mod select;
pub mod session;
pub mod simplify;

pub use confidence::Confidence;
pub use detect::{DetectionReport, ProcessedImage, detect};
pub use rectify::{Homography, rectify};
pub use session::{CropSession, ReceiptScanner, update_corner};
