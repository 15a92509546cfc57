// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipt detection pipeline — grayscale, blur, Sobel, contour tracing,
// rectangle selection and confidence scoring, run once per photo.

use image::RgbaImage;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{Point, Quadrilateral, ScanConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::confidence::{Confidence, score};
use super::contour::trace_contours;
use super::select::select_quadrilateral;
use crate::image::filters::{gaussian_blur, grayscale, sobel};

/// Outcome of one detection run.
///
/// Holds its own copy of the photo so the crop step does not depend on the
/// caller keeping the original alive.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Working copy of the source raster.
    pub image: RgbaImage,
    /// Detected receipt outline, if any contour qualified.
    pub quadrilateral: Option<Quadrilateral>,
    /// Zero when nothing was detected.
    pub confidence: Confidence,
}

impl ProcessedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_detected(&self) -> bool {
        self.quadrilateral.is_some()
    }

    /// The quadrilateral to seed the corner editor with: the detected one, or
    /// the image inset by `fallback_margin` on every side.
    pub fn editable_quadrilateral(&self, fallback_margin: f32) -> Quadrilateral {
        self.quadrilateral
            .unwrap_or_else(|| Quadrilateral::inset(self.width(), self.height(), fallback_margin))
    }

    /// Serializable summary for logs and the command line.
    pub fn report(&self, fallback_margin: f32) -> DetectionReport {
        DetectionReport {
            width: self.width(),
            height: self.height(),
            detected: self.is_detected(),
            corners: self.editable_quadrilateral(fallback_margin).corners(),
            confidence: self.confidence,
        }
    }
}

/// Detection summary with corners in TL, TR, BR, BL order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub width: u32,
    pub height: u32,
    /// False when `corners` is the inset fallback.
    pub detected: bool,
    pub corners: [Point; 4],
    pub confidence: Confidence,
}

/// Locate the receipt outline in a photo.
///
/// Never fails for lack of a document: when no contour yields a plausible
/// quadrilateral the result carries `None` and confidence 0, and callers
/// seed the editor with [`ProcessedImage::editable_quadrilateral`].
#[instrument(skip(image, config), fields(width = image.width(), height = image.height()))]
pub fn detect(image: &RgbaImage, config: &ScanConfig) -> Result<ProcessedImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ScanwerkError::Processing(format!(
            "cannot detect on an empty {}x{} image",
            width, height
        )));
    }
    info!("Starting receipt detection");

    let d = &config.detection;
    let gray = grayscale(image);
    let blurred = gaussian_blur(&gray, d.blur_radius)?;
    let edges = sobel(&blurred);
    let contours = trace_contours(&edges, d.edge_threshold, d.min_contour_len);
    debug!(contours = contours.len(), "Edge contours traced");

    let quadrilateral = select_quadrilateral(&contours, width, height, d);
    let confidence = match &quadrilateral {
        Some(quad) => score(quad, width, height, &config.confidence),
        None => {
            warn!("No receipt outline found; inset fallback will be offered");
            Confidence::default()
        }
    };

    info!(
        detected = quadrilateral.is_some(),
        confidence = confidence.total,
        "Receipt detection complete"
    );
    Ok(ProcessedImage {
        image: image.clone(),
        quadrilateral,
        confidence,
    })
}
