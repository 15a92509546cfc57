// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipt scanner and crop session — load a photo, detect the receipt, let
// the user drag corners, then rectify the accepted shape.

use std::path::Path;

use image::{DynamicImage, RgbaImage};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{Corner, Point, Quadrilateral, ScanConfig};
use tracing::{debug, info, instrument};

use super::confidence::Confidence;
use super::detect::{ProcessedImage, detect};
use super::rectify::rectify;
use crate::image::codec;

/// Replace corner `index` (TL=0, TR=1, BR=2, BL=3) with `point`, clamped to
/// the `width` x `height` raster.
///
/// The shape is not re-validated; dragging a corner past its neighbour
/// yields a non-convex quadrilateral, which is allowed. NaN or infinite
/// coordinates are rejected with `InvalidPoint`.
pub fn update_corner(
    quad: &Quadrilateral,
    index: usize,
    point: Point,
    width: u32,
    height: u32,
) -> Result<Quadrilateral> {
    let corner = Corner::try_from(index)?;
    if !point.is_finite() {
        return Err(ScanwerkError::InvalidPoint(point.x, point.y));
    }
    Ok(quad.with_corner(corner, point.clamped(width, height)))
}

/// A decoded receipt photo and the settings to process it with.
pub struct ReceiptScanner {
    image: RgbaImage,
    config: ScanConfig,
}

impl ReceiptScanner {
    // -- Construction ---------------------------------------------------------

    /// Decode a photo from memory (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::from_dynamic(codec::decode(data)?))
    }

    /// Decode a photo from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_dynamic(codec::open(path)?))
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    // -- Pipeline -------------------------------------------------------------

    pub fn detect(&self) -> Result<ProcessedImage> {
        detect(&self.image, &self.config)
    }

    /// Run detection and open an editing session on the result.
    pub fn begin_crop(self) -> Result<CropSession> {
        let processed = detect(&self.image, &self.config)?;
        Ok(CropSession::new(processed, self.config))
    }
}

/// Corner editing state for one photo.
///
/// Dropping the session without calling [`CropSession::accept`] discards the
/// edits.
pub struct CropSession {
    processed: ProcessedImage,
    config: ScanConfig,
    initial: Quadrilateral,
    current: Quadrilateral,
}

impl CropSession {
    pub fn new(processed: ProcessedImage, config: ScanConfig) -> Self {
        let initial = processed.editable_quadrilateral(config.detection.fallback_margin);
        Self {
            processed,
            config,
            initial,
            current: initial,
        }
    }

    pub fn quadrilateral(&self) -> Quadrilateral {
        self.current
    }

    pub fn confidence(&self) -> Confidence {
        self.processed.confidence
    }

    /// True when the session was seeded with the inset rectangle because
    /// detection found nothing.
    pub fn is_fallback(&self) -> bool {
        !self.processed.is_detected()
    }

    pub fn processed(&self) -> &ProcessedImage {
        &self.processed
    }

    /// Move one corner; see [`update_corner`].
    pub fn update_corner(&mut self, index: usize, point: Point) -> Result<Quadrilateral> {
        self.current = update_corner(
            &self.current,
            index,
            point,
            self.processed.width(),
            self.processed.height(),
        )?;
        debug!(index, corner = ?self.current.corners()[index], "Corner moved");
        Ok(self.current)
    }

    /// Discard edits and return to the detected (or fallback) shape.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Rectify the current shape at the configured output size.
    #[instrument(skip(self))]
    pub fn accept(self) -> Result<RgbaImage> {
        let output = &self.config.output;
        info!(
            width = output.width,
            height = output.height,
            fallback = self.is_fallback(),
            "Crop accepted"
        );
        rectify(&self.processed.image, &self.current, output.width, output.height)
    }

    /// Rectify and encode in the configured output format.
    pub fn accept_encoded(self) -> Result<Vec<u8>> {
        let format = self.config.output.format;
        let quality = self.config.output.jpeg_quality;
        let cropped = self.accept()?;
        codec::encode(&cropped, format, quality)
    }
}
