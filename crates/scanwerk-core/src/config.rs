// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: detection thresholds, confidence weighting, and
// output dimensions. Loaded from JSON; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};
use crate::types::OutputFormat;

/// Largest accepted blur radius; the kernel is `(2r+1)^2` weights.
pub const MAX_BLUR_RADIUS: u32 = 50;

/// Complete scanner settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detection: DetectionConfig,
    pub confidence: ConfidenceConfig,
    pub output: OutputConfig,
}

/// Edge detection and rectangle selection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Gaussian blur radius in pixels (sigma = radius / 3).
    pub blur_radius: u32,
    /// Edge magnitude (0-255) a pixel must exceed to join a contour.
    pub edge_threshold: u8,
    /// Contours with fewer points are discarded.
    pub min_contour_len: usize,
    /// Douglas-Peucker tolerance in pixels.
    pub epsilon: f32,
    /// Minimum quad width/height as a fraction of the image width/height.
    pub min_size_ratio: f32,
    /// Inset of the fallback rectangle as a fraction of each dimension.
    pub fallback_margin: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_radius: 2,
            edge_threshold: 100,
            min_contour_len: 50,
            epsilon: 10.0,
            min_size_ratio: 0.2,
            fallback_margin: 0.05,
        }
    }
}

/// Weights and bounds for the detection confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub aspect_weight: f32,
    pub size_weight: f32,
    /// Width/height ratios below this score zero on aspect.
    pub aspect_min: f32,
    /// Width/height ratios above this score zero on aspect.
    pub aspect_max: f32,
    /// Fraction of the image area at which the size score saturates.
    pub coverage_target: f32,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            aspect_weight: 0.6,
            size_weight: 0.4,
            aspect_min: 0.5,
            aspect_max: 2.0,
            coverage_target: 0.8,
        }
    }
}

/// Rectified output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    /// JPEG quality (1-100); ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 1000,
            format: OutputFormat::Png,
            jpeg_quality: 90,
        }
    }
}

impl ScanConfig {
    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.blur_radius > MAX_BLUR_RADIUS {
            return Err(invalid(format!(
                "blur_radius must be at most {MAX_BLUR_RADIUS}, got {}",
                d.blur_radius
            )));
        }
        if !(d.epsilon.is_finite() && d.epsilon >= 0.0) {
            return Err(invalid(format!("epsilon must be >= 0, got {}", d.epsilon)));
        }
        if !(0.0..1.0).contains(&d.min_size_ratio) {
            return Err(invalid(format!(
                "min_size_ratio must be in [0, 1), got {}",
                d.min_size_ratio
            )));
        }
        if !(d.fallback_margin > 0.0 && d.fallback_margin < 0.5) {
            return Err(invalid(format!(
                "fallback_margin must be in (0, 0.5), got {}",
                d.fallback_margin
            )));
        }

        let c = &self.confidence;
        for (name, weight) in [("aspect_weight", c.aspect_weight), ("size_weight", c.size_weight)] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(invalid(format!("{name} must be in [0, 1], got {weight}")));
            }
        }
        if !(c.aspect_min > 0.0 && c.aspect_min <= 1.0 && c.aspect_max >= 1.0) {
            return Err(invalid(format!(
                "aspect bounds must satisfy 0 < min <= 1 <= max, got [{}, {}]",
                c.aspect_min, c.aspect_max
            )));
        }
        if !(c.coverage_target > 0.0 && c.coverage_target <= 1.0) {
            return Err(invalid(format!(
                "coverage_target must be in (0, 1], got {}",
                c.coverage_target
            )));
        }

        let o = &self.output;
        if o.width == 0 || o.height == 0 {
            return Err(invalid(format!(
                "output dimensions must be non-zero, got {}x{}",
                o.width, o.height
            )));
        }
        if !(1..=100).contains(&o.jpeg_quality) {
            return Err(invalid(format!(
                "jpeg_quality must be in 1-100, got {}",
                o.jpeg_quality
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ScanwerkError {
    ScanwerkError::Config(message)
}
