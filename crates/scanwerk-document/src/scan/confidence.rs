// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection confidence — a 0-100 heuristic favouring large, moderately
// square quadrilaterals.

use scanwerk_core::{ConfidenceConfig, Quadrilateral};
use serde::{Deserialize, Serialize};

/// Confidence score with the two components it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Confidence {
    /// Closeness of width/height to 1.0, in [0, 1].
    pub aspect_score: f32,
    /// Area relative to the coverage target, in [0, 1].
    pub size_score: f32,
    /// Weighted total in [0, 100].
    pub total: f32,
}

/// Score `quad` against a `width` x `height` image.
///
/// `aspect_score = 1 - |w/h - 1|`, zero when the ratio falls outside
/// `[aspect_min, aspect_max]`; `size_score = area / (coverage_target *
/// image_area)`, capped at 1. The total is
/// `(aspect_score * aspect_weight + size_score * size_weight) * 100`.
pub fn score(quad: &Quadrilateral, width: u32, height: u32, config: &ConfidenceConfig) -> Confidence {
    let quad_w = quad.effective_width();
    let quad_h = quad.effective_height();

    let aspect_score = if quad_h > 0.0 {
        let ratio = quad_w / quad_h;
        if ratio < config.aspect_min || ratio > config.aspect_max {
            0.0
        } else {
            (1.0 - (ratio - 1.0).abs()).max(0.0)
        }
    } else {
        0.0
    };

    let target_area = width as f32 * height as f32 * config.coverage_target;
    let size_score = if target_area > 0.0 {
        (quad.area() / target_area).min(1.0)
    } else {
        0.0
    };

    let total = ((aspect_score * config.aspect_weight + size_score * config.size_weight) * 100.0)
        .clamp(0.0, 100.0);

    Confidence {
        aspect_score,
        size_score,
        total,
    }
}
