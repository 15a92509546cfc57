// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode/encode and the per-pixel filters (grayscale, blur,
// Sobel) used by receipt detection.

pub mod codec;
pub mod filters;

pub use filters::{gaussian_blur, grayscale, sobel};
