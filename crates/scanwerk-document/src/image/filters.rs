// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-pixel raster filters feeding receipt detection: luma grayscale,
// Gaussian blur, and Sobel gradient magnitude.
//
// Every filter borrows its input and returns a freshly allocated buffer of
// the same dimensions, so each stage can be run and tested on its own.

use image::{Rgba, RgbaImage};
use scanwerk_core::MAX_BLUR_RADIUS;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, instrument};

/// ITU-R BT.601 luma of an RGB triple, rounded to the nearest integer.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Replace R, G and B with the pixel's luma; alpha is preserved.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn grayscale(image: &RgbaImage) -> RgbaImage {
    let gray = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let l = luma(r, g, b);
        Rgba([l, l, l, a])
    });
    debug!("Grayscale conversion complete");
    gray
}

/// Normalised `(2r+1) x (2r+1)` Gaussian kernel with sigma = `radius / 3`,
/// stored row-major.
///
/// Radii above [`MAX_BLUR_RADIUS`] are a `Processing` error rather than an
/// attempt to allocate the kernel.
pub fn gaussian_kernel(radius: u32) -> Result<Vec<f64>> {
    if radius > MAX_BLUR_RADIUS {
        return Err(ScanwerkError::Processing(format!(
            "blur radius {} exceeds the maximum of {}",
            radius, MAX_BLUR_RADIUS
        )));
    }
    if radius == 0 {
        return Ok(vec![1.0]);
    }
    let r = radius as i64;
    let sigma = radius as f64 / 3.0;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    for dy in -r..=r {
        for dx in -r..=r {
            let dist_sq = (dx * dx + dy * dy) as f64;
            kernel.push((-dist_sq / two_sigma_sq).exp());
        }
    }
    let sum: f64 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    Ok(kernel)
}

/// Gaussian blur of the colour channels over a `(2r+1)²` neighbourhood.
///
/// Neighbour coordinates outside the image are clamped to the nearest edge
/// pixel, so a constant image stays constant. Alpha is copied unchanged.
/// Cost is O(width · height · radius²); radii above [`MAX_BLUR_RADIUS`] are
/// a `Processing` error.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn gaussian_blur(image: &RgbaImage, radius: u32) -> Result<RgbaImage> {
    let kernel = gaussian_kernel(radius)?;
    if radius == 0 || image.width() == 0 || image.height() == 0 {
        return Ok(image.clone());
    }

    let r = radius as i64;
    let side = (2 * r + 1) as usize;
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;

    let blurred = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let mut acc = [0.0f64; 3];
        for dy in -r..=r {
            let sy = (y as i64 + dy).clamp(0, max_y) as u32;
            let row = (dy + r) as usize * side;
            for dx in -r..=r {
                let sx = (x as i64 + dx).clamp(0, max_x) as u32;
                let weight = kernel[row + (dx + r) as usize];
                let px = image.get_pixel(sx, sy).0;
                acc[0] += weight * px[0] as f64;
                acc[1] += weight * px[1] as f64;
                acc[2] += weight * px[2] as f64;
            }
        }
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        let alpha = image.get_pixel(x, y).0[3];
        Rgba([channel(acc[0]), channel(acc[1]), channel(acc[2]), alpha])
    });

    debug!(radius, "Gaussian blur complete");
    Ok(blurred)
}

/// Sobel gradient magnitude of the red channel.
///
/// Output pixels carry `min(sqrt(Gx² + Gy²), 255)` in R, G and B with alpha
/// 255. The outermost one-pixel ring has no full 3x3 neighbourhood and is
/// written as magnitude 0; images under 3 px in either dimension are all 0.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn sobel(image: &RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut edges = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
    if width < 3 || height < 3 {
        return edges;
    }

    let red = |x: u32, y: u32| image.get_pixel(x, y).0[0] as f32;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = (red(x + 1, y - 1) + 2.0 * red(x + 1, y) + red(x + 1, y + 1))
                - (red(x - 1, y - 1) + 2.0 * red(x - 1, y) + red(x - 1, y + 1));
            let gy = (red(x - 1, y + 1) + 2.0 * red(x, y + 1) + red(x + 1, y + 1))
                - (red(x - 1, y - 1) + 2.0 * red(x, y - 1) + red(x + 1, y - 1));
            let magnitude = gx.hypot(gy).round().min(255.0) as u8;
            edges.put_pixel(x, y, Rgba([magnitude, magnitude, magnitude, 255]));
        }
    }

    debug!("Sobel edge detection complete");
    edges
}
