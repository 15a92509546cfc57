// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — map the receipt quadrilateral onto an upright
// output rectangle with a full four-point homography.

use image::{Rgba, RgbaImage};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{Point, Quadrilateral};
use tracing::{debug, info, instrument};

/// Upper bound on output pixels; larger requests are refused rather than
/// attempted.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Fill colour for output pixels that map outside the source photo.
const PAPER_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A projective transform `(x, y) -> (u, v)` in homogeneous coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Solve the transform that takes each `src[i]` exactly to `dst[i]`.
    ///
    /// With `h33` fixed to 1 the remaining eight coefficients follow from the
    /// 8x8 linear system
    ///
    /// ```text
    /// u = (h11 x + h12 y + h13) / (h31 x + h32 y + 1)
    /// v = (h21 x + h22 y + h23) / (h31 x + h32 y + 1)
    /// ```
    ///
    /// written out once per correspondence. Three collinear points (or any
    /// other degenerate layout) leave the system singular.
    pub fn from_correspondences(src: [Point; 4], dst: [Point; 4]) -> Result<Self> {
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for i in 0..4 {
            let (x, y) = (src[i].x as f64, src[i].y as f64);
            let (u, v) = (dst[i].x as f64, dst[i].y as f64);

            let r = 2 * i;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -x * u;
            a[(r, 7)] = -y * u;
            b[r] = u;

            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -x * v;
            a[(r + 1, 7)] = -y * v;
            b[r + 1] = v;
        }

        let h = a
            .lu()
            .solve(&b)
            .ok_or_else(|| ScanwerkError::Homography("corner system is singular".into()))?;
        if h.iter().any(|c| !c.is_finite()) {
            return Err(ScanwerkError::Homography(
                "corner system produced non-finite coefficients".into(),
            ));
        }

        let homography = Self {
            matrix: Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0),
        };

        // Near-singular systems solve without error but do not reproduce the
        // corners; treat those as degenerate too.
        let scale = dst
            .iter()
            .map(|p| p.x.abs().max(p.y.abs()) as f64)
            .fold(1.0f64, f64::max);
        for (s, d) in src.iter().zip(dst.iter()) {
            let mapped = homography.apply(*s).ok_or_else(|| {
                ScanwerkError::Homography("corner maps to infinity".into())
            })?;
            let err = (mapped.x as f64 - d.x as f64).hypot(mapped.y as f64 - d.y as f64);
            if err > 1e-3 * scale {
                return Err(ScanwerkError::Homography(format!(
                    "corner reprojection error {err:.3} px"
                )));
            }
        }

        Ok(homography)
    }

    /// Map a point; `None` when it lands on the line at infinity.
    pub fn apply(&self, p: Point) -> Option<Point> {
        let v = self.matrix * Vector3::new(p.x as f64, p.y as f64, 1.0);
        if v[2].abs() < 1e-12 {
            return None;
        }
        Some(Point::new((v[0] / v[2]) as f32, (v[1] / v[2]) as f32))
    }
}

/// Output corners in TL, TR, BR, BL order, on pixel centres.
///
/// Same convention as the corner editor: the last column is `width - 1`. A
/// one-pixel axis still spans one unit so the system stays solvable.
fn target_corners(width: u32, height: u32) -> [Point; 4] {
    let w = width.saturating_sub(1).max(1) as f32;
    let h = height.saturating_sub(1).max(1) as f32;
    [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ]
}

/// Bilinear sample at a fractional pixel position.
///
/// Positions up to half a pixel beyond the outermost pixel centres are
/// clamped onto the edge; anything further out (or NaN) yields `None`.
/// Channels are rounded, so sampling exactly on a pixel centre returns that
/// pixel unchanged.
fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> Option<Rgba<u8>> {
    let (width, height) = image.dimensions();
    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);
    if !(x >= -0.5 && y >= -0.5 && x <= max_x + 0.5 && y <= max_y + 0.5) {
        return None;
    }
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let (x0, y0) = (x.floor() as u32, y.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(width - 1), (y0 + 1).min(height - 1));
    let (fx, fy) = (x - x0 as f32, y - y0 as f32);

    let tl = image.get_pixel(x0, y0).0;
    let tr = image.get_pixel(x1, y0).0;
    let bl = image.get_pixel(x0, y1).0;
    let br = image.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for (c, channel) in out.iter_mut().enumerate() {
        let top = tl[c] as f32 * (1.0 - fx) + tr[c] as f32 * fx;
        let bottom = bl[c] as f32 * (1.0 - fx) + br[c] as f32 * fx;
        *channel = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgba(out))
}

/// Warp the region inside `quad` onto a `target_width` x `target_height`
/// raster.
///
/// The quadrilateral's TL, TR, BR and BL corners land exactly on the output's
/// corner pixels, so both scale and perspective skew are corrected; the
/// full-image quad at the source size reproduces the source. Sampling is
/// bilinear; output pixels that map outside the source are white.
#[instrument(skip(image, quad), fields(src_w = image.width(), src_h = image.height()))]
pub fn rectify(
    image: &RgbaImage,
    quad: &Quadrilateral,
    target_width: u32,
    target_height: u32,
) -> Result<RgbaImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScanwerkError::Processing("source image is empty".into()));
    }
    if target_width == 0 || target_height == 0 {
        return Err(ScanwerkError::Processing(format!(
            "target dimensions must be non-zero, got {}x{}",
            target_width, target_height
        )));
    }
    let pixels = target_width as u64 * target_height as u64;
    if pixels > MAX_OUTPUT_PIXELS {
        return Err(ScanwerkError::Processing(format!(
            "output raster of {}x{} exceeds {} pixels",
            target_width, target_height, MAX_OUTPUT_PIXELS
        )));
    }

    // Solved output -> source, so every output pixel pulls one sample.
    let homography =
        Homography::from_correspondences(target_corners(target_width, target_height), quad.corners())?;
    debug!(matrix = ?homography.matrix, "Homography solved");

    let output = RgbaImage::from_fn(target_width, target_height, |x, y| {
        homography
            .apply(Point::new(x as f32, y as f32))
            .and_then(|p| sample_bilinear(image, p.x, p.y))
            .unwrap_or(PAPER_WHITE)
    });

    info!(target_width, target_height, "Perspective rectification applied");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point as PolyPoint;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn homography_maps_corners_exactly() {
        let src = [
            Point::new(37.0, 22.0),
            Point::new(410.0, 61.0),
            Point::new(388.0, 530.0),
            Point::new(15.0, 470.0),
        ];
        let dst = target_corners(800, 1000);
        let h = Homography::from_correspondences(src, dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let mapped = h.apply(*s).unwrap();
            assert!(mapped.distance(d) < 1e-2, "{mapped:?} vs {d:?}");
        }
    }

    #[test]
    fn homography_of_identical_quads_is_identity() {
        let corners = target_corners(100, 50);
        let h = Homography::from_correspondences(corners, corners).unwrap();
        for p in [Point::new(0.0, 0.0), Point::new(37.5, 12.25), Point::new(99.0, 49.0)] {
            assert!(h.apply(p).unwrap().distance(&p) < 1e-4);
        }
    }

    #[test]
    fn target_corners_sit_on_pixel_centres() {
        assert_eq!(
            target_corners(800, 1000),
            [
                Point::new(0.0, 0.0),
                Point::new(799.0, 0.0),
                Point::new(799.0, 999.0),
                Point::new(0.0, 999.0),
            ]
        );
        assert_eq!(target_corners(1, 5)[2], Point::new(1.0, 4.0));
    }

    #[test]
    fn collinear_corners_are_rejected() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(0.0, 30.0),
        ];
        let err = Homography::from_correspondences(src, target_corners(10, 10)).unwrap_err();
        assert!(matches!(err, ScanwerkError::Homography(_)));
    }

    #[test]
    fn full_image_quad_downscales_cleanly() {
        // Left half red, right half blue.
        let img = RgbaImage::from_fn(100, 100, |x, _| if x < 50 { RED } else { BLUE });
        let quad = Quadrilateral::full_image(100, 100);

        let out = rectify(&img, &quad, 50, 80).unwrap();
        assert_eq!(out.dimensions(), (50, 80));
        let is_red = |p: &Rgba<u8>| p.0[0] > 250 && p.0[2] < 5;
        let is_blue = |p: &Rgba<u8>| p.0[0] < 5 && p.0[2] > 250;
        for y in [2, 40, 77] {
            assert!(is_red(out.get_pixel(5, y)));
            assert!(is_red(out.get_pixel(20, y)));
            assert!(is_blue(out.get_pixel(30, y)));
            assert!(is_blue(out.get_pixel(45, y)));
        }
    }

    #[test]
    fn full_image_quad_at_source_size_is_identity() {
        let img = RgbaImage::from_fn(100, 100, |x, y| Rgba([(x * 2) as u8, y as u8, 0, 255]));
        let out = rectify(&img, &Quadrilateral::full_image(100, 100), 100, 100).unwrap();
        assert_eq!(out.get_pixel(98, 50), img.get_pixel(98, 50));
        assert_eq!(out.get_pixel(99, 99), img.get_pixel(99, 99));
        assert_eq!(out, img);
    }

    #[test]
    fn corner_pixels_come_from_quad_corners() {
        let img = RgbaImage::from_fn(60, 40, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let quad = Quadrilateral::new(
            Point::new(10.0, 5.0),
            Point::new(50.0, 8.0),
            Point::new(47.0, 33.0),
            Point::new(12.0, 30.0),
        );
        let out = rectify(&img, &quad, 30, 20).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [10, 5, 7, 255]);
        assert_eq!(out.get_pixel(29, 0).0, [50, 8, 7, 255]);
        assert_eq!(out.get_pixel(29, 19).0, [47, 33, 7, 255]);
        assert_eq!(out.get_pixel(0, 19).0, [12, 30, 7, 255]);
    }

    #[test]
    fn samples_outside_the_source_are_white() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let quad = Quadrilateral::new(
            Point::new(-20.0, 0.0),
            Point::new(19.0, 0.0),
            Point::new(19.0, 19.0),
            Point::new(-20.0, 19.0),
        );
        let out = rectify(&img, &quad, 40, 20).unwrap();
        assert_eq!(*out.get_pixel(0, 10), PAPER_WHITE);
        assert_eq!(out.get_pixel(39, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn one_pixel_wide_target_is_allowed() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([40, 50, 60, 255]));
        let out = rectify(&img, &Quadrilateral::full_image(10, 10), 1, 5).unwrap();
        assert_eq!(out.dimensions(), (1, 5));
        assert!(out.pixels().all(|p| p.0 == [40, 50, 60, 255]));
    }

    #[test]
    fn skewed_quad_fills_the_output() {
        let mut img = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 0, 255]));
        let corners = [(60, 40), (250, 70), (230, 260), (40, 230)];
        let poly: Vec<PolyPoint<i32>> = corners.iter().map(|&(x, y)| PolyPoint::new(x, y)).collect();
        draw_polygon_mut(&mut img, &poly, Rgba([255, 255, 255, 255]));

        let quad = Quadrilateral::new(
            Point::new(60.0, 40.0),
            Point::new(250.0, 70.0),
            Point::new(230.0, 260.0),
            Point::new(40.0, 230.0),
        );
        let out = rectify(&img, &quad, 100, 120).unwrap();
        for (x, y) in [(10, 12), (90, 12), (90, 108), (10, 108), (50, 60)] {
            assert!(out.get_pixel(x, y).0[0] > 200, "pixel ({x},{y}) not white");
        }
    }

    #[test]
    fn zero_target_is_processing_error() {
        let img = RgbaImage::new(10, 10);
        let quad = Quadrilateral::full_image(10, 10);
        assert!(matches!(
            rectify(&img, &quad, 0, 10),
            Err(ScanwerkError::Processing(_))
        ));
        assert!(matches!(
            rectify(&img, &quad, 100_000, 100_000),
            Err(ScanwerkError::Processing(_))
        ));
    }
}
