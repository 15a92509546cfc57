// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectangle selection — turn traced contours into the receipt's corner
// quadrilateral.

use scanwerk_core::{Contour, DetectionConfig, Point, Quadrilateral};
use tracing::{debug, instrument, trace};

use super::simplify::simplify_closed;

/// Order contour points along the boundary by polar angle about the centroid.
///
/// Flood-fill discovery order wanders back and forth across the edge band;
/// sorting by angle yields a closed walk around a roughly convex outline,
/// which is what polygon simplification needs.
pub fn boundary_order(contour: &Contour) -> Vec<Point> {
    let Some(centre) = contour.centroid() else {
        return Vec::new();
    };
    let mut keyed: Vec<(f32, Point)> = contour
        .points()
        .iter()
        .map(|p| ((p.y - centre.y).atan2(p.x - centre.x), *p))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Whether `quad` is on the image and large enough to be the receipt.
///
/// Effective width must exceed `min_size_ratio * width` and effective height
/// must exceed `min_size_ratio * height`.
pub fn is_plausible(quad: &Quadrilateral, width: u32, height: u32, config: &DetectionConfig) -> bool {
    if !quad.is_within(width, height) {
        return false;
    }
    let min_w = width as f32 * config.min_size_ratio;
    let min_h = height as f32 * config.min_size_ratio;
    quad.effective_width() > min_w && quad.effective_height() > min_h
}

/// Pick the receipt outline from contours sorted largest first.
///
/// Each contour is simplified with `config.epsilon`; the first one that
/// reduces to exactly four vertices and passes [`is_plausible`] wins and no
/// further contours are examined. Returns `None` when nothing qualifies;
/// callers then fall back to [`Quadrilateral::inset`].
#[instrument(skip(contours, config), fields(candidates = contours.len()))]
pub fn select_quadrilateral(
    contours: &[Contour],
    width: u32,
    height: u32,
    config: &DetectionConfig,
) -> Option<Quadrilateral> {
    for (rank, contour) in contours.iter().enumerate() {
        let polygon = simplify_closed(&boundary_order(contour), config.epsilon);
        let Ok(vertices) = <[Point; 4]>::try_from(polygon.as_slice()) else {
            trace!(rank, vertices = polygon.len(), "Contour is not a quadrilateral");
            continue;
        };

        let quad = Quadrilateral::from_unordered(vertices);
        if is_plausible(&quad, width, height, config) {
            debug!(
                rank,
                points = contour.len(),
                top_left = ?quad.top_left(),
                bottom_right = ?quad.bottom_right(),
                "Quadrilateral selected"
            );
            return Some(quad);
        }
        trace!(rank, "Quadrilateral rejected as too small or out of bounds");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points of a one-pixel rectangle outline, in raster order.
    fn outline(x0: u32, y0: u32, x1: u32, y1: u32) -> Contour {
        let mut points = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                if x == x0 || x == x1 || y == y0 || y == y1 {
                    points.push(Point::new(x as f32, y as f32));
                }
            }
        }
        Contour::new(points)
    }

    fn near(a: Point, x: f32, y: f32) -> bool {
        a.distance(&Point::new(x, y)) <= 1.5
    }

    #[test]
    fn boundary_order_walks_around_the_outline() {
        let ordered = boundary_order(&outline(10, 10, 50, 30));
        assert_eq!(ordered.len(), outline(10, 10, 50, 30).len());
        // Consecutive points are neighbours along the outline, except near
        // corners where the angle sort may hop across a couple of pixels.
        let max_step = ordered
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .fold(0.0f32, f32::max);
        assert!(max_step < 3.0, "max step {max_step}");
    }

    #[test]
    fn selects_rectangle_outline() {
        let contours = vec![outline(20, 30, 150, 170)];
        let quad = select_quadrilateral(&contours, 200, 200, &DetectionConfig::default())
            .expect("rectangle should be selected");
        assert!(near(quad.top_left(), 20.0, 30.0));
        assert!(near(quad.top_right(), 150.0, 30.0));
        assert!(near(quad.bottom_right(), 150.0, 170.0));
        assert!(near(quad.bottom_left(), 20.0, 170.0));
    }

    #[test]
    fn rejects_small_rectangle() {
        // 30 px wide on a 200 px image is below the 20% (40 px) minimum.
        let contours = vec![outline(50, 20, 80, 180)];
        assert!(select_quadrilateral(&contours, 200, 200, &DetectionConfig::default()).is_none());
    }

    #[test]
    fn rejects_wide_but_short_rectangle() {
        // 160 px wide clears the width rule; 30 px tall is under 20% of 200.
        let contours = vec![outline(20, 85, 180, 115)];
        assert!(select_quadrilateral(&contours, 200, 200, &DetectionConfig::default()).is_none());

        let strip = Quadrilateral::new(
            Point::new(20.0, 85.0),
            Point::new(180.0, 85.0),
            Point::new(180.0, 115.0),
            Point::new(20.0, 115.0),
        );
        assert!(!is_plausible(&strip, 200, 200, &DetectionConfig::default()));
        let taller = strip
            .with_corner(scanwerk_core::Corner::BottomRight, Point::new(180.0, 130.0))
            .with_corner(scanwerk_core::Corner::BottomLeft, Point::new(20.0, 130.0));
        assert!(is_plausible(&taller, 200, 200, &DetectionConfig::default()));
    }

    #[test]
    fn first_valid_contour_wins() {
        let contours = vec![outline(10, 10, 190, 190), outline(40, 40, 160, 160)];
        let quad = select_quadrilateral(&contours, 200, 200, &DetectionConfig::default()).unwrap();
        assert!(near(quad.top_left(), 10.0, 10.0));
    }

    #[test]
    fn skips_non_quadrilateral_contours() {
        // A straight line simplifies to two vertices and is skipped.
        let line = Contour::new((0..150).map(|x| Point::new(x as f32 + 20.0, 100.0)).collect());
        let contours = vec![line, outline(30, 30, 170, 170)];
        let quad = select_quadrilateral(&contours, 200, 200, &DetectionConfig::default()).unwrap();
        assert!(near(quad.top_left(), 30.0, 30.0));
    }

    #[test]
    fn plausibility_checks_bounds() {
        let quad = Quadrilateral::new(
            Point::new(10.0, 10.0),
            Point::new(200.0, 10.0),
            Point::new(190.0, 190.0),
            Point::new(10.0, 190.0),
        );
        assert!(!is_plausible(&quad, 200, 200, &DetectionConfig::default()));
        let inside = quad.with_corner(scanwerk_core::Corner::TopRight, Point::new(199.0, 10.0));
        assert!(is_plausible(&inside, 200, 200, &DetectionConfig::default()));
    }
}
