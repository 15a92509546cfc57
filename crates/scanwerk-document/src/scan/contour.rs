// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour tracing — group above-threshold edge pixels into 8-connected
// components using an explicit-stack flood fill.

use image::RgbaImage;
use scanwerk_core::{Contour, Point};
use tracing::{debug, instrument};

const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Trace the connected edge regions of a Sobel magnitude map.
///
/// A pixel belongs to an edge when its red channel is strictly greater than
/// `threshold`. Seeds are taken in raster-scan order and each component is
/// filled iteratively, so image size never bounds stack depth. Components
/// with fewer than `min_len` points are dropped.
///
/// The result is sorted by point count, largest first; equal sizes keep their
/// discovery order. Rectangle selection relies on this ordering.
#[instrument(skip(edges), fields(width = edges.width(), height = edges.height()))]
pub fn trace_contours(edges: &RgbaImage, threshold: u8, min_len: usize) -> Vec<Contour> {
    let (width, height) = edges.dimensions();
    let idx = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let is_edge = |x: u32, y: u32| edges.get_pixel(x, y).0[0] > threshold;

    let mut visited = vec![false; width as usize * height as usize];
    let mut stack: Vec<(u32, u32)> = Vec::new();
    let mut contours = Vec::new();
    let mut discarded = 0usize;

    for y in 0..height {
        for x in 0..width {
            if visited[idx(x, y)] || !is_edge(x, y) {
                continue;
            }

            let mut points = Vec::new();
            visited[idx(x, y)] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                points.push(Point::new(cx as f32, cy as f32));

                for (dx, dy) in NEIGHBOURS {
                    let nx = cx as i64 + dx;
                    let ny = cy as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    if !visited[idx(nx, ny)] && is_edge(nx, ny) {
                        visited[idx(nx, ny)] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            if points.len() >= min_len {
                contours.push(Contour::new(points));
            } else {
                discarded += 1;
            }
        }
    }

    contours.sort_by(|a, b| b.len().cmp(&a.len()));
    debug!(
        kept = contours.len(),
        discarded,
        largest = contours.first().map(Contour::len).unwrap_or(0),
        "Contours traced"
    );
    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn edge_map(width: u32, height: u32, on: impl Fn(u32, u32) -> bool) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = if on(x, y) { 255 } else { 0 };
            Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn empty_map_has_no_contours() {
        let edges = edge_map(20, 20, |_, _| false);
        assert!(trace_contours(&edges, 100, 1).is_empty());
    }

    #[test]
    fn threshold_is_strict() {
        let edges = RgbaImage::from_pixel(10, 10, Rgba([100, 100, 100, 255]));
        assert!(trace_contours(&edges, 100, 1).is_empty());
        assert_eq!(trace_contours(&edges, 99, 1).len(), 1);
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let edges = edge_map(10, 10, |x, y| x == y);
        let contours = trace_contours(&edges, 100, 1);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 10);
    }

    #[test]
    fn short_contours_are_discarded_and_rest_sorted() {
        // Three separate horizontal runs of length 60, 5 and 80.
        let edges = edge_map(100, 30, |x, y| {
            (y == 2 && x < 60) || (y == 10 && x < 5) || (y == 20 && x < 80)
        });
        let contours = trace_contours(&edges, 100, 50);
        let lens: Vec<usize> = contours.iter().map(Contour::len).collect();
        assert_eq!(lens, vec![80, 60]);
    }

    #[test]
    fn rectangle_outline_is_one_contour_with_every_pixel() {
        let edges = edge_map(40, 40, |x, y| {
            (5..35).contains(&x) && (5..35).contains(&y)
                && (x == 5 || x == 34 || y == 5 || y == 34)
        });
        let contours = trace_contours(&edges, 100, 50);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4 * 30 - 4);
    }

    #[test]
    fn large_filled_region_does_not_overflow() {
        let edges = RgbaImage::from_pixel(600, 600, Rgba([255, 255, 255, 255]));
        let contours = trace_contours(&edges, 100, 50);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 360_000);
    }
}
