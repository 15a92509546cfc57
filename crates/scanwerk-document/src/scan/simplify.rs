// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Douglas-Peucker polyline simplification, for open polylines and closed
// rings.

use scanwerk_core::Point;

/// Distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the distance from `a` when the chord has zero length.
pub fn perpendicular_distance(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = dx.hypot(dy);
    if len <= f32::EPSILON {
        return p.distance(&a);
    }
    (dx * (p.y - a.y) - dy * (p.x - a.x)).abs() / len
}

/// Simplify an open polyline.
///
/// Both endpoints are always kept. An interior point survives when its
/// distance to the chord of the span being examined is strictly greater than
/// `epsilon`; the span is then split at that point and both halves are
/// examined in turn. Inputs with fewer than three points are returned as-is.
///
/// Spans are processed from an explicit work list, so very long contours do
/// not deepen the call stack.
pub fn simplify(points: &[Point], epsilon: f32) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut spans = vec![(0usize, last)];
    while let Some((start, end)) = spans.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let mut max_dist = 0.0f32;
        let mut max_idx = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = perpendicular_distance(*p, a, b);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_idx > start && max_dist > epsilon {
            keep[max_idx] = true;
            spans.push((max_idx, end));
            spans.push((start, max_idx));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Simplify a closed ring whose points are in boundary order.
///
/// The ring is cut at the point farthest from its centroid and again at the
/// point farthest from that anchor; each chain is simplified as an open
/// polyline and the results are joined. Vertices still lying within
/// `epsilon` of the chord between their neighbours are then removed, so a
/// clean rectangle comes back as exactly its four corners.
pub fn simplify_closed(ring: &[Point], epsilon: f32) -> Vec<Point> {
    if ring.len() < 4 {
        return ring.to_vec();
    }

    let n = ring.len() as f64;
    let (sx, sy) = ring
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let centroid = Point::new((sx / n) as f32, (sy / n) as f32);

    let anchor = farthest_from(ring, centroid);
    let rotated: Vec<Point> = ring[anchor..]
        .iter()
        .chain(ring[..anchor].iter())
        .copied()
        .collect();

    let opposite = farthest_from(&rotated, rotated[0]);
    if opposite == 0 {
        return vec![rotated[0]];
    }

    let mut merged = simplify(&rotated[..=opposite], epsilon);

    let mut back: Vec<Point> = rotated[opposite..].to_vec();
    back.push(rotated[0]);
    let back = simplify(&back, epsilon);
    merged.extend_from_slice(&back[1..back.len() - 1]);

    drop_collinear(merged, epsilon)
}

/// Index of the first point at maximum distance from `origin`.
fn farthest_from(points: &[Point], origin: Point) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MIN;
    for (i, p) in points.iter().enumerate() {
        let d = p.distance(&origin);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn drop_collinear(mut polygon: Vec<Point>, epsilon: f32) -> Vec<Point> {
    loop {
        if polygon.len() <= 3 {
            return polygon;
        }
        let n = polygon.len();
        let flat = (0..n).find(|&i| {
            let prev = polygon[(i + n - 1) % n];
            let next = polygon[(i + 1) % n];
            perpendicular_distance(polygon[i], prev, next) <= epsilon
        });
        match flat {
            Some(i) => {
                polygon.remove(i);
            }
            None => return polygon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Densely sampled walk from `from` to `to` (excluding `to`).
    fn segment(from: Point, to: Point, steps: usize) -> Vec<Point> {
        (0..steps)
            .map(|i| {
                let t = i as f32 / steps as f32;
                Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
            })
            .collect()
    }

    const TL: Point = Point::new(10.0, 20.0);
    const TR: Point = Point::new(110.0, 20.0);
    const BR: Point = Point::new(110.0, 80.0);
    const BL: Point = Point::new(10.0, 80.0);

    fn close(a: Point, b: Point) -> bool {
        a.distance(&b) <= 1.0
    }

    #[test]
    fn fewer_than_three_points_unchanged() {
        assert!(simplify(&[], 1.0).is_empty());
        let one = [Point::new(1.0, 2.0)];
        assert_eq!(simplify(&one, 1.0), one.to_vec());
        let two = [Point::new(0.0, 0.0), Point::new(50.0, 3.0)];
        assert_eq!(simplify(&two, 1.0), two.to_vec());
    }

    #[test]
    fn straight_line_keeps_endpoints_only() {
        let mut line = segment(Point::new(0.0, 0.0), Point::new(100.0, 50.0), 100);
        line.push(Point::new(100.0, 50.0));
        let out = simplify(&line, 0.5);
        assert_eq!(out, vec![Point::new(0.0, 0.0), Point::new(100.0, 50.0)]);
    }

    #[test]
    fn rectangle_walk_reduces_to_its_corners() {
        let mut walk = segment(TL, TR, 100);
        walk.extend(segment(TR, BR, 60));
        walk.extend(segment(BR, BL, 100));
        walk.push(BL);

        let out = simplify(&walk, 2.0);
        assert_eq!(out.len(), 4);
        for (got, want) in out.iter().zip([TL, TR, BR, BL]) {
            assert!(close(*got, want), "{got:?} vs {want:?}");
        }
    }

    #[test]
    fn distance_equal_to_epsilon_is_dropped() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 1.0), Point::new(10.0, 0.0)];
        assert_eq!(simplify(&pts, 1.0).len(), 2);
        assert_eq!(simplify(&pts, 0.99).len(), 3);
    }

    #[test]
    fn zero_length_chord_uses_point_distance() {
        let d = perpendicular_distance(Point::new(3.0, 4.0), Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn closed_ring_reduces_to_four_corners() {
        // Start mid-edge so the cut points are not the corners themselves.
        let mut ring = segment(Point::new(60.0, 20.0), TR, 50);
        ring.extend(segment(TR, BR, 60));
        ring.extend(segment(BR, BL, 100));
        ring.extend(segment(BL, TL, 60));
        ring.extend(segment(TL, Point::new(60.0, 20.0), 50));

        let out = simplify_closed(&ring, 3.0);
        assert_eq!(out.len(), 4, "{out:?}");
        for corner in [TL, TR, BR, BL] {
            assert!(out.iter().any(|p| close(*p, corner)), "missing {corner:?} in {out:?}");
        }
    }

    #[test]
    fn closed_ring_ignores_jitter_below_epsilon() {
        let mut ring = Vec::new();
        for (i, p) in segment(TL, TR, 100)
            .into_iter()
            .chain(segment(TR, BR, 60))
            .chain(segment(BR, BL, 100))
            .chain(segment(BL, TL, 60))
            .enumerate()
        {
            let wobble = if i % 2 == 0 { 1.5 } else { -1.5 };
            ring.push(Point::new(p.x + wobble, p.y - wobble));
        }
        let out = simplify_closed(&ring, 10.0);
        assert_eq!(out.len(), 4, "{out:?}");
    }

    #[test]
    fn closed_ring_of_identical_points_collapses() {
        let ring = vec![Point::new(5.0, 5.0); 10];
        assert_eq!(simplify_closed(&ring, 1.0), vec![Point::new(5.0, 5.0)]);
    }
}
