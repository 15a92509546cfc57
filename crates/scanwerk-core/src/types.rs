// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk receipt scanner: points, corner roles,
// quadrilaterals, contours, and output formats.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};

/// A position in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Clamp into `[0, width-1] x [0, height-1]`. NaN passes through; check
    /// [`Point::is_finite`] first.
    pub fn clamped(self, width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        Self {
            x: self.x.clamp(0.0, max_x),
            y: self.y.clamp(0.0, max_y),
        }
    }

    /// Whether the point lies on the raster (`0 <= x < width`, `0 <= y < height`).
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x < width as f32 && self.y < height as f32
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Logical role of a quadrilateral corner, in editor index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// All corners in index order (0-3).
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomRight => 2,
            Self::BottomLeft => 3,
        }
    }
}

impl TryFrom<usize> for Corner {
    type Error = ScanwerkError;

    fn try_from(index: usize) -> Result<Self> {
        Corner::ALL
            .get(index)
            .copied()
            .ok_or(ScanwerkError::InvalidCorner(index))
    }
}

/// Four corner points describing a (possibly skewed) document boundary.
///
/// Roles are fixed at construction. [`Quadrilateral::from_unordered`] assigns
/// them by sorting; [`Quadrilateral::with_corner`] replaces one point and
/// keeps every role as-is, so user edits may produce non-convex shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    corners: [Point; 4],
}

impl Quadrilateral {
    pub const fn new(
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Self {
        Self {
            corners: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Assign corner roles to four unordered points.
    ///
    /// Points are sorted by y (then x); the first two form the top edge and
    /// the last two the bottom edge, each pair ordered left to right.
    pub fn from_unordered(points: [Point; 4]) -> Self {
        let mut sorted = points;
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        let (top_left, top_right) = left_right(sorted[0], sorted[1]);
        let (bottom_left, bottom_right) = left_right(sorted[2], sorted[3]);
        Self::new(top_left, top_right, bottom_right, bottom_left)
    }

    /// Rectangle inset by `margin` (a fraction of each dimension) from the
    /// image border, kept on the raster. Used when detection finds nothing.
    pub fn inset(width: u32, height: u32, margin: f32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let (left, top) = (w * margin, h * margin);
        let (right, bottom) = (w * (1.0 - margin), h * (1.0 - margin));
        let at = |x, y| Point::new(x, y).clamped(width, height);
        Self::new(at(left, top), at(right, top), at(right, bottom), at(left, bottom))
    }

    /// The image's own outermost pixel corners.
    pub fn full_image(width: u32, height: u32) -> Self {
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(max_x, 0.0),
            Point::new(max_x, max_y),
            Point::new(0.0, max_y),
        )
    }

    // -- Accessors ------------------------------------------------------------

    pub fn corner(&self, corner: Corner) -> Point {
        self.corners[corner.index()]
    }

    pub fn top_left(&self) -> Point {
        self.corner(Corner::TopLeft)
    }

    pub fn top_right(&self) -> Point {
        self.corner(Corner::TopRight)
    }

    pub fn bottom_right(&self) -> Point {
        self.corner(Corner::BottomRight)
    }

    pub fn bottom_left(&self) -> Point {
        self.corner(Corner::BottomLeft)
    }

    /// Corners in role order TL, TR, BR, BL.
    pub fn corners(&self) -> [Point; 4] {
        self.corners
    }

    /// Replace one corner without re-sorting roles.
    pub fn with_corner(mut self, corner: Corner, point: Point) -> Self {
        self.corners[corner.index()] = point;
        self
    }

    // -- Geometry -------------------------------------------------------------

    /// Larger of the top and bottom edge lengths.
    pub fn effective_width(&self) -> f32 {
        let top = self.top_left().distance(&self.top_right());
        let bottom = self.bottom_left().distance(&self.bottom_right());
        top.max(bottom)
    }

    /// Larger of the left and right edge lengths.
    pub fn effective_height(&self) -> f32 {
        let left = self.top_left().distance(&self.bottom_left());
        let right = self.top_right().distance(&self.bottom_right());
        left.max(right)
    }

    /// Enclosed area by the shoelace formula over TL, TR, BR, BL.
    pub fn area(&self) -> f32 {
        let mut twice_area = 0.0f32;
        for i in 0..4 {
            let a = self.corners[i];
            let b = self.corners[(i + 1) % 4];
            twice_area += a.x * b.y - b.x * a.y;
        }
        twice_area.abs() / 2.0
    }

    /// Whether every corner lies on a `width` x `height` raster.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.corners.iter().all(|p| p.is_within(width, height))
    }
}

fn left_right(a: Point, b: Point) -> (Point, Point) {
    if a.x <= b.x { (a, b) } else { (b, a) }
}

/// A connected group of edge pixels, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean of all points, or `None` for an empty contour.
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        Some(Point::new((sx / n) as f32, (sy / n) as f32))
    }
}

/// Encodings available for the rectified receipt image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    /// MIME type for handing the image to the PDF assembler.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// Infer the output format from a file extension.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(ScanwerkError::UnsupportedFormat(other.to_string())),
        }
    }
}
