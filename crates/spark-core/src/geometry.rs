// File: crates/spark-core/src/geometry.rs
// Summary: Lightweight geometry helpers for pixel math and shape picking.

use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl RectF {
    pub const fn from_ltwh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }
    pub fn width(&self) -> f64 { self.right - self.left }
    pub fn height(&self) -> f64 { self.bottom - self.top }
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Clamp `v` into `[lo, hi]`. `lo` wins when the bounds are inverted.
#[inline]
pub fn clip<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}

/// Even-odd point-in-polygon test. The polygon is implicitly closed.
/// Open polylines with fewer than three vertices enclose no area.
pub fn polygon_contains(points: &[Point], p: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn circle_contains(center: Point, radius: f64, p: Point) -> bool {
    let (dx, dy) = (p.x - center.x, p.y - center.y);
    dx * dx + dy * dy <= radius * radius
}

/// Angles are radians, clockwise from the positive x axis (screen space), `start <= end`.
pub fn slice_contains(center: Point, radius: f64, start: f64, end: f64, p: Point) -> bool {
    if !circle_contains(center, radius, p) || end <= start {
        return false;
    }
    if end - start >= 2.0 * PI {
        return true;
    }
    let tau = 2.0 * PI;
    let angle = (p.y - center.y).atan2(p.x - center.x).rem_euclid(tau);
    let from = start.rem_euclid(tau);
    let sweep = end - start;
    (angle - from).rem_euclid(tau) <= sweep
}
