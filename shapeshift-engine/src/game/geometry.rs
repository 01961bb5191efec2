//! Fit Evaluation
//!
//! Decides whether a cloud of body keypoints lies inside a target outline.
//!
//! Tolerance semantics differ per shape kind:
//! - circle / rect: the boundary shrinks inward by `tolerance` (stricter)
//! - triangle: `tolerance` is a fraction of the triangle's area (slack)
//! - polygon: the region is dilated vertically by `tolerance` (more forgiving);
//!   its horizontal extent is not dilated
//! - curve band: the band narrows by `tolerance` (stricter)
//!
//! Any point at or below [`FLOOR_Y`] counts as inside for every shape.

use serde::{Serialize, Deserialize};
use tracing::trace;

use crate::core::point::{Keypoint, Point};
use crate::core::rng::DeterministicRng;
use crate::game::shape::Shape;

/// Points at or below this normalized y always count as inside.
pub const FLOOR_Y: f64 = 0.95;

/// Minimum number of confident keypoints for a pass.
pub const MIN_CONSIDERED_KEYPOINTS: usize = 4;

/// Minimum inside ratio for a pass.
pub const PASS_INSIDE_RATIO: f64 = 0.85;

/// Default confidence gate.
pub const DEFAULT_MIN_SCORE: f64 = 0.25;

/// Default containment tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.04;

/// Absolute slack added to the triangle area comparison.
const TRIANGLE_AREA_EPSILON: f64 = 1e-4;

/// Caller-tunable fit parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Keypoints with lower confidence are discarded
    pub min_score: f64,
    /// Containment tolerance (see module docs for per-shape meaning)
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Outcome of one fit evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct FitResult {
    /// Did the body fit?
    pub pass: bool,
    /// Fraction of considered keypoints that were inside
    pub inside_ratio: f64,
    /// Considered keypoints that were inside
    pub inside_count: usize,
    /// Keypoints that passed the confidence gate
    pub total: usize,
}

impl FitResult {
    /// Inside ratio as a 0-100 score, rounded.
    pub fn score(&self) -> u32 {
        (self.inside_ratio * 100.0).round() as u32
    }
}

/// Check whether a point lies inside a shape.
pub fn is_inside(shape: &Shape, point: Point, tolerance: f64) -> bool {
    if point.y >= FLOOR_Y {
        return true;
    }

    match shape {
        Shape::Circle { center, radius } => {
            point.distance(*center) <= (radius - tolerance).max(0.0)
        }
        Shape::Rect { center, width, height, .. } => {
            // Corner radius is cosmetic; containment is the plain box.
            let half_w = (width / 2.0 - tolerance).max(0.0);
            let half_h = (height / 2.0 - tolerance).max(0.0);
            (point.x - center.x).abs() <= half_w && (point.y - center.y).abs() <= half_h
        }
        Shape::Triangle { points } => point_in_triangle(point, points, tolerance),
        Shape::Polygon { points, .. } => point_in_polygon(point, points, tolerance),
        Shape::CurveBand { centerline, thickness } => {
            distance_to_polyline(point, centerline) <= thickness - tolerance
        }
    }
}

/// Evaluate how well a set of keypoints fits inside a shape.
///
/// Keypoints below `options.min_score` are ignored. A pass needs at least
/// [`MIN_CONSIDERED_KEYPOINTS`] confident keypoints with an inside ratio of at
/// least [`PASS_INSIDE_RATIO`].
pub fn evaluate_fit(shape: &Shape, keypoints: &[Keypoint], options: &FitOptions) -> FitResult {
    let considered: Vec<&Keypoint> = keypoints
        .iter()
        .filter(|k| k.confidence() >= options.min_score)
        .collect();

    if considered.is_empty() {
        return FitResult::default();
    }

    let inside_count = considered
        .iter()
        .filter(|k| is_inside(shape, k.position, options.tolerance))
        .count();
    let total = considered.len();
    let inside_ratio = inside_count as f64 / total as f64;
    let pass = total >= MIN_CONSIDERED_KEYPOINTS && inside_ratio >= PASS_INSIDE_RATIO;

    trace!(kind = ?shape.kind(), inside_count, total, inside_ratio, pass, "fit evaluated");

    FitResult {
        pass,
        inside_ratio,
        inside_count,
        total,
    }
}

/// Shift a shape horizontally to a random position inside `[padding, 1-padding]`.
///
/// Shapes wider than the allowed band are returned unshifted.
pub fn randomize_horizontal_placement(
    shape: &Shape,
    padding: f64,
    rng: &mut DeterministicRng,
) -> Shape {
    let (min_x, max_x) = shape.horizontal_bounds();
    let lowest_shift = padding - min_x;
    let highest_shift = (1.0 - padding) - max_x;

    if highest_shift < lowest_shift {
        return shape.clone();
    }

    let dx = rng.next_f64_range(lowest_shift, highest_shift);
    shape.translated(dx, 0.0)
}

// =============================================================================
// PER-SHAPE TESTS
// =============================================================================

#[inline]
fn triangle_area(p1: Point, p2: Point, p3: Point) -> f64 {
    ((p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y)) / 2.0).abs()
}

/// Area decomposition: the three sub-triangles around an inside point sum to
/// the full area.
fn point_in_triangle(point: Point, pts: &[Point; 3], tolerance: f64) -> bool {
    let [a, b, c] = *pts;
    let area_abc = triangle_area(a, b, c);
    let sum = triangle_area(point, b, c) + triangle_area(a, point, c) + triangle_area(a, b, point);

    let slack = area_abc * tolerance + TRIANGLE_AREA_EPSILON;
    (area_abc - sum).abs() <= slack
}

/// Even-odd ray cast towards +x over an implicitly closed ring.
fn ray_cast(point: Point, vertices: &[Point]) -> bool {
    let mut inside = false;
    let n = vertices.len();
    let mut j = n - 1;

    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];

        if (vi.y > point.y) != (vj.y > point.y) {
            let x_cross = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Ray-cast containment with each edge's vertical span widened by `tolerance`.
///
/// Widening is applied by probing the point at its own height and at
/// `+/- tolerance`, which keeps the even-odd parity consistent at shared
/// vertices.
fn point_in_polygon(point: Point, vertices: &[Point], tolerance: f64) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    if ray_cast(point, vertices) {
        return true;
    }
    if tolerance <= 0.0 {
        return false;
    }
    ray_cast(Point::new(point.x, point.y - tolerance), vertices)
        || ray_cast(Point::new(point.x, point.y + tolerance), vertices)
}

fn distance_to_polyline(point: Point, centerline: &[Point]) -> f64 {
    match centerline {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => centerline
            .windows(2)
            .map(|seg| point.distance_to_segment(seg[0], seg[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

// =============================================================================
// TESTS
// =============================================================================
