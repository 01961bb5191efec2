//! Normalized 2D Points and Body Keypoints
//!
//! All gameplay geometry lives in the camera's normalized frame:
//! `[0,1] x [0,1]`, origin top-left, x to the right, y downwards.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 2D coordinate in the normalized frame.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (0 = left edge, 1 = right edge)
    pub x: f64,
    /// Vertical position (0 = top edge, 1 = bottom edge)
    pub y: f64,
}

impl Point {
    /// Center of the frame
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Add another point component-wise.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtract another point component-wise.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Scale both components.
    #[inline]
    pub fn scale(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length (prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length (magnitude).
    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f64 {
        self.sub(other).length_squared()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation towards `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self.add(other.sub(self).scale(t))
    }

    /// Shortest distance from this point to the segment `a..b`.
    ///
    /// A degenerate segment (a == b) measures distance to `a`.
    pub fn distance_to_segment(self, a: Self, b: Self) -> f64 {
        let ab = b.sub(a);
        let len_sq = ab.length_squared();
        if len_sq <= f64::EPSILON {
            return self.distance(a);
        }
        let t = (self.sub(a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.distance(a.lerp(b, t))
    }

    /// Check that both components lie inside `[0,1]`.
    #[inline]
    pub fn is_normalized(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({:.4}, {:.4})", self.x, self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point::add(self, other)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point::sub(self, other)
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// Confidence-scored 2D body-part estimate from the tracker.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    /// Position in the normalized frame
    pub position: Point,
    /// Detection confidence in `[0,1]` (absent = 0)
    pub score: Option<f64>,
    /// Optional body-part name
    pub name: Option<String>,
}

impl Keypoint {
    /// Create a keypoint with a confidence score.
    pub fn new(x: f64, y: f64, score: f64) -> Self {
        Self {
            position: Point::new(x, y),
            score: Some(score),
            name: None,
        }
    }

    /// Attach a body-part name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Confidence, treating a missing score as zero.
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Fixed-index 3D skeleton joint with visibility.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Depth relative to the hips (smaller = closer to camera)
    pub z: f64,
    /// Visibility in `[0,1]` (absent = fully visible)
    pub visibility: Option<f64>,
}

impl Landmark {
    /// Create a fully visible landmark at depth 0.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0, visibility: Some(1.0) }
    }

    /// Create a landmark with explicit depth and visibility.
    #[inline]
    pub const fn with_visibility(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility: Some(visibility) }
    }

    /// Planar position.
    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Visibility, treating a missing value as fully visible.
    #[inline]
    pub fn visibility_or_full(&self) -> f64 {
        self.visibility.unwrap_or(1.0)
    }

    /// Convert to a keypoint, using visibility as confidence.
    pub fn to_keypoint(&self) -> Keypoint {
        Keypoint {
            position: self.point(),
            score: Some(self.visibility_or_full()),
            name: None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
