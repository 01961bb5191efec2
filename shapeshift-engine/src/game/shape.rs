//! Target Outlines
//!
//! The wall cut-outs a player has to fit through. Every coordinate is in the
//! normalized camera frame. A shape is a value: moving it produces a new
//! shape and never changes its vertex count or kind.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::point::Point;
use crate::game::pose::Difficulty;

/// Errors raised when constructing a shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// Polygon with fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Curve band without any centerline point.
    #[error("curve band needs at least one centerline point")]
    EmptyCenterline,

    /// Radius, width, height or thickness that is not strictly positive.
    #[error("{0} must be positive")]
    NonPositiveExtent(&'static str),

    /// Coordinate outside the normalized frame.
    #[error("coordinate {0} lies outside the normalized frame")]
    OutOfFrame(Point),
}

/// Discriminant of [`Shape`], for logging and UI branching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Circle
    Circle,
    /// Axis-aligned rectangle
    Rect,
    /// Triangle
    Triangle,
    /// Arbitrary polygon
    Polygon,
    /// Thick polyline
    CurveBand,
}

/// A target outline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Disc around `center`.
    Circle {
        /// Center point
        center: Point,
        /// Radius in normalized units
        radius: f64,
    },
    /// Axis-aligned rectangle. The corner radius is cosmetic.
    Rect {
        /// Center point
        center: Point,
        /// Full width
        width: f64,
        /// Full height
        height: f64,
        /// Rounded-corner radius used only when drawing
        corner_radius: Option<f64>,
    },
    /// Triangle with exactly three vertices.
    Triangle {
        /// Vertices
        points: [Point; 3],
    },
    /// Polygon over ordered vertices. Containment always treats it as closed.
    Polygon {
        /// Ordered vertices (at least three)
        points: Vec<Point>,
        /// Whether the outline is drawn closed
        closed: bool,
    },
    /// Band of half-width `thickness` around a polyline.
    CurveBand {
        /// Ordered centerline points
        centerline: Vec<Point>,
        /// Half-thickness of the band
        thickness: f64,
    },
}

fn check_point(p: Point) -> Result<Point, ShapeError> {
    if p.is_normalized() {
        Ok(p)
    } else {
        Err(ShapeError::OutOfFrame(p))
    }
}

fn check_extent(value: f64, what: &'static str) -> Result<f64, ShapeError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ShapeError::NonPositiveExtent(what))
    }
}

impl Shape {
    /// Create a circle.
    pub fn circle(center: Point, radius: f64) -> Result<Self, ShapeError> {
        Ok(Shape::Circle {
            center: check_point(center)?,
            radius: check_extent(radius, "radius")?,
        })
    }

    /// Create an axis-aligned rectangle.
    pub fn rect(center: Point, width: f64, height: f64) -> Result<Self, ShapeError> {
        Ok(Shape::Rect {
            center: check_point(center)?,
            width: check_extent(width, "width")?,
            height: check_extent(height, "height")?,
            corner_radius: None,
        })
    }

    /// Create a rectangle with rounded corners.
    pub fn rounded_rect(
        center: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
    ) -> Result<Self, ShapeError> {
        let mut shape = Self::rect(center, width, height)?;
        if let Shape::Rect { corner_radius: cr, .. } = &mut shape {
            *cr = Some(corner_radius.max(0.0));
        }
        Ok(shape)
    }

    /// Create a triangle.
    pub fn triangle(a: Point, b: Point, c: Point) -> Result<Self, ShapeError> {
        Ok(Shape::Triangle {
            points: [check_point(a)?, check_point(b)?, check_point(c)?],
        })
    }

    /// Create a polygon from at least three ordered vertices.
    pub fn polygon(points: Vec<Point>, closed: bool) -> Result<Self, ShapeError> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewVertices(points.len()));
        }
        for p in &points {
            check_point(*p)?;
        }
        Ok(Shape::Polygon { points, closed })
    }

    /// Create a curve band around a centerline.
    pub fn curve_band(centerline: Vec<Point>, thickness: f64) -> Result<Self, ShapeError> {
        if centerline.is_empty() {
            return Err(ShapeError::EmptyCenterline);
        }
        for p in &centerline {
            check_point(*p)?;
        }
        Ok(Shape::CurveBand {
            centerline,
            thickness: check_extent(thickness, "thickness")?,
        })
    }

    /// Get the shape kind.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Rect { .. } => ShapeKind::Rect,
            Shape::Triangle { .. } => ShapeKind::Triangle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::CurveBand { .. } => ShapeKind::CurveBand,
        }
    }

    /// Return a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        let offset = Point::new(dx, dy);
        match self {
            Shape::Circle { center, radius } => Shape::Circle {
                center: *center + offset,
                radius: *radius,
            },
            Shape::Rect { center, width, height, corner_radius } => Shape::Rect {
                center: *center + offset,
                width: *width,
                height: *height,
                corner_radius: *corner_radius,
            },
            Shape::Triangle { points } => Shape::Triangle {
                points: points.map(|p| p + offset),
            },
            Shape::Polygon { points, closed } => Shape::Polygon {
                points: points.iter().map(|p| *p + offset).collect(),
                closed: *closed,
            },
            Shape::CurveBand { centerline, thickness } => Shape::CurveBand {
                centerline: centerline.iter().map(|p| *p + offset).collect(),
                thickness: *thickness,
            },
        }
    }

    /// Horizontal extent `(min_x, max_x)` of the filled region.
    pub fn horizontal_bounds(&self) -> (f64, f64) {
        match self {
            Shape::Circle { center, radius } => (center.x - radius, center.x + radius),
            Shape::Rect { center, width, .. } => {
                let half = width / 2.0;
                (center.x - half, center.x + half)
            }
            Shape::Triangle { points } => x_extent(points),
            Shape::Polygon { points, .. } => x_extent(points),
            Shape::CurveBand { centerline, thickness } => {
                let (min, max) = x_extent(centerline);
                (min - thickness, max + thickness)
            }
        }
    }

    /// Width of the horizontal extent.
    pub fn horizontal_span(&self) -> f64 {
        let (min, max) = self.horizontal_bounds();
        max - min
    }
}

fn x_extent(points: &[Point]) -> (f64, f64) {
    points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
        (min.min(p.x), max.max(p.x))
    })
}

// =============================================================================
// SHAPE CATALOG
// =============================================================================

/// A named outline in the shape catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeTemplate {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Difficulty tier the outline belongs to
    pub difficulty: Difficulty,
    /// Outline geometry
    pub shape: Shape,
}

impl ShapeTemplate {
    fn new(id: &str, name: &str, difficulty: Difficulty, shape: Shape) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            difficulty,
            shape,
        }
    }
}

/// Built-in outlines for shape mode.
pub fn default_shapes() -> Vec<ShapeTemplate> {
    let p = Point::new;
    let shapes: [(&str, &str, Difficulty, Result<Shape, ShapeError>); 7] = [
        (
            "triangle-wide",
            "Triangle",
            Difficulty::Easy,
            Shape::triangle(p(0.5, 0.38), p(0.18, 0.98), p(0.82, 0.98)),
        ),
        (
            "door-rect",
            "Tall Rectangle",
            Difficulty::Easy,
            Shape::rounded_rect(p(0.5, 0.68), 0.46, 0.6, 0.08),
        ),
        (
            "rectangle-thin",
            "Thin Rectangle (Tall)",
            Difficulty::Medium,
            Shape::rounded_rect(p(0.5, 0.63), 0.26, 0.7, 0.05),
        ),
        (
            "porthole",
            "Porthole",
            Difficulty::Medium,
            Shape::circle(p(0.5, 0.6), 0.38),
        ),
        (
            "arch",
            "Arch",
            Difficulty::Hard,
            Shape::polygon(
                vec![
                    p(0.3, 0.98),
                    p(0.3, 0.4),
                    p(0.4, 0.28),
                    p(0.6, 0.28),
                    p(0.7, 0.4),
                    p(0.7, 0.98),
                ],
                false,
            ),
        ),
        (
            "letter-y",
            "Letter Y",
            Difficulty::Hard,
            Shape::polygon(
                vec![
                    p(0.44, 0.98),
                    p(0.44, 0.5),
                    p(0.2, 0.1),
                    p(0.32, 0.05),
                    p(0.5, 0.38),
                    p(0.68, 0.05),
                    p(0.8, 0.1),
                    p(0.56, 0.5),
                    p(0.56, 0.98),
                ],
                false,
            ),
        ),
        (
            "lean",
            "Lean",
            Difficulty::Expert,
            Shape::curve_band(
                vec![p(0.58, 0.1), p(0.52, 0.4), p(0.44, 0.7), p(0.4, 0.98)],
                0.14,
            ),
        ),
    ];

    shapes
        .into_iter()
        .filter_map(|(id, name, difficulty, shape)| {
            shape.ok().map(|s| ShapeTemplate::new(id, name, difficulty, s))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_validation() {
        assert_eq!(
            Shape::polygon(vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)], true),
            Err(ShapeError::TooFewVertices(2))
        );
        assert_eq!(Shape::curve_band(vec![], 0.1), Err(ShapeError::EmptyCenterline));
        assert_eq!(
            Shape::circle(Point::CENTER, 0.0),
            Err(ShapeError::NonPositiveExtent("radius"))
        );
        assert!(matches!(
            Shape::rect(Point::new(1.5, 0.5), 0.1, 0.1),
            Err(ShapeError::OutOfFrame(_))
        ));
    }

    #[test]
    fn test_translation_preserves_topology() {
        let poly = Shape::polygon(
            vec![Point::new(0.2, 0.2), Point::new(0.4, 0.2), Point::new(0.3, 0.5)],
            true,
        )
        .unwrap();
        let moved = poly.translated(0.1, -0.05);

        assert_eq!(moved.kind(), ShapeKind::Polygon);
        match (&poly, &moved) {
            (Shape::Polygon { points: a, closed: ca }, Shape::Polygon { points: b, closed: cb }) => {
                assert_eq!(a.len(), b.len());
                assert_eq!(ca, cb);
                assert!((b[0].x - 0.3).abs() < 1e-12);
                assert!((b[0].y - 0.15).abs() < 1e-12);
            }
            _ => unreachable!(),
        }
        // Original untouched
        assert_eq!(poly.horizontal_bounds(), (0.2, 0.4));
    }

    #[test]
    fn test_horizontal_bounds() {
        let circle = Shape::circle(Point::new(0.5, 0.5), 0.2).unwrap();
        let (min, max) = circle.horizontal_bounds();
        assert!((min - 0.3).abs() < 1e-12 && (max - 0.7).abs() < 1e-12);

        let rect = Shape::rect(Point::new(0.4, 0.5), 0.2, 0.6).unwrap();
        let (min, max) = rect.horizontal_bounds();
        assert!((min - 0.3).abs() < 1e-12 && (max - 0.5).abs() < 1e-12);

        let band = Shape::curve_band(vec![Point::new(0.4, 0.1), Point::new(0.6, 0.9)], 0.05).unwrap();
        let (min, max) = band.horizontal_bounds();
        assert!((min - 0.35).abs() < 1e-12 && (max - 0.65).abs() < 1e-12);
        assert!((band.horizontal_span() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_default_catalog() {
        let shapes = default_shapes();
        assert_eq!(shapes.len(), 7);
        for difficulty in Difficulty::ALL {
            assert!(
                shapes.iter().any(|s| s.difficulty == difficulty),
                "catalog should cover {:?}",
                difficulty
            );
        }
        let door = shapes.iter().find(|s| s.id == "door-rect").unwrap();
        assert!(matches!(door.shape, Shape::Rect { corner_radius: Some(_), .. }));
    }
}
