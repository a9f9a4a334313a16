use crate::cloud::point::CloudPoint;
use crate::geometry::bounding_box::Aabb;
use crate::geometry::circle::Circle;
use crate::geometry::polygon::MultiPolygon;
use crate::wkt::{self, WktError};
use nalgebra::point;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A region in the x/y plane to cut points out of a cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipGeometry {
    BoundingBox {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    Polygon(MultiPolygon),
    Circle(Circle),
}

#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Expected {expected} comma separated numbers after '{kind}:', got '{got}'.")]
    Arguments {
        kind: &'static str,
        expected: usize,
        got: String,
    },

    #[error("The bounding box is inverted: minimum ({min_x}, {min_y}) > maximum ({max_x}, {max_y}).")]
    InvertedBoundingBox {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("The circle radius must not be negative. (got: {0})")]
    NegativeRadius(f64),

    #[error(transparent)]
    Wkt(#[from] WktError),
}

impl ClipGeometry {
    /// The area covered by the geometry. The z range is unbounded.
    pub fn bounds(&self) -> Aabb {
        match self {
            ClipGeometry::BoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            } => Aabb::new(
                point![*min_x, *min_y, f64::MIN],
                point![*max_x, *max_y, f64::MAX],
            ),
            ClipGeometry::Polygon(polygons) => polygons.bounds(),
            ClipGeometry::Circle(circle) => circle.bounds(),
        }
    }

    /// One flag per point, true for the points inside the geometry.
    pub fn mask(&self, points: &[CloudPoint]) -> Vec<bool> {
        match self {
            ClipGeometry::BoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            } => square_clip(points, *min_x, *min_y, *max_x, *max_y),
            ClipGeometry::Polygon(polygons) => poly_clip(points, polygons),
            ClipGeometry::Circle(circle) => circle_clip(points, circle),
        }
    }
}

/// Points inside the rectangle. The bounds are inclusive.
pub fn square_clip(
    points: &[CloudPoint],
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
) -> Vec<bool> {
    points
        .iter()
        .map(|p| {
            let (x, y) = (p.position.x, p.position.y);
            x >= min_x && x <= max_x && y >= min_y && y <= max_y
        })
        .collect()
}

/// Points inside any of the polygons.
///
/// Only the points within the bounding box of the polygons are ray cast.
pub fn poly_clip(points: &[CloudPoint], polygons: &MultiPolygon) -> Vec<bool> {
    let envelope = polygons.bounds();
    if envelope.is_empty() {
        return vec![false; points.len()];
    }
    points
        .iter()
        .map(|p| {
            let (x, y) = (p.position.x, p.position.y);
            envelope.contains_xy(x, y) && polygons.contains(x, y)
        })
        .collect()
}

/// Points within the circle, including the ones exactly on the circle line.
pub fn circle_clip(points: &[CloudPoint], circle: &Circle) -> Vec<bool> {
    points
        .iter()
        .map(|p| circle.contains(p.position.x, p.position.y))
        .collect()
}

fn parse_numbers<const N: usize>(kind: &'static str, args: &str) -> Result<[f64; N], ClipError> {
    let error = || ClipError::Arguments {
        kind,
        expected: N,
        got: args.to_string(),
    };
    let numbers = args
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| error())?;
    numbers.try_into().map_err(|_| error())
}

impl FromStr for ClipGeometry {
    type Err = ClipError;

    /// Accepts `bbox:min_x,min_y,max_x,max_y`, `circle:x,y,radius` or a WKT (multi)polygon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(args) = strip_prefix_ignore_case(s, "bbox:") {
            let [min_x, min_y, max_x, max_y] = parse_numbers::<4>("bbox", args)?;
            if min_x > max_x || min_y > max_y {
                return Err(ClipError::InvertedBoundingBox {
                    min_x,
                    min_y,
                    max_x,
                    max_y,
                });
            }
            Ok(ClipGeometry::BoundingBox {
                min_x,
                min_y,
                max_x,
                max_y,
            })
        } else if let Some(args) = strip_prefix_ignore_case(s, "circle:") {
            let [x, y, radius] = parse_numbers::<3>("circle", args)?;
            if radius < 0.0 {
                return Err(ClipError::NegativeRadius(radius));
            }
            Ok(ClipGeometry::Circle(Circle::new(x, y, radius)))
        } else {
            Ok(ClipGeometry::Polygon(wkt::parse_geometry(s)?))
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{circle_clip, poly_clip, square_clip, ClipError, ClipGeometry};
    use crate::cloud::point::CloudPoint;
    use crate::geometry::circle::Circle;
    use crate::geometry::polygon::{MultiPolygon, Polygon};
    use nalgebra::point;

    fn points(coords: &[(f64, f64)]) -> Vec<CloudPoint> {
        coords
            .iter()
            .map(|&(x, y)| CloudPoint::new(x, y, 0.0))
            .collect()
    }

    #[test]
    fn square_bounds_are_inclusive() {
        let pts = points(&[(0.0, 0.0), (1.0, 1.0), (1.0001, 0.5), (0.5, -0.1), (0.5, 0.5)]);
        assert_eq!(
            square_clip(&pts, 0.0, 0.0, 1.0, 1.0),
            vec![true, true, false, false, true]
        );
    }

    #[test]
    fn polygon_clip() {
        // L shaped polygon. (1.5, 1.5) is inside the envelope, but outside the polygon.
        let polygon = MultiPolygon::from(Polygon::new(
            vec![
                point![0.0, 0.0],
                point![2.0, 0.0],
                point![2.0, 1.0],
                point![1.0, 1.0],
                point![1.0, 2.0],
                point![0.0, 2.0],
            ],
            vec![],
        ));
        let pts = points(&[(0.5, 0.5), (1.5, 0.5), (0.5, 1.5), (1.5, 1.5), (3.0, 3.0)]);
        assert_eq!(
            poly_clip(&pts, &polygon),
            vec![true, true, true, false, false]
        );
        assert_eq!(
            poly_clip(&pts, &MultiPolygon::default()),
            vec![false; 5]
        );
    }

    #[test]
    fn circle_clip_includes_edge() {
        let pts = points(&[(0.0, 0.0), (3.0, 4.0), (3.0, 4.1)]);
        assert_eq!(
            circle_clip(&pts, &Circle::new(0.0, 0.0, 5.0)),
            vec![true, true, false]
        );
    }

    #[test]
    fn parse_geometries() {
        assert_eq!(
            "bbox:1,2,3,4".parse::<ClipGeometry>().unwrap(),
            ClipGeometry::BoundingBox {
                min_x: 1.0,
                min_y: 2.0,
                max_x: 3.0,
                max_y: 4.0
            }
        );
        assert_eq!(
            " Circle: 10.5, -3, 2 ".parse::<ClipGeometry>().unwrap(),
            ClipGeometry::Circle(Circle::new(10.5, -3.0, 2.0))
        );
        let polygon = "POLYGON ((0 0, 1 0, 1 1, 0 0))"
            .parse::<ClipGeometry>()
            .unwrap();
        assert!(matches!(polygon, ClipGeometry::Polygon(_)));
        assert_eq!(polygon.bounds().max.x, 1.0);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            "bbox:1,2,3".parse::<ClipGeometry>(),
            Err(ClipError::Arguments { expected: 4, .. })
        ));
        assert!(matches!(
            "bbox:3,2,1,4".parse::<ClipGeometry>(),
            Err(ClipError::InvertedBoundingBox { .. })
        ));
        assert!(matches!(
            "circle:0,0,-1".parse::<ClipGeometry>(),
            Err(ClipError::NegativeRadius(_))
        ));
        assert!(matches!(
            "circle:a,b,c".parse::<ClipGeometry>(),
            Err(ClipError::Arguments { .. })
        ));
        assert!(matches!(
            "LINESTRING (0 0, 1 1)".parse::<ClipGeometry>(),
            Err(ClipError::Wkt(_))
        ));
    }
}
