use nalgebra::{point, Point2};
use serde::{Deserialize, Serialize};

use super::bounding_box::Aabb;

/// A closed ring of vertices in the x/y plane.
/// Whether the last vertex repeats the first one does not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring(pub Vec<Point2<f64>>);

/// A polygon with an exterior ring and any number of holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultiPolygon(pub Vec<Polygon>);

impl Ring {
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.0
    }

    /// Even-odd ray casting test.
    ///
    /// A horizontal ray is cast from the query point towards +x, every edge it
    /// crosses toggles the result.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let vertices = self.vertices();
        let n = vertices.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut p1 = vertices[0];
        for i in 1..=n {
            let p2 = vertices[i % n];
            if y > p1.y.min(p2.y) && y <= p1.y.max(p2.y) && x <= p1.x.max(p2.x) {
                // the y range check above already excludes horizontal edges
                let x_intercept = (y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y) + p1.x;
                if p1.x == p2.x || x <= x_intercept {
                    inside = !inside;
                }
            }
            p1 = p2;
        }
        inside
    }
}

impl Polygon {
    pub fn new(exterior: Vec<Point2<f64>>, interiors: Vec<Vec<Point2<f64>>>) -> Self {
        Polygon {
            exterior: Ring(exterior),
            interiors: interiors.into_iter().map(Ring).collect(),
        }
    }

    /// Checks, if the point is inside the exterior ring and outside of all holes.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.exterior.contains(x, y) && !self.interiors.iter().any(|hole| hole.contains(x, y))
    }

    /// The envelope of the exterior ring. The z range is unbounded.
    pub fn bounds(&self) -> Aabb {
        envelope(self.exterior.vertices())
    }
}

impl MultiPolygon {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.0.iter().any(|polygon| polygon.contains(x, y))
    }

    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for polygon in &self.0 {
            aabb.extend_aabb(&polygon.bounds());
        }
        aabb
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        MultiPolygon(vec![polygon])
    }
}

fn envelope(vertices: &[Point2<f64>]) -> Aabb {
    let mut aabb = Aabb::empty();
    for v in vertices {
        aabb.extend(point![v.x, v.y, f64::MIN]);
        aabb.extend(point![v.x, v.y, f64::MAX]);
    }
    aabb
}
