use nalgebra::{point, Point2};
use serde::{Deserialize, Serialize};

use super::bounding_box::Aabb;

/// A circle in the x/y plane.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Circle {
            center: point![x, y],
            radius,
        }
    }

    /// Points exactly on the circle line are inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.center.x;
        let dy = y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Bounding square of the circle. The z range is unbounded.
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            point![
                self.center.x - self.radius,
                self.center.y - self.radius,
                f64::MIN
            ],
            point![
                self.center.x + self.radius,
                self.center.y + self.radius,
                f64::MAX
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Circle;

    #[test]
    fn contains() {
        let c = Circle::new(10.0, 10.0, 5.0);
        assert!(c.contains(10.0, 10.0));
        assert!(c.contains(15.0, 10.0));
        assert!(c.contains(13.0, 14.0));
        assert!(!c.contains(14.0, 14.0));
        assert!(!c.contains(4.9, 10.0));
    }

    #[test]
    fn bounds() {
        let c = Circle::new(1.0, 2.0, 3.0);
        let b = c.bounds();
        assert_eq!((b.min.x, b.min.y, b.max.x, b.max.y), (-2.0, -1.0, 4.0, 5.0));
    }
}
