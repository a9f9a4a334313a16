use nalgebra::{point, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// An axis aligned bounding box in world coordinates.
/// An Aabb can also be empty. An empty aabb is represented by
/// setting the minimum to f64::MAX and the maximum to f64::MIN.
#[derive(Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Constructs an empty bounding box.
    pub fn empty() -> Self {
        Aabb {
            min: point![f64::MAX, f64::MAX, f64::MAX],
            max: point![f64::MIN, f64::MIN, f64::MIN],
        }
    }

    /// Construct a new AABB with the given bounds.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Aabb { min, max }
    }

    /// Smallest bounding box containing all the given positions.
    pub fn from_points<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut aabb = Aabb::empty();
        for position in positions {
            aabb.extend(position);
        }
        aabb
    }

    /// Checks, if the bounding box is empty.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Checks, if the position is inside the footprint (x/y) of the box.
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        self.min.x <= x && self.min.y <= y && self.max.x >= x && self.max.y >= y
    }

    /// Grow the bounding box, so that it contains the given position.
    pub fn extend(&mut self, position: Point3<f64>) {
        if self.min.x > position.x {
            self.min.x = position.x;
        }
        if self.min.y > position.y {
            self.min.y = position.y;
        }
        if self.min.z > position.z {
            self.min.z = position.z;
        }
        if self.max.x < position.x {
            self.max.x = position.x;
        }
        if self.max.y < position.y {
            self.max.y = position.y;
        }
        if self.max.z < position.z {
            self.max.z = position.z;
        }
    }

    /// Grow the bounding box, so that it contains the other aabb.
    pub fn extend_aabb(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.extend(other.min);
        self.extend(other.max);
    }

    /// Side lengths of the box. Zero for empty boxes.
    pub fn extent(&self) -> Vector3<f64> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Checks if the footprints (x/y) of the two bounding boxes overlap.
    pub fn intersects_xy(&self, other: Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.max.x >= other.min.x
            && self.max.y >= other.min.y
            && self.min.x <= other.max.x
            && self.min.y <= other.max.y
    }

    /// Checks if the footprint (x/y) of `other` is fully inside the footprint of this box.
    pub fn contains_xy_aabb(&self, other: Self) -> bool {
        if other.is_empty() {
            return true;
        }
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for Aabb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "Aabb (empty)")
        } else {
            write!(
                f,
                "Aabb ({:?},{:?},{:?} - {:?},{:?},{:?})",
                self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{point, vector};

    use crate::geometry::bounding_box::Aabb;

    #[test]
    fn is_empty() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());

        let aabb = Aabb::new(point![2.0, 4.0, 1.0], point![4.0, 5.0, 2.0]);
        assert!(!aabb.is_empty());
    }

    #[test]
    fn from_points() {
        let aabb = Aabb::from_points([point![1.0, 2.0, 3.0], point![3.0, 2.0, 1.0]]);
        assert_eq!(aabb.min, point![1.0, 2.0, 1.0]);
        assert_eq!(aabb.max, point![3.0, 2.0, 3.0]);
        assert!(Aabb::from_points(Vec::new()).is_empty());
    }

    #[test]
    fn extend_union() {
        let mut aabb = Aabb::new(point![2.0, 4.0, 1.0], point![4.0, 5.0, 2.0]);
        let other = Aabb::new(point![2.0, 2.0, 2.0], point![3.0, 5.0, 3.0]);
        aabb.extend_aabb(&other);
        assert_eq!(aabb.min, point![2.0, 2.0, 1.0]);
        assert_eq!(aabb.max, point![4.0, 5.0, 3.0]);

        aabb.extend_aabb(&Aabb::empty());
        assert_eq!(aabb.max, point![4.0, 5.0, 3.0]);
    }

    #[test]
    fn intersects() {
        let aabb = Aabb::new(point![2.0, 4.0, 1.0], point![4.0, 5.0, 2.0]);
        let other1 = Aabb::new(point![4.5, 5.5, 2.5], point![5.0, 6.0, 6.0]);
        let other2 = Aabb::new(point![4.0, 5.0, 20.0], point![5.0, 6.0, 30.0]);
        assert!(!aabb.intersects_xy(other1));
        assert!(aabb.intersects_xy(other2));
        assert!(other2.intersects_xy(aabb));
        assert!(!aabb.intersects_xy(Aabb::empty()));
        assert!(aabb.contains_xy(3.0, 4.5));
        assert!(!aabb.contains_xy(4.5, 4.5));
    }

    #[test]
    fn contains_footprint() {
        let aabb = Aabb::new(point![0.0, 0.0, 0.0], point![10.0, 10.0, 1.0]);
        let inner = Aabb::new(point![1.0, 1.0, -5.0], point![9.0, 9.0, 5.0]);
        let outer = Aabb::new(point![-1.0, 1.0, 0.0], point![9.0, 9.0, 0.0]);
        assert!(aabb.contains_xy_aabb(inner));
        assert!(!aabb.contains_xy_aabb(outer));
    }

    #[test]
    fn extent() {
        let aabb = Aabb::new(point![2.0, 4.0, 1.0], point![4.0, 5.0, 2.0]);
        assert_eq!(aabb.extent(), vector![2.0, 1.0, 1.0]);
        assert_eq!(Aabb::empty().extent(), vector![0.0, 0.0, 0.0]);
    }
}
