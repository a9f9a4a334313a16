use nalgebra::{vector, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::point::CloudPoint;
use crate::geometry::bounding_box::Aabb;

/// What is known about the las file a point cloud was read from.
/// It is used to write the points back with the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LasMetadata {
    pub version: (u8, u8),
    pub point_format: u8,
    pub scale: Vector3<f64>,
    pub offset: Vector3<f64>,
    pub system_identifier: String,
    pub generating_software: String,
    pub file_source_id: u16,
}

impl LasMetadata {
    /// Metadata for point clouds that did not come from a las file.
    ///
    /// Uses LAS 1.2, millimeter resolution and an offset at the (rounded down) minimum of the
    /// points. The point format is the smallest one that can store the attributes that are present.
    pub fn for_points(points: &[CloudPoint], bounds: &Aabb) -> Self {
        let has_gps_time = points.iter().any(|p| p.attributes.gps_time.is_some());
        let has_color = points.iter().any(|p| p.attributes.color.is_some());
        let point_format = match (has_gps_time, has_color) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        };
        let offset = if bounds.is_empty() {
            vector![0.0, 0.0, 0.0]
        } else {
            bounds.min.coords.map(f64::floor)
        };
        LasMetadata {
            version: (1, 2),
            point_format,
            scale: vector![0.001, 0.001, 0.001],
            offset,
            system_identifier: "LIDARFOR".to_string(),
            generating_software: "LIDARFOR".to_string(),
            file_source_id: 0,
        }
    }
}

/// Bookkeeping about a point cloud.
/// `bounds` and `count` always describe the points currently held by the cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudHeader {
    pub bounds: Aabb,
    pub count: usize,
    pub metadata: Option<LasMetadata>,
}

impl CloudHeader {
    pub fn new(metadata: Option<LasMetadata>) -> Self {
        CloudHeader {
            bounds: Aabb::empty(),
            count: 0,
            metadata,
        }
    }

    pub fn min(&self) -> Option<nalgebra::Point3<f64>> {
        if self.bounds.is_empty() {
            None
        } else {
            Some(self.bounds.min)
        }
    }

    pub fn max(&self) -> Option<nalgebra::Point3<f64>> {
        if self.bounds.is_empty() {
            None
        } else {
            Some(self.bounds.max)
        }
    }

    /// Recalculates bounds and point count.
    pub fn update_from(&mut self, points: &[CloudPoint]) {
        self.bounds = Aabb::from_points(points.iter().map(|p| p.position));
        self.count = points.len();
    }
}

impl Display for CloudHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of points: {}", self.count)?;
        match (self.min(), self.max()) {
            (Some(min), Some(max)) => {
                writeln!(f, "Minimum: ({:.3}, {:.3}, {:.3})", min.x, min.y, min.z)?;
                writeln!(f, "Maximum: ({:.3}, {:.3}, {:.3})", max.x, max.y, max.z)?;
            }
            _ => writeln!(f, "Bounds: (empty)")?,
        }
        match &self.metadata {
            Some(meta) => {
                writeln!(f, "LAS version: {}.{}", meta.version.0, meta.version.1)?;
                writeln!(f, "Point format: {}", meta.point_format)?;
                writeln!(
                    f,
                    "Scale: ({}, {}, {})",
                    meta.scale.x, meta.scale.y, meta.scale.z
                )?;
                writeln!(
                    f,
                    "Offset: ({}, {}, {})",
                    meta.offset.x, meta.offset.y, meta.offset.z
                )?;
                write!(f, "Generating software: {}", meta.generating_software)
            }
            None => write!(f, "LAS header: (none)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{point, vector};

    use super::{CloudHeader, LasMetadata};
    use crate::cloud::point::{CloudPoint, LasPointAttributes};

    #[test]
    fn update_from_points() {
        let mut header = CloudHeader::new(None);
        assert_eq!(header.min(), None);
        header.update_from(&[
            CloudPoint::new(1.0, 5.0, 2.0),
            CloudPoint::new(3.0, 4.0, -1.0),
        ]);
        assert_eq!(header.count, 2);
        assert_eq!(header.min(), Some(point![1.0, 4.0, -1.0]));
        assert_eq!(header.max(), Some(point![3.0, 5.0, 2.0]));

        header.update_from(&[]);
        assert_eq!(header.count, 0);
        assert_eq!(header.max(), None);
    }

    #[test]
    fn metadata_for_custom_points() {
        let points = vec![
            CloudPoint::new(10.5, 20.2, 3.7),
            CloudPoint::new(11.0, 21.0, 4.0).with_attributes(LasPointAttributes {
                gps_time: Some(1.0),
                ..Default::default()
            }),
        ];
        let mut header = CloudHeader::new(None);
        header.update_from(&points);
        let meta = LasMetadata::for_points(&points, &header.bounds);
        assert_eq!(meta.point_format, 1);
        assert_eq!(meta.version, (1, 2));
        assert_eq!(meta.offset, vector![10.0, 20.0, 3.0]);
    }
}
