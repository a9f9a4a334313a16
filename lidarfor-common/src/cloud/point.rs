use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// The per point attributes of a LAS point record, for both the legacy (0-5)
/// and the extended (6-10) point formats.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LasPointAttributes {
    pub intensity: u16,
    pub return_number: u8,
    pub number_of_returns: u8,
    pub scan_direction: bool,
    pub edge_of_flight_line: bool,
    pub classification: u8,
    pub is_synthetic: bool,
    pub is_key_point: bool,
    pub is_withheld: bool,
    /// Only stored by the extended point formats.
    pub is_overlap: bool,
    /// Only stored by the extended point formats.
    pub scanner_channel: u8,
    /// Scan angle in degrees. Legacy formats store it rounded to a whole degree.
    pub scan_angle: f32,
    pub user_data: u8,
    pub point_source_id: u16,
    pub gps_time: Option<f64>,
    pub color: Option<(u16, u16, u16)>,
}

/// A single point of a [super::CloudData]: world position plus las attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudPoint {
    pub position: Point3<f64>,
    pub attributes: LasPointAttributes,
}

impl CloudPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        CloudPoint {
            position: Point3::new(x, y, z),
            attributes: Default::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: LasPointAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The scan angle rounded to a whole degree, as legacy point formats store it.
    pub fn scan_angle_rank(&self) -> i8 {
        self.attributes.scan_angle.round().clamp(-128.0, 127.0) as i8
    }

    /// Reads the given dimension as a float.
    /// Returns NaN for optional attributes, that this point does not have.
    pub fn get(&self, dimension: Dimension) -> f64 {
        let a = &self.attributes;
        match dimension {
            Dimension::X => self.position.x,
            Dimension::Y => self.position.y,
            Dimension::Z => self.position.z,
            Dimension::Intensity => a.intensity as f64,
            Dimension::ReturnNumber => a.return_number as f64,
            Dimension::NumberOfReturns => a.number_of_returns as f64,
            Dimension::Classification => a.classification as f64,
            Dimension::ScanAngleRank => self.scan_angle_rank() as f64,
            Dimension::UserData => a.user_data as f64,
            Dimension::PointSourceId => a.point_source_id as f64,
            Dimension::GpsTime => a.gps_time.unwrap_or(f64::NAN),
        }
    }
}

/// A numeric column of the point table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    X,
    Y,
    Z,
    Intensity,
    ReturnNumber,
    NumberOfReturns,
    Classification,
    ScanAngleRank,
    UserData,
    PointSourceId,
    GpsTime,
}

impl Dimension {
    pub const ALL: [Dimension; 11] = [
        Dimension::X,
        Dimension::Y,
        Dimension::Z,
        Dimension::Intensity,
        Dimension::ReturnNumber,
        Dimension::NumberOfReturns,
        Dimension::Classification,
        Dimension::ScanAngleRank,
        Dimension::UserData,
        Dimension::PointSourceId,
        Dimension::GpsTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::X => "x",
            Dimension::Y => "y",
            Dimension::Z => "z",
            Dimension::Intensity => "intensity",
            Dimension::ReturnNumber => "return_number",
            Dimension::NumberOfReturns => "number_of_returns",
            Dimension::Classification => "classification",
            Dimension::ScanAngleRank => "scan_angle_rank",
            Dimension::UserData => "user_data",
            Dimension::PointSourceId => "pt_src_id",
            Dimension::GpsTime => "gps_time",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown dimension '{0}'. Valid values are: x, y, z, intensity, return_number, number_of_returns, classification, scan_angle_rank, user_data, pt_src_id, gps_time")]
pub struct UnknownDimensionError(String);

impl FromStr for Dimension {
    type Err = UnknownDimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "point_source_id" => return Ok(Dimension::PointSourceId),
            "gpstime" => return Ok(Dimension::GpsTime),
            _ => {}
        }
        Dimension::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| UnknownDimensionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CloudPoint, Dimension, LasPointAttributes};

    #[test]
    fn dimension_access() {
        let point = CloudPoint::new(1.0, 2.0, 3.0).with_attributes(LasPointAttributes {
            intensity: 400,
            classification: 2,
            scan_angle: -12.4,
            ..Default::default()
        });
        assert_eq!(point.get(Dimension::Z), 3.0);
        assert_eq!(point.get(Dimension::Intensity), 400.0);
        assert_eq!(point.get(Dimension::Classification), 2.0);
        assert_eq!(point.get(Dimension::ScanAngleRank), -12.0);
        assert!(point.get(Dimension::GpsTime).is_nan());
    }

    #[test]
    fn dimension_names() {
        for d in Dimension::ALL {
            assert_eq!(d.name().parse::<Dimension>().unwrap(), d);
        }
        assert_eq!("Z".parse::<Dimension>().unwrap(), Dimension::Z);
        assert_eq!(
            "point_source_id".parse::<Dimension>().unwrap(),
            Dimension::PointSourceId
        );
        assert!("foo".parse::<Dimension>().is_err());
    }
}
