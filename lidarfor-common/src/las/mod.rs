use crate::cloud::header::{CloudHeader, LasMetadata};
use crate::cloud::point::{CloudPoint, LasPointAttributes};
use crate::cloud::CloudData;
use las::point::{Classification, Format, ScanDirection};
use las::{Builder, Color, Read, Reader, Transform, Vector, Write, Writer};
use log::{debug, info};
use nalgebra::{vector, Point3};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LasError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Bad LAS file: {desc}")]
    FileFormat { desc: String },
}

impl From<las::Error> for LasError {
    fn from(e: las::Error) -> Self {
        match e {
            las::Error::Io(io) => LasError::Io(io),
            _ => LasError::FileFormat {
                desc: format!("{}", e),
            },
        }
    }
}

/// Checks if the file extension is `.laz` (case insensitive).
pub fn path_is_compressed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("laz"))
        .unwrap_or(false)
}

/// Reads all points of a las or laz file into memory.
pub fn read_cloud_data(path: &Path) -> Result<CloudData, LasError> {
    let mut reader = Reader::from_path(path)?;
    let metadata = metadata_from_header(reader.header())?;
    debug!(
        "Reading {} points (point format {}) from {}",
        reader.header().number_of_points(),
        metadata.point_format,
        path.display()
    );

    let mut points = Vec::with_capacity(reader.header().number_of_points() as usize);
    for point in reader.points() {
        points.push(from_las_point(point?));
    }

    Ok(CloudData::new(points, CloudHeader::new(Some(metadata))))
}

/// Writes the points to a las file, or a laz file if the file name ends with `.laz`.
///
/// If the cloud does not carry metadata from a las file, a las 1.2 header is made up
/// from the points themselves.
pub fn write_cloud_data(cloud: &CloudData, path: &Path) -> Result<(), LasError> {
    let metadata = match &cloud.header.metadata {
        Some(m) => m.clone(),
        None => LasMetadata::for_points(&cloud.points, &cloud.header.bounds),
    };
    let header = header_from_metadata(&metadata, path_is_compressed(path))?;
    let format = *header.point_format();

    let mut writer = Writer::from_path(path, header)?;
    for point in &cloud.points {
        writer.write(to_las_point(point, &format)?)?;
    }
    writer.close()?;
    info!("Wrote {} points to {}", cloud.points.len(), path.display());
    Ok(())
}

fn metadata_from_header(header: &las::Header) -> Result<LasMetadata, LasError> {
    let version = header.version();
    let transforms = header.transforms();
    Ok(LasMetadata {
        version: (version.major, version.minor),
        point_format: header.point_format().to_u8()?,
        scale: vector![transforms.x.scale, transforms.y.scale, transforms.z.scale],
        offset: vector![transforms.x.offset, transforms.y.offset, transforms.z.offset],
        system_identifier: header.system_identifier().to_string(),
        generating_software: header.generating_software().to_string(),
        file_source_id: header.file_source_id(),
    })
}

/// Point formats with waveform packets are written without them,
/// since waveform data is not kept in memory.
fn writable_point_format(point_format: u8) -> u8 {
    match point_format {
        4 => 1,
        5 => 3,
        9 => 6,
        10 => 7,
        other => other,
    }
}

fn header_from_metadata(metadata: &LasMetadata, compress: bool) -> Result<las::Header, LasError> {
    let mut builder = Builder::from(metadata.version);
    let mut format = Format::new(writable_point_format(metadata.point_format))?;
    format.is_compressed = compress;
    builder.point_format = format;
    builder.transforms = Vector {
        x: Transform {
            scale: metadata.scale.x,
            offset: metadata.offset.x,
        },
        y: Transform {
            scale: metadata.scale.y,
            offset: metadata.offset.y,
        },
        z: Transform {
            scale: metadata.scale.z,
            offset: metadata.offset.z,
        },
    };
    builder.system_identifier = metadata.system_identifier.clone();
    builder.generating_software = metadata.generating_software.clone();
    builder.file_source_id = metadata.file_source_id;
    Ok(builder.into_header()?)
}

fn from_las_point(point: las::Point) -> CloudPoint {
    CloudPoint {
        position: Point3::new(point.x, point.y, point.z),
        attributes: LasPointAttributes {
            intensity: point.intensity,
            return_number: point.return_number,
            number_of_returns: point.number_of_returns,
            scan_direction: point.scan_direction == ScanDirection::LeftToRight,
            edge_of_flight_line: point.is_edge_of_flight_line,
            classification: u8::from(point.classification),
            is_synthetic: point.is_synthetic,
            is_key_point: point.is_key_point,
            is_withheld: point.is_withheld,
            is_overlap: point.is_overlap,
            scanner_channel: point.scanner_channel,
            scan_angle: point.scan_angle,
            user_data: point.user_data,
            point_source_id: point.point_source_id,
            gps_time: point.gps_time,
            color: point.color.map(|c| (c.red, c.green, c.blue)),
        },
    }
}

fn to_las_point(point: &CloudPoint, format: &Format) -> Result<las::Point, LasError> {
    let attributes = &point.attributes;
    let scan_direction = if attributes.scan_direction {
        ScanDirection::LeftToRight
    } else {
        ScanDirection::RightToLeft
    };

    // the writer refuses points, whose optional attributes do not match the point format.
    let gps_time = if format.has_gps_time {
        Some(attributes.gps_time.unwrap_or(0.0))
    } else {
        None
    };
    let color = if format.has_color {
        let (r, g, b) = attributes.color.unwrap_or((0, 0, 0));
        Some(Color::new(r, g, b))
    } else {
        None
    };
    let nir = if format.has_nir { Some(0) } else { None };

    // overlap and scanner channel only exist in the extended formats,
    // which also store the scan angle in fractions of a degree.
    let (is_overlap, scanner_channel, scan_angle) = if format.is_extended {
        (
            attributes.is_overlap,
            attributes.scanner_channel,
            attributes.scan_angle,
        )
    } else {
        (false, 0, point.scan_angle_rank() as f32)
    };

    Ok(las::Point {
        x: point.position.x,
        y: point.position.y,
        z: point.position.z,
        intensity: attributes.intensity,
        return_number: attributes.return_number,
        number_of_returns: attributes.number_of_returns,
        scan_direction,
        is_edge_of_flight_line: attributes.edge_of_flight_line,
        classification: Classification::new(attributes.classification)?,
        is_synthetic: attributes.is_synthetic,
        is_key_point: attributes.is_key_point,
        is_withheld: attributes.is_withheld,
        is_overlap,
        scanner_channel,
        scan_angle,
        user_data: attributes.user_data,
        point_source_id: attributes.point_source_id,
        gps_time,
        color,
        nir,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::{path_is_compressed, read_cloud_data, write_cloud_data};
    use crate::cloud::header::{CloudHeader, LasMetadata};
    use crate::cloud::point::{CloudPoint, LasPointAttributes};
    use crate::cloud::CloudData;
    use nalgebra::{point, vector};
    use std::path::Path;

    fn sample_points() -> Vec<CloudPoint> {
        (0..20)
            .map(|i| {
                let f = i as f64;
                CloudPoint::new(100.0 + f, 200.0 + f * 0.5, 10.0 + f * 0.25).with_attributes(
                    LasPointAttributes {
                        intensity: 10 * i as u16,
                        return_number: 1,
                        number_of_returns: 2,
                        scan_direction: i % 2 == 0,
                        classification: if i < 10 { 2 } else { 5 },
                        scan_angle: -5.0,
                        user_data: 7,
                        point_source_id: 3,
                        gps_time: Some(1000.0 + f),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn compressed_extension() {
        assert!(path_is_compressed(Path::new("a/b.laz")));
        assert!(path_is_compressed(Path::new("B.LAZ")));
        assert!(!path_is_compressed(Path::new("b.las")));
        assert!(!path_is_compressed(Path::new("b")));
    }

    #[test]
    fn write_then_read_las() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.las");
        let data = CloudData::new(sample_points(), CloudHeader::new(None));
        write_cloud_data(&data, &path).unwrap();

        let read = read_cloud_data(&path).unwrap();
        assert_eq!(read.header.count, 20);
        assert_eq!(read.header.bounds.min, point![100.0, 200.0, 10.0]);
        assert_eq!(read.header.bounds.max, point![119.0, 209.5, 14.75]);
        let meta = read.header.metadata.as_ref().unwrap();
        assert_eq!(meta.point_format, 1);
        assert_eq!(meta.version, (1, 2));

        let p = &read.points[13];
        assert_eq!(p.attributes.intensity, 130);
        assert_eq!(p.attributes.classification, 5);
        assert_eq!(p.attributes.number_of_returns, 2);
        assert_eq!(p.scan_angle_rank(), -5);
        assert_eq!(p.attributes.gps_time, Some(1013.0));
        assert!(!p.attributes.scan_direction);
        assert!(read.points[12].attributes.scan_direction);
    }

    #[test]
    fn write_then_read_laz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.laz");
        let data = CloudData::new(sample_points(), CloudHeader::new(None));
        write_cloud_data(&data, &path).unwrap();

        let read = read_cloud_data(&path).unwrap();
        assert_eq!(read.points.len(), 20);
        assert_eq!(read.points[4].position, point![104.0, 202.0, 11.0]);
    }

    #[test]
    fn extended_format_keeps_attributes() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = LasMetadata {
            version: (1, 4),
            point_format: 6,
            scale: vector![0.001, 0.001, 0.001],
            offset: vector![0.0, 0.0, 0.0],
            system_identifier: "TEST".to_string(),
            generating_software: "TEST".to_string(),
            file_source_id: 0,
        };
        let point = CloudPoint::new(1.0, 2.0, 3.0).with_attributes(LasPointAttributes {
            return_number: 1,
            number_of_returns: 1,
            classification: 2,
            is_withheld: true,
            is_synthetic: true,
            is_key_point: true,
            is_overlap: true,
            scanner_channel: 2,
            scan_angle: 12.3,
            gps_time: Some(5.0),
            ..Default::default()
        });
        let data = CloudData::new(vec![point], CloudHeader::new(Some(metadata)));

        // written twice, to make sure nothing gets lost after reading
        let first = dir.path().join("first.las");
        write_cloud_data(&data, &first).unwrap();
        let read = read_cloud_data(&first).unwrap();
        let second = dir.path().join("second.las");
        write_cloud_data(&read, &second).unwrap();
        let reread = read_cloud_data(&second).unwrap();

        assert_eq!(reread.header.metadata.as_ref().unwrap().point_format, 6);
        assert_eq!(reread.points[0].position, read.points[0].position);
        let attributes = &reread.points[0].attributes;
        assert!((attributes.scan_angle - 12.3).abs() < 0.01);
        assert!(attributes.is_withheld);
        assert!(attributes.is_synthetic);
        assert!(attributes.is_key_point);
        assert!(attributes.is_overlap);
        assert_eq!(attributes.scanner_channel, 2);
        assert_eq!(reread.points[0].scan_angle_rank(), 12);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_cloud_data(&dir.path().join("nope.las")).is_err());
    }
}
