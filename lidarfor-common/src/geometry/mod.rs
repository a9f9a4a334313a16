pub mod bounding_box;
pub mod circle;
pub mod polygon;
