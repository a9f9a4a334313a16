#![deny(unused_must_use)]

pub mod clip;
pub mod cloud;
pub mod geometry;
pub mod las;
pub mod plot;
pub mod raster;
pub mod settings;
pub mod wkt;

pub use nalgebra;
