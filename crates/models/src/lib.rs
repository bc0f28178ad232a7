pub mod config;
pub mod error;
pub mod geodata;
pub mod image;

pub use config::*;
pub use error::*;
pub use geodata::*;
pub use image::*;
