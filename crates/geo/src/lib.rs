pub mod crs;
pub mod model;
pub mod service;
pub mod slope;
pub mod soil;

pub use crs::*;
pub use model::*;
pub use service::*;
pub use slope::*;
pub use soil::*;
