pub mod cache;
pub mod context;
pub mod dockerfile;
pub mod image_builder;
pub mod service;
pub mod verify;

pub use cache::*;
pub use context::*;
pub use dockerfile::*;
pub use image_builder::*;
pub use service::*;
pub use verify::*;
