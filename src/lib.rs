//! Raster annotation surface: freehand ink and line/rectangle/ellipse shapes
//! drawn over an optional background image, flattened to a bitmap or JPEG.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod surface;

pub use config::SurfaceConfig;
pub use error::{ConfigError, SurfaceError, SurfaceResult};
pub use model::{BackgroundImage, Color4, DrawingMode, Element, InkStroke, Shape, StrokeStyle};
pub use surface::Surface;
