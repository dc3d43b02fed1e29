mod surface;

pub use surface::{PixelBuffer, PixelFormat, Surface, SurfaceSink};
