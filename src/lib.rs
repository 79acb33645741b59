mod error;
mod mosaic;
mod palette;
mod quantizer;
mod sixel_encoder;

pub use error::{Error, Result};
pub use mosaic::{load_image, scale_down, scale_up, Mosaic, WorkingSize};
pub use palette::{Palette, RgbColor};
pub use quantizer::{distance, nearest, nearest_index, quantize, quantize_par};
pub use sixel_encoder::SixelEncoder;
