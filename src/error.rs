use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Palette is empty, repeats a label or has a channel outside 0..=255
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Pixel grid with a zero dimension
    #[error("empty pixel grid: {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
