use crate::error::Result;
use crate::palette::Palette;
use crate::quantizer::{quantize, quantize_par};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbImage};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Resolution the palette mapping runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkingSize {
    Exact { width: u32, height: u32 },
    /// Each side divided by the factor, never below one pixel.
    Scale(u32),
}

impl Default for WorkingSize {
    fn default() -> Self {
        Self::Exact {
            width: 800,
            height: 1000,
        }
    }
}

impl WorkingSize {
    pub fn dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Self::Exact { width, height } => (width, height),
            Self::Scale(factor) => {
                let factor = factor.max(1);
                ((width / factor).max(1), (height / factor).max(1))
            }
        }
    }
}

pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.decode()?)
}

/// Bilinear shrink, smooths the source before palette mapping.
pub fn scale_down(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Nearest-neighbour enlarge, keeps the flat tile regions crisp.
pub fn scale_up(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(img, width, height, FilterType::Nearest)
}

#[derive(Debug, Clone, Default)]
pub struct Mosaic {
    palette: Palette,
    working_size: WorkingSize,
    parallel: bool,
}

impl Mosaic {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            ..Default::default()
        }
    }

    pub fn working_size(mut self, working_size: WorkingSize) -> Self {
        self.working_size = working_size;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Downscales, maps every pixel to the palette and scales back to the
    /// dimensions of `img`.
    pub fn render(&self, img: &DynamicImage) -> Result<RgbImage> {
        let (width, height) = (img.width(), img.height());
        let (small_w, small_h) = self.working_size.dimensions(width, height);
        debug!("Working size: {small_w}x{small_h} (source {width}x{height})");

        let grid = scale_down(img, small_w, small_h).to_rgb8();

        let start_time = Instant::now();
        let tiles = if self.parallel {
            quantize_par(&grid, &self.palette)?
        } else {
            quantize(&grid, &self.palette)?
        };
        info!(
            "Map to palette: {} colors, {}ms",
            self.palette.len(),
            start_time.elapsed().as_millis()
        );

        Ok(scale_up(&tiles, width, height))
    }
}
