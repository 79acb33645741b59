use crate::error::{Error, Result};
use crate::palette::{Palette, RgbColor};
use image::{Rgb, RgbImage};
use rayon::prelude::*;
use std::iter;

/// Euclidean distance between two colors in RGB space.
#[inline]
pub fn distance(a: &RgbColor, b: &RgbColor) -> f64 {
    iter::zip(a.0, b.0)
        .map(|(a, b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Index of the palette entry closest to `pixel`.
///
/// Only a strictly smaller distance replaces the current best, so on a tie the
/// entry listed first in the palette wins.
pub fn nearest_index(pixel: &RgbColor, palette: &Palette) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, (_, rgb)) in palette.colors().iter().enumerate() {
        let dist = distance(pixel, rgb);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

#[inline]
pub fn nearest(pixel: &RgbColor, palette: &Palette) -> RgbColor {
    palette.colors()[nearest_index(pixel, palette)].1
}

fn check_dimensions(grid: &RgbImage) -> Result<()> {
    let (width, height) = grid.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyGrid { width, height });
    }
    Ok(())
}

/// Builds a new image where every pixel is replaced by its nearest palette color.
pub fn quantize(grid: &RgbImage, palette: &Palette) -> Result<RgbImage> {
    check_dimensions(grid)?;
    let mut out = RgbImage::new(grid.width(), grid.height());
    for (x, y, pixel) in grid.enumerate_pixels() {
        out.put_pixel(x, y, nearest(pixel, palette));
    }
    Ok(out)
}

/// Same result as [`quantize`], with the pixels spread over the rayon pool.
pub fn quantize_par(grid: &RgbImage, palette: &Palette) -> Result<RgbImage> {
    check_dimensions(grid)?;
    let mut out = RgbImage::new(grid.width(), grid.height());
    out.par_chunks_exact_mut(3)
        .zip(grid.par_chunks_exact(3))
        .for_each(|(dst, src)| {
            let rgb = nearest(&Rgb([src[0], src[1], src[2]]), palette);
            dst.copy_from_slice(&rgb.0);
        });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_white() -> Palette {
        Palette::new(vec![
            ("black".to_string(), Rgb([47, 47, 47])),
            ("white".to_string(), Rgb([245, 245, 242])),
        ])
        .unwrap()
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) * 5 % 256) as u8])
        })
    }

    #[test]
    fn test_distance() {
        let a = Rgb([10, 20, 30]);
        let b = Rgb([13, 24, 30]);
        assert_eq!(distance(&a, &a), 0.0);
        assert_eq!(distance(&a, &b), 5.0);
        assert_eq!(distance(&a, &b), distance(&b, &a));
        assert_eq!(
            distance(&Rgb([0, 0, 0]), &Rgb([255, 255, 255])),
            (3.0f64 * 255.0 * 255.0).sqrt()
        );
    }

    #[test]
    fn test_distance_triangle() {
        let colors = [
            Rgb([0, 0, 0]),
            Rgb([255, 0, 10]),
            Rgb([12, 200, 99]),
            Rgb([47, 47, 47]),
        ];
        for a in &colors {
            for b in &colors {
                for c in &colors {
                    assert!(distance(a, c) <= distance(a, b) + distance(b, c) + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_nearest() {
        let palette = black_white();
        assert_eq!(nearest(&Rgb([10, 10, 10]), &palette), Rgb([47, 47, 47]));
        assert_eq!(nearest(&Rgb([250, 250, 250]), &palette), Rgb([245, 245, 242]));
        assert_eq!(nearest(&Rgb([47, 47, 47]), &palette), Rgb([47, 47, 47]));
    }

    #[test]
    fn test_nearest_mid_grey_is_not_a_tie() {
        let palette = black_white();
        let pixel = Rgb([146, 146, 146]);
        let to_black = distance(&pixel, &Rgb([47, 47, 47]));
        let to_white = distance(&pixel, &Rgb([245, 245, 242]));
        assert!(to_white < to_black, "{to_white} vs {to_black}");
        assert_eq!(nearest(&pixel, &palette), Rgb([245, 245, 242]));
        assert_eq!(nearest_index(&pixel, &palette), 1);
    }

    #[test]
    fn test_nearest_tie_keeps_first() {
        let pixel = Rgb([146, 146, 146]);
        let black = ("black".to_string(), Rgb([47, 47, 47]));
        let white = ("white".to_string(), Rgb([245, 245, 245]));
        let palette = Palette::new(vec![black.clone(), white.clone()]).unwrap();
        assert_eq!(distance(&pixel, &black.1), distance(&pixel, &white.1));
        for _ in 0..10 {
            assert_eq!(nearest_index(&pixel, &palette), 0);
        }
        let palette = Palette::new(vec![white, black]).unwrap();
        assert_eq!(nearest(&pixel, &palette), Rgb([245, 245, 245]));
    }

    #[test]
    fn test_quantize_membership_and_shape() {
        let palette = Palette::lego();
        let grid = gradient(37, 11);
        let out = quantize(&grid, &palette).unwrap();
        assert_eq!(out.dimensions(), (37, 11));
        assert!(out
            .pixels()
            .all(|p| palette.colors().iter().any(|(_, rgb)| rgb == p)));
        assert_eq!(grid, gradient(37, 11));
    }

    #[test]
    fn test_quantize_cells_independent() {
        let palette = Palette::new(vec![
            ("red".to_string(), Rgb([255, 0, 0])),
            ("green".to_string(), Rgb([0, 255, 0])),
            ("blue".to_string(), Rgb([0, 0, 255])),
            ("black".to_string(), Rgb([0, 0, 0])),
        ])
        .unwrap();
        let cells = [
            Rgb([200, 30, 20]),
            Rgb([10, 220, 40]),
            Rgb([5, 15, 190]),
            Rgb([20, 20, 20]),
        ];
        let expected = [
            Rgb([255, 0, 0]),
            Rgb([0, 255, 0]),
            Rgb([0, 0, 255]),
            Rgb([0, 0, 0]),
        ];
        let grid = RgbImage::from_fn(2, 2, |x, y| cells[(y * 2 + x) as usize]);
        let out = quantize(&grid, &palette).unwrap();
        for (x, y, p) in out.enumerate_pixels() {
            assert_eq!(*p, expected[(y * 2 + x) as usize]);
        }

        let order = [3, 2, 0, 1];
        let permuted = RgbImage::from_fn(2, 2, |x, y| cells[order[(y * 2 + x) as usize]]);
        let out = quantize(&permuted, &palette).unwrap();
        for (x, y, p) in out.enumerate_pixels() {
            assert_eq!(*p, expected[order[(y * 2 + x) as usize]]);
        }
    }

    #[test]
    fn test_quantize_empty() {
        let palette = Palette::lego();
        assert!(matches!(
            quantize(&RgbImage::new(0, 4), &palette),
            Err(Error::EmptyGrid { width: 0, height: 4 })
        ));
        assert!(matches!(
            quantize_par(&RgbImage::new(4, 0), &palette),
            Err(Error::EmptyGrid { width: 4, height: 0 })
        ));
    }

    #[test]
    fn test_quantize_par_matches() {
        let palette = Palette::lego();
        let grid = gradient(64, 48);
        assert_eq!(
            quantize(&grid, &palette).unwrap(),
            quantize_par(&grid, &palette).unwrap()
        );
    }
}
