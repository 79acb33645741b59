use crate::error::{Error, Result};
use crate::palette::{Palette, RgbColor};
use image::{imageops::ColorMap, RgbImage};
use std::collections::HashMap;
use std::io::{self, Write};

/// Color registers a sixel terminal is guaranteed to accept.
pub const MAX_REGISTERS: usize = 256;

/// Writes palette-mapped images as DEC sixel graphics.
///
/// Register `i` holds palette entry `i`. Every pixel row is painted as one bit
/// of the current six-row band, with runs of one register RLE-compressed.
pub struct SixelEncoder<'a> {
    palette: &'a Palette,
    registers: HashMap<[u8; 3], usize>,
}

impl<'a> SixelEncoder<'a> {
    pub fn new(palette: &'a Palette) -> Result<Self> {
        if palette.len() > MAX_REGISTERS {
            return Err(Error::InvalidPalette(format!(
                "{} colors exceed the {MAX_REGISTERS} sixel registers",
                palette.len()
            )));
        }
        let mut registers = HashMap::with_capacity(palette.len());
        for (i, (_, rgb)) in palette.iter().enumerate() {
            registers.entry(rgb.0).or_insert(i);
        }
        Ok(Self { palette, registers })
    }

    /// Palette colors hit the register table, anything else falls back to the
    /// nearest entry.
    #[inline]
    fn register_of(&self, pixel: &RgbColor) -> usize {
        match self.registers.get(&pixel.0) {
            Some(&register) => register,
            None => self.palette.index_of(pixel),
        }
    }

    fn write_registers<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (i, (_, rgb)) in self.palette.iter().enumerate() {
            let [r, g, b] = rgb.0.map(|c| c as u16 * 100 / 255);
            write!(w, "#{i};2;{r};{g};{b}")?;
        }
        Ok(())
    }

    pub fn encode<W: Write>(&self, img: &RgbImage, w: &mut W) -> io::Result<()> {
        let height = img.height() as usize;
        write!(w, "\x1bPq\"1;1;{};{}", img.width(), img.height())?;
        self.write_registers(w)?;

        for (y, row) in img.rows().enumerate() {
            let sixel = char::from(63 + (1u8 << (y % 6)));
            let mut run: Option<(usize, usize)> = None;
            for pixel in row {
                let register = self.register_of(pixel);
                run = match run {
                    Some((current, len)) if current == register => Some((current, len + 1)),
                    Some((current, len)) => {
                        write_run(w, current, len, sixel)?;
                        Some((register, 1))
                    }
                    None => Some((register, 1)),
                };
            }
            if let Some((register, len)) = run {
                write_run(w, register, len, sixel)?;
            }
            // `-` moves to the next band, `$` overpaints the current one.
            if y + 1 < height {
                w.write_all(if y % 6 == 5 { b"-" } else { b"$" })?;
            }
        }

        w.write_all(b"\x1b\\")?;
        w.flush()
    }
}

fn write_run<W: Write>(w: &mut W, register: usize, len: usize, sixel: char) -> io::Result<()> {
    match len {
        1 => write!(w, "#{register}{sixel}"),
        _ => write!(w, "#{register}!{len}{sixel}"),
    }
}
