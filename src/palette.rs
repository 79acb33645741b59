use crate::error::{Error, Result};
use crate::quantizer::nearest_index;
use image::{imageops::ColorMap, Rgb};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub type RgbColor = Rgb<u8>;

const LEGO_COLORS: [(&str, [u8; 3]); 7] = [
    ("blue", [70, 158, 209]),
    ("black", [47, 47, 47]),
    ("brown", [130, 94, 65]),
    ("grey", [124, 124, 124]),
    ("peach", [247, 188, 153]),
    ("white", [245, 245, 242]),
    ("red", [222, 20, 20]),
];

/// Fixed, ordered set of labelled output colors.
///
/// Entry order is part of the contract: nearest-color search resolves ties in
/// favour of the entry listed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<(String, RgbColor)>,
}

impl Palette {
    pub fn new(entries: Vec<(String, RgbColor)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::InvalidPalette("palette has no colors".into()));
        }
        let mut labels = HashSet::new();
        for (label, _) in &entries {
            if !labels.insert(label.as_str()) {
                return Err(Error::InvalidPalette(format!("duplicate label `{label}`")));
            }
        }
        Ok(Self { entries })
    }

    /// Tile colors of the classic brick set.
    pub fn lego() -> Self {
        let entries = LEGO_COLORS
            .iter()
            .map(|&(label, rgb)| (label.to_string(), Rgb(rgb)))
            .collect();
        Self { entries }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    #[inline(always)]
    pub fn colors(&self) -> &[(String, RgbColor)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RgbColor)> {
        self.entries.iter().map(|(label, rgb)| (label.as_str(), *rgb))
    }

    pub fn get(&self, label: &str) -> Option<RgbColor> {
        self.iter().find(|(l, _)| *l == label).map(|(_, rgb)| rgb)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`, construction rejects empty palettes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::lego()
    }
}

fn parse_channel(value: &str, line_no: usize) -> Result<u8> {
    let value: i64 = value.parse().map_err(|_| {
        Error::InvalidPalette(format!("line {line_no}: `{value}` is not an integer"))
    })?;
    u8::try_from(value).map_err(|_| {
        Error::InvalidPalette(format!("line {line_no}: channel {value} is outside 0..=255"))
    })
}

/// Parses one `label r g b` entry per line. Blank lines and `#` comments are skipped.
impl FromStr for Palette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut seen = HashMap::new();
        for (i, line) in s.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let &[label, r, g, b] = fields.as_slice() else {
                return Err(Error::InvalidPalette(format!(
                    "line {line_no}: expected `label r g b`, got {} fields",
                    fields.len()
                )));
            };
            if let Some(first) = seen.insert(label, line_no) {
                return Err(Error::InvalidPalette(format!(
                    "line {line_no}: duplicate label `{label}`, first defined on line {first}"
                )));
            }
            let rgb = [
                parse_channel(r, line_no)?,
                parse_channel(g, line_no)?,
                parse_channel(b, line_no)?,
            ];
            entries.push((label.to_string(), Rgb(rgb)));
        }
        Self::new(entries)
    }
}

impl ColorMap for Palette {
    type Color = RgbColor;

    #[inline(always)]
    fn index_of(&self, color: &Self::Color) -> usize {
        nearest_index(color, self)
    }

    #[inline(always)]
    fn lookup(&self, index: usize) -> Option<Self::Color> {
        self.entries.get(index).map(|(_, rgb)| *rgb)
    }

    fn has_lookup(&self) -> bool {
        true
    }

    #[inline(always)]
    fn map_color(&self, color: &mut Self::Color) {
        *color = self.entries[self.index_of(color)].1
    }
}
