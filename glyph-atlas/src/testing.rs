//! A procedural glyph source for tests.
//!
//! `BoxFont` draws every glyph as a solid rectangle whose size follows the
//! active pixel size, so pipeline stages can be exercised without font files.

use std::collections::{btree_map::Entry, BTreeMap, HashMap, HashSet};

use crate::bitmap::AlphaMap;
use crate::error::{Error, Result};
use crate::source::{
    GlyphIndex, GlyphMetrics, GlyphSource, RenderMode, RenderedGlyph, SizeMetrics,
};

/// Offset applied to code points by the second ("symbol") charmap.
pub const SYMBOL_OFFSET: u32 = 0xF000;

/// A TrueType font with rectangular glyphs for space, `A` and `V`, kerned
/// `A V` -100 at 1000 units per em. See `test_data/README.md`.
pub const RECTS_TTF: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/rects.ttf");

#[derive(Clone, Debug)]
pub struct BoxFont {
    size: u32,
    charmap: usize,
    glyphs: BTreeMap<u32, GlyphIndex>,
    next_glyph: GlyphIndex,
    broken: HashSet<GlyphIndex>,
    kerning: HashMap<(GlyphIndex, GlyphIndex), f32>,
}

impl BoxFont {
    /// Printable ASCII, including space.
    pub fn latin() -> Self {
        let mut font = Self {
            size: 32,
            charmap: 0,
            glyphs: BTreeMap::new(),
            next_glyph: 1,
            broken: HashSet::new(),
            kerning: HashMap::new(),
        };
        for code_point in 0x20..0x7F {
            font = font.with_char(code_point);
        }
        font
    }

    /// All of ASCII, control characters included.
    pub fn ascii() -> Self {
        let mut font = Self::latin();
        for code_point in (0..0x20).chain([0x7F]) {
            font = font.with_char(code_point);
        }
        font
    }

    /// Adds a glyph for `code_point`.
    pub fn with_char(mut self, code_point: u32) -> Self {
        if let Entry::Vacant(entry) = self.glyphs.entry(code_point) {
            entry.insert(self.next_glyph);
            self.next_glyph += 1;
        }
        self
    }

    pub fn without_char(mut self, code_point: u32) -> Self {
        self.glyphs.remove(&code_point);
        self
    }

    /// Maps `code_point` to a glyph that never renders.
    pub fn with_broken_char(mut self, code_point: u32) -> Self {
        self = self.with_char(code_point);
        let glyph = self.glyphs[&code_point];
        self.broken.insert(glyph);
        self
    }

    /// Adds a kerning pair, in ems.
    pub fn with_kerning(mut self, left: char, right: char, em: f32) -> Self {
        let pair = (self.glyphs[&(left as u32)], self.glyphs[&(right as u32)]);
        self.kerning.insert(pair, em);
        self
    }

    pub fn glyph_for(&self, c: char) -> GlyphIndex {
        self.glyphs[&(c as u32)]
    }

    fn is_space(&self, glyph: GlyphIndex) -> bool {
        self.glyphs.get(&0x20) == Some(&glyph)
    }

    fn metrics(&self, glyph: GlyphIndex) -> GlyphMetrics {
        let size = self.size as i64;
        // widths cycle through 1/3, 1/2 and 2/3 of an em
        let width = size * (2 + glyph as i64 % 3) / 6;
        let advance = (width + size / 8) * 64;
        if self.is_space(glyph) {
            return GlyphMetrics {
                advance: size / 4 * 64,
                ..Default::default()
            };
        }
        GlyphMetrics {
            width: width as u32,
            rows: (size * 3 / 4) as u32,
            left: (size / 16) as i32,
            // every third glyph has a descender
            top: if glyph % 3 == 0 {
                (size / 2) as i32
            } else {
                (size * 3 / 4) as i32
            },
            advance,
        }
    }
}

impl GlyphSource for BoxFont {
    fn size(&self) -> u32 {
        self.size
    }

    fn set_size(&mut self, pixels: u32) -> Result<()> {
        if pixels == 0 {
            return Err(Error::FontSize { pixels });
        }
        self.size = pixels;
        Ok(())
    }

    fn set_charmap(&mut self, index: usize) -> bool {
        if index > 1 {
            return false;
        }
        self.charmap = index;
        true
    }

    fn glyph_index(&mut self, code_point: u32) -> Option<GlyphIndex> {
        let code_point = match self.charmap {
            0 => code_point,
            _ => code_point.checked_sub(SYMBOL_OFFSET)?,
        };
        self.glyphs.get(&code_point).copied()
    }

    fn render_glyph(&mut self, glyph: GlyphIndex, mode: RenderMode) -> Option<RenderedGlyph> {
        let metrics = self.measure_glyph(glyph, mode)?;
        let (width, rows) = (metrics.width as usize, metrics.rows as usize);
        let mut coverage = AlphaMap::new(width, rows);
        for y in 0..rows {
            for x in 0..width {
                let edge = x == 0 || y == 0 || x + 1 == width || y + 1 == rows;
                let value = match mode {
                    RenderMode::Normal if edge => 128,
                    _ => 255,
                };
                coverage.set(x, y, value);
            }
        }
        Some(RenderedGlyph { metrics, coverage })
    }

    fn measure_glyph(&mut self, glyph: GlyphIndex, _mode: RenderMode) -> Option<GlyphMetrics> {
        if glyph == 0 || glyph >= self.next_glyph || self.broken.contains(&glyph) {
            return None;
        }
        Some(self.metrics(glyph))
    }

    fn size_metrics(&self) -> SizeMetrics {
        let size = self.size as i64;
        SizeMetrics {
            height: size * 5 / 4 * 64,
            descender: -(size / 4) * 64,
        }
    }

    fn line_height(&self) -> f32 {
        self.size as f32 * 1.15
    }

    fn baseline(&self) -> f32 {
        self.size as f32 * 0.9
    }

    fn kerning(&mut self, left: GlyphIndex, right: GlyphIndex) -> Option<i64> {
        let em = self.kerning.get(&(left, right)).copied().unwrap_or_default();
        Some((em * self.size as f32 * 64.0).round() as i64)
    }
}
