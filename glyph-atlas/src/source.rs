//! Access to a rasterizer face.
//!
//! Every pipeline stage reads glyphs through the [`GlyphSource`] trait. The
//! only state a source carries between calls is its active pixel size, which
//! stages change through [`SizeGuard`] so that the previous size is always
//! restored.

mod freetype;

use std::ops::{Deref, DerefMut};

use crate::bitmap::AlphaMap;
use crate::error::Result;

pub use self::freetype::FreeTypeFont;

/// Index of a glyph in the face; 0 is `.notdef`.
pub type GlyphIndex = u32;

pub const NOTDEF: GlyphIndex = 0;

/// How a glyph is rasterized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// One bit per pixel, no anti-aliasing.
    Mono,
    /// 8-bit anti-aliased coverage.
    Normal,
}

/// Placement of a rendered glyph bitmap.
///
/// `left` and `top` are in pixels relative to the pen position and baseline,
/// `advance` is in 26.6 fixed point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: u32,
    pub rows: u32,
    pub left: i32,
    pub top: i32,
    pub advance: i64,
}

impl GlyphMetrics {
    /// Horizontal advance in whole pixels, truncated.
    pub fn advance_px(&self) -> i64 {
        self.advance / 64
    }
}

/// A rendered glyph: its metrics and its coverage.
///
/// Monochrome renders are expanded to 0/255 coverage.
#[derive(Clone, Debug)]
pub struct RenderedGlyph {
    pub metrics: GlyphMetrics,
    pub coverage: AlphaMap,
}

/// Metrics of the active size, in 26.6 fixed point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeMetrics {
    pub height: i64,
    pub descender: i64,
}

impl SizeMetrics {
    /// Line height including the descender, in pixels.
    pub fn leading(&self) -> f32 {
        (self.height + self.descender) as f32 / 64.0
    }
}

/// A face that can be sized, queried and rasterized.
pub trait GlyphSource {
    /// The active pixel size.
    fn size(&self) -> u32;

    /// Changes the active pixel size.
    fn set_size(&mut self, pixels: u32) -> Result<()>;

    /// Selects one of the face's character maps.
    ///
    /// Returns `false` if the index is out of range or selection fails; the
    /// previously active charmap stays selected.
    fn set_charmap(&mut self, index: usize) -> bool;

    /// Maps a code point through the active charmap.
    fn glyph_index(&mut self, code_point: u32) -> Option<GlyphIndex>;

    /// Loads and renders a glyph at the active size.
    fn render_glyph(&mut self, glyph: GlyphIndex, mode: RenderMode) -> Option<RenderedGlyph>;

    /// Loads and renders a glyph, keeping only its metrics.
    fn measure_glyph(&mut self, glyph: GlyphIndex, mode: RenderMode) -> Option<GlyphMetrics> {
        self.render_glyph(glyph, mode).map(|glyph| glyph.metrics)
    }

    fn size_metrics(&self) -> SizeMetrics;

    /// Height of the face bounding box at the active size, in pixels.
    fn line_height(&self) -> f32;

    /// Ascent of the face bounding box at the active size, in pixels.
    fn baseline(&self) -> f32;

    /// Horizontal kerning between two glyphs at the active size, in 26.6.
    fn kerning(&mut self, left: GlyphIndex, right: GlyphIndex) -> Option<i64>;

    /// Sets the size for the lifetime of the returned guard.
    fn scoped_size(&mut self, pixels: u32) -> Result<SizeGuard<'_, Self>>
    where
        Self: Sized,
    {
        SizeGuard::new(self, pixels)
    }
}

/// Restores the previous size of a source when dropped.
pub struct SizeGuard<'a, S: GlyphSource> {
    source: &'a mut S,
    previous: u32,
}

impl<'a, S: GlyphSource> SizeGuard<'a, S> {
    pub fn new(source: &'a mut S, pixels: u32) -> Result<Self> {
        let previous = source.size();
        source.set_size(pixels)?;
        Ok(Self { source, previous })
    }
}

impl<S: GlyphSource> Deref for SizeGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.source
    }
}

impl<S: GlyphSource> DerefMut for SizeGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.source
    }
}

impl<S: GlyphSource> Drop for SizeGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.source.set_size(self.previous) {
            log::warn!("failed to restore font size {}: {e}", self.previous);
        }
    }
}
