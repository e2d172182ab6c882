//! Rendering packed glyphs into the atlas image.

use crate::bitmap::{AlphaMap, AtlasImage};
use crate::charset::{CharEntry, Character};
use crate::distance_field::DistanceField;
use crate::error::Result;
use crate::pack::PackedAtlas;
use crate::params::{OutputKind, RasterSettings};
use crate::source::GlyphSource;

/// Renders every packed character into a new atlas image.
///
/// Glyphs are rasterized at `font_size * scale` into a buffer with a
/// `spread * scale` border, turned into a distance field when requested and
/// copied into their packed boxes. A glyph that fails to render is left
/// transparent.
pub fn compose_atlas<S: GlyphSource>(
    source: &mut S,
    chars: &[CharEntry],
    atlas: &PackedAtlas,
    settings: RasterSettings,
) -> Result<AtlasImage> {
    log::info!("Converting...");
    let mut source = source.scoped_size(settings.raster_size(atlas.font_size))?;
    let field = DistanceField::new(settings.spread, settings.scale);
    let mut image = AtlasImage::new(atlas.texture_size);
    let mut progress = Progress::new(chars.len(), "converted");

    for (index, entry) in chars.iter().enumerate() {
        // counted before the glyph, so 100% is never shown
        progress.report(index);
        if let Some(desc) = atlas.get(entry.character) {
            match rasterize(&mut *source, entry, settings) {
                Some(buffer) => {
                    let buffer = match settings.output {
                        OutputKind::DistanceField => field.build(&buffer),
                        OutputKind::Graphic => buffer,
                    };
                    image.blit(&buffer, desc.x, desc.y, desc.width, desc.height);
                }
                None => log::warn!(
                    "glyph {} for U+{:04X} failed to render, leaving it blank",
                    entry.glyph,
                    entry.character.id()
                ),
            }
        }
    }
    Ok(image)
}

/// Renders one character into a buffer padded by the scaled spread.
fn rasterize<S: GlyphSource>(
    source: &mut S,
    entry: &CharEntry,
    settings: RasterSettings,
) -> Option<AlphaMap> {
    let pad = settings.scaled_spread() as usize;
    let mode = settings.render_mode();
    match entry.character {
        Character::MissingGlyph => {
            let metrics = source.measure_glyph(entry.glyph, mode)?;
            let leading = source.size_metrics().leading();
            let width = metrics.advance_px().max(0) as usize;
            let height = (leading * 0.75).max(0.0) as usize;
            Some(missing_glyph_box(width, height, pad))
        }
        Character::Real(_) => {
            let glyph = source.render_glyph(entry.glyph, mode)?;
            let coverage = glyph.coverage;
            let mut buffer =
                AlphaMap::new(coverage.width() + 2 * pad, coverage.height() + 2 * pad);
            buffer.copy_from(&coverage, pad, pad);
            Some(buffer)
        }
    }
}

/// Draws the outline of a `width × height` box inset by `pad`.
///
/// Bars are an eighth of the smaller buffer side thick, at least one pixel.
fn missing_glyph_box(width: usize, height: usize, pad: usize) -> AlphaMap {
    let (buffer_width, buffer_height) = (width + 2 * pad, height + 2 * pad);
    let mut buffer = AlphaMap::new(buffer_width, buffer_height);
    let line = (buffer_width.min(buffer_height) / 8).max(1);

    for j in 0..height {
        let y = j + pad;
        for i in 0..line {
            let x = i + pad;
            buffer.set(x, y, 0xff);
            if let Some(mirrored) = buffer_width.checked_sub(x + 1) {
                buffer.set(mirrored, y, 0xff);
            }
        }
    }
    for i in 0..width {
        let x = i + pad;
        for j in 0..line {
            let y = j + pad;
            buffer.set(x, y, 0xff);
            if let Some(mirrored) = buffer_height.checked_sub(y + 1) {
                buffer.set(x, mirrored, 0xff);
            }
        }
    }
    buffer
}

/// Logs whole percentages of a task as they are passed.
pub(crate) struct Progress {
    total: usize,
    reported: usize,
    suffix: &'static str,
}

impl Progress {
    pub(crate) fn new(total: usize, suffix: &'static str) -> Self {
        Self {
            total,
            reported: 0,
            suffix,
        }
    }

    /// Records that `done` items are finished, returning the percentage if
    /// it was logged.
    pub(crate) fn report(&mut self, done: usize) -> Option<usize> {
        let percent = done * 100 / self.total.max(1);
        if percent > self.reported {
            self.reported = percent;
            log::info!("{percent:>3}% {}", self.suffix);
            return Some(percent);
        }
        None
    }
}
