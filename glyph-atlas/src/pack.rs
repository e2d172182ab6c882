//! Measuring glyphs and packing them into a single square texture.

use std::collections::BTreeMap;

use rect_packer::{Config, Packer};

use crate::charset::{CharEntry, Character};
use crate::params::RasterSettings;
use crate::source::{GlyphIndex, GlyphMetrics, GlyphSource};

/// Placement and metrics of one character in the atlas.
///
/// Dimensions are in output pixels and include the distance field border;
/// offsets and advances are in output units.
#[derive(Clone, Debug, PartialEq)]
pub struct CharDescription {
    pub character: Character,
    pub glyph: GlyphIndex,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
    /// Kerning against following characters, keyed by their id.
    pub kerning: BTreeMap<u32, f32>,
}

/// Normalized texture coordinates of a glyph box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
}

impl CharDescription {
    pub fn id(&self) -> u32 {
        self.character.id()
    }

    pub fn uv(&self, texture_size: u32) -> UvRect {
        let size = texture_size as f32;
        UvRect {
            u: self.x as f32 / size,
            v: self.y as f32 / size,
            u2: (self.x + self.width) as f32 / size,
            v2: (self.y + self.height) as f32 / size,
        }
    }
}

/// The result of a successful pack.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedAtlas {
    pub font_size: u32,
    pub texture_size: u32,
    glyphs: BTreeMap<u32, CharDescription>,
}

impl PackedAtlas {
    pub fn new(
        font_size: u32,
        texture_size: u32,
        glyphs: impl IntoIterator<Item = CharDescription>,
    ) -> Self {
        Self {
            font_size,
            texture_size,
            glyphs: glyphs.into_iter().map(|desc| (desc.id(), desc)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, character: Character) -> Option<&CharDescription> {
        self.glyphs.get(&character.id())
    }

    /// Descriptions in ascending id order.
    pub fn glyphs(&self) -> impl Iterator<Item = &CharDescription> + '_ {
        self.glyphs.values()
    }

    pub fn glyphs_mut(&mut self) -> impl Iterator<Item = &mut CharDescription> + '_ {
        self.glyphs.values_mut()
    }

    /// Total number of kerning pairs over all glyphs.
    pub fn kerning_pairs(&self) -> usize {
        self.glyphs().map(|glyph| glyph.kerning.len()).sum()
    }
}

/// Measures every character at `font_size` and packs the glyph boxes into
/// one `texture_size` square.
///
/// Returns `None` if the font cannot be sized or the boxes do not fit.
/// Characters whose glyph fails to render are left out of this attempt.
pub fn pack_atlas<S: GlyphSource>(
    source: &mut S,
    chars: &[CharEntry],
    settings: RasterSettings,
    font_size: u32,
    texture_size: u32,
) -> Option<PackedAtlas> {
    let mut source = source.scoped_size(settings.raster_size(font_size)).ok()?;
    let mode = settings.render_mode();

    let measured: Vec<(CharEntry, GlyphMetrics)> = chars
        .iter()
        .filter_map(|entry| {
            let metrics = source.measure_glyph(entry.glyph, mode)?;
            Some((*entry, metrics))
        })
        .collect();
    // every glyph shares the baseline of the tallest one
    let max_top = measured
        .iter()
        .map(|(_, metrics)| metrics.top)
        .max()
        .unwrap_or_default()
        .max(0);
    let leading = source.size_metrics().leading();
    drop(source);

    let mut descriptions: Vec<CharDescription> = measured
        .iter()
        .map(|(entry, metrics)| describe(entry, metrics, max_top, leading, settings))
        .collect();

    let sizes: Vec<_> = descriptions
        .iter()
        .map(|desc| (desc.width, desc.height))
        .collect();
    let placements = pack_rects(&sizes, texture_size)?;
    for (desc, (x, y)) in descriptions.iter_mut().zip(placements) {
        desc.x = x;
        desc.y = y;
    }
    log::debug!(
        "packed {} glyphs at font size {font_size} into {texture_size}x{texture_size}",
        descriptions.len()
    );
    Some(PackedAtlas::new(font_size, texture_size, descriptions))
}

fn describe(
    entry: &CharEntry,
    metrics: &GlyphMetrics,
    max_top: i32,
    leading: f32,
    settings: RasterSettings,
) -> CharDescription {
    let (width, height, y_offset) = match entry.character {
        // a box sized from the space advance and three quarters of the line
        Character::MissingGlyph => (
            metrics.advance_px(),
            (leading * 0.75) as i64,
            leading * 0.25,
        ),
        Character::Real(_) => (
            metrics.width as i64,
            metrics.rows as i64,
            (max_top - metrics.top) as f32,
        ),
    };
    let padding = 2 * settings.scaled_spread() as i64;
    let pad = |extent: i64| if extent > 0 { extent + padding } else { 0 };
    let scale = settings.scale as i64;
    let scale_f = settings.scale as f32;
    CharDescription {
        character: entry.character,
        glyph: entry.glyph,
        x: 0,
        y: 0,
        width: (pad(width) / scale) as u32,
        height: (pad(height) / scale) as u32,
        x_offset: metrics.left as f32 / scale_f,
        y_offset: y_offset / scale_f,
        x_advance: metrics.advance as f32 / 64.0 / scale_f,
        kerning: BTreeMap::new(),
    }
}

/// Packs rectangles into one `bin_size` square without rotation.
///
/// Returns the top left corner of every rectangle in input order, or `None`
/// if they do not all fit. Empty rectangles take no space and sit at the
/// origin.
pub fn pack_rects(sizes: &[(u32, u32)], bin_size: u32) -> Option<Vec<(u32, u32)>> {
    let bin = i32::try_from(bin_size).ok()?;
    let mut packer = Packer::new(Config {
        width: bin,
        height: bin,
        border_padding: 0,
        rectangle_padding: 0,
    });
    // tallest first packs noticeably tighter
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let (wa, ha) = sizes[a];
        let (wb, hb) = sizes[b];
        hb.cmp(&ha).then(wb.cmp(&wa))
    });

    let mut placements = vec![(0, 0); sizes.len()];
    for index in order {
        let (width, height) = sizes[index];
        if width == 0 || height == 0 {
            continue;
        }
        if width > bin_size || height > bin_size {
            return None;
        }
        let rect = packer.pack(width as i32, height as i32, false)?;
        placements[index] = (rect.x as u32, rect.y as u32);
    }
    Some(placements)
}
