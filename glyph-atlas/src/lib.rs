//! Font atlas generation.
//!
//! Renders the characters of a TrueType or OpenType font into one square
//! RGBA texture and describes the placement and metrics of every glyph in a
//! companion `.fnt` file. Glyphs are stored either as anti-aliased coverage
//! or as a signed distance field computed from an oversampled monochrome
//! raster.
//!
//! ```no_run
//! use glyph_atlas::{FontConverter, Params};
//!
//! let mut converter = FontConverter::open(Params::new("Arial.ttf"))?;
//! let result = converter.convert()?;
//! println!("wrote {}", result.image_path.display());
//! # Ok::<_, glyph_atlas::Error>(())
//! ```

mod bitmap;
mod charset;
mod compose;
mod convert;
mod description;
mod distance_field;
mod error;
mod kerning;
mod pack;
mod params;
mod search;
mod source;

#[cfg(test)]
mod testing;

pub use bitmap::{AlphaMap, AtlasImage};
pub use charset::{build_char_list, load_char_list, CharEntry, Character};
pub use compose::compose_atlas;
pub use convert::{Conversion, FontConverter};
pub use description::{Float, FontDescription};
pub use distance_field::DistanceField;
pub use error::{Error, Result};
pub use kerning::collect_kerning;
pub use pack::{pack_atlas, pack_rects, CharDescription, PackedAtlas, UvRect};
pub use params::{
    CharSource, Mode, OutputKind, Params, RasterSettings, RawParams, DEFAULT_CHARMAP,
    DEFAULT_FONT_SIZE, DEFAULT_MAX_CHAR, DEFAULT_SCALE, DEFAULT_SPREAD, DEFAULT_TEXTURE_SIZE,
    MAX_SCALE, MAX_SPREAD, MAX_TEXTURE_SIZE, MIN_TEXTURE_SIZE,
};
pub use search::{adjust_font_size, adjust_texture_size};
pub use source::{
    FreeTypeFont, GlyphIndex, GlyphMetrics, GlyphSource, RenderMode, RenderedGlyph, SizeGuard,
    SizeMetrics, NOTDEF,
};
