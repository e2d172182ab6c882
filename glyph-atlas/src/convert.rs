//! The full font to atlas conversion.

use std::path::PathBuf;

use crate::charset::{build_char_list, CharEntry};
use crate::compose::compose_atlas;
use crate::description::FontDescription;
use crate::error::{Error, Result};
use crate::kerning::collect_kerning;
use crate::pack::{pack_atlas, PackedAtlas};
use crate::params::{Mode, Params};
use crate::search;
use crate::source::{FreeTypeFont, GlyphSource};

/// Summary of a finished conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    pub font_size: u32,
    pub texture_size: u32,
    /// Characters in the atlas, the missing glyph placeholder included.
    pub glyph_count: usize,
    pub kerning_pairs: usize,
    pub image_path: PathBuf,
    pub description_path: PathBuf,
}

/// Drives a glyph source through every stage of atlas generation.
pub struct FontConverter<S> {
    source: S,
    params: Params,
    chars: Vec<CharEntry>,
}

impl FontConverter<FreeTypeFont> {
    /// Opens `params.font` with FreeType.
    pub fn open(params: Params) -> Result<Self> {
        let font = FreeTypeFont::open(&params.font)?;
        Self::new(font, params)
    }
}

impl<S: GlyphSource> FontConverter<S> {
    /// Selects the configured charmap and resolves the character set.
    ///
    /// A charmap that cannot be selected is reported and the font's default
    /// charmap is used instead.
    pub fn new(mut source: S, params: Params) -> Result<Self> {
        if !source.set_charmap(params.charmap) {
            log::warn!(
                "charmap {} could not be selected, keeping the default",
                params.charmap
            );
        }
        let chars = build_char_list(&mut source, &params)?;
        Ok(Self {
            source,
            params,
            chars,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn chars(&self) -> &[CharEntry] {
        &self.chars
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Packs the character set at the given sizes.
    pub fn try_pack(&mut self, font_size: u32, texture_size: u32) -> Option<PackedAtlas> {
        pack_atlas(
            &mut self.source,
            &self.chars,
            self.params.raster(),
            font_size,
            texture_size,
        )
    }

    /// Finds the largest font size that fits the configured texture and
    /// makes it the font size of this conversion.
    pub fn adjust_font_size(&mut self) -> Option<u32> {
        let (source, chars) = (&mut self.source, &self.chars);
        let (settings, texture_size) = (self.params.raster(), self.params.texture_size);
        let size = search::adjust_font_size(|font_size| {
            pack_atlas(source, chars, settings, font_size, texture_size).is_some()
        })?;
        self.params.font_size = size;
        Some(size)
    }

    /// Finds the smallest texture that fits the configured font size and
    /// makes it the texture size of this conversion.
    pub fn adjust_texture_size(&mut self) -> Option<u32> {
        let (source, chars) = (&mut self.source, &self.chars);
        let (settings, font_size) = (self.params.raster(), self.params.font_size);
        let size = search::adjust_texture_size(|texture_size| {
            pack_atlas(source, chars, settings, font_size, texture_size).is_some()
        })?;
        self.params.texture_size = size;
        Some(size)
    }

    /// Resolves the sizes for the configured mode, then writes the atlas
    /// image and the font description next to the font.
    ///
    /// Nothing is written unless the characters fit. The image is written
    /// first, so it is left behind if writing the description fails.
    pub fn convert(&mut self) -> Result<Conversion> {
        let resolved = match self.params.mode {
            Mode::Generate => true,
            Mode::AdjustFontSize => self.adjust_font_size().is_some(),
            Mode::AdjustTextureSize => self.adjust_texture_size().is_some(),
        };
        if !resolved {
            return Err(Error::DoesNotFit);
        }

        let (font_size, texture_size) = (self.params.font_size, self.params.texture_size);
        log::info!("Packing chars into texture...");
        let mut atlas = self
            .try_pack(font_size, texture_size)
            .ok_or(Error::DoesNotFit)?;
        log::info!(
            "{} chars packed at size {font_size} into {texture_size}x{texture_size}",
            atlas.len()
        );

        let kerning_pairs = collect_kerning(&mut self.source, &mut atlas, self.params.scale)?;
        let image = compose_atlas(&mut self.source, &self.chars, &atlas, self.params.raster())?;

        let image_path = self.params.image_path();
        log::info!("Storing image...");
        image.write_png(&image_path)?;

        let description_path = self.params.description_path();
        log::info!("Storing font description...");
        FontDescription::new(&mut self.source, &atlas, &self.params)?.save(&description_path)?;

        Ok(Conversion {
            font_size,
            texture_size,
            glyph_count: atlas.len(),
            kerning_pairs,
            image_path,
            description_path,
        })
    }
}
