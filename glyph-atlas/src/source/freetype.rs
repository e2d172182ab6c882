use std::{
    borrow::Borrow,
    path::{Path, PathBuf},
    sync::Arc,
};

use ::freetype::{
    face::{KerningMode, LoadFlag},
    ffi::{FT_Get_Char_Index, FT_Set_Charmap, FT_ULong},
    Face, Library, RenderMode as FtRenderMode,
};

use super::{GlyphIndex, GlyphMetrics, GlyphSource, RenderMode, RenderedGlyph, SizeMetrics};
use crate::{
    bitmap::AlphaMap,
    error::{Error, Result},
    params::DEFAULT_FONT_SIZE,
};

/// A font file opened through FreeType.
pub struct FreeTypeFont {
    path: PathBuf,
    face: Face<SharedFontData>,
    size: u32,
    // the face holds a reference to the library; keep it alive alongside
    _library: Library,
}

impl FreeTypeFont {
    /// Opens the first face of a font file and sizes it to the default
    /// font size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let file = std::fs::File::open(&path).map_err(|source| Error::FontOpen {
            path: path.clone(),
            source,
        })?;
        // SAFETY: the mapping is read-only and lives as long as the face
        let map = unsafe { memmap2::Mmap::map(&file) }.map_err(|source| Error::FontOpen {
            path: path.clone(),
            source,
        })?;
        let data = SharedFontData(Arc::new(map));
        let load_error = |source| Error::FontLoad {
            path: path.clone(),
            source,
        };
        let library = Library::init().map_err(load_error)?;
        let face = library.new_memory_face2(data, 0).map_err(load_error)?;
        let mut font = Self {
            path,
            face,
            size: 0,
            _library: library,
        };
        font.set_size(DEFAULT_FONT_SIZE)?;
        Ok(font)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn charmap_count(&self) -> usize {
        self.face.raw().num_charmaps.max(0) as usize
    }

    fn load(&self, glyph: GlyphIndex, mode: RenderMode) -> Option<()> {
        self.face.load_glyph(glyph, LoadFlag::DEFAULT).ok()?;
        let mode = match mode {
            RenderMode::Mono => FtRenderMode::Mono,
            RenderMode::Normal => FtRenderMode::Normal,
        };
        self.face.glyph().render_glyph(mode).ok()
    }

    fn slot_metrics(&self) -> GlyphMetrics {
        let slot = self.face.glyph();
        let bitmap = slot.bitmap();
        GlyphMetrics {
            width: bitmap.width().max(0) as u32,
            rows: bitmap.rows().max(0) as u32,
            left: slot.bitmap_left(),
            top: slot.bitmap_top(),
            advance: slot.advance().x as i64,
        }
    }

    /// Multiplies font units by the active vertical scale, in pixels.
    fn scale_y(&self, units: i64) -> f32 {
        let y_scale = self
            .face
            .size_metrics()
            .map(|metrics| metrics.y_scale as i64)
            .unwrap_or_default();
        // FT_MulFix: 16.16 scale, rounded, yielding 26.6
        let scaled = (units * y_scale + 0x8000) >> 16;
        scaled as f32 / 64.0
    }
}

impl GlyphSource for FreeTypeFont {
    fn size(&self) -> u32 {
        self.size
    }

    fn set_size(&mut self, pixels: u32) -> Result<()> {
        if pixels == 0 {
            return Err(Error::FontSize { pixels });
        }
        self.face
            .set_pixel_sizes(0, pixels)
            .map_err(|_| Error::FontSize { pixels })?;
        self.size = pixels;
        Ok(())
    }

    fn set_charmap(&mut self, index: usize) -> bool {
        if index >= self.charmap_count() {
            return false;
        }
        let raw = self.face.raw_mut();
        // SAFETY: index was checked against num_charmaps
        let charmap = unsafe { *raw.charmaps.add(index) };
        // SAFETY: the face is live and the charmap belongs to it
        unsafe { FT_Set_Charmap(raw as *mut _, charmap) == 0 }
    }

    fn glyph_index(&mut self, code_point: u32) -> Option<GlyphIndex> {
        let raw = self.face.raw_mut();
        // SAFETY: the face is live; unmapped code points yield glyph 0
        let glyph = unsafe { FT_Get_Char_Index(raw as *mut _, code_point as FT_ULong) };
        (glyph != 0).then_some(glyph)
    }

    fn render_glyph(&mut self, glyph: GlyphIndex, mode: RenderMode) -> Option<RenderedGlyph> {
        self.load(glyph, mode)?;
        let metrics = self.slot_metrics();
        let bitmap = self.face.glyph().bitmap();
        let (width, rows) = (metrics.width as usize, metrics.rows as usize);
        let coverage = if width == 0 || rows == 0 {
            AlphaMap::new(width, rows)
        } else {
            let pitch = bitmap.pitch().unsigned_abs() as usize;
            match mode {
                RenderMode::Mono => AlphaMap::from_mono(width, rows, pitch, bitmap.buffer()),
                RenderMode::Normal => AlphaMap::from_gray(width, rows, pitch, bitmap.buffer()),
            }
        };
        Some(RenderedGlyph { metrics, coverage })
    }

    fn measure_glyph(&mut self, glyph: GlyphIndex, mode: RenderMode) -> Option<GlyphMetrics> {
        self.load(glyph, mode)?;
        Some(self.slot_metrics())
    }

    fn size_metrics(&self) -> SizeMetrics {
        self.face
            .size_metrics()
            .map(|metrics| SizeMetrics {
                height: metrics.height as i64,
                descender: metrics.descender as i64,
            })
            .unwrap_or_default()
    }

    fn line_height(&self) -> f32 {
        let bbox = self.face.raw().bbox;
        self.scale_y(bbox.yMax as i64 - bbox.yMin as i64)
    }

    fn baseline(&self) -> f32 {
        self.scale_y(self.face.raw().bbox.yMax as i64)
    }

    fn kerning(&mut self, left: GlyphIndex, right: GlyphIndex) -> Option<i64> {
        self.face
            .get_kerning(left, right, KerningMode::KerningDefault)
            .ok()
            .map(|vector| vector.x as i64)
    }
}

#[derive(Clone)]
pub struct SharedFontData(Arc<memmap2::Mmap>);

impl Borrow<[u8]> for SharedFontData {
    fn borrow(&self) -> &[u8] {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RECTS_TTF;

    fn rects(size: u32) -> FreeTypeFont {
        let mut font = FreeTypeFont::open(RECTS_TTF).unwrap();
        font.set_size(size).unwrap();
        font
    }

    #[test]
    fn open_sizes_to_default() {
        let font = FreeTypeFont::open(RECTS_TTF).unwrap();
        assert_eq!(font.size(), DEFAULT_FONT_SIZE);
        assert_eq!(font.path(), Path::new(RECTS_TTF));
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut font = rects(10);
        assert!(matches!(font.set_size(0), Err(Error::FontSize { pixels: 0 })));
        assert_eq!(font.size(), 10);
    }

    #[test]
    fn char_to_glyph() {
        let mut font = rects(10);
        assert_eq!(font.glyph_index(' ' as u32), Some(1));
        assert_eq!(font.glyph_index('A' as u32), Some(2));
        assert_eq!(font.glyph_index('V' as u32), Some(3));
        assert_eq!(font.glyph_index('B' as u32), None);
        assert_eq!(font.glyph_index(0), None);
    }

    #[test]
    fn charmap_selection_is_bounded() {
        let mut font = rects(10);
        assert_eq!(font.charmap_count(), 2);
        assert!(font.set_charmap(1));
        assert_eq!(font.glyph_index('A' as u32), Some(2));
        assert!(font.set_charmap(0));
        assert!(!font.set_charmap(2));
        assert!(!font.set_charmap(usize::MAX));
        assert_eq!(font.glyph_index('V' as u32), Some(3));
    }

    #[test]
    fn render_mono() {
        let mut font = rects(10);
        let glyph = font.render_glyph(2, RenderMode::Mono).unwrap();
        assert_eq!(
            glyph.metrics,
            GlyphMetrics {
                width: 5,
                rows: 7,
                left: 1,
                top: 7,
                advance: 7 * 64,
            }
        );
        assert_eq!((glyph.coverage.width(), glyph.coverage.height()), (5, 7));
        assert!(glyph.coverage.as_bytes().iter().all(|value| *value == 255));

        let glyph = font.render_glyph(3, RenderMode::Mono).unwrap();
        assert_eq!((glyph.metrics.left, glyph.metrics.top), (0, 5));
        assert_eq!(glyph.metrics.advance, 5 * 64);
    }

    #[test]
    fn render_mono_rows_span_bytes() {
        // ten pixels per row take two bytes of the mono bitmap
        let mut font = rects(20);
        let glyph = font.render_glyph(2, RenderMode::Mono).unwrap();
        assert_eq!((glyph.metrics.width, glyph.metrics.rows), (10, 14));
        assert_eq!(glyph.coverage.as_bytes(), &[255; 140][..]);
    }

    #[test]
    fn render_greyscale() {
        let mut font = rects(10);
        let glyph = font.render_glyph(2, RenderMode::Normal).unwrap();
        assert_eq!((glyph.coverage.width(), glyph.coverage.height()), (5, 7));
        assert!(glyph.coverage.as_bytes().iter().all(|value| *value == 255));

        let space = font.render_glyph(1, RenderMode::Normal).unwrap();
        assert!(space.coverage.is_empty());
        assert_eq!((space.metrics.width, space.metrics.rows), (0, 0));
        assert_eq!(space.metrics.advance, 3 * 64);
    }

    #[test]
    fn measure_matches_render() {
        let mut font = rects(20);
        let measured = font.measure_glyph(3, RenderMode::Mono).unwrap();
        let rendered = font.render_glyph(3, RenderMode::Mono).unwrap();
        assert_eq!(measured, rendered.metrics);
    }

    #[test]
    fn line_metrics_follow_size() {
        let font = rects(10);
        assert_eq!(font.line_height(), 10.0);
        assert_eq!(font.baseline(), 8.0);
        assert_eq!(
            font.size_metrics(),
            SizeMetrics {
                height: 10 * 64,
                descender: -2 * 64,
            }
        );

        let font = rects(20);
        assert_eq!(font.line_height(), 20.0);
        assert_eq!(font.baseline(), 16.0);
    }

    #[test]
    fn kerning_pairs() {
        let mut font = rects(20);
        assert_eq!(font.kerning(2, 3), Some(-2 * 64));
        assert_eq!(font.kerning(3, 2), Some(0));
        assert_eq!(font.kerning(2, 2), Some(0));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FreeTypeFont::open("no/such/font.ttf").err().unwrap();
        assert!(matches!(err, Error::FontOpen { .. }));
        assert!(err.to_string().contains("no/such/font.ttf"));
    }

    #[test]
    fn garbage_file_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = FreeTypeFont::open(&path).err().unwrap();
        assert!(matches!(err, Error::FontLoad { .. }));
    }
}
