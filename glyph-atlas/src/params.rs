//! Generation parameters and their defaults.

use std::path::{Path, PathBuf};

use crate::source::RenderMode;

/// Smallest supported atlas edge, in pixels.
pub const MIN_TEXTURE_SIZE: u32 = 64;
/// Largest supported atlas edge, in pixels.
pub const MAX_TEXTURE_SIZE: u32 = 4096;
/// Largest accepted oversampling factor.
pub const MAX_SCALE: u32 = 64;
/// Largest accepted distance field spread, in output pixels.
pub const MAX_SPREAD: u32 = 64;

pub const DEFAULT_FONT_SIZE: u32 = 32;
pub const DEFAULT_MAX_CHAR: u32 = 128;
pub const DEFAULT_SCALE: u32 = 16;
pub const DEFAULT_SPREAD: u32 = 2;
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;
pub const DEFAULT_CHARMAP: usize = 0;

/// What a run resolves before producing output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Use the requested font and texture sizes as-is.
    #[default]
    Generate,
    /// Find the largest font size that fits the requested texture.
    AdjustFontSize,
    /// Find the smallest texture that fits the requested font size.
    AdjustTextureSize,
}

impl Mode {
    /// Parses the command line spelling of a mode.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "generate" => Some(Self::Generate),
            "adjustfont" => Some(Self::AdjustFontSize),
            "adjusttexture" => Some(Self::AdjustTextureSize),
            _ => None,
        }
    }
}

/// The kind of atlas to produce.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputKind {
    /// Anti-aliased coverage, rendered at the final size.
    Graphic,
    /// Signed distance field computed from an oversampled monochrome raster.
    #[default]
    DistanceField,
}

impl OutputKind {
    /// Parses the command line spelling of an output kind.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gf" => Some(Self::Graphic),
            "dff" => Some(Self::DistanceField),
            _ => None,
        }
    }

    pub fn is_distance_field(self) -> bool {
        self == Self::DistanceField
    }
}

/// Where the set of characters comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CharSource {
    /// Every code point in `0..=max`.
    MaxChar(u32),
    /// All characters found in a UTF-8 text file.
    List(PathBuf),
}

/// Parameters as supplied by the user; anything may be missing or invalid.
///
/// Numeric fields are signed so that out of range input can be detected and
/// replaced rather than rejected.
#[derive(Clone, Debug, Default)]
pub struct RawParams {
    pub font: PathBuf,
    pub char_list: Option<PathBuf>,
    pub max_char: Option<i64>,
    pub spread: Option<i64>,
    pub scale: Option<i64>,
    pub mode: Option<String>,
    pub font_size: Option<i64>,
    pub texture_size: Option<i64>,
    pub charmap: Option<i64>,
    pub output: Option<String>,
}

impl RawParams {
    pub fn new(font: impl Into<PathBuf>) -> Self {
        Self {
            font: font.into(),
            ..Default::default()
        }
    }

    /// Replaces every unset or out of range value with its default.
    pub fn resolve(self) -> Params {
        fn positive(value: Option<i64>, default: u32) -> u32 {
            value
                .filter(|v| *v > 0)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(default)
        }
        fn bounded(value: Option<i64>, min: i64, max: u32, default: u32) -> u32 {
            value
                .filter(|v| (min..=max as i64).contains(v))
                .map(|v| v as u32)
                .unwrap_or(default)
        }

        let output = self
            .output
            .as_deref()
            .and_then(OutputKind::from_name)
            .unwrap_or_default();
        let texture_size = self
            .texture_size
            .filter(|size| (MIN_TEXTURE_SIZE as i64..=MAX_TEXTURE_SIZE as i64).contains(size))
            .map(|size| size as u32)
            .unwrap_or(DEFAULT_TEXTURE_SIZE);
        let chars = match self.char_list {
            Some(path) if !path.as_os_str().is_empty() => CharSource::List(path),
            _ => CharSource::MaxChar(positive(self.max_char, DEFAULT_MAX_CHAR)),
        };
        let mut params = Params {
            font: self.font,
            mode: self
                .mode
                .as_deref()
                .and_then(Mode::from_name)
                .unwrap_or_default(),
            output,
            font_size: positive(self.font_size, DEFAULT_FONT_SIZE),
            chars,
            scale: bounded(self.scale, 1, MAX_SCALE, DEFAULT_SCALE),
            spread: bounded(self.spread, 0, MAX_SPREAD, DEFAULT_SPREAD),
            texture_size,
            charmap: self
                .charmap
                .filter(|v| *v >= 0)
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(DEFAULT_CHARMAP),
        };
        if output == OutputKind::Graphic {
            // oversampling only makes sense ahead of a distance transform
            params.scale = 1;
        }
        params
    }
}

/// Resolved, validated parameters for a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub font: PathBuf,
    pub mode: Mode,
    pub output: OutputKind,
    /// Output font size in pixels.
    pub font_size: u32,
    pub chars: CharSource,
    /// Oversampling factor; always 1 for graphic output.
    pub scale: u32,
    /// Distance field spread in output pixels.
    pub spread: u32,
    /// Edge of the square atlas in pixels.
    pub texture_size: u32,
    /// Index of the face charmap to select.
    pub charmap: usize,
}

impl Params {
    /// Default parameters for the given font file.
    pub fn new(font: impl Into<PathBuf>) -> Self {
        RawParams::new(font).resolve()
    }

    pub fn raster(&self) -> RasterSettings {
        RasterSettings {
            output: self.output,
            scale: self.scale,
            spread: self.spread,
        }
    }

    /// Path of the generated atlas image.
    pub fn image_path(&self) -> PathBuf {
        with_suffix(&self.font, ".png")
    }

    /// Path of the generated font description.
    pub fn description_path(&self) -> PathBuf {
        with_suffix(&self.font, ".fnt")
    }
}

/// The parameters that govern how glyphs are rasterized and measured.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RasterSettings {
    pub output: OutputKind,
    pub scale: u32,
    pub spread: u32,
}

impl RasterSettings {
    /// Spread in rasterization pixels; also the border added on each side
    /// of a glyph raster.
    pub fn scaled_spread(&self) -> u32 {
        self.spread.saturating_mul(self.scale)
    }

    /// Rasterization size for an output font size.
    pub fn raster_size(&self, font_size: u32) -> u32 {
        font_size.saturating_mul(self.scale)
    }

    pub fn render_mode(&self) -> RenderMode {
        match self.output {
            OutputKind::DistanceField => RenderMode::Mono,
            OutputKind::Graphic => RenderMode::Normal,
        }
    }
}

// `Arial.ttf` becomes `Arial.ttf.png`; the font extension is kept.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    name.into()
}
