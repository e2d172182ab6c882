//! The YAML-like `.fnt` font description.
//!
//! ```text
//! font:
//!   name:
//!   size: 32
//!   lineHeight: 37
//!   ...
//!   chars:
//!     65: {xoffset: 2, yoffset: 0, width: 20, ...}
//!   kerning:
//!     65: {86: -4}
//! ```

use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::error::{Error, Result};
use crate::pack::PackedAtlas;
use crate::params::Params;
use crate::source::GlyphSource;

/// Everything written to a font description.
#[derive(Clone, Debug)]
pub struct FontDescription<'a> {
    atlas: &'a PackedAtlas,
    line_height: u32,
    baseline_height: u32,
    distance_field: bool,
    spread: u32,
}

impl<'a> FontDescription<'a> {
    /// Reads the line metrics at the atlas font size.
    pub fn new<S: GlyphSource>(
        source: &mut S,
        atlas: &'a PackedAtlas,
        params: &Params,
    ) -> Result<Self> {
        let source = source.scoped_size(atlas.font_size)?;
        Ok(Self {
            atlas,
            line_height: source.line_height().ceil() as u32,
            baseline_height: source.baseline().ceil() as u32,
            distance_field: params.output.is_distance_field(),
            spread: params.spread,
        })
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    pub fn baseline_height(&self) -> u32 {
        self.baseline_height
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        let atlas = self.atlas;
        writeln!(w, "font:")?;
        writeln!(w, "  name: ")?;
        writeln!(w, "  size: {}", atlas.font_size)?;
        writeln!(w, "  lineHeight: {}", self.line_height)?;
        writeln!(w, "  baselineHeight: {}", self.baseline_height)?;
        writeln!(w, "  scaleW: {}", atlas.texture_size)?;
        writeln!(w, "  scaleH: {}", atlas.texture_size)?;
        writeln!(w, "  distanceFieldFont: {}", self.distance_field)?;
        writeln!(w, "  spread: {}", self.spread)?;

        writeln!(w, "  chars: ")?;
        for desc in atlas.glyphs() {
            let uv = desc.uv(atlas.texture_size);
            writeln!(
                w,
                "    {}: {{xoffset: {}, yoffset: {}, width: {}, height: {}, xadvance: {}, u: {}, v: {}, u2: {}, v2: {}}}",
                desc.id(),
                Float(desc.x_offset),
                Float(desc.y_offset),
                desc.width,
                desc.height,
                Float(desc.x_advance),
                Float(uv.u),
                Float(uv.v),
                Float(uv.u2),
                Float(uv.v2),
            )?;
        }

        if atlas.kerning_pairs() > 0 {
            writeln!(w, "  kerning:")?;
            for desc in atlas.glyphs().filter(|desc| !desc.kerning.is_empty()) {
                write!(w, "    {}: {{", desc.id())?;
                for (i, (right, value)) in desc.kerning.iter().enumerate() {
                    if i > 0 {
                        write!(w, ", ")?;
                    }
                    write!(w, "{right}: {}", Float(*value))?;
                }
                writeln!(w, "}}")?;
            }
        }
        w.flush()
    }

    /// Writes the description to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let write_error = |source| Error::Write {
            path: path.to_owned(),
            source,
        };
        let file = File::create(path).map_err(write_error)?;
        self.write_to(BufWriter::new(file)).map_err(write_error)
    }
}

/// Formats a float the way a default C++ output stream does: six
/// significant digits, trailing zeros dropped, exponent notation for very
/// large and very small magnitudes.
#[derive(Copy, Clone, Debug)]
pub struct Float(pub f32);

impl Float {
    const PRECISION: i32 = 6;
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0 as f64;
        if value == 0.0 {
            return f.write_str(if value.is_sign_negative() { "-0" } else { "0" });
        }
        if value.is_nan() {
            return f.write_str("nan");
        }
        if value.is_infinite() {
            return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }

        let scientific = format!("{:.*e}", (Self::PRECISION - 1) as usize, value);
        let (mantissa, exponent) = scientific.split_once('e').ok_or(fmt::Error)?;
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if (-4..Self::PRECISION).contains(&exponent) {
            let decimals = (Self::PRECISION - 1 - exponent) as usize;
            let fixed = format!("{value:.decimals$}");
            f.write_str(trim_fraction(&fixed))
        } else {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(
                f,
                "{}e{sign}{:02}",
                trim_fraction(mantissa),
                exponent.unsigned_abs()
            )
        }
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
