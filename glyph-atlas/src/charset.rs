//! Selection of the characters that go into the atlas.

use std::path::Path;

use crate::error::{Error, Result};
use crate::params::{CharSource, Params};
use crate::source::{GlyphIndex, GlyphSource, RenderMode};

/// Code point of the space glyph that stands in for missing characters.
const SPACE: u32 = 0x20;

/// A character placed in the atlas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Character {
    /// A code point the font can render.
    Real(u32),
    /// The placeholder drawn for any character the font cannot produce.
    MissingGlyph,
}

impl Character {
    /// Identifier written to the font description.
    ///
    /// The placeholder is stored as U+FFFF, a noncharacter that is never
    /// selected as a real character.
    pub const MISSING_GLYPH_ID: u32 = 0xFFFF;

    pub fn id(self) -> u32 {
        match self {
            Character::Real(code_point) => code_point,
            Character::MissingGlyph => Self::MISSING_GLYPH_ID,
        }
    }
}

/// A selected character and the glyph used to draw it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CharEntry {
    pub character: Character,
    pub glyph: GlyphIndex,
}

/// Resolves the characters to render.
///
/// Candidates come from the character list file if one is configured and
/// from `0..=max_char` otherwise. A candidate is kept only if the font maps
/// it to a glyph that loads and renders in monochrome. The missing glyph
/// placeholder is always appended last.
pub fn build_char_list<S: GlyphSource>(source: &mut S, params: &Params) -> Result<Vec<CharEntry>> {
    log::info!("Preparing char list...");
    let candidates = match &params.chars {
        CharSource::MaxChar(max) => (0..=*max).collect(),
        CharSource::List(path) => load_char_list(path)?,
    };

    let mut entries = Vec::with_capacity(candidates.len() + 1);
    for code_point in candidates {
        if code_point == Character::MISSING_GLYPH_ID {
            continue;
        }
        let Some(glyph) = source.glyph_index(code_point) else {
            continue;
        };
        if source.measure_glyph(glyph, RenderMode::Mono).is_some() {
            entries.push(CharEntry {
                character: Character::Real(code_point),
                glyph,
            });
        } else {
            log::debug!("skipping U+{code_point:04X}: glyph {glyph} does not render");
        }
    }

    let space = source.glyph_index(SPACE).ok_or(Error::MissingSpaceGlyph)?;
    entries.push(CharEntry {
        character: Character::MissingGlyph,
        glyph: space,
    });

    log::info!("{} characters found", entries.len());
    Ok(entries)
}

/// Reads every code point from a UTF-8 text file, sorted and deduplicated.
///
/// Line breaks are not characters; invalid byte sequences are skipped.
pub fn load_char_list(path: &Path) -> Result<Vec<u32>> {
    let bytes = std::fs::read(path).map_err(|source| Error::CharList {
        path: path.to_owned(),
        source,
    })?;
    Ok(parse_char_list(&bytes, path))
}

fn parse_char_list(bytes: &[u8], path: &Path) -> Vec<u32> {
    let mut code_points = Vec::new();
    for (line_number, line) in bytes.split(|b| *b == b'\n').enumerate() {
        for chunk in line.utf8_chunks() {
            code_points.extend(chunk.valid().chars().map(u32::from));
            if !chunk.invalid().is_empty() {
                log::warn!(
                    "{}:{}: skipping invalid UTF-8 bytes {:02X?}",
                    path.display(),
                    line_number + 1,
                    chunk.invalid()
                );
            }
        }
    }
    code_points.sort_unstable();
    code_points.dedup();
    code_points
}
