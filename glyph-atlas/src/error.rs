//! Errors produced while generating a font atlas.

use std::path::PathBuf;

use thiserror::Error;

/// An error that stops atlas generation.
///
/// Invalid parameters are never reported here: they are replaced by
/// defaults when [`RawParams`](crate::RawParams) are resolved.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open font file '{}': {source}", path.display())]
    FontOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load font '{}': {source}", path.display())]
    FontLoad {
        path: PathBuf,
        source: freetype::Error,
    },

    #[error("font cannot be sized to {pixels} pixels")]
    FontSize { pixels: u32 },

    #[error("failed to read character list '{}': {source}", path.display())]
    CharList {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("font doesn't contain space character, this font could not be converted")]
    MissingSpaceGlyph,

    #[error("chars will not fit into texture")]
    DoesNotFit,

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode png: {0}")]
    Png(#[from] png::EncodingError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
