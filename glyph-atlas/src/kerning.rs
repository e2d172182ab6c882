//! Kerning between every pair of packed characters.

use crate::compose::Progress;
use crate::error::Result;
use crate::pack::PackedAtlas;
use crate::source::{GlyphSource, NOTDEF};

/// Fills the kerning maps of every packed character and returns the number
/// of pairs found.
///
/// Kerning is read at the rasterization size and stored in output pixels.
/// Glyphs are looked up by character id through the active charmap, so the
/// missing glyph placeholder kerns as `.notdef`.
pub fn collect_kerning<S: GlyphSource>(
    source: &mut S,
    atlas: &mut PackedAtlas,
    scale: u32,
) -> Result<usize> {
    log::info!("Preparing kerning information...");
    let mut source = source.scoped_size(atlas.font_size.saturating_mul(scale))?;
    let scale = scale.max(1) as f32;

    let glyphs: Vec<_> = atlas
        .glyphs()
        .map(|desc| (desc.id(), source.glyph_index(desc.id()).unwrap_or(NOTDEF)))
        .collect();
    let mut progress = Progress::new(glyphs.len(), "done");
    let mut count = 0;

    for (index, (desc, &(_, left))) in atlas.glyphs_mut().zip(&glyphs).enumerate() {
        desc.kerning.clear();
        for &(right_id, right) in &glyphs {
            match source.kerning(left, right) {
                Some(0) | None => {}
                Some(x) => {
                    desc.kerning.insert(right_id, x as f32 / 64.0 / scale);
                    count += 1;
                }
            }
        }
        progress.report(index + 1);
    }

    log::info!("{count} kerning pairs found");
    Ok(count)
}
