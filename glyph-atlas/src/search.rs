//! Searching for the font or texture size that makes an atlas fit.
//!
//! Both searches take a predicate that answers whether the character set
//! packs at a given size. The font size is maximized, since a larger size
//! gives better glyphs, while the texture size is minimized, since a larger
//! texture only costs memory. Both probe sequences are fixed, so the same
//! predicate always yields the same result.

use crate::params::{DEFAULT_FONT_SIZE, DEFAULT_TEXTURE_SIZE, MAX_TEXTURE_SIZE, MIN_TEXTURE_SIZE};

/// Finds a large font size for which `fits` holds.
///
/// Starts at 16 and doubles before each probe, so the first size tried is
/// 32. Doubling stops at the first failure, the last interval is bisected
/// and finally the size steps down by one until it fits. Returns `None` if
/// not even size 1 fits.
///
/// ```
/// assert_eq!(glyph_atlas::adjust_font_size(|size| size <= 40), Some(40));
/// ```
pub fn adjust_font_size(mut fits: impl FnMut(u32) -> bool) -> Option<u32> {
    log::info!("Adjusting font size...");
    let mut probe = |size: u32| {
        let ok = fits(size);
        log::debug!("font size {size}: {}", if ok { "fits" } else { "too big" });
        ok
    };

    let mut size = DEFAULT_FONT_SIZE / 2;
    let mut fitting = true;
    while fitting {
        let Some(next) = size.checked_mul(2) else {
            break;
        };
        size = next;
        fitting = probe(size);
    }

    let mut step = size >> 2;
    while step > 0 {
        size = if fitting {
            size.saturating_add(step)
        } else {
            size - step
        };
        step >>= 1;
        fitting = probe(size);
    }

    while !fitting && size > 1 {
        size -= 1;
        fitting = probe(size);
    }

    log::info!("Font size: {size}");
    fitting.then_some(size)
}

/// Finds a small power of two texture size for which `fits` holds.
///
/// Doubles from 512 until the set fits, giving up past
/// [`MAX_TEXTURE_SIZE`], then halves while it still fits. The result is
/// never below [`MIN_TEXTURE_SIZE`].
///
/// ```
/// assert_eq!(glyph_atlas::adjust_texture_size(|size| size >= 300), Some(512));
/// ```
pub fn adjust_texture_size(mut fits: impl FnMut(u32) -> bool) -> Option<u32> {
    log::info!("Adjusting texture size...");
    let mut probe = |size: u32| {
        let ok = fits(size);
        log::debug!("texture size {size}: {}", if ok { "fits" } else { "too small" });
        ok
    };

    let mut size = DEFAULT_TEXTURE_SIZE / 2;
    let mut fitting = false;
    while !fitting && size < MAX_TEXTURE_SIZE {
        size <<= 1;
        fitting = probe(size);
    }
    if !fitting {
        log::info!("no texture up to {MAX_TEXTURE_SIZE} fits");
        return None;
    }

    while fitting && size >= MIN_TEXTURE_SIZE {
        size >>= 1;
        fitting = probe(size);
    }
    // the last probe either failed or went below the minimum
    size = (size << 1).max(MIN_TEXTURE_SIZE);

    log::info!("Texture size: {size}");
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(limit: u32, probes: &mut Vec<u32>) -> impl FnMut(u32) -> bool + '_ {
        move |size| {
            probes.push(size);
            size <= limit
        }
    }

    #[test]
    fn font_size_exact_threshold() {
        for limit in [1, 2, 15, 16, 17, 31, 32, 33, 47, 100, 127, 128, 129, 1000] {
            assert_eq!(adjust_font_size(|size| size <= limit), Some(limit), "{limit}");
        }
    }

    #[test]
    fn font_size_probe_sequence() {
        let mut probes = Vec::new();
        assert_eq!(adjust_font_size(recording(40, &mut probes)), Some(40));
        // 32 fits, 64 fails; 64-16, 48-8, 40+4, 44-2, 42-1; then down to 40
        assert_eq!(probes, vec![32, 64, 48, 40, 44, 42, 41, 40]);
    }

    #[test]
    fn font_size_is_deterministic() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        let a = adjust_font_size(recording(77, &mut first));
        let b = adjust_font_size(recording(77, &mut second));
        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[test]
    fn font_size_nothing_fits() {
        assert_eq!(adjust_font_size(|_| false), None);
    }

    #[test]
    fn texture_size_threshold() {
        let cases = [
            (1, 64),
            (64, 64),
            (65, 128),
            (300, 512),
            (512, 512),
            (513, 1024),
            (4096, 4096),
        ];
        for (needed, expected) in cases {
            assert_eq!(
                adjust_texture_size(|size| size >= needed),
                Some(expected),
                "{needed}"
            );
        }
    }

    #[test]
    fn texture_size_never_probes_past_maximum() {
        let mut probes = Vec::new();
        let result = adjust_texture_size(|size| {
            probes.push(size);
            false
        });
        assert_eq!(result, None);
        assert_eq!(probes, vec![512, 1024, 2048, 4096]);
    }

    #[test]
    fn texture_size_shrinks_below_start() {
        let mut probes = Vec::new();
        let result = adjust_texture_size(|size| {
            probes.push(size);
            size >= 100
        });
        assert_eq!(result, Some(128));
        assert_eq!(probes, vec![512, 256, 128, 64]);
    }
}
