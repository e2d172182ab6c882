//! Signed distance fields from oversampled monochrome rasters.

use crate::bitmap::AlphaMap;

/// Converts a raster rendered at `scale` times the output size into a
/// distance field at the output size.
///
/// Distances are measured in raster pixels and saturate at
/// `spread * scale`, so each output pixel encodes at most `spread` output
/// pixels of distance on either side of an edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DistanceField {
    pub spread: u32,
    pub scale: u32,
}

impl DistanceField {
    pub fn new(spread: u32, scale: u32) -> Self {
        Self { spread, scale }
    }

    /// Search radius in raster pixels.
    pub fn radius(&self) -> u32 {
        self.spread.saturating_mul(self.scale)
    }

    /// Downsamples `input` by `scale`, storing the distance at the centre of
    /// every output pixel's footprint.
    pub fn build(&self, input: &AlphaMap) -> AlphaMap {
        let scale = self.scale.max(1) as usize;
        let width = input.width() / scale;
        let height = input.height() / scale;
        let mut output = AlphaMap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let distance =
                    self.find_signed_distance(input, x * scale + scale / 2, y * scale + scale / 2);
                output.set(x, y, self.distance_to_alpha(distance));
            }
        }
        output
    }

    /// Distance from (cx, cy) to the nearest pixel of opposite coverage.
    ///
    /// Positive inside the shape, negative outside. Only pixels within
    /// [`radius`](Self::radius) on both axes are examined and the magnitude
    /// never exceeds the radius.
    pub fn find_signed_distance(&self, input: &AlphaMap, cx: usize, cy: usize) -> f32 {
        let inside = input.get(cx, cy) != 0;
        let radius = self.radius() as usize;

        let x_range = cx.saturating_sub(radius)
            ..=cx.saturating_add(radius).min(input.width().saturating_sub(1));
        let y_range = cy.saturating_sub(radius)
            ..=cy.saturating_add(radius).min(input.height().saturating_sub(1));

        let mut min_square = (radius as u64).saturating_mul(radius as u64);
        for y in y_range {
            for x in x_range.clone() {
                if (input.get(x, y) != 0) != inside {
                    let dx = cx.abs_diff(x) as u64;
                    let dy = cy.abs_diff(y) as u64;
                    min_square = min_square.min(dx * dx + dy * dy);
                }
            }
        }

        let distance = (min_square as f32).sqrt().min(radius as f32);
        if inside {
            distance
        } else {
            -distance
        }
    }

    /// Maps a signed distance to alpha, with edges landing at half
    /// intensity.
    pub fn distance_to_alpha(&self, distance: f32) -> u8 {
        let radius = self.radius();
        if radius == 0 {
            return if distance.is_sign_positive() { 0xff } else { 0 };
        }
        let alpha = (0.5 + 0.5 * distance / radius as f32).clamp(0.0, 1.0);
        (alpha * 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(size: usize, cx: i64, cy: i64, radius: i64) -> AlphaMap {
        let mut map = AlphaMap::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let (dx, dy) = (x as i64 - cx, y as i64 - cy);
                if dx * dx + dy * dy <= radius * radius {
                    map.set(x, y, 255);
                }
            }
        }
        map
    }

    #[test]
    fn alpha_mapping() {
        let field = DistanceField::new(2, 1);
        assert_eq!(field.distance_to_alpha(2.0), 255);
        assert_eq!(field.distance_to_alpha(1.0), 191);
        assert_eq!(field.distance_to_alpha(0.0), 127);
        assert_eq!(field.distance_to_alpha(-1.0), 63);
        assert_eq!(field.distance_to_alpha(-2.0), 0);
        assert_eq!(field.distance_to_alpha(-5.0), 0);
        assert_eq!(field.distance_to_alpha(9.0), 255);
    }

    #[test]
    fn zero_radius_is_a_step() {
        let field = DistanceField::new(0, 16);
        assert_eq!(field.distance_to_alpha(0.0), 255);
        assert_eq!(field.distance_to_alpha(-0.0), 0);
        let input = AlphaMap::from_vec(2, 1, vec![255, 0]);
        assert_eq!(field.find_signed_distance(&input, 0, 0), 0.0);
        assert!(field.find_signed_distance(&input, 1, 0).is_sign_negative());
    }

    #[test]
    fn distance_saturates_at_radius() {
        let field = DistanceField::new(2, 2);
        let solid = AlphaMap::from_vec(9, 9, vec![255; 81]);
        assert_eq!(field.find_signed_distance(&solid, 4, 4), 4.0);
        let empty = AlphaMap::new(9, 9);
        assert_eq!(field.find_signed_distance(&empty, 0, 8), -4.0);
    }

    #[test]
    fn nearest_edge_is_found() {
        let field = DistanceField::new(4, 1);
        // a vertical edge between columns 4 and 5
        let mut input = AlphaMap::new(10, 10);
        for y in 0..10 {
            for x in 0..5 {
                input.set(x, y, 255);
            }
        }
        assert_eq!(field.find_signed_distance(&input, 2, 5), 3.0);
        assert_eq!(field.find_signed_distance(&input, 4, 5), 1.0);
        assert_eq!(field.find_signed_distance(&input, 6, 5), -2.0);
    }

    #[test]
    fn disk_falls_off_monotonically() {
        let field = DistanceField::new(2, 4);
        // output pixel (8, 8) samples (34, 34), the centre of the disk
        let input = disk(64, 34, 34, 20);
        let output = field.build(&input);
        assert_eq!((output.width(), output.height()), (16, 16));

        let row: Vec<u8> = (8..16).map(|x| output.get(x, 8)).collect();
        assert_eq!(row, vec![255, 255, 255, 255, 193, 143, 63, 0]);
        assert!(row.windows(2).all(|pair| pair[0] >= pair[1]));
        // the boundary sits between samples 54 (inside) and 58 (outside)
        assert!(row[5] > 128 && row[6] < 128);

        // the field is symmetric around the centre
        let column: Vec<u8> = (8..16).map(|y| output.get(8, y)).collect();
        assert_eq!(row, column);
    }

    #[test]
    fn disk_edge_is_half_intensity() {
        // wide spread at unit scale, so one pixel of distance is a small step
        let field = DistanceField::new(64, 1);
        let input = disk(33, 16, 16, 8);
        let output = field.build(&input);
        assert_eq!((output.width(), output.height()), (33, 33));

        // (24, 16) is the last pixel inside the disk, (25, 16) the first outside
        let inner = output.get(24, 16);
        let outer = output.get(25, 16);
        assert!(inner.abs_diff(128) <= 1, "{inner}");
        assert!(inner >= 128 && outer < 128, "{inner} {outer}");
        assert_eq!(output.get(16, 8), inner);
        assert_eq!(output.get(16, 16), 143);
    }

    #[test]
    fn huge_radius_saturates() {
        let field = DistanceField::new(70000, 70000);
        assert_eq!(field.radius(), u32::MAX);
        let input = AlphaMap::from_vec(3, 1, vec![255, 255, 0]);
        assert_eq!(field.find_signed_distance(&input, 0, 0), 2.0);
        assert_eq!(field.find_signed_distance(&input, 2, 0), -1.0);
        assert_eq!(field.distance_to_alpha(2.0), 127);
    }

    #[test]
    fn output_is_downsampled() {
        let field = DistanceField::new(2, 16);
        let output = field.build(&AlphaMap::new(100, 40));
        assert_eq!((output.width(), output.height()), (6, 2));
        assert!(output.as_bytes().iter().all(|alpha| *alpha == 0));
    }
}
