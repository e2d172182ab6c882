//! Row-addressed pixel buffers.
//!
//! Glyph buffers and the atlas are flat byte vectors; these wrappers keep all
//! offset arithmetic in one place and clip every access to the buffer bounds.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::error::{Error, Result};

/// A single-channel 8-bit image stored row by row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlphaMap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl AlphaMap {
    /// A zeroed map.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Wraps existing row-major data.
    ///
    /// # Panics
    ///
    /// If `data` does not hold exactly `width * height` bytes.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), width * height, "alpha map size mismatch");
        Self {
            width,
            height,
            data,
        }
    }

    /// Expands a 1 bit per pixel, most significant bit first bitmap to 0/255.
    pub fn from_mono(width: usize, height: usize, pitch: usize, bits: &[u8]) -> Self {
        let mut map = Self::new(width, height);
        for (y, row) in map.data.chunks_exact_mut(width.max(1)).take(height).enumerate() {
            let src = &bits[y * pitch..];
            for (x, pixel) in row.iter_mut().enumerate() {
                let bit = (src[x >> 3] >> (7 - (x & 7))) & 1;
                *pixel = 255 * bit;
            }
        }
        map
    }

    /// Copies an 8 bit per pixel bitmap with the given row pitch.
    pub fn from_gray(width: usize, height: usize, pitch: usize, bytes: &[u8]) -> Self {
        let mut map = Self::new(width, height);
        for (y, row) in map.data.chunks_exact_mut(width.max(1)).take(height).enumerate() {
            let start = y * pitch;
            row.copy_from_slice(&bytes[start..start + width]);
        }
        map
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The value at (x, y), or 0 outside the map.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0
        }
    }

    /// Writes (x, y); writes outside the map are dropped.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Copies `src` with its top left corner at (x, y), clipped to this map.
    pub fn copy_from(&mut self, src: &AlphaMap, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let columns = src.width.min(self.width - x);
        for row in 0..src.height.min(self.height - y) {
            let dst_start = (y + row) * self.width + x;
            self.data[dst_start..dst_start + columns].copy_from_slice(&src.row(row)[..columns]);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// The square RGBA8 atlas.
///
/// Glyphs are written as white with the coverage or distance in the alpha
/// channel, so renderers can tint them freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtlasImage {
    size: usize,
    data: Vec<u8>,
}

impl AtlasImage {
    const CHANNELS: usize = 4;

    /// A transparent black atlas of `size × size` pixels.
    pub fn new(size: u32) -> Self {
        let size = size as usize;
        Self {
            size,
            data: vec![0; size * size * Self::CHANNELS],
        }
    }

    pub fn size(&self) -> u32 {
        self.size as u32
    }

    /// Writes `width × height` pixels of `alpha` at (x, y).
    ///
    /// The region is clipped to the atlas and to `alpha`.
    pub fn blit(&mut self, alpha: &AlphaMap, x: u32, y: u32, width: u32, height: u32) {
        let (x, y) = (x as usize, y as usize);
        if x >= self.size || y >= self.size {
            return;
        }
        let columns = (width as usize).min(alpha.width()).min(self.size - x);
        let rows = (height as usize).min(alpha.height()).min(self.size - y);
        for row in 0..rows {
            let start = ((y + row) * self.size + x) * Self::CHANNELS;
            let dst = &mut self.data[start..start + columns * Self::CHANNELS];
            for (pixel, coverage) in dst
                .chunks_exact_mut(Self::CHANNELS)
                .zip(&alpha.row(row)[..columns])
            {
                pixel.copy_from_slice(&[0xff, 0xff, 0xff, *coverage]);
            }
        }
    }

    /// The RGBA value at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let start = (y as usize * self.size + x as usize) * Self::CHANNELS;
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.data[start..start + Self::CHANNELS]);
        pixel
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Encodes the atlas as an 8-bit RGBA PNG.
    pub fn encode_png<W: Write>(&self, w: W) -> Result<()> {
        let mut encoder = png::Encoder::new(w, self.size(), self.size());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.data)?;
        writer.finish()?;
        Ok(())
    }

    /// Writes the atlas to a PNG file, replacing any existing file.
    pub fn write_png(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Write {
            path: path.to_owned(),
            source,
        })?;
        self.encode_png(BufWriter::new(file))
    }
}
