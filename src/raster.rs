use thiserror::Error;

/// Interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    #[error("raster has zero width or height")]
    Empty,
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A decoded RGBA8 bitmap, row-major, top-to-bottom.
///
/// Immutable once built. A new drop produces a new `RasterImage` rather than
/// mutating the old one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::Empty);
        }
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(RasterError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

impl TryFrom<image::RgbaImage> for RasterImage {
    type Error = RasterError;

    fn try_from(buffer: image::RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = buffer.dimensions();
        Self::from_rgba(width, height, buffer.into_raw())
    }
}

/// Axis-aligned region in source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn fits_within(&self, source: &RasterImage) -> bool {
        let right = self.x as u64 + self.width as u64;
        let bottom = self.y as u64 + self.height as u64;
        right <= source.width as u64 && bottom <= source.height as u64
    }
}

/// Copies `rect` out of `source` into a new raster of `rect.width x rect.height`.
///
/// Channels are copied verbatim, one row slice at a time. The rectangle must
/// lie inside `source`; an out-of-bounds rectangle panics on the row slice.
pub fn extract(source: &RasterImage, rect: CropRect) -> RasterImage {
    debug_assert!(rect.fits_within(source), "{rect:?} exceeds source bounds");

    let stride = source.width as usize * CHANNELS;
    let row_len = rect.width as usize * CHANNELS;
    let mut pixels = Vec::with_capacity(row_len * rect.height as usize);

    for y in rect.y..rect.y + rect.height {
        let start = y as usize * stride + rect.x as usize * CHANNELS;
        pixels.extend_from_slice(&source.pixels[start..start + row_len]);
    }

    RasterImage {
        width: rect.width,
        height: rect.height,
        pixels,
    }
}
