//! Rasterized snapshot of the host view.

use crate::error::SnapshotError;

/// Straight-alpha RGBA8 pixels, row-major, no row padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Bytes per pixel.
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Wraps RGBA8 pixel data.
    ///
    /// # Errors
    ///
    /// Fails on a zero dimension or if `pixels` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SnapshotError> {
        if width == 0 || height == 0 {
            return Err(SnapshotError::Empty { width, height });
        }
        let expected = u64::from(width) * u64::from(height) * u64::from(Self::BYTES_PER_PIXEL);
        if pixels.len() as u64 != expected {
            return Err(SnapshotError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { width, height, pixels })
    }

    /// A single-color snapshot.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let pixels = rgba.iter().copied().cycle().take(count * 4).collect();
        Self { width, height, pixels }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes per row.
    #[must_use]
    pub const fn bytes_per_row(&self) -> u32 {
        self.width * Self::BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
