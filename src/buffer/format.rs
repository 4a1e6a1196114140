use crate::foundation::error::{PigmentError, PigmentResult};

/// Raw storage layouts a [`crate::Buffer`] can hold.
///
/// `Argb8888Pre` is the canonical working format: native-endian `u32` words laid out as
/// `0xAARRGGBB` with premultiplied colour. Every other format is reached through the
/// converter registry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BufferFormat {
    /// Premultiplied ARGB words (canonical).
    Argb8888Pre,
    /// Straight-alpha ARGB words.
    Argb8888,
    /// Straight-alpha bytes in R, G, B, A order.
    Rgba8888,
    /// Interleaved bytes in R, G, B order.
    Rgb888,
    /// Interleaved bytes in B, G, R order.
    Bgr888,
    /// Three planes holding R, G and B bytes.
    Rgb888Planar,
    /// Little-endian `u16` words, 5 bits red, 6 green, 5 blue.
    Rgb565,
    /// Single alpha byte.
    A8,
}

impl BufferFormat {
    /// The canonical working format.
    pub const CANONICAL: BufferFormat = BufferFormat::Argb8888Pre;

    /// Every known format.
    pub const ALL: [BufferFormat; 8] = [
        BufferFormat::Argb8888Pre,
        BufferFormat::Argb8888,
        BufferFormat::Rgba8888,
        BufferFormat::Rgb888,
        BufferFormat::Bgr888,
        BufferFormat::Rgb888Planar,
        BufferFormat::Rgb565,
        BufferFormat::A8,
    ];

    /// Number of planes backing one image.
    pub fn plane_count(self) -> usize {
        match self {
            BufferFormat::Rgb888Planar => 3,
            _ => 1,
        }
    }

    /// Bytes one pixel occupies inside a single plane.
    pub fn plane_bytes_per_pixel(self) -> usize {
        match self {
            BufferFormat::Argb8888Pre | BufferFormat::Argb8888 | BufferFormat::Rgba8888 => 4,
            BufferFormat::Rgb888 | BufferFormat::Bgr888 => 3,
            BufferFormat::Rgb565 => 2,
            BufferFormat::Rgb888Planar | BufferFormat::A8 => 1,
        }
    }

    /// Whether the format carries an alpha channel.
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            BufferFormat::Argb8888Pre
                | BufferFormat::Argb8888
                | BufferFormat::Rgba8888
                | BufferFormat::A8
        )
    }

    /// Tightly packed row length in bytes for one plane, `None` on overflow.
    pub fn row_bytes(self, width: u32) -> Option<usize> {
        (width as usize).checked_mul(self.plane_bytes_per_pixel())
    }

    /// Reject zero extents.
    pub(crate) fn check_extent(self, width: u32, height: u32) -> PigmentResult<()> {
        if width == 0 || height == 0 {
            return Err(PigmentError::invalid_format(format!(
                "{self:?} buffer must have non-zero extent, got {width}x{height}"
            )));
        }
        Ok(())
    }

    /// Check that a plane of `len` bytes with `stride` can hold `width x height` pixels.
    pub(crate) fn check_plane(
        self,
        width: u32,
        height: u32,
        len: usize,
        stride: usize,
    ) -> PigmentResult<()> {
        let row = self
            .row_bytes(width)
            .ok_or_else(|| PigmentError::invalid_format("row size overflow"))?;
        if stride < row {
            return Err(PigmentError::invalid_format(format!(
                "{self:?} stride {stride} is smaller than row size {row}"
            )));
        }
        let needed = (height as usize)
            .saturating_sub(1)
            .checked_mul(stride)
            .and_then(|v| v.checked_add(row))
            .ok_or_else(|| PigmentError::invalid_format("plane size overflow"))?;
        if len < needed {
            return Err(PigmentError::invalid_format(format!(
                "{self:?} plane of {len} bytes is too small for {width}x{height} (needs {needed})"
            )));
        }
        Ok(())
    }
}
