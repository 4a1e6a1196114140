//! Stride-aware borrowed views over pixel planes.
//!
//! Views are what converters and renderers actually touch. They never assume contiguous rows:
//! each plane carries its own stride ("pitch") in bytes.

use crate::buffer::format::BufferFormat;
use crate::foundation::error::{PigmentError, PigmentResult};
use smallvec::SmallVec;

/// One read-only plane.
#[derive(Clone, Copy, Debug)]
pub struct PlaneRef<'a> {
    /// Plane bytes.
    pub data: &'a [u8],
    /// Distance between row starts in bytes.
    pub stride: usize,
}

/// One writable plane.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    /// Plane bytes.
    pub data: &'a mut [u8],
    /// Distance between row starts in bytes.
    pub stride: usize,
}

/// Read-only image view.
#[derive(Clone, Debug)]
pub struct ImageRef<'a> {
    format: BufferFormat,
    width: u32,
    height: u32,
    planes: SmallVec<[PlaneRef<'a>; 3]>,
}

impl<'a> ImageRef<'a> {
    /// Build a view from planes, validating plane count and sizes against the format.
    pub fn new(
        format: BufferFormat,
        width: u32,
        height: u32,
        planes: impl IntoIterator<Item = PlaneRef<'a>>,
    ) -> PigmentResult<Self> {
        let planes: SmallVec<[PlaneRef<'a>; 3]> = planes.into_iter().collect();
        check_planes(
            format,
            width,
            height,
            planes.iter().map(|p| (p.data.len(), p.stride)),
        )?;
        Ok(Self {
            format,
            width,
            height,
            planes,
        })
    }

    /// Single-plane view.
    pub fn packed(
        format: BufferFormat,
        width: u32,
        height: u32,
        data: &'a [u8],
        stride: usize,
    ) -> PigmentResult<Self> {
        Self::new(format, width, height, [PlaneRef { data, stride }])
    }

    /// Storage format.
    pub fn format(&self) -> BufferFormat {
        self.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Plane `i`.
    pub fn plane(&self, i: usize) -> PlaneRef<'a> {
        self.planes[i]
    }

    /// Visible bytes of row `y` in plane `i`, padding excluded.
    pub fn row(&self, i: usize, y: u32) -> &'a [u8] {
        let p = self.planes[i];
        let start = (y as usize) * p.stride;
        let len = (self.width as usize) * self.format.plane_bytes_per_pixel();
        &p.data[start..start + len]
    }
}

/// Writable image view.
#[derive(Debug)]
pub struct ImageMut<'a> {
    format: BufferFormat,
    width: u32,
    height: u32,
    // Vec, not SmallVec: Vec's drop does not count as a use of the borrowed planes.
    planes: Vec<PlaneMut<'a>>,
}

impl<'a> ImageMut<'a> {
    /// Build a writable view from planes, validating plane count and sizes against the format.
    pub fn new(
        format: BufferFormat,
        width: u32,
        height: u32,
        planes: impl IntoIterator<Item = PlaneMut<'a>>,
    ) -> PigmentResult<Self> {
        let planes: Vec<PlaneMut<'a>> = planes.into_iter().collect();
        check_planes(
            format,
            width,
            height,
            planes.iter().map(|p| (p.data.len(), p.stride)),
        )?;
        Ok(Self {
            format,
            width,
            height,
            planes,
        })
    }

    /// Single-plane writable view.
    pub fn packed(
        format: BufferFormat,
        width: u32,
        height: u32,
        data: &'a mut [u8],
        stride: usize,
    ) -> PigmentResult<Self> {
        Self::new(format, width, height, [PlaneMut { data, stride }])
    }

    /// Storage format.
    pub fn format(&self) -> BufferFormat {
        self.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Stride of plane `i`.
    pub fn stride(&self, i: usize) -> usize {
        self.planes[i].stride
    }

    /// Raw bytes of plane `i`.
    pub fn plane_data_mut(&mut self, i: usize) -> &mut [u8] {
        &mut *self.planes[i].data
    }

    /// Visible bytes of row `y` in plane `i`, padding excluded.
    pub fn row_mut(&mut self, i: usize, y: u32) -> &mut [u8] {
        let len = (self.width as usize) * self.format.plane_bytes_per_pixel();
        let p = &mut self.planes[i];
        let start = (y as usize) * p.stride;
        &mut p.data[start..start + len]
    }

    /// Reborrow as a read-only view.
    pub fn as_image_ref(&self) -> ImageRef<'_> {
        ImageRef {
            format: self.format,
            width: self.width,
            height: self.height,
            planes: self
                .planes
                .iter()
                .map(|p| PlaneRef {
                    data: &*p.data,
                    stride: p.stride,
                })
                .collect(),
        }
    }
}

fn check_planes(
    format: BufferFormat,
    width: u32,
    height: u32,
    planes: impl ExactSizeIterator<Item = (usize, usize)>,
) -> PigmentResult<()> {
    format.check_extent(width, height)?;
    if planes.len() != format.plane_count() {
        return Err(PigmentError::invalid_format(format!(
            "{format:?} expects {} plane(s), got {}",
            format.plane_count(),
            planes.len()
        )));
    }
    for (len, stride) in planes {
        format.check_plane(width, height, len, stride)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/view.rs"]
mod tests;
