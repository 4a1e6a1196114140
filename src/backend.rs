//! Backend tags and the storage each backend owns.

use crate::buffer::format::BufferFormat;
use crate::buffer::view::{ImageMut, ImageRef, PlaneMut, PlaneRef};
use crate::foundation::error::{PigmentError, PigmentResult};
use smallvec::SmallVec;
use std::fmt;

/// Which backend produced a piece of storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// CPU-addressable memory.
    Software,
    /// Memory managed by an accelerator backend.
    Hardware,
}

/// One CPU plane: bytes plus row stride.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plane {
    bytes: Vec<u8>,
    stride: usize,
}

impl Plane {
    /// Wrap `bytes` whose rows start every `stride` bytes.
    pub fn new(bytes: Vec<u8>, stride: usize) -> Self {
        Self { bytes, stride }
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Backing bytes, padding included.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Give the bytes back to the caller.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct StorageKey {
    pub(crate) format: BufferFormat,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// CPU storage for one image.
#[derive(Clone, Debug, Default)]
pub struct SoftwareData {
    planes: SmallVec<[Plane; 3]>,
    // Set for storage a pool allocated; lets pools bucket released memory.
    key: Option<StorageKey>,
}

/// Byte layout of pool-allocated software storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StorageLayout {
    /// Bytes per row, padding included.
    pub stride: usize,
    /// Bytes in each plane.
    pub plane_len: usize,
    /// Bytes across all planes.
    pub total: usize,
}

impl SoftwareData {
    /// Storage made of caller-supplied planes.
    pub fn new(planes: impl IntoIterator<Item = Plane>) -> Self {
        Self {
            planes: planes.into_iter().collect(),
            key: None,
        }
    }

    /// Single-plane storage.
    pub fn packed(bytes: Vec<u8>, stride: usize) -> Self {
        Self::new([Plane::new(bytes, stride)])
    }

    /// Row stride and total byte length of zeroed storage for `format`.
    ///
    /// Fails with `AllocationFailure` when the total exceeds `isize::MAX`.
    pub(crate) fn layout(
        format: BufferFormat,
        width: u32,
        height: u32,
        row_alignment: usize,
    ) -> PigmentResult<StorageLayout> {
        format.check_extent(width, height)?;
        let align = row_alignment.max(1);
        let row = format
            .row_bytes(width)
            .ok_or_else(|| PigmentError::allocation("row size overflow"))?;
        let stride = row
            .checked_next_multiple_of(align)
            .ok_or_else(|| PigmentError::allocation("stride overflow"))?;
        let plane_len = stride
            .checked_mul(height as usize)
            .ok_or_else(|| PigmentError::allocation("plane size overflow"))?;
        let total = plane_len
            .checked_mul(format.plane_count())
            .filter(|&t| t <= isize::MAX as usize)
            .ok_or_else(|| {
                PigmentError::allocation(format!(
                    "{format:?} {width}x{height} exceeds the addressable size"
                ))
            })?;
        Ok(StorageLayout {
            stride,
            plane_len,
            total,
        })
    }

    /// Zero-filled storage for `format` with each row padded up to `row_alignment` bytes.
    pub(crate) fn zeroed(
        format: BufferFormat,
        width: u32,
        height: u32,
        row_alignment: usize,
    ) -> PigmentResult<Self> {
        let layout = Self::layout(format, width, height, row_alignment)?;
        let planes: SmallVec<[Plane; 3]> = (0..format.plane_count())
            .map(|_| {
                let mut bytes = Vec::new();
                bytes.try_reserve_exact(layout.plane_len).map_err(|e| {
                    PigmentError::allocation(format!("{} bytes: {e}", layout.plane_len))
                })?;
                bytes.resize(layout.plane_len, 0);
                Ok(Plane::new(bytes, layout.stride))
            })
            .collect::<PigmentResult<_>>()?;
        Ok(Self {
            planes,
            key: Some(StorageKey {
                format,
                width,
                height,
            }),
        })
    }

    pub(crate) fn key(&self) -> Option<StorageKey> {
        self.key
    }

    /// Planes in format order.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Give the planes back to the caller.
    pub fn into_planes(self) -> Vec<Plane> {
        self.planes.into_vec()
    }

    /// Total bytes held, padding included.
    pub fn byte_len(&self) -> usize {
        self.planes.iter().map(|p| p.bytes.len()).sum()
    }

    pub(crate) fn clear(&mut self) {
        for p in &mut self.planes {
            p.bytes.fill(0);
        }
    }

    pub(crate) fn image_ref(
        &self,
        format: BufferFormat,
        width: u32,
        height: u32,
    ) -> PigmentResult<ImageRef<'_>> {
        ImageRef::new(
            format,
            width,
            height,
            self.planes.iter().map(|p| PlaneRef {
                data: &p.bytes,
                stride: p.stride,
            }),
        )
    }

    pub(crate) fn image_mut(
        &mut self,
        format: BufferFormat,
        width: u32,
        height: u32,
    ) -> PigmentResult<ImageMut<'_>> {
        ImageMut::new(
            format,
            width,
            height,
            self.planes.iter_mut().map(|p| PlaneMut {
                data: &mut p.bytes,
                stride: p.stride,
            }),
        )
    }
}

/// Storage owned by an accelerator backend.
///
/// Concrete GPU backends live outside this crate; they hand their memory handles to buffers
/// through this trait.
pub trait HardwareStorage: Send + Sync + fmt::Debug {
    /// Bytes the backend reserved for this storage.
    fn byte_len(&self) -> usize;

    /// Row strides of each plane, if the backend exposes them.
    fn strides(&self) -> SmallVec<[usize; 3]> {
        SmallVec::new()
    }
}

/// Backend-owned storage behind a buffer.
#[derive(Debug)]
pub enum BackendData {
    /// CPU planes.
    Software(SoftwareData),
    /// Accelerator memory handle.
    Hardware(Box<dyn HardwareStorage>),
}

impl BackendData {
    /// Backend that owns this storage.
    pub fn backend(&self) -> Backend {
        match self {
            BackendData::Software(_) => Backend::Software,
            BackendData::Hardware(_) => Backend::Hardware,
        }
    }

    /// CPU planes, if this is software storage.
    pub fn as_software(&self) -> Option<&SoftwareData> {
        match self {
            BackendData::Software(d) => Some(d),
            BackendData::Hardware(_) => None,
        }
    }

    /// Mutable CPU planes, if this is software storage.
    pub fn as_software_mut(&mut self) -> Option<&mut SoftwareData> {
        match self {
            BackendData::Software(d) => Some(d),
            BackendData::Hardware(_) => None,
        }
    }

    /// Total bytes held.
    pub fn byte_len(&self) -> usize {
        match self {
            BackendData::Software(d) => d.byte_len(),
            BackendData::Hardware(h) => h.byte_len(),
        }
    }

    /// Raw access descriptor for this storage.
    pub fn raw_access(&self) -> RawAccess {
        match self {
            BackendData::Software(d) => RawAccess {
                backend: Backend::Software,
                mappable: true,
                strides: d.planes.iter().map(|p| p.stride).collect(),
            },
            BackendData::Hardware(h) => RawAccess {
                backend: Backend::Hardware,
                mappable: false,
                strides: h.strides(),
            },
        }
    }
}

/// What a caller needs to address storage directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawAccess {
    /// Owning backend.
    pub backend: Backend,
    /// Whether the planes can be mapped into CPU views.
    pub mappable: bool,
    /// Row stride of each plane in bytes.
    pub strides: SmallVec<[usize; 3]>,
}
