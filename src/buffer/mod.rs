//! Reference-counted, format-tagged pixel storage.

pub(crate) mod format;
pub(crate) mod view;

use crate::backend::{Backend, BackendData, RawAccess, SoftwareData};
use crate::buffer::format::BufferFormat;
use crate::buffer::view::{ImageMut, ImageRef};
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::pool::Pool;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

const BUFFER_TAG: u32 = 0xB0FF_E125;

/// Hook that receives caller-supplied storage back when an external buffer is destroyed.
pub type ExternalRelease = Box<dyn FnOnce(SoftwareData) + Send + Sync>;

/// Opaque caller data attached to a buffer or surface.
pub type UserData = Arc<dyn Any + Send + Sync>;

enum Origin {
    Pool(Arc<dyn Pool>),
    External(Option<ExternalRelease>),
}

struct BufferInner {
    tag: u32,
    width: u32,
    height: u32,
    format: BufferFormat,
    backend: Backend,
    data: RwLock<BackendData>,
    origin: Origin,
    user: RwLock<Option<UserData>>,
}

impl Drop for BufferInner {
    fn drop(&mut self) {
        let slot = self.data.get_mut().unwrap_or_else(PoisonError::into_inner);
        let data = std::mem::replace(slot, BackendData::Software(SoftwareData::default()));
        match &mut self.origin {
            Origin::Pool(pool) => pool.release(data),
            Origin::External(release) => {
                if let (Some(release), BackendData::Software(sw)) = (release.take(), data) {
                    release(sw);
                }
            }
        }
    }
}

/// Shared handle to pixel storage.
///
/// Cloning takes a reference; dropping releases one. When the last handle goes away, pool-backed
/// storage returns to its pool and external storage goes back to its release hook (or is simply
/// dropped if none was given). The pool is never asked to free external storage.
///
/// Width, height and format are fixed at construction.
#[derive(Clone)]
pub struct Buffer {
    inner: Arc<BufferInner>,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("format", &self.inner.format)
            .field("backend", &self.inner.backend)
            .field("external", &self.is_external())
            .field("refs", &self.ref_count())
            .finish()
    }
}

impl Buffer {
    /// Allocate a buffer from `pool`.
    pub fn new(
        format: BufferFormat,
        width: u32,
        height: u32,
        pool: &Arc<dyn Pool>,
    ) -> PigmentResult<Self> {
        format.check_extent(width, height)?;
        let data = pool.allocate(format, width, height)?;
        tracing::debug!(?format, width, height, backend = ?data.backend(), "buffer created");
        Ok(Self::wrap(
            format,
            width,
            height,
            data,
            Origin::Pool(Arc::clone(pool)),
        ))
    }

    /// Wrap caller-supplied storage. The storage is dropped with the buffer.
    pub fn from_external(
        format: BufferFormat,
        width: u32,
        height: u32,
        data: SoftwareData,
    ) -> PigmentResult<Self> {
        Self::external(format, width, height, data, None)
    }

    /// Wrap caller-supplied storage and hand it to `release` when the buffer is destroyed.
    pub fn from_external_with_release(
        format: BufferFormat,
        width: u32,
        height: u32,
        data: SoftwareData,
        release: impl FnOnce(SoftwareData) + Send + Sync + 'static,
    ) -> PigmentResult<Self> {
        Self::external(format, width, height, data, Some(Box::new(release)))
    }

    fn external(
        format: BufferFormat,
        width: u32,
        height: u32,
        data: SoftwareData,
        release: Option<ExternalRelease>,
    ) -> PigmentResult<Self> {
        data.image_ref(format, width, height)?;
        Ok(Self::wrap(
            format,
            width,
            height,
            BackendData::Software(data),
            Origin::External(release),
        ))
    }

    fn wrap(
        format: BufferFormat,
        width: u32,
        height: u32,
        data: BackendData,
        origin: Origin,
    ) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                tag: BUFFER_TAG,
                width,
                height,
                format,
                backend: data.backend(),
                data: RwLock::new(data),
                origin,
                user: RwLock::new(None),
            }),
        }
    }

    #[inline]
    fn check(&self) -> &BufferInner {
        debug_assert_eq!(self.inner.tag, BUFFER_TAG, "not a live buffer");
        &self.inner
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.check().width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.check().height
    }

    /// Storage format.
    pub fn format(&self) -> BufferFormat {
        self.check().format
    }

    /// Backend that owns the storage.
    pub fn backend(&self) -> Backend {
        self.check().backend
    }

    /// Whether the storage was supplied by the caller rather than a pool.
    pub fn is_external(&self) -> bool {
        matches!(self.check().origin, Origin::External(_))
    }

    /// Pool backing this buffer, `None` for external buffers.
    pub fn pool(&self) -> Option<Arc<dyn Pool>> {
        match &self.check().origin {
            Origin::Pool(p) => Some(Arc::clone(p)),
            Origin::External(_) => None,
        }
    }

    /// Number of live handles.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two handles refer to the same buffer.
    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Shared access to the backend storage.
    pub fn read(&self) -> BufferRead<'_> {
        let inner = self.check();
        BufferRead {
            inner,
            guard: inner.data.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Exclusive access to the backend storage.
    pub fn write(&self) -> BufferWrite<'_> {
        let inner = self.check();
        BufferWrite {
            inner,
            guard: inner.data.write().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Raw access descriptor, answered by the owning pool when there is one.
    pub fn query(&self) -> PigmentResult<RawAccess> {
        let read = self.read();
        match &self.check().origin {
            Origin::Pool(p) => p.query(read.data()),
            Origin::External(_) => Ok(read.data().raw_access()),
        }
    }

    /// Digest of the visible pixel bytes, row padding excluded.
    pub fn content_hash(&self) -> PigmentResult<u64> {
        let read = self.read();
        let img = read.image()?;
        let mut hasher = xxhash_rust::xxh3::Xxh3::new();
        for plane in 0..img.format().plane_count() {
            for y in 0..img.height() {
                hasher.update(img.row(plane, y));
            }
        }
        Ok(hasher.digest())
    }

    /// Attach opaque caller data, replacing any previous value.
    pub fn set_user_data(&self, data: Option<UserData>) {
        *self
            .check()
            .user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = data;
    }

    /// Fetch caller data previously attached, if it has type `T`.
    pub fn user_data<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let user = self
            .check()
            .user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        user.downcast::<T>().ok()
    }
}

/// Shared borrow of a buffer's storage.
pub struct BufferRead<'a> {
    inner: &'a BufferInner,
    guard: RwLockReadGuard<'a, BackendData>,
}

impl BufferRead<'_> {
    /// Backend storage. No ownership moves.
    pub fn data(&self) -> &BackendData {
        &self.guard
    }

    /// CPU view of the pixels.
    pub fn image(&self) -> PigmentResult<ImageRef<'_>> {
        let sw = self.guard.as_software().ok_or_else(not_mappable)?;
        sw.image_ref(self.inner.format, self.inner.width, self.inner.height)
    }
}

/// Exclusive borrow of a buffer's storage.
pub struct BufferWrite<'a> {
    inner: &'a BufferInner,
    guard: RwLockWriteGuard<'a, BackendData>,
}

impl BufferWrite<'_> {
    /// Backend storage. No ownership moves.
    pub fn data(&self) -> &BackendData {
        &self.guard
    }

    /// Writable CPU view of the pixels.
    pub fn image_mut(&mut self) -> PigmentResult<ImageMut<'_>> {
        let (format, width, height) = (self.inner.format, self.inner.width, self.inner.height);
        let sw = self.guard.as_software_mut().ok_or_else(not_mappable)?;
        sw.image_mut(format, width, height)
    }
}

fn not_mappable() -> PigmentError {
    PigmentError::invalid_argument("buffer storage is not CPU-mappable")
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/buffer.rs"]
mod tests;
