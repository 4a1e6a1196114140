//! Render targets: one buffer plus a logical pixel format.

use crate::buffer::format::BufferFormat;
use crate::buffer::view::{ImageMut, ImageRef};
use crate::buffer::{Buffer, BufferWrite, UserData};
use crate::convert::codecs::{self, PixelCodec};
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::pool::Pool;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

const SURFACE_TAG: u32 = 0x5F0F_ACE5;

/// Logical pixel interpretation of a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceFormat {
    /// Premultiplied ARGB colour.
    Argb8888,
    /// Coverage / alpha only.
    A8,
}

impl SurfaceFormat {
    /// Storage format a freshly created surface of this format allocates.
    pub fn storage_format(self) -> BufferFormat {
        match self {
            SurfaceFormat::Argb8888 => BufferFormat::Argb8888Pre,
            SurfaceFormat::A8 => BufferFormat::A8,
        }
    }

    /// Whether a buffer stored as `format` can back a surface of this format.
    ///
    /// `Argb8888` accepts any four-channel storage; straight-alpha layouts are
    /// premultiplied on read and unpremultiplied on write.
    pub fn is_backed_by(self, format: BufferFormat) -> bool {
        match self {
            SurfaceFormat::Argb8888 => matches!(
                format,
                BufferFormat::Argb8888Pre | BufferFormat::Argb8888 | BufferFormat::Rgba8888
            ),
            SurfaceFormat::A8 => format == BufferFormat::A8,
        }
    }
}

/// Snapshot handed to a surface release hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Logical format.
    pub format: SurfaceFormat,
}

/// Hook run after a surface has released its buffer.
pub type SurfaceRelease = Box<dyn FnOnce(SurfaceInfo) + Send + Sync>;

struct ReleaseSlot {
    info: SurfaceInfo,
    hook: Mutex<Option<SurfaceRelease>>,
}

impl Drop for ReleaseSlot {
    fn drop(&mut self) {
        let hook = self
            .hook
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(hook) = hook {
            hook(self.info);
        }
    }
}

// Field order matters: `buffer` drops before `release`, so the hook always runs after the
// buffer reference is gone.
struct SurfaceInner {
    tag: u32,
    buffer: Buffer,
    format: SurfaceFormat,
    user: RwLock<Option<UserData>>,
    release: ReleaseSlot,
}

/// Shared handle to a render target.
///
/// A surface wraps exactly one [`Buffer`] for its whole life. Cloning takes a reference;
/// dropping the last handle releases the buffer reference and then runs the release hook.
#[derive(Clone)]
pub struct Surface {
    inner: Arc<SurfaceInner>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("format", &self.inner.format)
            .field("buffer", &self.inner.buffer)
            .field("refs", &self.ref_count())
            .finish()
    }
}

impl Surface {
    /// Allocate a surface and its buffer from `pool`.
    pub fn new(
        format: SurfaceFormat,
        width: u32,
        height: u32,
        pool: &Arc<dyn Pool>,
    ) -> PigmentResult<Self> {
        let buffer = Buffer::new(format.storage_format(), width, height, pool)?;
        Self::from_buffer(&buffer, format)
    }

    /// Wrap an existing buffer, taking a reference on it.
    pub fn from_buffer(buffer: &Buffer, format: SurfaceFormat) -> PigmentResult<Self> {
        if !format.is_backed_by(buffer.format()) {
            return Err(PigmentError::incompatible_format(format!(
                "{format:?} surface cannot be backed by a {:?} buffer",
                buffer.format()
            )));
        }
        let info = SurfaceInfo {
            width: buffer.width(),
            height: buffer.height(),
            format,
        };
        Ok(Self {
            inner: Arc::new(SurfaceInner {
                tag: SURFACE_TAG,
                buffer: buffer.clone(),
                format,
                user: RwLock::new(None),
                release: ReleaseSlot {
                    info,
                    hook: Mutex::new(None),
                },
            }),
        })
    }

    #[inline]
    fn check(&self) -> &SurfaceInner {
        debug_assert_eq!(self.inner.tag, SURFACE_TAG, "not a live surface");
        &self.inner
    }

    /// Backing buffer, borrowed.
    pub fn buffer(&self) -> &Buffer {
        &self.check().buffer
    }

    /// Logical format.
    pub fn format(&self) -> SurfaceFormat {
        self.check().format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.check().buffer.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.check().buffer.height()
    }

    /// Number of live handles.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two handles refer to the same surface.
    pub fn ptr_eq(&self, other: &Surface) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Install the hook run on destruction, replacing any previous one.
    pub fn set_release(&self, hook: impl FnOnce(SurfaceInfo) + Send + Sync + 'static) {
        *self
            .check()
            .release
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
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

    /// Exclusive pixel access for renderers.
    pub fn lock(&self) -> PigmentResult<SurfaceLock<'_>> {
        let inner = self.check();
        let write = inner.buffer.write();
        if write.data().as_software().is_none() {
            return Err(PigmentError::invalid_argument(
                "surface storage is not CPU-mappable",
            ));
        }
        Ok(SurfaceLock {
            storage: inner.buffer.format(),
            width: inner.buffer.width(),
            height: inner.buffer.height(),
            write,
        })
    }
}

/// Write access to a surface's pixels in canonical premultiplied ARGB words.
///
/// Straight-alpha storage is converted on the way in and out. `A8` surfaces keep only the
/// alpha byte of whatever is written.
pub struct SurfaceLock<'a> {
    storage: BufferFormat,
    width: u32,
    height: u32,
    write: BufferWrite<'a>,
}

impl SurfaceLock<'_> {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    fn check_span(&self, x: u32, y: u32, len: usize) -> PigmentResult<()> {
        let end = (x as usize).checked_add(len);
        if y >= self.height || end.is_none_or(|e| e > self.width as usize) {
            return Err(PigmentError::invalid_argument(format!(
                "span ({x},{y})+{len} outside {}x{} surface",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Store `src` starting at `(x, y)`.
    pub fn write_span(&mut self, x: u32, y: u32, src: &[u32]) -> PigmentResult<()> {
        self.check_span(x, y, src.len())?;
        let storage = self.storage;
        let mut img = self.write.image_mut()?;
        match storage {
            BufferFormat::Argb8888Pre => store_span::<codecs::Argb8888Pre>(&mut img, x, y, src),
            BufferFormat::Argb8888 => store_span::<codecs::Argb8888>(&mut img, x, y, src),
            BufferFormat::Rgba8888 => store_span::<codecs::Rgba8888>(&mut img, x, y, src),
            BufferFormat::A8 => {
                let start = x as usize;
                let row = img.row_mut(0, y);
                for (dst, &p) in row[start..start + src.len()].iter_mut().zip(src) {
                    *dst = (p >> 24) as u8;
                }
            }
            other => return Err(unsupported_storage(other)),
        }
        Ok(())
    }

    /// Load `out.len()` pixels starting at `(x, y)`.
    pub fn read_span(&mut self, x: u32, y: u32, out: &mut [u32]) -> PigmentResult<()> {
        self.check_span(x, y, out.len())?;
        let storage = self.storage;
        let img = self.write.image_mut()?;
        let img = img.as_image_ref();
        match storage {
            BufferFormat::Argb8888Pre => load_span::<codecs::Argb8888Pre>(&img, x, y, out),
            BufferFormat::Argb8888 => load_span::<codecs::Argb8888>(&img, x, y, out),
            BufferFormat::Rgba8888 => load_span::<codecs::Rgba8888>(&img, x, y, out),
            BufferFormat::A8 => {
                for (o, &a) in out.iter_mut().zip(&img.row(0, y)[x as usize..]) {
                    *o = u32::from(a) * 0x0101_0101;
                }
            }
            other => return Err(unsupported_storage(other)),
        }
        Ok(())
    }

    /// Single pixel at `(x, y)`.
    pub fn pixel(&mut self, x: u32, y: u32) -> PigmentResult<u32> {
        let mut out = [0u32; 1];
        self.read_span(x, y, &mut out)?;
        Ok(out[0])
    }

    /// Set every pixel to `argb`.
    pub fn fill(&mut self, argb: u32) -> PigmentResult<()> {
        let row = vec![argb; self.width as usize];
        for y in 0..self.height {
            self.write_span(0, y, &row)?;
        }
        Ok(())
    }

    /// Set every pixel to transparent black.
    pub fn clear(&mut self) -> PigmentResult<()> {
        self.fill(0)
    }
}

fn store_span<C: PixelCodec>(img: &mut ImageMut<'_>, x: u32, y: u32, src: &[u32]) {
    for (dx, &p) in (x..).zip(src) {
        C::store(img, dx, y, p);
    }
}

fn load_span<C: PixelCodec>(img: &ImageRef<'_>, x: u32, y: u32, out: &mut [u32]) {
    for (dx, o) in (x..).zip(out.iter_mut()) {
        *o = C::load(img, dx, y);
    }
}

fn unsupported_storage(format: BufferFormat) -> PigmentError {
    PigmentError::incompatible_format(format!("{format:?} storage cannot back a surface"))
}

#[cfg(test)]
#[path = "../tests/unit/surface/surface.rs"]
mod tests;
