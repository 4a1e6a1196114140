use crate::backend::{Backend, BackendData, SoftwareData};
use crate::buffer::format::BufferFormat;
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::pool::{Pool, PoolStats};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Options for [`HeapPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HeapPoolOpts {
    /// Upper bound on outstanding bytes. `None` means unbounded.
    pub max_bytes: Option<usize>,
    /// Rows are padded to a multiple of this many bytes.
    pub row_alignment: usize,
}

impl Default for HeapPoolOpts {
    fn default() -> Self {
        Self {
            max_bytes: None,
            row_alignment: 1,
        }
    }
}

/// Plain heap allocator for software buffers.
///
/// Never blocks: bookkeeping uses atomics only.
#[derive(Debug, Default)]
pub struct HeapPool {
    opts: HeapPoolOpts,
    outstanding: AtomicUsize,
    outstanding_bytes: AtomicUsize,
    allocations: AtomicU64,
    releases: AtomicU64,
}

impl HeapPool {
    /// Create a pool with the given options.
    pub fn new(opts: HeapPoolOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    fn reserve(&self, bytes: usize) -> PigmentResult<()> {
        let Some(max) = self.opts.max_bytes else {
            self.outstanding_bytes.fetch_add(bytes, Ordering::Relaxed);
            return Ok(());
        };
        self.outstanding_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                cur.checked_add(bytes).filter(|&next| next <= max)
            })
            .map(|_| ())
            .map_err(|cur| {
                PigmentError::allocation(format!(
                    "heap pool budget exhausted: {cur} of {max} bytes in use, {bytes} requested"
                ))
            })
    }
}

impl Pool for HeapPool {
    fn backend(&self) -> Backend {
        Backend::Software
    }

    fn allocate(
        &self,
        format: BufferFormat,
        width: u32,
        height: u32,
    ) -> PigmentResult<BackendData> {
        let layout = SoftwareData::layout(format, width, height, self.opts.row_alignment)?;
        self.reserve(layout.total)?;
        let data = match SoftwareData::zeroed(format, width, height, self.opts.row_alignment) {
            Ok(data) => data,
            Err(e) => {
                self.outstanding_bytes.fetch_sub(layout.total, Ordering::AcqRel);
                return Err(e);
            }
        };
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        self.allocations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(?format, width, height, bytes = data.byte_len(), "heap alloc");
        Ok(BackendData::Software(data))
    }

    fn release(&self, data: BackendData) {
        if data.backend() != Backend::Software {
            tracing::warn!("heap pool asked to release hardware storage; dropping it");
            return;
        }
        let bytes = data.byte_len();
        self.outstanding_bytes.fetch_sub(bytes, Ordering::AcqRel);
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        self.releases.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(bytes, "heap release");
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.outstanding.load(Ordering::Relaxed),
            outstanding_bytes: self.outstanding_bytes.load(Ordering::Acquire),
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            retained: 0,
            retained_bytes: 0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/heap.rs"]
mod tests;
