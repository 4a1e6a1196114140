use crate::backend::{Backend, BackendData, SoftwareData, StorageKey};
use crate::buffer::format::BufferFormat;
use crate::foundation::error::PigmentResult;
use crate::pool::{Pool, PoolStats};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Options for [`RecyclingPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecyclingPoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained storages per `(w, h, format)` bucket.
    pub max_per_bucket: usize,
    /// Rows are padded to a multiple of this many bytes.
    pub row_alignment: usize,
}

impl Default for RecyclingPoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_per_bucket: 8,
            row_alignment: 1,
        }
    }
}

struct Bucket {
    key: StorageKey,
    retained: Vec<SoftwareData>,
}

#[derive(Default)]
struct Inner {
    stats: PoolStats,
    reused: u64,
    dropped_on_release: u64,

    // Hash lookup is fine here: this runs per buffer, never per pixel.
    bucket_idx_by_key: HashMap<StorageKey, usize>,
    buckets: Vec<Bucket>,
}

/// Bounded pooled allocator that keeps released software storage for reuse.
///
/// Keyed by `(width, height, format)`. All bookkeeping sits behind one mutex, so `allocate` and
/// `release` may block briefly while another thread holds it. Reused storage is zeroed before it
/// is handed out again.
pub struct RecyclingPool {
    opts: RecyclingPoolOpts,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for RecyclingPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecyclingPool")
            .field("opts", &self.opts)
            .field("stats", &self.stats())
            .finish()
    }
}

impl RecyclingPool {
    /// Create a pool with the given options.
    pub fn new(opts: RecyclingPoolOpts) -> Self {
        Self {
            opts,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Number of allocations served from retained storage.
    pub fn reused(&self) -> u64 {
        self.lock().reused
    }

    /// Number of releases that were dropped instead of retained.
    pub fn dropped_on_release(&self) -> u64 {
        self.lock().dropped_on_release
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Pool for RecyclingPool {
    fn backend(&self) -> Backend {
        Backend::Software
    }

    fn allocate(
        &self,
        format: BufferFormat,
        width: u32,
        height: u32,
    ) -> PigmentResult<BackendData> {
        let key = StorageKey {
            format,
            width,
            height,
        };
        SoftwareData::layout(format, width, height, self.opts.row_alignment)?;
        let mut inner = self.lock();

        if let Some(&bi) = inner.bucket_idx_by_key.get(&key)
            && let Some(mut data) = inner.buckets[bi].retained.pop()
        {
            let bytes = data.byte_len();
            data.clear();
            let st = &mut inner.stats;
            st.retained = st.retained.saturating_sub(1);
            st.retained_bytes = st.retained_bytes.saturating_sub(bytes);
            st.outstanding += 1;
            st.outstanding_bytes += bytes;
            st.allocations += 1;
            inner.reused += 1;
            tracing::trace!(?format, width, height, "recycling pool hit");
            return Ok(BackendData::Software(data));
        }

        let data = SoftwareData::zeroed(format, width, height, self.opts.row_alignment)?;
        let st = &mut inner.stats;
        st.outstanding += 1;
        st.outstanding_bytes += data.byte_len();
        st.allocations += 1;
        tracing::trace!(?format, width, height, "recycling pool miss");
        Ok(BackendData::Software(data))
    }

    fn release(&self, data: BackendData) {
        let BackendData::Software(data) = data else {
            tracing::warn!("recycling pool asked to release hardware storage; dropping it");
            return;
        };
        let bytes = data.byte_len();
        let mut inner = self.lock();
        {
            let st = &mut inner.stats;
            st.outstanding = st.outstanding.saturating_sub(1);
            st.outstanding_bytes = st.outstanding_bytes.saturating_sub(bytes);
            st.releases += 1;
        }

        let Some(key) = data.key() else {
            inner.dropped_on_release += 1;
            return;
        };
        if self.opts.max_pool_bytes == 0 || self.opts.max_per_bucket == 0 {
            inner.dropped_on_release += 1;
            return;
        }
        if inner.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            inner.dropped_on_release += 1;
            return;
        }

        let bi = match inner.bucket_idx_by_key.get(&key).copied() {
            Some(i) => i,
            None => {
                let i = inner.buckets.len();
                inner.buckets.push(Bucket {
                    key,
                    retained: Vec::new(),
                });
                inner.bucket_idx_by_key.insert(key, i);
                i
            }
        };

        let bucket = &mut inner.buckets[bi];
        debug_assert_eq!(bucket.key, key);
        if bucket.retained.len() >= self.opts.max_per_bucket {
            inner.dropped_on_release += 1;
            return;
        }

        bucket.retained.push(data);
        inner.stats.retained += 1;
        inner.stats.retained_bytes += bytes;
    }

    fn stats(&self) -> PoolStats {
        self.lock().stats
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/recycling.rs"]
mod tests;
