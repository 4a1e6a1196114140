//! Backing-store allocators for buffers.

use crate::backend::{Backend, BackendData, RawAccess};
use crate::buffer::format::BufferFormat;
use crate::foundation::error::PigmentResult;
use std::fmt;

pub(crate) mod heap;
pub(crate) mod recycling;

/// Counters a pool exposes so callers can check paired allocate/release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Storage handed out and not yet released.
    pub outstanding: usize,
    /// Bytes handed out and not yet released.
    pub outstanding_bytes: usize,
    /// Total successful `allocate` calls.
    pub allocations: u64,
    /// Total `release` calls.
    pub releases: u64,
    /// Released storage kept around for reuse.
    pub retained: usize,
    /// Bytes kept around for reuse.
    pub retained_bytes: usize,
}

/// Supplies and reclaims backing storage for buffers.
///
/// Every `allocate` must be paired with exactly one `release`; the storage is moved into
/// `release`, so double release cannot be expressed. Implementations are shared across threads
/// and document their own blocking behaviour.
pub trait Pool: Send + Sync + fmt::Debug {
    /// Backend whose storage this pool hands out.
    fn backend(&self) -> Backend;

    /// Allocate storage for a `width x height` image in `format`.
    fn allocate(&self, format: BufferFormat, width: u32, height: u32)
    -> PigmentResult<BackendData>;

    /// Take storage back.
    fn release(&self, data: BackendData);

    /// Describe how to address `data` directly.
    fn query(&self, data: &BackendData) -> PigmentResult<RawAccess> {
        Ok(data.raw_access())
    }

    /// Current counters.
    fn stats(&self) -> PoolStats;
}

pub use heap::{HeapPool, HeapPoolOpts};
pub use recycling::{RecyclingPool, RecyclingPoolOpts};
