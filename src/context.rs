//! Engine context: pools per backend and the converter registry.

use crate::backend::Backend;
use crate::buffer::Buffer;
use crate::buffer::format::BufferFormat;
use crate::convert::{Angle, ConverterRegistry};
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::pool::{HeapPool, HeapPoolOpts, Pool, RecyclingPool, RecyclingPoolOpts};
use crate::surface::{Surface, SurfaceFormat};
use anyhow::Context as _;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Which pool implementation backs software buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolKind {
    /// Allocate on demand, free on release.
    Heap(HeapPoolOpts),
    /// Keep released storage in size buckets for reuse.
    Recycling(RecyclingPoolOpts),
}

impl Default for PoolKind {
    fn default() -> Self {
        Self::Heap(HeapPoolOpts::default())
    }
}

/// Context configuration.
///
/// Loadable from JSON, e.g. `{"pool": {"kind": "recycling", "max_per_bucket": 4}}`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ContextOpts {
    /// Software pool selection.
    pub pool: PoolKind,
    /// Register the built-in CPU conversion routines.
    pub software_converters: bool,
}

impl Default for ContextOpts {
    fn default() -> Self {
        Self {
            pool: PoolKind::default(),
            software_converters: true,
        }
    }
}

impl ContextOpts {
    /// Parse options from a JSON document.
    pub fn from_json(json: &str) -> PigmentResult<Self> {
        let opts = serde_json::from_str(json).context("parse context options JSON")?;
        Ok(opts)
    }

    /// Serialize options to pretty JSON.
    pub fn to_json(&self) -> PigmentResult<String> {
        let s = serde_json::to_string_pretty(self).context("serialize context options")?;
        Ok(s)
    }
}

/// A storage backend plugged into a [`Context`].
pub trait BackendProvider: fmt::Debug {
    /// Backend this provider serves.
    fn backend(&self) -> Backend;

    /// Build the pool that allocates this backend's storage.
    fn create_pool(&self, opts: &ContextOpts) -> PigmentResult<Arc<dyn Pool>>;

    /// Add this backend's conversion routines.
    fn register_converters(&self, registry: &mut ConverterRegistry, opts: &ContextOpts);
}

/// CPU memory backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareBackend;

impl BackendProvider for SoftwareBackend {
    fn backend(&self) -> Backend {
        Backend::Software
    }

    fn create_pool(&self, opts: &ContextOpts) -> PigmentResult<Arc<dyn Pool>> {
        let pool: Arc<dyn Pool> = match opts.pool {
            PoolKind::Heap(o) => Arc::new(HeapPool::new(o)),
            PoolKind::Recycling(o) => Arc::new(RecyclingPool::new(o)),
        };
        Ok(pool)
    }

    fn register_converters(&self, registry: &mut ConverterRegistry, opts: &ContextOpts) {
        if opts.software_converters {
            registry.install_software_defaults();
        }
    }
}

/// Owns the converter registry and one pool per registered backend.
pub struct Context {
    opts: ContextOpts,
    registry: ConverterRegistry,
    pools: HashMap<Backend, Arc<dyn Pool>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("opts", &self.opts)
            .field("converters", &self.registry.len())
            .field("backends", &self.pools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Context {
    /// Context with the software backend only.
    #[tracing::instrument]
    pub fn new(opts: ContextOpts) -> PigmentResult<Self> {
        Self::with_providers(opts, &[&SoftwareBackend])
    }

    /// Context with the given backends. A later provider for the same backend replaces an
    /// earlier one's pool; its converters are registered on top.
    pub fn with_providers(
        opts: ContextOpts,
        providers: &[&dyn BackendProvider],
    ) -> PigmentResult<Self> {
        let mut registry = ConverterRegistry::new();
        let mut pools = HashMap::new();
        for provider in providers {
            let pool = provider.create_pool(&opts)?;
            if pool.backend() != provider.backend() {
                return Err(PigmentError::invalid_argument(format!(
                    "{:?} provider returned a {:?} pool",
                    provider.backend(),
                    pool.backend()
                )));
            }
            provider.register_converters(&mut registry, &opts);
            pools.insert(provider.backend(), pool);
        }
        tracing::debug!(
            backends = pools.len(),
            converters = registry.len(),
            "context ready"
        );
        Ok(Self {
            opts,
            registry,
            pools,
        })
    }

    /// Options the context was built with.
    pub fn opts(&self) -> &ContextOpts {
        &self.opts
    }

    /// Converter registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Converter registry, for registering extra routines.
    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// Software pool.
    pub fn pool(&self) -> PigmentResult<&Arc<dyn Pool>> {
        self.pool_for(Backend::Software)
    }

    /// Pool of `backend`.
    pub fn pool_for(&self, backend: Backend) -> PigmentResult<&Arc<dyn Pool>> {
        self.pools
            .get(&backend)
            .ok_or_else(|| PigmentError::not_found(format!("no pool for {backend:?} backend")))
    }

    /// Allocate a software buffer.
    pub fn buffer(&self, format: BufferFormat, width: u32, height: u32) -> PigmentResult<Buffer> {
        Buffer::new(format, width, height, self.pool()?)
    }

    /// Allocate a software surface.
    pub fn surface(
        &self,
        format: SurfaceFormat,
        width: u32,
        height: u32,
    ) -> PigmentResult<Surface> {
        Surface::new(format, width, height, self.pool()?)
    }

    /// Convert `src` into a fresh software buffer of `format`, rotated by `angle`.
    pub fn convert_to(
        &self,
        src: &Buffer,
        format: BufferFormat,
        angle: Angle,
    ) -> PigmentResult<Buffer> {
        let (w, h) = angle.rotated_extent(src.width(), src.height());
        let dst = self.buffer(format, w, h)?;
        self.registry.convert_buffer(src, &dst, angle)?;
        Ok(dst)
    }
}

#[cfg(test)]
#[path = "../tests/unit/context/context.rs"]
mod tests;
