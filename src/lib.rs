//! Pigment is the core of a 2D rendering engine.
//!
//! - [`Buffer`]s are reference-counted pixel storage handed out by a pluggable [`Pool`]
//! - [`Surface`]s are drawable views over a buffer
//! - a [`ConverterRegistry`] maps `(source format, rotation, destination format)` to a routine
//! - [`Renderer`]s paint into surfaces; [`HSwitch`] composites two children side by side
//!
//! A [`Context`] ties pools and the registry together for a set of backends.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Storage backends and the data they hand out.
pub mod backend;
/// Pixel buffers and borrowed image views.
pub mod buffer;
/// `image` crate bridge.
pub mod codec;
/// Engine context and backend providers.
pub mod context;
/// Pixel format conversion.
pub mod convert;
/// Storage pools.
pub mod pool;
/// Draw protocol and built-in renderers.
pub mod renderer;
/// Drawable surfaces.
pub mod surface;

pub use crate::foundation::core::{Color, PixelRect};
pub use crate::foundation::error::{PigmentError, PigmentResult};

pub use crate::backend::{Backend, BackendData, HardwareStorage, Plane, RawAccess, SoftwareData};
pub use crate::buffer::format::BufferFormat;
pub use crate::buffer::view::{ImageMut, ImageRef, PlaneMut, PlaneRef};
pub use crate::buffer::{Buffer, BufferRead, BufferWrite, UserData};
pub use crate::context::{BackendProvider, Context, ContextOpts, PoolKind, SoftwareBackend};
pub use crate::convert::{Angle, Converter, ConverterKey, ConverterRegistry};
pub use crate::pool::{HeapPool, HeapPoolOpts, Pool, PoolStats, RecyclingPool, RecyclingPoolOpts};
pub use crate::renderer::{
    Background, Checker, HSwitch, Renderer, RendererRef, SwitchEdge, SwitchMode,
};
pub use crate::surface::{Surface, SurfaceFormat, SurfaceInfo, SurfaceLock};
