//! Pixel-format conversion registry.
//!
//! Routines are keyed by `(source format, angle, destination format)`. The registry is an
//! explicit object owned by [`crate::Context`]; backends populate it once at start-up.
//!
//! Conversion is layout work only: channels are moved by exact 8-bit shifting and masking.
//! Alpha is dropped for alpha-less destinations and synthesized as opaque for alpha-less
//! sources. The only arithmetic is premultiplication for straight-alpha formats and bit
//! truncation/replication for `Rgb565`.

pub(crate) mod codecs;
pub(crate) mod routines;

use crate::buffer::Buffer;
use crate::buffer::format::BufferFormat;
use crate::buffer::view::{ImageMut, ImageRef};
use crate::foundation::error::{PigmentError, PigmentResult};
use std::collections::HashMap;
use std::fmt;

pub use routines::{ImageConverter, SpanConverter};

/// Clockwise rotation applied while converting.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Angle {
    /// Straight copy.
    #[default]
    None,
    /// 90 degrees clockwise.
    Cw90,
    /// 180 degrees.
    Cw180,
    /// 270 degrees clockwise.
    Cw270,
}

impl Angle {
    /// Every supported angle.
    pub const ALL: [Angle; 4] = [Angle::None, Angle::Cw90, Angle::Cw180, Angle::Cw270];

    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Angle::None => 0,
            Angle::Cw90 => 90,
            Angle::Cw180 => 180,
            Angle::Cw270 => 270,
        }
    }

    /// Extent of a `width x height` image after rotation.
    pub fn rotated_extent(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Angle::None | Angle::Cw180 => (width, height),
            Angle::Cw90 | Angle::Cw270 => (height, width),
        }
    }
}

/// A registered conversion routine with its dimensionality.
#[derive(Clone, Copy)]
pub enum Converter {
    /// Converts a full image, rotation included.
    Image(ImageConverter),
    /// Converts one row at a time; only valid without rotation.
    Span(SpanConverter),
}

impl Converter {
    /// Whether both values point at the same routine.
    pub fn same_routine(&self, other: &Converter) -> bool {
        match (self, other) {
            (Converter::Image(a), Converter::Image(b)) => std::ptr::fn_addr_eq(*a, *b),
            (Converter::Span(a), Converter::Span(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }

    /// Whether this is a 1D (row) routine.
    pub fn is_span(&self) -> bool {
        matches!(self, Converter::Span(_))
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Image(_) => f.write_str("Converter::Image"),
            Converter::Span(_) => f.write_str("Converter::Span"),
        }
    }
}

/// Registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConverterKey {
    /// Source storage format.
    pub src: BufferFormat,
    /// Rotation.
    pub angle: Angle,
    /// Destination storage format.
    pub dst: BufferFormat,
}

impl ConverterKey {
    /// Build a key.
    pub fn new(src: BufferFormat, angle: Angle, dst: BufferFormat) -> Self {
        Self { src, angle, dst }
    }
}

/// Maps `(source, angle, destination)` to a conversion routine. Last registration wins.
#[derive(Default, Clone)]
pub struct ConverterRegistry {
    entries: HashMap<ConverterKey, Converter>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ConverterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in software routines.
    pub fn with_software_defaults() -> Self {
        let mut reg = Self::new();
        reg.install_software_defaults();
        reg
    }

    /// Add the built-in software routines, replacing existing entries with the same keys.
    pub fn install_software_defaults(&mut self) {
        let defaults = routines::software_defaults();
        tracing::debug!(count = defaults.len(), "registering software converters");
        self.entries.extend(defaults);
    }

    /// Insert or replace the routine for `(src, angle, dst)`, returning the one it replaced.
    pub fn register(
        &mut self,
        converter: Converter,
        src: BufferFormat,
        angle: Angle,
        dst: BufferFormat,
    ) -> PigmentResult<Option<Converter>> {
        if converter.is_span() && angle != Angle::None {
            return Err(PigmentError::invalid_argument(format!(
                "span converter {src:?}->{dst:?} cannot rotate by {angle:?}"
            )));
        }
        tracing::trace!(?src, ?angle, ?dst, "register converter");
        Ok(self
            .entries
            .insert(ConverterKey::new(src, angle, dst), converter))
    }

    /// Routine registered for `(src, angle, dst)`.
    pub fn lookup(
        &self,
        src: BufferFormat,
        angle: Angle,
        dst: BufferFormat,
    ) -> PigmentResult<Converter> {
        self.entries
            .get(&ConverterKey::new(src, angle, dst))
            .copied()
            .ok_or_else(|| {
                PigmentError::not_found(format!("no converter {src:?} -> {dst:?} at {angle:?}"))
            })
    }

    /// Whether a routine is registered for the triple.
    pub fn contains(&self, src: BufferFormat, angle: Angle, dst: BufferFormat) -> bool {
        self.entries
            .contains_key(&ConverterKey::new(src, angle, dst))
    }

    /// Number of registered routines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = ConverterKey> + '_ {
        self.entries.keys().copied()
    }

    /// Convert `src` into `dst`, rotating by `angle`.
    ///
    /// `dst` must have the rotated extent of `src`. Strides are honoured independently.
    #[tracing::instrument(
        level = "debug",
        skip(self, src, dst),
        fields(src_format = ?src.format(), dst_format = ?dst.format())
    )]
    pub fn convert(
        &self,
        src: &ImageRef<'_>,
        dst: &mut ImageMut<'_>,
        angle: Angle,
    ) -> PigmentResult<()> {
        let converter = self.lookup(src.format(), angle, dst.format())?;
        let (w, h) = angle.rotated_extent(src.width(), src.height());
        if (dst.width(), dst.height()) != (w, h) {
            return Err(PigmentError::invalid_argument(format!(
                "destination is {}x{}, rotation by {angle:?} needs {w}x{h}",
                dst.width(),
                dst.height()
            )));
        }
        match converter {
            Converter::Image(f) => f(src, dst),
            Converter::Span(f) => {
                for y in 0..src.height() {
                    f(src, dst, y);
                }
            }
        }
        Ok(())
    }

    /// Convert row `y` only, for callers that produce or consume pixels line by line.
    ///
    /// Requires a span routine for `(src, Angle::None, dst)` and equal extents.
    pub fn convert_row(
        &self,
        src: &ImageRef<'_>,
        dst: &mut ImageMut<'_>,
        y: u32,
    ) -> PigmentResult<()> {
        let Converter::Span(f) = self.lookup(src.format(), Angle::None, dst.format())? else {
            return Err(PigmentError::not_found(format!(
                "no span converter {:?} -> {:?}",
                src.format(),
                dst.format()
            )));
        };
        if (dst.width(), dst.height()) != (src.width(), src.height()) || y >= src.height() {
            return Err(PigmentError::invalid_argument(format!(
                "row {y} outside {}x{} conversion",
                src.width(),
                src.height()
            )));
        }
        f(src, dst, y);
        Ok(())
    }

    /// Convert one buffer's pixels into another buffer.
    pub fn convert_buffer(&self, src: &Buffer, dst: &Buffer, angle: Angle) -> PigmentResult<()> {
        if src.ptr_eq(dst) {
            return Err(PigmentError::invalid_argument(
                "cannot convert a buffer into itself",
            ));
        }
        let read = src.read();
        let src_img = read.image()?;
        let mut write = dst.write();
        let mut dst_img = write.image_mut()?;
        self.convert(&src_img, &mut dst_img, angle)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/registry.rs"]
mod tests;
