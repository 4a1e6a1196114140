//! Bridge between surfaces and the `image` crate's pixel buffers.
//!
//! `image` buffers are straight-alpha RGBA or RGB bytes; everything goes through the context's
//! converter registry, with a hop through the canonical format when no direct routine exists.

use crate::backend::SoftwareData;
use crate::buffer::Buffer;
use crate::buffer::format::BufferFormat;
use crate::buffer::view::{ImageMut, ImageRef};
use crate::context::Context;
use crate::convert::{Angle, ConverterRegistry};
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::surface::{Surface, SurfaceFormat};
use anyhow::{Context as _, anyhow};
use image::{RgbImage, RgbaImage};
use std::io::Cursor;

fn convert_routed(
    registry: &ConverterRegistry,
    src: &ImageRef<'_>,
    dst: &mut ImageMut<'_>,
    angle: Angle,
) -> PigmentResult<()> {
    if registry.contains(src.format(), angle, dst.format()) {
        return registry.convert(src, dst, angle);
    }
    let canonical = BufferFormat::CANONICAL;
    let (w, h) = angle.rotated_extent(src.width(), src.height());
    let stride = canonical
        .row_bytes(w)
        .ok_or_else(|| PigmentError::allocation(format!("{w}px canonical row overflows")))?;
    let mut scratch = vec![0u8; stride * h as usize];
    {
        let mut mid = ImageMut::packed(canonical, w, h, &mut scratch, stride)?;
        registry.convert(src, &mut mid, angle)?;
    }
    let mid = ImageRef::packed(canonical, w, h, &scratch, stride)?;
    registry.convert(&mid, dst, Angle::None)
}

/// Build a premultiplied surface from straight-alpha RGBA pixels, rotated by `angle`.
pub fn surface_from_rgba_image(
    ctx: &Context,
    img: &RgbaImage,
    angle: Angle,
) -> PigmentResult<Surface> {
    let (w, h) = img.dimensions();
    let src = ImageRef::packed(BufferFormat::Rgba8888, w, h, img.as_raw(), w as usize * 4)?;
    let (sw, sh) = angle.rotated_extent(w, h);
    let surface = ctx.surface(SurfaceFormat::Argb8888, sw, sh)?;
    {
        let mut write = surface.buffer().write();
        let mut dst = write.image_mut()?;
        convert_routed(ctx.registry(), &src, &mut dst, angle)?;
    }
    Ok(surface)
}

fn surface_to_bytes(
    ctx: &Context,
    surface: &Surface,
    format: BufferFormat,
) -> PigmentResult<Vec<u8>> {
    let buffer = surface.buffer();
    let (w, h) = (buffer.width(), buffer.height());
    let stride = format
        .row_bytes(w)
        .ok_or_else(|| PigmentError::allocation(format!("{w}px {format:?} row overflows")))?;
    let mut bytes = vec![0u8; stride * h as usize];
    {
        let read = buffer.read();
        let src = read.image()?;
        let mut dst = ImageMut::packed(format, w, h, &mut bytes, stride)?;
        convert_routed(ctx.registry(), &src, &mut dst, Angle::None)?;
    }
    Ok(bytes)
}

/// Export a surface as straight-alpha RGBA.
pub fn surface_to_rgba_image(ctx: &Context, surface: &Surface) -> PigmentResult<RgbaImage> {
    let bytes = surface_to_bytes(ctx, surface, BufferFormat::Rgba8888)?;
    let (w, h) = (surface.width(), surface.height());
    let img = RgbaImage::from_raw(w, h, bytes)
        .ok_or_else(|| anyhow!("rgba buffer does not match {w}x{h}"))?;
    Ok(img)
}

/// Export a surface as RGB, dropping alpha.
pub fn surface_to_rgb_image(ctx: &Context, surface: &Surface) -> PigmentResult<RgbImage> {
    let bytes = surface_to_bytes(ctx, surface, BufferFormat::Rgb888)?;
    let (w, h) = (surface.width(), surface.height());
    let img = RgbImage::from_raw(w, h, bytes)
        .ok_or_else(|| anyhow!("rgb buffer does not match {w}x{h}"))?;
    Ok(img)
}

/// Wrap an RGB image's storage as an external `Rgb888` buffer without copying.
pub fn buffer_from_rgb_image(img: RgbImage) -> PigmentResult<Buffer> {
    let (w, h) = img.dimensions();
    let data = SoftwareData::packed(img.into_raw(), w as usize * 3);
    Buffer::from_external(BufferFormat::Rgb888, w, h, data)
}

/// Decode an encoded image (any format `image` was built with) into a surface.
pub fn decode_surface(ctx: &Context, bytes: &[u8]) -> PigmentResult<Surface> {
    let img = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    surface_from_rgba_image(ctx, &img, Angle::None)
}

/// Encode a surface as PNG.
pub fn encode_png(ctx: &Context, surface: &Surface) -> PigmentResult<Vec<u8>> {
    let img = surface_to_rgba_image(ctx, surface)?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

#[cfg(test)]
#[path = "../tests/unit/codec/codec.rs"]
mod tests;
