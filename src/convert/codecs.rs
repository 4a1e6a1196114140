//! Per-format pixel load/store against the canonical premultiplied ARGB word.

use crate::buffer::format::BufferFormat;
use crate::buffer::view::{ImageMut, ImageRef};
use crate::foundation::math::{argb_channels, argb_pack, premultiply, unpremultiply};

/// Moves one pixel between a storage format and a canonical `0xAARRGGBB` premultiplied word.
pub(crate) trait PixelCodec {
    const FORMAT: BufferFormat;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32;

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32);
}

#[inline]
fn px<'a>(img: &ImageRef<'a>, plane: usize, x: u32, y: u32, bpp: usize) -> &'a [u8] {
    let start = (x as usize) * bpp;
    &img.row(plane, y)[start..start + bpp]
}

#[inline]
fn px_mut<'a>(img: &'a mut ImageMut<'_>, plane: usize, x: u32, y: u32, bpp: usize) -> &'a mut [u8] {
    let start = (x as usize) * bpp;
    &mut img.row_mut(plane, y)[start..start + bpp]
}

pub(crate) struct Argb8888Pre;

impl PixelCodec for Argb8888Pre {
    const FORMAT: BufferFormat = BufferFormat::Argb8888Pre;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        let b = px(img, 0, x, y, 4);
        u32::from_ne_bytes([b[0], b[1], b[2], b[3]])
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        px_mut(img, 0, x, y, 4).copy_from_slice(&p.to_ne_bytes());
    }
}

pub(crate) struct Argb8888;

impl PixelCodec for Argb8888 {
    const FORMAT: BufferFormat = BufferFormat::Argb8888;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        premultiply(Argb8888Pre::load(img, x, y))
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        Argb8888Pre::store(img, x, y, unpremultiply(p));
    }
}

pub(crate) struct Rgba8888;

impl PixelCodec for Rgba8888 {
    const FORMAT: BufferFormat = BufferFormat::Rgba8888;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        let b = px(img, 0, x, y, 4);
        premultiply(argb_pack([b[3], b[0], b[1], b[2]]))
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        let [a, r, g, b] = argb_channels(unpremultiply(p));
        px_mut(img, 0, x, y, 4).copy_from_slice(&[r, g, b, a]);
    }
}

pub(crate) struct Rgb888;

impl PixelCodec for Rgb888 {
    const FORMAT: BufferFormat = BufferFormat::Rgb888;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        let b = px(img, 0, x, y, 3);
        argb_pack([0xFF, b[0], b[1], b[2]])
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        let [_, r, g, b] = argb_channels(p);
        px_mut(img, 0, x, y, 3).copy_from_slice(&[r, g, b]);
    }
}

pub(crate) struct Bgr888;

impl PixelCodec for Bgr888 {
    const FORMAT: BufferFormat = BufferFormat::Bgr888;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        let b = px(img, 0, x, y, 3);
        argb_pack([0xFF, b[2], b[1], b[0]])
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        let [_, r, g, b] = argb_channels(p);
        px_mut(img, 0, x, y, 3).copy_from_slice(&[b, g, r]);
    }
}

pub(crate) struct Rgb888Planar;

impl PixelCodec for Rgb888Planar {
    const FORMAT: BufferFormat = BufferFormat::Rgb888Planar;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        let r = px(img, 0, x, y, 1)[0];
        let g = px(img, 1, x, y, 1)[0];
        let b = px(img, 2, x, y, 1)[0];
        argb_pack([0xFF, r, g, b])
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        let [_, r, g, b] = argb_channels(p);
        px_mut(img, 0, x, y, 1)[0] = r;
        px_mut(img, 1, x, y, 1)[0] = g;
        px_mut(img, 2, x, y, 1)[0] = b;
    }
}

pub(crate) struct Rgb565;

impl PixelCodec for Rgb565 {
    const FORMAT: BufferFormat = BufferFormat::Rgb565;

    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        let b = px(img, 0, x, y, 2);
        let v = u16::from_le_bytes([b[0], b[1]]);
        let r5 = ((v >> 11) & 0x1F) as u8;
        let g6 = ((v >> 5) & 0x3F) as u8;
        let b5 = (v & 0x1F) as u8;
        argb_pack([
            0xFF,
            (r5 << 3) | (r5 >> 2),
            (g6 << 2) | (g6 >> 4),
            (b5 << 3) | (b5 >> 2),
        ])
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        let [_, r, g, b] = argb_channels(p);
        let v = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
        px_mut(img, 0, x, y, 2).copy_from_slice(&v.to_le_bytes());
    }
}

pub(crate) struct A8;

impl PixelCodec for A8 {
    const FORMAT: BufferFormat = BufferFormat::A8;

    // Coverage reads back as premultiplied white.
    fn load(img: &ImageRef<'_>, x: u32, y: u32) -> u32 {
        u32::from(px(img, 0, x, y, 1)[0]) * 0x0101_0101
    }

    fn store(img: &mut ImageMut<'_>, x: u32, y: u32, p: u32) {
        px_mut(img, 0, x, y, 1)[0] = (p >> 24) as u8;
    }
}
