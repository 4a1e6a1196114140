use super::*;
use crate::context::ContextOpts;
use crate::foundation::core::Color;
use crate::renderer::{Background, Renderer};
use image::{Rgb, Rgba};

fn ctx() -> Context {
    Context::new(ContextOpts::default()).unwrap()
}

#[test]
fn rgba_image_imports_premultiplied() {
    let ctx = ctx();
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([0x10, 0x20, 0x30, 0xFF]));
    img.put_pixel(1, 0, Rgba([0xFF, 0x00, 0x00, 0x80]));

    let s = surface_from_rgba_image(&ctx, &img, Angle::None).unwrap();
    let mut lock = s.lock().unwrap();
    assert_eq!(lock.pixel(0, 0).unwrap(), 0xFF10_2030);
    assert_eq!(lock.pixel(1, 0).unwrap(), 0x8080_0000);
}

#[test]
fn rotated_import_swaps_extent() {
    let ctx = ctx();
    let mut img = RgbaImage::new(3, 1);
    img.put_pixel(0, 0, Rgba([0xFF, 0, 0, 0xFF]));
    let s = surface_from_rgba_image(&ctx, &img, Angle::Cw90).unwrap();
    assert_eq!((s.width(), s.height()), (1, 3));
    assert_eq!(s.lock().unwrap().pixel(0, 0).unwrap(), 0xFFFF_0000);
}

#[test]
fn export_round_trips_opaque_pixels() {
    let ctx = ctx();
    let mut img = RgbaImage::new(2, 2);
    for (i, px) in img.pixels_mut().enumerate() {
        *px = Rgba([i as u8 * 40, 7, 200, 0xFF]);
    }
    let s = surface_from_rgba_image(&ctx, &img, Angle::None).unwrap();
    assert_eq!(surface_to_rgba_image(&ctx, &s).unwrap(), img);
}

#[test]
fn rgb_export_drops_alpha() {
    let ctx = ctx();
    let s = ctx.surface(SurfaceFormat::Argb8888, 2, 1).unwrap();
    Background::new(Color::opaque(0x10, 0x20, 0x30))
        .draw(&s, None, 0, 0)
        .unwrap();
    let rgb = surface_to_rgb_image(&ctx, &s).unwrap();
    assert_eq!(rgb.get_pixel(1, 0), &Rgb([0x10, 0x20, 0x30]));
}

#[test]
fn a8_surface_exports_through_canonical() {
    let ctx = ctx();
    let s = ctx.surface(SurfaceFormat::A8, 1, 1).unwrap();
    s.lock().unwrap().fill(0x8000_0000).unwrap();
    let rgba = surface_to_rgba_image(&ctx, &s).unwrap();
    assert_eq!(rgba.get_pixel(0, 0), &Rgba([0xFF, 0xFF, 0xFF, 0x80]));
}

#[test]
fn rgb_image_wraps_without_pool() {
    let mut img = RgbImage::new(2, 1);
    img.put_pixel(1, 0, Rgb([1, 2, 3]));
    let b = buffer_from_rgb_image(img).unwrap();
    assert!(b.is_external());
    assert!(b.pool().is_none());
    let read = b.read();
    assert_eq!(read.image().unwrap().row(0, 0), &[0, 0, 0, 1, 2, 3]);
}

#[test]
fn png_encode_then_decode() {
    let ctx = ctx();
    let s = ctx.surface(SurfaceFormat::Argb8888, 3, 2).unwrap();
    Background::new(Color::opaque(9, 8, 7)).draw(&s, None, 0, 0).unwrap();

    let png = encode_png(&ctx, &s).unwrap();
    let back = decode_surface(&ctx, &png).unwrap();
    assert_eq!((back.width(), back.height()), (3, 2));
    assert_eq!(
        back.buffer().content_hash().unwrap(),
        s.buffer().content_hash().unwrap()
    );
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let err = decode_surface(&ctx(), b"not an image").unwrap_err();
    assert!(matches!(err, PigmentError::Other(_)));
}
