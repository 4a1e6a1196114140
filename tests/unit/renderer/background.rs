use super::*;
use crate::pool::{HeapPool, Pool};
use crate::surface::SurfaceFormat;
use std::sync::Arc;

fn surface(format: SurfaceFormat, w: u32, h: u32) -> Surface {
    let pool: Arc<dyn Pool> = Arc::new(HeapPool::default());
    Surface::new(format, w, h, &pool).unwrap()
}

#[test]
fn fills_only_the_clip() {
    let s = surface(SurfaceFormat::Argb8888, 4, 2);
    let bg = Background::new(Color::opaque(0x10, 0x20, 0x30));
    bg.draw(&s, Some(PixelRect::new(1, 0, 2, 1)), 7, -3).unwrap();

    let mut lock = s.lock().unwrap();
    let mut row = [0u32; 4];
    lock.read_span(0, 0, &mut row).unwrap();
    assert_eq!(row, [0, 0xFF10_2030, 0xFF10_2030, 0]);
    lock.read_span(0, 1, &mut row).unwrap();
    assert_eq!(row, [0; 4]);
}

#[test]
fn colour_is_stored_premultiplied() {
    let s = surface(SurfaceFormat::Argb8888, 1, 1);
    let bg = Background::new(Color::transparent());
    bg.set_color(Color {
        r: 255,
        g: 0,
        b: 0,
        a: 128,
    });
    assert_eq!(bg.color().a, 128);
    bg.draw(&s, None, 0, 0).unwrap();
    assert_eq!(s.lock().unwrap().pixel(0, 0).unwrap(), 0x8080_0000);
}

#[test]
fn a8_surface_keeps_alpha() {
    let s = surface(SurfaceFormat::A8, 2, 1);
    Background::new(Color::opaque(1, 2, 3)).draw(&s, None, 0, 0).unwrap();
    assert_eq!(s.lock().unwrap().pixel(1, 0).unwrap(), 0xFFFF_FFFF);
}
