use super::*;
use crate::pool::{HeapPool, Pool};
use crate::surface::SurfaceFormat;
use std::sync::Arc;

const BLACK: Color = Color {
    r: 0,
    g: 0,
    b: 0,
    a: 255,
};
const WHITE: Color = Color {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

fn surface(w: u32, h: u32) -> Surface {
    let pool: Arc<dyn Pool> = Arc::new(HeapPool::default());
    Surface::new(SurfaceFormat::Argb8888, w, h, &pool).unwrap()
}

#[test]
fn origin_cell_uses_even_colour() {
    let c = Checker::new(WHITE, BLACK, 2, 2);
    assert_eq!(c.sample(0, 0), 0xFFFF_FFFF);
    assert_eq!(c.sample(1, 1), 0xFFFF_FFFF);
    assert_eq!(c.sample(2, 0), 0xFF00_0000);
    assert_eq!(c.sample(2, 2), 0xFFFF_FFFF);
}

#[test]
fn negative_coordinates_continue_the_pattern() {
    let c = Checker::new(WHITE, BLACK, 2, 2);
    assert_eq!(c.sample(-1, 0), 0xFF00_0000);
    assert_eq!(c.sample(-2, -2), 0xFFFF_FFFF);
    assert_eq!(c.sample(-3, 0), 0xFF00_0000);
}

#[test]
fn draw_matches_sample_under_offset() {
    let s = surface(6, 3);
    let c = Checker::new(WHITE, BLACK, 2, 1);
    c.draw(&s, None, -3, 5).unwrap();

    let mut lock = s.lock().unwrap();
    for y in 0..3 {
        for x in 0..6 {
            assert_eq!(
                lock.pixel(x, y).unwrap(),
                c.sample(x as i32 - 3, y as i32 + 5),
                "({x},{y})"
            );
        }
    }
}

#[test]
fn zero_cell_is_invalid_argument() {
    let s = surface(2, 2);
    let c = Checker::new(WHITE, BLACK, 1, 1);
    c.set_cell_size(0, 4);
    let err = c.draw(&s, None, 0, 0).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidArgument(_)));
}

#[test]
fn colours_can_be_swapped() {
    let c = Checker::new(WHITE, BLACK, 1, 1);
    c.set_even_color(BLACK);
    c.set_odd_color(WHITE);
    assert_eq!(c.sample(0, 0), 0xFF00_0000);
    assert_eq!(c.sample(1, 0), 0xFFFF_FFFF);
}
