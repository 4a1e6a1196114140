use super::*;
use crate::pool::{HeapPool, Pool};
use crate::surface::SurfaceFormat;

fn surface(w: u32, h: u32) -> Surface {
    let pool: Arc<dyn Pool> = Arc::new(HeapPool::default());
    Surface::new(SurfaceFormat::Argb8888, w, h, &pool).unwrap()
}

#[test]
fn missing_clip_resolves_to_whole_surface() {
    let s = surface(5, 3);
    assert_eq!(resolve_clip(&s, None).unwrap(), PixelRect::from_size(5, 3));
}

#[test]
fn clip_outside_surface_is_invalid_argument() {
    let s = surface(5, 3);
    for clip in [
        PixelRect::new(-1, 0, 2, 2),
        PixelRect::new(4, 0, 2, 1),
        PixelRect::new(0, 2, 1, 2),
    ] {
        let err = resolve_clip(&s, Some(clip)).unwrap_err();
        assert!(matches!(err, PigmentError::InvalidArgument(_)), "{clip:?}");
    }
}

#[test]
fn empty_clip_is_a_no_op_anywhere() {
    let s = surface(5, 3);
    let r = resolve_clip(&s, Some(PixelRect::new(100, 100, 0, 4))).unwrap();
    assert!(r.is_empty());
}

#[test]
fn spans_carry_renderer_coordinates() {
    let s = surface(3, 2);
    let mut seen = Vec::new();
    draw_spans(&s, Some(PixelRect::new(1, 0, 2, 2)), 10, 20, |rx, ry, row| {
        seen.push((rx, ry, row.len()));
        row.fill(0xFF00_0000);
    })
    .unwrap();
    assert_eq!(seen, vec![(11, 20, 2), (11, 21, 2)]);

    let mut lock = s.lock().unwrap();
    assert_eq!(lock.pixel(0, 0).unwrap(), 0);
    assert_eq!(lock.pixel(1, 1).unwrap(), 0xFF00_0000);
}

#[test]
fn negative_origin_still_paints_the_whole_clip() {
    let s = surface(4, 4);
    let mut rows = Vec::new();
    draw_spans(&s, None, -1, -1, |rx, ry, row| {
        assert_eq!((rx, row.len()), (-1, 4));
        rows.push(ry);
        row.fill(0xFFFF_FFFF);
    })
    .unwrap();
    assert_eq!(rows, vec![-1, 0, 1, 2]);

    let mut lock = s.lock().unwrap();
    assert_eq!(lock.pixel(0, 0).unwrap(), 0xFFFF_FFFF);
    assert_eq!(lock.pixel(3, 3).unwrap(), 0xFFFF_FFFF);
}
