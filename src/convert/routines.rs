use crate::buffer::view::{ImageMut, ImageRef};
use crate::convert::codecs::{
    A8, Argb8888, Argb8888Pre, Bgr888, PixelCodec, Rgb565, Rgb888, Rgb888Planar, Rgba8888,
};
use crate::convert::{Angle, Converter, ConverterKey};
use std::collections::HashMap;

/// Whole-image routine. Destination extent is already checked against the rotation.
pub type ImageConverter = fn(&ImageRef<'_>, &mut ImageMut<'_>);

/// Single-row routine converting row `y` of the source into row `y` of the destination.
pub type SpanConverter = fn(&ImageRef<'_>, &mut ImageMut<'_>, u32);

pub(crate) fn convert_image<S: PixelCodec, D: PixelCodec, const DEG: u16>(
    src: &ImageRef<'_>,
    dst: &mut ImageMut<'_>,
) {
    let (w, h) = (src.width(), src.height());
    for y in 0..h {
        for x in 0..w {
            let p = S::load(src, x, y);
            let (dx, dy) = match DEG {
                90 => (h - 1 - y, x),
                180 => (w - 1 - x, h - 1 - y),
                270 => (y, w - 1 - x),
                _ => (x, y),
            };
            D::store(dst, dx, dy, p);
        }
    }
}

pub(crate) fn convert_span<S: PixelCodec, D: PixelCodec>(
    src: &ImageRef<'_>,
    dst: &mut ImageMut<'_>,
    y: u32,
) {
    for x in 0..src.width() {
        D::store(dst, x, y, S::load(src, x, y));
    }
}

/// Same-format row copy, plane by plane.
pub(crate) fn copy_span(src: &ImageRef<'_>, dst: &mut ImageMut<'_>, y: u32) {
    for plane in 0..src.format().plane_count() {
        dst.row_mut(plane, y).copy_from_slice(src.row(plane, y));
    }
}

fn insert(map: &mut HashMap<ConverterKey, Converter>, key: ConverterKey, c: Converter) {
    map.insert(key, c);
}

macro_rules! register_all_angles {
    ($map:expr, $src:ty, $dst:ty) => {{
        let (s, d) = (<$src>::FORMAT, <$dst>::FORMAT);
        insert(
            $map,
            ConverterKey::new(s, Angle::None, d),
            Converter::Span(convert_span::<$src, $dst>),
        );
        insert(
            $map,
            ConverterKey::new(s, Angle::Cw90, d),
            Converter::Image(convert_image::<$src, $dst, 90>),
        );
        insert(
            $map,
            ConverterKey::new(s, Angle::Cw180, d),
            Converter::Image(convert_image::<$src, $dst, 180>),
        );
        insert(
            $map,
            ConverterKey::new(s, Angle::Cw270, d),
            Converter::Image(convert_image::<$src, $dst, 270>),
        );
    }};
}

macro_rules! register_both_ways {
    ($map:expr, $($fmt:ty),+ $(,)?) => {{
        $(
            register_all_angles!($map, Argb8888Pre, $fmt);
            register_all_angles!($map, $fmt, Argb8888Pre);
        )+
    }};
}

/// Built-in software routines: every format to and from the canonical format at every angle,
/// plus same-format copies and lossless same-format rotations.
pub(crate) fn software_defaults() -> HashMap<ConverterKey, Converter> {
    let mut map = HashMap::new();
    register_both_ways!(
        &mut map,
        Argb8888,
        Rgba8888,
        Rgb888,
        Bgr888,
        Rgb888Planar,
        Rgb565,
        A8,
    );

    // Straight-alpha formats round-trip through premultiplication, so only lossless formats get
    // same-format rotations.
    register_all_angles!(&mut map, Argb8888Pre, Argb8888Pre);
    register_all_angles!(&mut map, Rgb888, Rgb888);
    register_all_angles!(&mut map, Bgr888, Bgr888);
    register_all_angles!(&mut map, Rgb888Planar, Rgb888Planar);
    register_all_angles!(&mut map, Rgb565, Rgb565);
    register_all_angles!(&mut map, A8, A8);

    for format in crate::buffer::format::BufferFormat::ALL {
        insert(
            &mut map,
            ConverterKey::new(format, Angle::None, format),
            Converter::Span(copy_span),
        );
    }
    map
}
