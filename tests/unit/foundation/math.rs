use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(100, 128), 50);
}

#[test]
fn pack_and_split_are_inverse() {
    let p = 0x80_40_20_10;
    assert_eq!(argb_channels(p), [0x80, 0x40, 0x20, 0x10]);
    assert_eq!(argb_pack(argb_channels(p)), p);
}

#[test]
fn premultiply_scales_color_by_alpha() {
    assert_eq!(premultiply(0xFF_12_34_56), 0xFF_12_34_56);
    assert_eq!(premultiply(0x00_12_34_56), 0);
    assert_eq!(premultiply(0x80_FF_00_FF), 0x80_80_00_80);
}

#[test]
fn unpremultiply_restores_opaque_extremes() {
    assert_eq!(unpremultiply(0x80_80_00_80), 0x80_FF_00_FF);
    assert_eq!(unpremultiply(0), 0);
    assert_eq!(unpremultiply(0xFF_01_02_03), 0xFF_01_02_03);
}

#[test]
fn crossfade_endpoints_match_inputs() {
    let a = 0xFF_10_20_30;
    let b = 0x80_40_00_40;
    assert_eq!(crossfade(a, b, 0.0), a);
    assert_eq!(crossfade(a, b, 1.0), b);
}
