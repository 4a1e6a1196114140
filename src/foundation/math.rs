pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Split a `0xAARRGGBB` word into `[a, r, g, b]`.
#[inline]
pub(crate) fn argb_channels(p: u32) -> [u8; 4] {
    [(p >> 24) as u8, (p >> 16) as u8, (p >> 8) as u8, p as u8]
}

/// Pack `[a, r, g, b]` into a `0xAARRGGBB` word.
#[inline]
pub(crate) fn argb_pack(c: [u8; 4]) -> u32 {
    (u32::from(c[0]) << 24) | (u32::from(c[1]) << 16) | (u32::from(c[2]) << 8) | u32::from(c[3])
}

/// Straight-alpha ARGB word to premultiplied.
pub(crate) fn premultiply(p: u32) -> u32 {
    let [a, r, g, b] = argb_channels(p);
    match a {
        255 => p,
        0 => 0,
        _ => {
            let a16 = u16::from(a);
            argb_pack([
                a,
                mul_div255_u8(u16::from(r), a16),
                mul_div255_u8(u16::from(g), a16),
                mul_div255_u8(u16::from(b), a16),
            ])
        }
    }
}

/// Premultiplied ARGB word to straight alpha.
pub(crate) fn unpremultiply(p: u32) -> u32 {
    let [a, r, g, b] = argb_channels(p);
    match a {
        255 => p,
        0 => 0,
        _ => {
            let un = |c: u8| -> u8 {
                let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
                v.min(255) as u8
            };
            argb_pack([a, un(r), un(g), un(b)])
        }
    }
}

/// Linear blend of two premultiplied words, `t = 0` yields `a`, `t = 1` yields `b`.
pub(crate) fn crossfade(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
    let it = 255u16 - tt;

    let ca = argb_channels(a);
    let cb = argb_channels(b);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255_u8(u16::from(ca[i]), it);
        let bv = mul_div255_u8(u16::from(cb[i]), tt);
        out[i] = av.saturating_add(bv);
    }
    argb_pack(out)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
