use super::*;

#[test]
fn packed_view_accepts_padded_stride() {
    let data = vec![0u8; 2 * 8 + 6];
    let v = ImageRef::packed(BufferFormat::Rgb888, 2, 3, &data, 8).unwrap();
    assert_eq!(v.row(0, 2).len(), 6);
}

#[test]
fn view_rejects_short_stride() {
    let data = vec![0u8; 64];
    let err = ImageRef::packed(BufferFormat::Argb8888Pre, 4, 2, &data, 12).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidFormat(_)));
}

#[test]
fn view_rejects_short_plane() {
    let data = vec![0u8; 15];
    let err = ImageRef::packed(BufferFormat::Argb8888Pre, 2, 2, &data, 8).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidFormat(_)));
}

#[test]
fn planar_view_requires_three_planes() {
    let data = vec![0u8; 4];
    let err = ImageRef::packed(BufferFormat::Rgb888Planar, 2, 2, &data, 2).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidFormat(_)));

    let (r, g, b) = (vec![1u8; 4], vec![2u8; 4], vec![3u8; 4]);
    let v = ImageRef::new(
        BufferFormat::Rgb888Planar,
        2,
        2,
        [
            PlaneRef { data: &r, stride: 2 },
            PlaneRef { data: &g, stride: 2 },
            PlaneRef { data: &b, stride: 2 },
        ],
    )
    .unwrap();
    assert_eq!(v.row(1, 1), &[2, 2]);
}

#[test]
fn zero_extent_view_is_invalid_format() {
    let data = vec![0u8; 4];
    let err = ImageRef::packed(BufferFormat::A8, 0, 1, &data, 4).unwrap_err();
    assert!(matches!(err, PigmentError::InvalidFormat(_)));
}

#[test]
fn mutable_view_writes_are_visible_through_reborrow() {
    let mut data = vec![0u8; 8];
    let mut v = ImageMut::packed(BufferFormat::A8, 3, 2, &mut data, 4).unwrap();
    v.row_mut(0, 1).copy_from_slice(&[7, 8, 9]);
    assert_eq!(v.as_image_ref().row(0, 1), &[7, 8, 9]);
    drop(v);
    assert_eq!(data, vec![0, 0, 0, 0, 7, 8, 9, 0]);
}
