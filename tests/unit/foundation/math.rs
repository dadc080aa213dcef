use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn unpremul_inverts_premul_for_opaque_and_transparent() {
    assert_eq!(unpremul_channel(200, 255), 200);
    assert_eq!(unpremul_channel(200, 0), 0);
    let premul = mul_div255_u8(180, 128);
    assert!((i32::from(unpremul_channel(premul, 128)) - 180).abs() <= 1);
}

#[test]
fn luma_of_white_and_black() {
    assert!((luma(255, 255, 255) - 255.0).abs() < 1e-9);
    assert_eq!(luma(0, 0, 0), 0.0);
}
