use super::*;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Rgba8 = "#ff0000".parse().unwrap();
    assert_eq!(c, Rgba8::rgba(255, 0, 0, 255));

    let c: Rgba8 = "#0000FF80".parse().unwrap();
    assert_eq!(c, Rgba8::rgba(0, 0, 255, 0x80));
}

#[test]
fn missing_alpha_is_opaque_and_explicit_alpha_is_kept() {
    let c: Rgba8 = "#00FF00".parse().unwrap();
    assert_eq!(c.a, 0xFF);
    let c: Rgba8 = "#00FF0080".parse().unwrap();
    assert_eq!(c.a, 0x80);
    let c: Rgba8 = "#00FF0000".parse().unwrap();
    assert_eq!(c.a, 0);
}

#[test]
fn rejects_bad_lengths_and_digits() {
    assert!("#fff".parse::<Rgba8>().is_err());
    assert!("#12345".parse::<Rgba8>().is_err());
    assert!("#GG0000".parse::<Rgba8>().is_err());
    assert!("#ffé0000".parse::<Rgba8>().is_err());
}

#[test]
fn display_is_canonical_uppercase_with_alpha() {
    assert_eq!(Rgba8::rgba(0x0a, 0xbc, 0xde, 0xff).to_string(), "#0ABCDEFF");
    let back: Rgba8 = Rgba8::rgba(1, 2, 3, 4).to_string().parse().unwrap();
    assert_eq!(back, Rgba8::rgba(1, 2, 3, 4));
}

#[test]
fn premul_then_unpremul_keeps_opaque_and_clears_transparent() {
    assert_eq!(Rgba8::rgba(200, 100, 50, 255).to_premul(), [200, 100, 50, 255]);
    assert_eq!(Rgba8::rgba(200, 100, 50, 0).to_premul(), [0, 0, 0, 0]);

    let mut px = Rgba8::rgba(255, 0, 0, 128).to_premul().to_vec();
    assert_eq!(px, vec![128, 0, 0, 128]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![255, 0, 0, 128]);
}
