//! Tests for PNG encoding of globe previews.

use std::io::Read;

use globe_common::Color;
use renderer::png::{create_png, create_png_auto};
use renderer::{render_preview, PreviewRequest, ViewBasis};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Walk the chunk list, returning (type, data) pairs.
fn chunks(png: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = 8;
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let kind = String::from_utf8_lossy(&png[pos + 4..pos + 8]).to_string();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = &png[pos + 8 + len..pos + 12 + len];

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&png[pos + 4..pos + 8 + len]);
        assert_eq!(crc, hasher.finalize().to_be_bytes(), "bad CRC on {}", kind);

        out.push((kind, data));
        pos += 12 + len;
    }
    out
}

fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter().copied().cycle().take(width * height * 4).collect()
}

#[test]
fn test_create_png_simple() {
    let pixels = [
        255, 0, 0, 255, // red
        0, 255, 0, 255, // green
        0, 255, 0, 255, // green
        255, 0, 0, 255, // red
    ];

    let png = create_png(&pixels, 2, 2).unwrap();
    assert_eq!(&png[0..8], &SIGNATURE);

    let kinds: Vec<String> = chunks(&png).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec!["IHDR", "IDAT", "IEND"]);
}

#[test]
fn test_rgba_idat_round_trips() {
    let pixels = solid(3, 2, [10, 20, 30, 40]);
    let png = create_png(&pixels, 3, 2).unwrap();

    let idat = chunks(&png)
        .into_iter()
        .find(|(k, _)| k == "IDAT")
        .map(|(_, d)| d)
        .unwrap();
    let mut raw = Vec::new();
    flate2::read::ZlibDecoder::new(&idat[..])
        .read_to_end(&mut raw)
        .unwrap();

    // Two scanlines, each a filter byte plus 3 RGBA pixels
    assert_eq!(raw.len(), 2 * (1 + 12));
    assert_eq!(raw[0], 0);
    assert_eq!(&raw[1..5], &[10, 20, 30, 40]);
}

#[test]
fn test_auto_uses_palette_with_transparency() {
    let mut pixels = solid(4, 4, [14, 17, 23, 255]);
    pixels[0..4].copy_from_slice(&[255, 255, 255, 0]);

    let png = create_png_auto(&pixels, 4, 4).unwrap();
    let found = chunks(&png);
    let kinds: Vec<&str> = found.iter().map(|(k, _)| k.as_str()).collect();

    assert_eq!(kinds, vec!["IHDR", "PLTE", "tRNS", "IDAT", "IEND"]);
    // Color type 3
    assert_eq!(found[0].1[9], 3);
    assert_eq!(found[1].1.len(), 2 * 3);
}

#[test]
fn test_auto_falls_back_to_rgba() {
    let pixels: Vec<u8> = (0..300u32)
        .flat_map(|i| [(i % 256) as u8, (i / 2 % 256) as u8, (i / 3 % 256) as u8, 255])
        .collect();

    let png = create_png_auto(&pixels, 300, 1).unwrap();
    assert_eq!(chunks(&png)[0].1[9], 6);
}

#[test]
fn test_buffer_size_mismatch_is_error() {
    let err = create_png(&[0u8; 10], 2, 2).unwrap_err();
    assert!(err.contains("expected 16"));
    assert!(create_png_auto(&[], 0, 0).is_err());
}

#[test]
fn test_preview_encodes_with_window_size() {
    let request = PreviewRequest {
        width: 80,
        height: 50,
        background: Color::rgb(14, 17, 23),
        view: ViewBasis {
            forward: [0.0, 1.0, 0.0],
            up: [0.0, 0.0, 1.0],
        },
        base: Some(Color::rgb(20, 60, 120)),
        data: None,
        graticule: None,
    };
    let pixels = render_preview(&request);
    let png = create_png_auto(&pixels, 80, 50).unwrap();

    let ihdr = &chunks(&png)[0].1;
    assert_eq!(&ihdr[0..4], &80u32.to_be_bytes());
    assert_eq!(&ihdr[4..8], &50u32.to_be_bytes());
}
