use lsb::{
    bmp::{Bitmap, BmpError, Channel},
    BitWidth,
};
use std::io::Cursor;

fn encode_file(image: &Bitmap) -> Vec<u8> {
    let mut file = Vec::new();
    image.write(&mut file).unwrap();
    file
}

fn gradient(width: u32, height: u32) -> Bitmap {
    let mut image = Bitmap::new(width, height).unwrap();
    for (i, byte) in image.pixels_mut().iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    image
}

#[test]
fn it_round_trips_every_row_padding() {
    for width in 1..=4 {
        let image = gradient(width, 3);
        let file = encode_file(&image);

        let row = (width as usize * 3).div_ceil(4) * 4;
        assert_eq!(file.len(), 54 + row * 3);
        assert_eq!(file.len() as u32, image.file_header().file_size);

        let parsed = Bitmap::read(Cursor::new(&file)).unwrap();
        assert_eq!(parsed, image);
        assert_eq!(parsed.pixels().len(), width as usize * 9);
    }
}

#[test]
fn it_skips_row_padding_when_reading() {
    let image = gradient(1, 2);
    let mut file = encode_file(&image);

    // One pixel per row, so each row carries one padding byte.
    file[54 + 3] = 0xEE;
    let parsed = Bitmap::read(Cursor::new(&file)).unwrap();

    assert_eq!(parsed.pixels(), [0, 1, 2, 3, 4, 5]);
    assert_eq!(encode_file(&parsed)[54 + 3], 0);
}

#[test]
fn it_reads_top_down_bitmaps() {
    let image = gradient(5, 2);
    let mut file = encode_file(&image);
    file[22..26].copy_from_slice(&(-2i32).to_le_bytes());

    let parsed = Bitmap::read(Cursor::new(&file)).unwrap();

    assert_eq!(parsed.height(), 2);
    assert_eq!(parsed.info_header().height, -2);
    assert_eq!(parsed.pixels(), image.pixels());
    assert_eq!(encode_file(&parsed), file);
}

#[test]
fn it_keeps_bytes_between_headers_and_pixels() {
    let image = gradient(4, 1);
    let mut file = encode_file(&image);

    // Move the pixel data back by 8 bytes of opaque header data.
    let pixels = file.split_off(54);
    file.extend_from_slice(b"EXTENDED");
    file.extend_from_slice(&pixels);
    file[10..14].copy_from_slice(&62u32.to_le_bytes());

    let parsed = Bitmap::read(Cursor::new(&file)).unwrap();

    assert_eq!(parsed.pixels(), image.pixels());
    assert_eq!(encode_file(&parsed), file);
}

#[test]
fn it_rejects_unsupported_files() {
    let file = encode_file(&gradient(2, 2));

    let mut png = file.clone();
    png[..2].copy_from_slice(b"\x89P");
    assert!(matches!(
        Bitmap::read(Cursor::new(&png)),
        Err(BmpError::InvalidSignature(0x5089))
    ));

    let mut paletted = file.clone();
    paletted[28..30].copy_from_slice(&8u16.to_le_bytes());
    assert!(matches!(
        Bitmap::read(Cursor::new(&paletted)),
        Err(BmpError::UnsupportedBitCount(8))
    ));

    let mut compressed = file.clone();
    compressed[30..34].copy_from_slice(&1u32.to_le_bytes());
    assert!(matches!(
        Bitmap::read(Cursor::new(&compressed)),
        Err(BmpError::UnsupportedCompression(1))
    ));

    let mut empty = file.clone();
    empty[18..22].copy_from_slice(&0i32.to_le_bytes());
    assert!(matches!(
        Bitmap::read(Cursor::new(&empty)),
        Err(BmpError::InvalidDimensions { width: 0, .. })
    ));

    let mut overlapping = file.clone();
    overlapping[10..14].copy_from_slice(&20u32.to_le_bytes());
    assert!(matches!(
        Bitmap::read(Cursor::new(&overlapping)),
        Err(BmpError::InvalidPixelOffset(20))
    ));
}

#[test]
fn it_reports_truncated_pixel_data() {
    let file = encode_file(&gradient(4, 4));

    assert!(matches!(
        Bitmap::read(Cursor::new(&file[..54 + 20])),
        Err(BmpError::TruncatedPixelData {
            expected: 48,
            found: 20
        })
    ));
    assert!(matches!(
        Bitmap::read(Cursor::new(&file[..30])),
        Err(BmpError::Io(_))
    ));
}

#[test]
fn it_reports_a_pixel_offset_past_the_end_of_the_file() {
    let mut file = encode_file(&gradient(2, 2));
    file[10..14].copy_from_slice(&u32::MAX.to_le_bytes());

    match Bitmap::read(Cursor::new(&file)) {
        Err(BmpError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn it_accepts_a_missing_final_row_padding() {
    let image = gradient(1, 2);
    let file = encode_file(&image);

    let parsed = Bitmap::read(Cursor::new(&file[..file.len() - 1])).unwrap();
    assert_eq!(parsed.pixels(), image.pixels());
}

#[test]
fn it_saves_and_opens_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cover.bmp");

    let mut image = gradient(10, 10);
    lsb::encode(b"on disk", image.pixels_mut(), BitWidth::TWO).unwrap();
    image.save(&path).unwrap();

    let opened = Bitmap::open(&path).unwrap();
    assert_eq!(opened, image);
    assert_eq!(lsb::decode(opened.pixels(), BitWidth::TWO).unwrap(), b"on disk");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn it_extracts_channels_in_rgb_order() {
    let image = gradient(3, 1);

    assert_eq!(image.channel(Channel::Blue), [0, 3, 6]);
    assert_eq!(image.channel(Channel::Green), [1, 4, 7]);
    assert_eq!(image.channel(Channel::Red), [2, 5, 8]);
}
