//! Reading and writing 24-bit uncompressed bitmaps.
//!
//! A [`Bitmap`] exposes its pixel bytes as one contiguous buffer with the row padding
//! removed, which is the container [`encode`][crate::encode] and [`decode`][crate::decode]
//! operate on. Rows are kept in file order and channels in file order (blue, green, red), so
//! a buffer read from a file and written back round-trips byte for byte.
//!
//! # Examples
//!
//! ```
//! use lsb::{bmp::Bitmap, BitWidth};
//! use std::io::Cursor;
//!
//! let mut image = Bitmap::new(16, 16)?;
//! lsb::encode(b"hidden", image.pixels_mut(), BitWidth::ONE)?;
//!
//! let mut file = Vec::new();
//! image.write(&mut file)?;
//!
//! let image = Bitmap::read(Cursor::new(file))?;
//! assert_eq!(lsb::decode(image.pixels(), BitWidth::ONE)?, b"hidden");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Little-endian `"BM"`.
pub const SIGNATURE: u16 = 0x4D42;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;
const BYTES_PER_PIXEL: usize = 3;

#[derive(Debug, Error)]
pub enum BmpError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("not a bitmap: signature {0:#06x}")]
    InvalidSignature(u16),

    #[error("info header of {0} bytes is too short")]
    InvalidHeaderSize(u32),

    #[error("pixel data offset {0} overlaps the headers")]
    InvalidPixelOffset(u32),

    #[error("only 24-bit bitmaps are supported, got {0} bits per pixel")]
    UnsupportedBitCount(u16),

    #[error("only uncompressed bitmaps are supported, got compression {0}")]
    UnsupportedCompression(u32),

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("pixel data truncated: expected {expected} bytes, found {found}")]
    TruncatedPixelData { expected: usize, found: usize },
}

/// The BITMAPFILEHEADER structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

/// The BITMAPINFOHEADER structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub size: u32,
    pub width: i32,
    /// Positive for bottom-up bitmaps, negative for top-down ones.
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

/// A colour channel of a 24-bit pixel, valued by its offset within the pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Blue = 0,
    Green = 1,
    Red = 2,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Red => "red",
        }
    }
}

/// A 24-bit uncompressed bitmap image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    file_header: FileHeader,
    info_header: InfoHeader,
    /// Bytes between the end of the info header and the pixel data, kept verbatim.
    gap: Vec<u8>,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Creates a black bottom-up bitmap of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`BmpError::InvalidDimensions`] if either dimension is zero or the image
    /// would not fit in a bitmap file.
    pub fn new(width: u32, height: u32) -> Result<Self, BmpError> {
        let invalid = || BmpError::InvalidDimensions {
            width: width.try_into().unwrap_or(i32::MAX),
            height: height.try_into().unwrap_or(i32::MAX),
        };

        let w = i32::try_from(width).map_err(|_| invalid())?;
        let h = i32::try_from(height).map_err(|_| invalid())?;
        let (row_len, padding) = row_layout(w).ok_or_else(invalid)?;

        let image_size = (row_len + padding)
            .checked_mul(height as usize)
            .and_then(|size| u32::try_from(size).ok())
            .filter(|_| h > 0)
            .ok_or_else(invalid)?;
        let pixel_offset = (FILE_HEADER_LEN + INFO_HEADER_LEN) as u32;
        let file_size = image_size.checked_add(pixel_offset).ok_or_else(invalid)?;

        Ok(Self {
            file_header: FileHeader {
                signature: SIGNATURE,
                file_size,
                reserved1: 0,
                reserved2: 0,
                pixel_offset,
            },
            info_header: InfoHeader {
                size: INFO_HEADER_LEN as u32,
                width: w,
                height: h,
                planes: 1,
                bit_count: 24,
                compression: 0,
                image_size,
                x_pixels_per_meter: 2835,
                y_pixels_per_meter: 2835,
                colors_used: 0,
                colors_important: 0,
            },
            gap: Vec::new(),
            pixels: vec![0; row_len * height as usize],
        })
    }

    /// Opens and parses the bitmap at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BmpError> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Parses a bitmap from `reader`.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, on anything other than an uncompressed 24-bit bitmap, and when
    /// the reader ends before the pixel data does.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, BmpError> {
        let mut buf = [0u8; FILE_HEADER_LEN];
        reader.read_exact(&mut buf)?;
        let file_header = FileHeader::parse(&buf);

        if file_header.signature != SIGNATURE {
            return Err(BmpError::InvalidSignature(file_header.signature));
        }

        let mut buf = [0u8; INFO_HEADER_LEN];
        reader.read_exact(&mut buf)?;
        let info_header = InfoHeader::parse(&buf);

        if (info_header.size as usize) < INFO_HEADER_LEN {
            return Err(BmpError::InvalidHeaderSize(info_header.size));
        }
        if info_header.bit_count != 24 {
            return Err(BmpError::UnsupportedBitCount(info_header.bit_count));
        }
        if info_header.compression != 0 {
            return Err(BmpError::UnsupportedCompression(info_header.compression));
        }

        let gap_len = (file_header.pixel_offset as usize)
            .checked_sub(FILE_HEADER_LEN + INFO_HEADER_LEN)
            .ok_or(BmpError::InvalidPixelOffset(file_header.pixel_offset))?;
        // Grow with the data actually read so a lying header cannot force a huge allocation.
        let mut gap = Vec::new();
        let read = reader
            .by_ref()
            .take(gap_len as u64)
            .read_to_end(&mut gap)?;
        if read < gap_len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        let invalid = BmpError::InvalidDimensions {
            width: info_header.width,
            height: info_header.height,
        };
        let (row_len, padding) = row_layout(info_header.width).ok_or(invalid)?;
        let rows = info_header.height.unsigned_abs() as usize;
        if rows == 0 {
            return Err(BmpError::InvalidDimensions {
                width: info_header.width,
                height: info_header.height,
            });
        }
        let expected = row_len.checked_mul(rows).ok_or(BmpError::InvalidDimensions {
            width: info_header.width,
            height: info_header.height,
        })?;

        // Likewise for the pixel rows.
        let mut pixels = Vec::new();
        let mut pad = [0u8; 3];
        for _ in 0..rows {
            let found = pixels.len();
            let read = reader
                .by_ref()
                .take(row_len as u64)
                .read_to_end(&mut pixels)?;

            if read < row_len {
                return Err(BmpError::TruncatedPixelData {
                    expected,
                    found: found + read,
                });
            }

            if pixels.len() < expected {
                reader.read_exact(&mut pad[..padding])?;
            } else {
                // The final row's padding is routinely omitted by encoders.
                let _ = reader.read(&mut pad[..padding])?;
            }
        }

        tracing::debug!(
            width = info_header.width,
            height = info_header.height,
            pixels = pixels.len(),
            "read bitmap"
        );

        Ok(Self {
            file_header,
            info_header,
            gap,
            pixels,
        })
    }

    /// Writes the bitmap to `path` atomically: either the whole file is written or
    /// `path` is left as it was.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BmpError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            self.write(&mut writer)?;
            writer.flush()?;
        }
        file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Serializes the bitmap into `writer`.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), BmpError> {
        writer.write_all(&self.file_header.to_bytes())?;
        writer.write_all(&self.info_header.to_bytes())?;
        writer.write_all(&self.gap)?;

        let (row_len, padding) = self.row_layout();
        let pad = [0u8; 3];
        for row in self.pixels.chunks(row_len) {
            writer.write_all(row)?;
            writer.write_all(&pad[..padding])?;
        }

        Ok(())
    }

    #[must_use]
    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    #[must_use]
    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.info_header.width.unsigned_abs() as usize
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.info_header.height.unsigned_abs() as usize
    }

    /// The pixel bytes, row padding excluded.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Copies one channel of every pixel into a new buffer.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> Vec<u8> {
        self.pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|pixel| pixel[channel as usize])
            .collect()
    }

    /// Returns the red, green and blue planes.
    #[must_use]
    pub fn rgb(&self) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            self.channel(Channel::Red),
            self.channel(Channel::Green),
            self.channel(Channel::Blue),
        )
    }

    /// Overwrites the pixels from red, green and blue planes. Extra plane entries are ignored.
    pub fn set_rgb(&mut self, red: &[u8], green: &[u8], blue: &[u8]) {
        let planes = red.iter().zip(green).zip(blue);

        for (pixel, ((&r, &g), &b)) in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL).zip(planes) {
            pixel[Channel::Red as usize] = r;
            pixel[Channel::Green as usize] = g;
            pixel[Channel::Blue as usize] = b;
        }
    }

    fn row_layout(&self) -> (usize, usize) {
        // Validated on construction.
        row_layout(self.info_header.width).unwrap_or((self.pixels.len(), 0))
    }
}

/// Row length in bytes and the padding that rounds it up to a multiple of four.
fn row_layout(width: i32) -> Option<(usize, usize)> {
    if width <= 0 {
        return None;
    }

    let row_len = (width as usize).checked_mul(BYTES_PER_PIXEL)?;
    Some((row_len, (4 - row_len % 4) % 4))
}

impl FileHeader {
    fn parse(buf: &[u8; FILE_HEADER_LEN]) -> Self {
        let mut fields = Fields(buf);
        Self {
            signature: fields.u16(),
            file_size: fields.u32(),
            reserved1: fields.u16(),
            reserved2: fields.u16(),
            pixel_offset: fields.u32(),
        }
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FILE_HEADER_LEN);
        buf.extend_from_slice(&self.signature.to_le_bytes());
        buf.extend_from_slice(&self.file_size.to_le_bytes());
        buf.extend_from_slice(&self.reserved1.to_le_bytes());
        buf.extend_from_slice(&self.reserved2.to_le_bytes());
        buf.extend_from_slice(&self.pixel_offset.to_le_bytes());
        buf
    }
}

impl InfoHeader {
    fn parse(buf: &[u8; INFO_HEADER_LEN]) -> Self {
        let mut fields = Fields(buf);
        Self {
            size: fields.u32(),
            width: fields.i32(),
            height: fields.i32(),
            planes: fields.u16(),
            bit_count: fields.u16(),
            compression: fields.u32(),
            image_size: fields.u32(),
            x_pixels_per_meter: fields.i32(),
            y_pixels_per_meter: fields.i32(),
            colors_used: fields.u32(),
            colors_important: fields.u32(),
        }
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(INFO_HEADER_LEN);
        buf.extend_from_slice(&self.size.to_le_bytes());
        buf.extend_from_slice(&self.width.to_le_bytes());
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf.extend_from_slice(&self.planes.to_le_bytes());
        buf.extend_from_slice(&self.bit_count.to_le_bytes());
        buf.extend_from_slice(&self.compression.to_le_bytes());
        buf.extend_from_slice(&self.image_size.to_le_bytes());
        buf.extend_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        buf.extend_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        buf.extend_from_slice(&self.colors_used.to_le_bytes());
        buf.extend_from_slice(&self.colors_important.to_le_bytes());
        buf
    }
}

/// Sequential little-endian field reader over a fixed-size header.
struct Fields<'a>(&'a [u8]);

impl Fields<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut field = [0u8; N];
        field.copy_from_slice(&self.0[..N]);
        self.0 = &self.0[N..];
        field
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
}
