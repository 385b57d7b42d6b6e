use crate::Error;
use std::{fmt, str::FromStr};

/// Number of least significant bits of each container byte used for storage.
///
/// # Examples
///
/// ```
/// use lsb::BitWidth;
///
/// let width: BitWidth = "2".parse()?;
/// assert_eq!(width, BitWidth::TWO);
///
/// assert!(BitWidth::try_from(4u8).is_err());
/// # Ok::<(), lsb::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitWidth(u8);

impl BitWidth {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);

    /// Every supported width, narrowest first.
    pub const ALL: [Self; 3] = [Self::ONE, Self::TWO, Self::THREE];

    /// Creates a [`BitWidth`] of `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitWidth`] unless `bits` is 1, 2 or 3.
    pub fn new(bits: u8) -> Result<Self, Error> {
        match bits {
            1..=3 => Ok(Self(bits)),
            _ => Err(Error::InvalidBitWidth(bits)),
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Number of container bytes needed to store `bits` bits.
    #[must_use]
    pub const fn slots(self, bits: u64) -> u64 {
        bits.div_ceil(self.0 as u64)
    }

    /// Container byte index and bit offset within it of stream bit `pos`.
    #[inline]
    pub(super) const fn locate(self, pos: usize) -> (usize, u32) {
        let width = self.0 as usize;
        (pos / width, (pos % width) as u32)
    }
}

impl TryFrom<u8> for BitWidth {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for BitWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim().parse()?)
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Iterator over the bits of a byte sequence, least significant bit first.
pub(super) struct Bits<I> {
    bytes: I,
    byte: u8,
    offset: u8,
}

impl<I: Iterator<Item = u8>> From<I> for Bits<I> {
    fn from(bytes: I) -> Self {
        Self {
            bytes,
            byte: 0,
            offset: 8,
        }
    }
}

impl<I: Iterator<Item = u8>> Iterator for Bits<I> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset == 8 {
            self.byte = self.bytes.next()?;
            self.offset = 0;
        }

        let bit = (self.byte >> self.offset) & 1;
        self.offset += 1;

        Some(bit)
    }
}

/// Stores `bit` at stream position `pos`, keeping every other bit of the target byte.
#[inline]
pub(super) fn put(container: &mut [u8], width: BitWidth, pos: usize, bit: u8) {
    let (index, offset) = width.locate(pos);
    let byte = &mut container[index];

    *byte = (*byte & !(1 << offset)) | ((bit & 1) << offset);
}

/// Reads the bit at stream position `pos`.
#[inline]
pub(super) fn take(container: &[u8], width: BitWidth, pos: usize) -> u8 {
    let (index, offset) = width.locate(pos);
    (container[index] >> offset) & 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_rejects_unsupported_widths() {
        for bits in [0u8, 4, 8, 255] {
            assert!(matches!(BitWidth::new(bits), Err(Error::InvalidBitWidth(b)) if b == bits));
        }
        assert!(matches!("x".parse::<BitWidth>(), Err(Error::ParseBitWidth(_))));
        assert_eq!(" 3 ".parse::<BitWidth>().unwrap(), BitWidth::THREE);
    }

    #[test]
    fn it_iterates_bits_lsb_first() {
        let bits: Vec<u8> = Bits::from([0b1000_0001u8, 0b0000_0110].into_iter()).collect();

        assert_eq!(bits, [1, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 0]);
        assert_eq!(Bits::from(std::iter::empty()).count(), 0);
    }

    #[test]
    fn it_locates_stream_positions() {
        assert_eq!(BitWidth::ONE.locate(9), (9, 0));
        assert_eq!(BitWidth::TWO.locate(9), (4, 1));
        assert_eq!(BitWidth::THREE.locate(8), (2, 2));
        assert_eq!(BitWidth::THREE.locate(9), (3, 0));
    }

    #[test]
    fn put_only_touches_the_addressed_bit() {
        let mut container = [0b1010_1010u8; 2];

        put(&mut container, BitWidth::THREE, 4, 1);
        assert_eq!(container, [0b1010_1010, 0b1010_1010]);

        put(&mut container, BitWidth::THREE, 3, 1);
        assert_eq!(container, [0b1010_1010, 0b1010_1011]);
        assert_eq!(take(&container, BitWidth::THREE, 3), 1);

        put(&mut container, BitWidth::THREE, 1, 0);
        assert_eq!(container, [0b1010_1000, 0b1010_1011]);
        assert_eq!(take(&container, BitWidth::THREE, 1), 0);
    }
}
