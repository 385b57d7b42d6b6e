use crate::{
    binary::{bits, framed_bits, BitWidth, LEN_PREFIX},
    Error, Reveal,
};
use std::io::{BufWriter, Write};

/// A binary package that contains a steganographic message.
///
/// The message length is read from the first 32 stream bits and checked against the package
/// size before any payload bit is read, so a package concealed with a different width or
/// corrupted in transit cannot cause reads past its end.
///
/// # Examples
///
/// Revealing a secret message hidden within the package:
///
/// ```
/// use lsb::{binary, BitWidth, Conceal, Reveal};
///
/// let mut package = vec![0u8; 64];
/// binary::Carrier::new(BitWidth::ONE).conceal(b"hi", &mut package)?;
///
/// let package = binary::Package::new(BitWidth::ONE, &package);
/// assert_eq!(package.payload_len()?, 2);
///
/// let mut message = Vec::new();
/// package.reveal(&mut message)?;
///
/// assert_eq!(message, b"hi");
/// # Ok::<(), lsb::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Package<'a> {
    width: BitWidth,
    container: &'a [u8],
}

impl<'a> Package<'a> {
    /// Creates a new [`Package`] reading `width` bits from every byte of `container`.
    #[must_use]
    pub fn new(width: BitWidth, container: &'a [u8]) -> Self {
        Self { width, container }
    }

    #[must_use]
    pub fn width(&self) -> BitWidth {
        self.width
    }

    /// Returns the payload length declared by the package.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedContainer`] if the package cannot hold the length field, or
    /// cannot hold as many bytes as the length field declares.
    pub fn payload_len(&self) -> Result<usize, Error> {
        self.check(framed_bits(0))?;

        let mut prefix = [0u8; LEN_PREFIX];
        for (index, byte) in prefix.iter_mut().enumerate() {
            *byte = self.byte(index);
        }
        let len = u32::from_le_bytes(prefix);

        self.check(framed_bits(u64::from(len)))?;

        usize::try_from(len).map_err(|_| Error::TruncatedContainer {
            required: self.width.slots(framed_bits(u64::from(len))),
            available: self.container.len(),
        })
    }

    /// Payload bytes following the length field, given the length [`Package::payload_len`]
    /// returned.
    pub(super) fn payload(&self, len: usize) -> impl ExactSizeIterator<Item = u8> + '_ {
        (LEN_PREFIX..LEN_PREFIX + len).map(|index| self.byte(index))
    }

    fn check(&self, bits: u64) -> Result<(), Error> {
        let required = self.width.slots(bits);

        if required > self.container.len() as u64 {
            return Err(Error::TruncatedContainer {
                required,
                available: self.container.len(),
            });
        }

        Ok(())
    }

    /// Assembles the framed byte at `index` from its eight stream bits.
    fn byte(&self, index: usize) -> u8 {
        (0..8).fold(0u8, |byte, bit| {
            byte | (bits::take(self.container, self.width, index * 8 + bit) << bit)
        })
    }
}

impl Reveal for Package<'_> {
    fn reveal<W: Write>(self, output: W) -> Result<usize, Error> {
        let len = self.payload_len()?;

        tracing::debug!(
            payload = len,
            width = %self.width,
            available = self.container.len(),
            "revealing payload"
        );

        let mut output = BufWriter::new(output);
        for byte in self.payload(len) {
            output.write_all(&[byte])?;
        }
        output.flush()?;

        Ok(len)
    }
}
