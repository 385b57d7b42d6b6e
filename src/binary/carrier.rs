use crate::{
    binary::{bits, required_len, BitWidth, LEN_PREFIX},
    Conceal, Error,
};

/// A binary carrier that can conceal a steganographic message.
///
/// The [`conceal`][crate::Conceal::conceal] method frames the payload with its length and
/// writes it into the low bits of the cover in place. The cover is checked before the first
/// write, so it is either fully updated or not touched at all.
///
/// # Examples
///
/// Concealing a secret message in the supplied cover:
///
/// ```
/// use lsb::{binary, BitWidth, Conceal};
///
/// let mut cover = vec![0xFFu8; 100];
/// let payload = b"a very secret message";
///
/// let touched = binary::Carrier::new(BitWidth::TWO).conceal(payload, &mut cover)?;
///
/// assert_eq!(touched, 100);
/// assert!(cover.iter().all(|byte| byte & 0b1111_1100 == 0b1111_1100));
/// # Ok::<(), lsb::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carrier {
    width: BitWidth,
}

impl Carrier {
    /// Creates a new [`Carrier`] writing `width` bits into every cover byte.
    #[must_use]
    pub fn new(width: BitWidth) -> Self {
        Self { width }
    }

    #[must_use]
    pub fn width(&self) -> BitWidth {
        self.width
    }
}

impl Conceal for Carrier {
    fn conceal(self, payload: &[u8], cover: &mut [u8]) -> Result<usize, Error> {
        let required = required_len(payload.len(), self.width);

        let len = match u32::try_from(payload.len()) {
            Ok(len) if required <= cover.len() as u64 => len,
            _ => {
                return Err(Error::Capacity {
                    required,
                    available: cover.len(),
                });
            }
        };

        tracing::debug!(
            payload = payload.len(),
            width = %self.width,
            touched = required,
            available = cover.len(),
            "concealing payload"
        );

        let prefix: [u8; LEN_PREFIX] = len.to_le_bytes();
        let stream = prefix.into_iter().chain(payload.iter().copied());

        for (pos, bit) in bits::Bits::from(stream).enumerate() {
            bits::put(cover, self.width, pos, bit);
        }

        Ok(required as usize)
    }
}
