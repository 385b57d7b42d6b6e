//! Binary implementations of [`Conceal`][crate::Conceal] and [`Reveal`][crate::Reveal] traits.
//!
//! The [`Carrier`] and [`Package`] structures conceal and reveal length-prefixed messages
//! within the low bits of some other binary data.
//!
//! ## Bit Layout
//!
//! A payload is framed by prepending its length as a 4-byte little-endian integer. The framed
//! payload is then read as one continuous stream of bits, least significant bit first within
//! each byte, and bit `p` of that stream is stored in bit `p % k` of container byte `p / k`,
//! where `k` is the [`BitWidth`]. Higher bits of every container byte are left as they were.
//!
//! A width of 3 does not divide 8, so payload bytes straddle container bytes: the first
//! payload byte occupies the low 3 bits of container bytes 0 and 1 and the low 2 bits of
//! container byte 2, whose third bit already belongs to the second payload byte.
//!
//! The width is never stored in the container. It is up to the *sender* to share it with the
//! *receiver*; decoding with a different width yields either
//! [`Error::TruncatedContainer`][crate::Error::TruncatedContainer] or meaningless bytes, but
//! never reads out of bounds.
//!
//! ## Examples
//!
//! Concealing a secret message:
//!
//! ```
//! use lsb::{binary, BitWidth, Conceal};
//!
//! let mut cover = vec![0u8; 128];
//! let payload = b"a very secret message";
//!
//! let carrier = binary::Carrier::new(BitWidth::THREE);
//! carrier.conceal(payload.as_slice(), &mut cover)?;
//! # Ok::<(), lsb::Error>(())
//! ```
//!
//! Extracting a hidden message:
//!
//! ```
//! use lsb::{binary, BitWidth, Conceal, Reveal};
//!
//! # let mut cover = vec![0u8; 128];
//! # binary::Carrier::new(BitWidth::THREE).conceal(b"a very secret message", &mut cover)?;
//! let mut message = Vec::new();
//!
//! binary::Package::new(BitWidth::THREE, &cover).reveal(&mut message)?;
//! assert_eq!(message, b"a very secret message");
//! # Ok::<(), lsb::Error>(())
//! ```

mod bits;
mod carrier;
mod package;

pub use bits::BitWidth;
pub use carrier::Carrier;
pub use package::Package;

use crate::{Conceal, Error};

/// Size of the little-endian length field that precedes every concealed payload.
pub const LEN_PREFIX: usize = 4;

/// Returns how many container bytes are needed to conceal a payload of `payload_len` bytes.
///
/// # Examples
///
/// ```
/// use lsb::{binary, BitWidth};
///
/// assert_eq!(binary::required_len(3, BitWidth::ONE), 56);
/// assert_eq!(binary::required_len(3, BitWidth::THREE), 19);
/// ```
#[must_use]
pub fn required_len(payload_len: usize, width: BitWidth) -> u64 {
    width.slots(framed_bits(payload_len as u64))
}

/// Returns the length of the largest payload that fits into `container_len` bytes.
///
/// # Examples
///
/// ```
/// use lsb::{binary, BitWidth};
///
/// assert_eq!(binary::capacity(60, BitWidth::ONE), 3);
/// assert_eq!(binary::capacity(10, BitWidth::ONE), 0);
/// ```
#[must_use]
pub fn capacity(container_len: usize, width: BitWidth) -> usize {
    let bytes = (container_len as u64).saturating_mul(u64::from(width.get())) / 8;
    let payload = bytes.saturating_sub(LEN_PREFIX as u64).min(u64::from(u32::MAX));

    usize::try_from(payload).unwrap_or(usize::MAX)
}

/// Conceals `payload` in the low bits of `container`, returning how many bytes were touched.
///
/// # Errors
///
/// Returns [`Error::Capacity`] and leaves `container` unmodified if the framed payload does
/// not fit.
pub fn encode(payload: &[u8], container: &mut [u8], width: BitWidth) -> Result<usize, Error> {
    Carrier::new(width).conceal(payload, container)
}

/// Reveals a payload previously concealed in `container` with the same `width`.
///
/// # Errors
///
/// Returns [`Error::TruncatedContainer`] if `container` is too short to hold the length field,
/// or shorter than the length field claims.
pub fn decode(container: &[u8], width: BitWidth) -> Result<Vec<u8>, Error> {
    let package = Package::new(width, container);
    let len = package.payload_len()?;

    tracing::debug!(payload = len, width = %width, "decoding payload");

    let payload = package.payload(len).collect();
    Ok(payload)
}

/// Bits occupied by a framed payload of `payload_len` bytes.
fn framed_bits(payload_len: u64) -> u64 {
    payload_len.saturating_add(LEN_PREFIX as u64).saturating_mul(8)
}
