//! # LSB
//!
//! The **LSB** library hides arbitrary byte payloads in the least significant bits of a byte
//! container, typically the pixel bytes of an uncompressed bitmap, and recovers them exactly.
//!
//! ## Binary implementation
//!
//! The [`binary`] module packs a length-prefixed payload into the low *k* bits of every
//! container byte, where *k* is a [`BitWidth`] of 1, 2 or 3. The width acts as the shared
//! key: it is never stored in the container, so the receiver must know it. See its
//! [documentation][`binary`] for the exact bit layout.
//!
//! ## Containers
//!
//! The [`bmp`] module reads and writes 24-bit uncompressed bitmaps and exposes their pixel
//! bytes as a contiguous buffer suitable for [`encode`] and [`decode`]. The [`metrics`]
//! module measures how much a modified image differs from its original.
//!
//! ## Examples
//!
//! ```
//! use lsb::BitWidth;
//!
//! let mut container = vec![0xAAu8; 64];
//! let written = lsb::encode(b"hi", &mut container, BitWidth::TWO)?;
//! assert_eq!(written, 24);
//!
//! assert_eq!(lsb::decode(&container, BitWidth::TWO)?, b"hi");
//! # Ok::<(), lsb::Error>(())
//! ```

use std::io;

pub mod binary;
pub mod bmp;
mod error;
pub mod metrics;

pub use binary::{decode, encode, BitWidth};
pub use error::Error;

/// A trait for objects able to conceal steganographic messages, or carriers.
///
/// Carriers are defined by a single required method, [`conceal`][Conceal::conceal],
/// which hides the payload in the given cover data.
///
/// # Examples
///
/// [`binary::Carrier`] can be used to conceal secret messages in binary data.
pub trait Conceal {
    /// Conceals the payload in the given cover and returns how many cover bytes were touched.
    ///
    /// # Errors
    ///
    /// An implementation must check that the concealed form of `payload` fits in `cover`
    /// before writing anything, so that `cover` is left unmodified on error.
    fn conceal(self, payload: &[u8], cover: &mut [u8]) -> Result<usize, Error>;
}

/// A trait for objects able to reveal steganographic messages, or packages.
///
/// Packages are defined by a single required method, [`reveal`][Reveal::reveal],
/// which writes the hidden message to the output.
///
/// # Examples
///
/// [`binary::Package`] can be used to reveal secret messages hidden in binary data.
pub trait Reveal {
    /// Writes the hidden message into `output`, returning how many bytes were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the package cannot hold the message it declares, or if writing
    /// to `output` fails. If an error is returned, it is not guaranteed that no bytes were
    /// written.
    fn reveal<W: io::Write>(self, output: W) -> Result<usize, Error>;
}
