//! Extension trait for Targets that are built up and then frozen
//!
//! A `Builder` is a [`Target`] that is written to until complete and then
//! finalized into an immutable form. The only implementor provided is
//! [`StrictBuilder`](strict::StrictBuilder), a thin wrapper around `Vec<u8>`
//! whose main use is rendering encodings as hex in tests and logs.

use crate::conv::target::Target;
use crate::hexstring::util::hex_of_bytes;

/// `Target` extension trait with a terminal `finalize` operation.
pub trait Builder
where
    Self: Target + Sized,
{
    /// Type suitable for presenting the finalized contents of a `Builder` object
    type Final: Into<Vec<u8>>;

    /// Creates a `Self` object containing a fixed number of bytes
    fn words<const N: usize>(arr: [u8; N]) -> Self;

    /// Converts a `Self` value into a `Self::Final` value once
    /// it is fully built.
    fn finalize(self) -> Self::Final;

    /// Consumes the Builder object and returns a vector of its contents
    fn into_vec(self) -> Vec<u8> {
        self.finalize().into()
    }

    /// Returns the lowercase hexadecimal rendering of the built bytes
    fn into_hex(self) -> String {
        hex_of_bytes(&self.into_vec())
    }

    /// Returns a Builder object containing zero bytes
    fn empty() -> Self {
        Self::words([])
    }

    /// Number of bytes written so far
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub mod strict;
