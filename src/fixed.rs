//! Fixed-length opaque byte-sequences
//!
//! [`FixedBytes<N>`] is the static counterpart of BARE `Data<N>`: exactly
//! `N` raw bytes, with no length prefix on the wire.

use crate::conv::{target::Target, Decode, Encode};
use crate::error::WidthError;
use crate::parse::{ParseResult, Parser};
#[cfg(feature = "serde_impls")]
use serde::Serialize;

/// Simple type for holding fixed-length binary sequences.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FixedBytes<const N: usize>([u8; N]);

#[cfg(feature = "serde_impls")]
impl<const N: usize> Serialize for FixedBytes<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<const N: usize> Default for FixedBytes<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> FixedBytes<N> {
    #[inline(always)]
    #[must_use]
    pub const fn from_array(arr: [u8; N]) -> FixedBytes<N> {
        Self(arr)
    }

    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Attempts to construct a [`FixedBytes<N>`] by copying the bytes of a
    /// byte-slice whose length is presumptively equal to `N`.
    ///
    /// # Errors
    ///
    /// Returns [`WidthError::WrongWidth`] if `bytes.len() != N`.
    pub fn try_from_slice(bytes: &[u8]) -> Result<FixedBytes<N>, WidthError> {
        <[u8; N]>::try_from(bytes)
            .map(Self)
            .map_err(|_| WidthError::WrongWidth {
                exact: N,
                actual: bytes.len(),
            })
    }

    /// Always equal to `N`.
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline(always)]
    #[must_use]
    pub const fn to_array(self) -> [u8; N] {
        self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl<const N: usize> std::fmt::LowerHex for FixedBytes<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        crate::hexstring::util::write_hex!(f, ""; &self.0)
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for FixedBytes<N> {
    fn from(arr: [u8; N]) -> Self {
        Self(arr)
    }
}

impl<const N: usize> From<FixedBytes<N>> for Vec<u8> {
    fn from(bytes: FixedBytes<N>) -> Self {
        bytes.0.into()
    }
}

impl<const N: usize> TryFrom<&[u8]> for FixedBytes<N> {
    type Error = WidthError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from_slice(bytes)
    }
}

impl<const N: usize> Encode for FixedBytes<N> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_many(self.0) + crate::resolve_zero!(buf)
    }
}

impl<const N: usize> Decode for FixedBytes<N> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Self(p.consume_arr::<N>()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;

    #[test]
    fn no_prefix() {
        let fb = FixedBytes::from_array([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(fb.to_bytes(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(FixedBytes::<4>::decode(hex!("deadbeef")), fb);
        assert_eq!(format!("{:x}", fb), "deadbeef");
        assert!(FixedBytes::<4>::try_decode(hex!("dead")).is_err());
    }

    #[test]
    fn wrong_width() {
        assert_eq!(
            FixedBytes::<3>::try_from_slice(&[1, 2]),
            Err(WidthError::WrongWidth { exact: 3, actual: 2 })
        );
        assert_eq!(FixedBytes::<2>::default().to_array(), [0, 0]);
    }
}
