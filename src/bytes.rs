//! Variable-length opaque byte-sequences
//!
//! [`Bytes`] is the static counterpart of BARE `Data`: a varint byte-count
//! followed by the raw bytes. Unlike `Vec<u8>`, which is encoded as an
//! `Array<U8>` element by element (with an identical wire form), `Bytes` is
//! read and written in bulk.

use std::ops::{Deref, DerefMut};

use crate::conv::{target::Target, Decode, Encode};
use crate::parse::{ParseResult, Parser};
use crate::varint::read_length;
#[cfg(feature = "serde_impls")]
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Bytes(Vec<u8>);

#[cfg(feature = "serde_impls")]
impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl Bytes {
    /// Constructs a new, empty byte-sequence
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub const fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Named to avoid ambiguity with `<[u8]>::to_vec` through deref-coercion.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl DerefMut for Bytes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}

impl FromIterator<u8> for Bytes {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        Self(Vec::from_iter(iter))
    }
}

impl Extend<u8> for Bytes {
    fn extend<T: IntoIterator<Item = u8>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl From<Bytes> for Vec<u8> {
    #[inline]
    fn from(val: Bytes) -> Self {
        val.0
    }
}

impl From<Vec<u8>> for Bytes {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    #[inline]
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Encode for Bytes {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_prefixed(&self.0) + buf.resolve_zero()
    }
}

impl Decode for Bytes {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = read_length(p)?;
        Ok(Self(p.take_dynamic(len)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hex;

    #[test]
    fn prefixed() {
        let b = Bytes::from([0xca, 0xfe]);
        assert_eq!(b.to_bytes(), vec![0x02, 0xca, 0xfe]);
        assert_eq!(Bytes::decode(hex!("02cafe")), b);
        assert_eq!(Bytes::decode(hex!("00")), Bytes::new());
        assert_eq!(b.to_bytes(), vec![0xcau8, 0xfe].to_bytes());
    }

    #[test]
    fn truncated() {
        assert!(Bytes::try_decode(hex!("03cafe")).unwrap_err().is_underflow());
    }
}
