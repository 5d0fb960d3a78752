//! Hex-encoded byte strings
//!
//! Encoded BARE messages are most easily written down, compared, and logged
//! as hexadecimal strings. [`HexString`] is a byte-buffer that parses from and
//! displays as hex, and is usable both as an encoding [`Target`] and as an
//! input to any of the `unpack`/`decode` entry points.
//!
//! Conversion is unambiguous: `From` impls take raw bytes, while
//! [`HexString::from_hex`] (and the [`hex!`](crate::hex) macro) parse hex text.

use crate::conv::target::Target;
use crate::error::HexConvError;

pub(crate) mod util {
    use crate::error::HexConvError;
    use std::fmt::Write;

    /// Formats a sequence of bytes into an undelimited lowercase hexadecimal `String`
    #[must_use]
    pub fn hex_of_bytes(bytes: &[u8]) -> String {
        let mut hex = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            // write! into a String is infallible
            let _ = write!(&mut hex, "{byte:02x}");
        }
        hex
    }

    /// Parses a hexadecimally encoded string into the bytes it represents.
    pub fn bytes_of_hex(src: &str) -> Result<Vec<u8>, HexConvError> {
        if src.len() % 2 != 0 {
            return Err(HexConvError::OddParity(src.to_owned()));
        }
        src.as_bytes()
            .chunks_exact(2)
            .map(|pair| match pair {
                [hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    Ok((nibble(*hi) << 4) | nibble(*lo))
                }
                _ => Err(HexConvError::NonHex(src.to_owned())),
            })
            .collect()
    }

    const fn nibble(digit: u8) -> u8 {
        match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            _ => digit - b'A' + 10,
        }
    }

    /// Writes a prefix string followed by the hex-encoding of a byte-slice
    /// to a formatter.
    macro_rules! write_hex {
        ($f:expr, $prefix:expr; $bytes:expr) => {
            write!(
                $f,
                "{}{}",
                $prefix,
                $crate::hexstring::util::hex_of_bytes($bytes)
            )
        };
    }

    pub(crate) use write_hex;
}

/// Byte-buffer that is parsed from and displayed as a hexadecimal string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct HexString {
    bytes: Vec<u8>,
}

impl HexString {
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Parses a hex-encoded string.
    ///
    /// Returns an error if the string is of odd length, or if it contains
    /// any character that is not a hexadecimal digit (case-insensitive).
    pub fn from_hex(hex: impl AsRef<str>) -> Result<Self, HexConvError> {
        Ok(Self {
            bytes: util::bytes_of_hex(hex.as_ref())?,
        })
    }

    /// Returns the lowercase hexadecimal rendering of `self`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        util::hex_of_bytes(&self.bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for HexString {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HexString").field(&self.to_hex()).finish()
    }
}

impl std::fmt::Display for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for HexString {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Vec<u8>> for HexString {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for HexString {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl<const N: usize> From<[u8; N]> for HexString {
    fn from(bytes: [u8; N]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl From<HexString> for Vec<u8> {
    fn from(val: HexString) -> Self {
        val.bytes
    }
}

impl PartialEq<&str> for HexString {
    fn eq(&self, other: &&str) -> bool {
        util::bytes_of_hex(other).map_or(false, |bytes| bytes == self.bytes)
    }
}

impl Target for HexString {
    fn anticipate(&mut self, extra: usize) {
        self.bytes.anticipate(extra)
    }

    fn create() -> Self {
        Self::new()
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.bytes.push_one(b)
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.bytes.push_many(arr)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.bytes.push_all(buf)
    }

    fn resolve(&mut self) {
        self.bytes.resolve()
    }
}

/// Converts a string-like expression into a [`HexString`] by parsing it
/// as hexadecimal.
///
/// # Panics
///
/// Panics if the argument is not a valid hex-string.
#[macro_export]
macro_rules! hex {
    ($s:expr) => {{
        $crate::hexstring::HexString::from_hex($s).expect("hex! macro encountered error")
    }};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let h = hex!("DEADbeef");
        assert_eq!(h.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(h.to_hex(), "deadbeef");
        assert_eq!(h, "deadbeef");
        assert_eq!(HexString::from_hex("").map(|h| h.len()), Ok(0));
    }

    #[test]
    fn hex_rejects() {
        assert_eq!(
            HexString::from_hex("abc"),
            Err(HexConvError::OddParity("abc".into()))
        );
        assert_eq!(
            HexString::from_hex("zz"),
            Err(HexConvError::NonHex("zz".into()))
        );
    }
}
