//! Variable-length integers
//!
//! BARE `UInt` is an unsigned LEB128 varint: the value is split into 7-bit
//! groups, least-significant first, and every byte but the last has its high
//! bit (`0x80`) set. BARE `Int` is zig-zag mapped onto the unsigned form
//! (`0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`) before being written the same way.
//!
//! Both are bounded to 64 bits, so no encoding is ever longer than
//! [`MAX_VARINT_LEN`] bytes.

use crate::conv::target::Target;
use crate::conv::{Decode, Encode};
use crate::error::BoundsError;
use crate::parse::error::{ParseResult, TokenError};
use crate::parse::Parser;

/// Maximal number of bytes in the encoding of a 64-bit varint
pub const MAX_VARINT_LEN: usize = 10;

#[inline]
#[must_use]
pub const fn zigzag(i: i64) -> u64 {
    ((i << 1) ^ (i >> 63)) as u64
}

#[inline]
#[must_use]
pub const fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

/// Appends the unsigned varint encoding of `n`, returning the number of
/// bytes written.
pub fn write_uint<U: Target>(buf: &mut U, mut n: u64) -> usize {
    let mut ret = 0;
    while n >= 0x80 {
        ret += buf.push_one((n as u8) | 0x80);
        n >>= 7;
    }
    ret + buf.push_one(n as u8) + buf.resolve_zero()
}

/// Appends the zig-zag varint encoding of `i`.
pub fn write_int<U: Target>(buf: &mut U, i: i64) -> usize {
    write_uint(buf, zigzag(i))
}

/// Appends `value` as a signed (zig-zag) or unsigned varint.
///
/// Returns an error without writing anything if `value` does not fit in
/// `i64` (signed) or `u64` (unsigned).
pub fn write_varint<U: Target>(
    buf: &mut U,
    value: i128,
    signed: bool,
) -> Result<usize, BoundsError<i128>> {
    if signed {
        let i = BoundsError::<i128>::restrict(value, i64::MIN, i64::MAX)?;
        Ok(write_int(buf, i as i64))
    } else {
        let u = BoundsError::<i128>::restrict(value, 0u64, u64::MAX)?;
        Ok(write_uint(buf, u as u64))
    }
}

/// Consumes an unsigned varint.
///
/// # Errors
///
/// Fails with a buffer error if the source ends while the continuation bit
/// is still set, with [`TokenError::NonTerminating`] if no terminal byte
/// occurs within [`MAX_VARINT_LEN`] bytes, and with
/// [`TokenError::VarintOverflow`] if the value exceeds `u64::MAX`.
pub fn read_uint<P: Parser>(p: &mut P) -> ParseResult<u64> {
    let raw = p.take_self_terminating(|byte| byte & 0x80 == 0, MAX_VARINT_LEN)?;
    let mut ret: u64 = 0;
    for (ix, &byte) in raw.iter().enumerate() {
        let group = u64::from(byte & 0x7f);
        if ix == MAX_VARINT_LEN - 1 && group > 1 {
            return Err(TokenError::VarintOverflow(raw).into());
        }
        ret |= group << (7 * ix);
    }
    Ok(ret)
}

/// Consumes a zig-zag signed varint.
pub fn read_int<P: Parser>(p: &mut P) -> ParseResult<i64> {
    read_uint(p).map(unzigzag)
}

/// Consumes a signed or unsigned varint, widened to `i128`.
pub fn read_varint<P: Parser>(p: &mut P, signed: bool) -> ParseResult<i128> {
    if signed {
        read_int(p).map(i128::from)
    } else {
        read_uint(p).map(i128::from)
    }
}

/// Consumes an unsigned varint used as a length or count prefix.
pub fn read_length<P: Parser>(p: &mut P) -> ParseResult<usize> {
    let raw = read_uint(p)?;
    Ok(usize::try_from(raw).map_err(BoundsError::<i128>::from)?)
}

/// BARE `UInt`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Uint(pub u64);

/// BARE `Int`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Int(pub i64);

macro_rules! impl_varint {
    ($t:ident, $inner:ty, $write:ident, $read:ident) => {
        impl Encode for $t {
            fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                $write(buf, self.0)
            }
        }

        impl Decode for $t {
            fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                $read(p).map(Self)
            }
        }

        impl From<$inner> for $t {
            fn from(val: $inner) -> Self {
                Self(val)
            }
        }

        impl From<$t> for $inner {
            fn from(val: $t) -> Self {
                val.0
            }
        }

        impl std::fmt::Display for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_varint!(Uint, u64, write_uint, read_uint);
impl_varint!(Int, i64, write_int, read_int);

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::error::ParseError;
    use crate::parse::ByteParser;
    use crate::{hex, Builder, EncodeLength, StrictBuilder};

    fn uint_hex(n: u64) -> String {
        Uint(n).encode::<StrictBuilder>().into_hex()
    }

    #[test]
    fn uint_known() {
        assert_eq!(uint_hex(0), "00");
        assert_eq!(uint_hex(1), "01");
        assert_eq!(uint_hex(127), "7f");
        assert_eq!(uint_hex(128), "8001");
        assert_eq!(uint_hex(300), "ac02");
        assert_eq!(uint_hex(u64::MAX), "ffffffffffffffffff01");
        assert_eq!(Uint(u64::MAX).enc_len(), MAX_VARINT_LEN);
    }

    #[test]
    fn int_known() {
        let enc = |i: i64| Int(i).encode::<StrictBuilder>().into_hex();
        assert_eq!(enc(0), "00");
        assert_eq!(enc(-1), "01");
        assert_eq!(enc(1), "02");
        assert_eq!(enc(-2), "03");
        assert_eq!(enc(-64), "7f");
        assert_eq!(enc(64), "8001");
        assert_eq!(enc(i64::MIN), "ffffffffffffffffff01");
    }

    #[test]
    fn varint_boundaries_roundtrip() {
        let unsigned = [0, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX - 1, u64::MAX];
        for n in unsigned {
            assert_eq!(Uint::decode(Uint(n).to_bytes()), Uint(n));
        }
        let signed = [0, 1, -1, 63, -64, 64, -65, i32::MIN as i64, i64::MAX, i64::MIN];
        for i in signed {
            assert_eq!(Int::decode(Int(i).to_bytes()), Int(i));
            assert_eq!(unzigzag(zigzag(i)), i);
        }
    }

    #[test]
    fn write_varint_contract() {
        let mut buf = Vec::new();
        assert_eq!(write_varint(&mut buf, -1, true), Ok(1));
        assert_eq!(write_varint(&mut buf, 300, false), Ok(2));
        assert_eq!(buf, vec![0x01, 0xac, 0x02]);
        assert!(write_varint(&mut buf, -1, false).is_err());
        assert!(write_varint(&mut buf, i128::from(u64::MAX) + 1, false).is_err());
        assert!(write_varint(&mut buf, i128::from(i64::MAX) + 1, true).is_err());
        assert_eq!(buf.len(), 3);

        let mut p: ByteParser = crate::parse::TryIntoParser::try_into_parser(buf).unwrap();
        assert_eq!(read_varint(&mut p, true).unwrap(), -1);
        assert_eq!(read_varint(&mut p, false).unwrap(), 300);
    }

    #[test]
    fn varint_truncated() {
        let err = Uint::try_decode(hex!("8080")).unwrap_err();
        assert!(err.is_underflow());
    }

    #[test]
    fn varint_too_long() {
        match Uint::try_decode(hex!("8080808080808080808080")) {
            Err(crate::DecodeError::Parse(ParseError::Token(TokenError::NonTerminating(buf)))) => {
                assert_eq!(buf.len(), MAX_VARINT_LEN)
            }
            other => panic!("unexpected result {:?}", other),
        }
        match Uint::try_decode(hex!("ffffffffffffffffff02")) {
            Err(crate::DecodeError::Parse(ParseError::Token(TokenError::VarintOverflow(_)))) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
