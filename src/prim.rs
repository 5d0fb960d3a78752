//! Codecs for fixed-width primitive types
//!
//! Integers and floats are written little-endian at their natural width;
//! `bool` is a single byte `0x00`/`0x01`, and `()` (BARE `Void`) occupies no
//! bytes at all.

use crate::conv::{target::Target, Decode, Encode};
use crate::parse::{ParseResult, Parser};

impl Encode for () {
    #[inline(always)]
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.resolve_zero()
    }

    #[inline(always)]
    fn to_bytes(&self) -> Vec<u8> {
        Vec::new()
    }
}

impl Decode for () {
    #[inline]
    fn parse<P: Parser>(_: &mut P) -> ParseResult<()> {
        Ok(())
    }
}

impl Encode for bool {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_one(u8::from(*self)) + crate::resolve_zero!(buf)
    }
}

impl Decode for bool {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        p.take_bool()
    }
}

macro_rules! impl_fixed_width {
    ( $( $t:ty => $take:ident ),+ $(,)? ) => {
        $(
            impl Encode for $t {
                #[inline]
                fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                    buf.push_many(self.to_le_bytes()) + crate::resolve_zero!(buf)
                }
            }

            impl Decode for $t {
                #[inline]
                fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                    p.$take()
                }
            }
        )+
    };
}

impl_fixed_width!(
    u8 => take_u8,
    u16 => take_u16,
    u32 => take_u32,
    u64 => take_u64,
    i8 => take_i8,
    i16 => take_i16,
    i32 => take_i32,
    i64 => take_i64,
    f32 => take_f32,
    f64 => take_f64,
);

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, Builder, EncodeLength, StrictBuilder};

    fn encode_decode<T>(table: &[(T, &str)])
    where
        T: Encode + Decode + PartialEq + std::fmt::Debug,
    {
        for (val, enc) in table.iter() {
            assert_eq!(val.encode::<StrictBuilder>().into_hex(), *enc);
            assert_eq!(&T::decode(hex!(*enc)), val);
        }
    }

    #[test]
    fn unit() {
        assert_eq!(().enc_len(), 0);
        assert_eq!((), <()>::decode(Vec::new()));
    }

    #[test]
    fn bools() {
        encode_decode(&[(true, "01"), (false, "00")]);
        assert!(bool::try_decode(hex!("ff")).is_err());
    }

    #[test]
    fn unsigned() {
        encode_decode(&[(0u8, "00"), (255u8, "ff")]);
        encode_decode(&[(0x0102u16, "0201"), (u16::MAX, "ffff")]);
        encode_decode(&[(0xdeadbeefu32, "efbeadde")]);
        encode_decode(&[(1u64, "0100000000000000")]);
    }

    #[test]
    fn signed() {
        encode_decode(&[(-1i8, "ff"), (i8::MIN, "80"), (i8::MAX, "7f")]);
        encode_decode(&[(-2i16, "feff")]);
        encode_decode(&[(i32::MIN, "00000080")]);
        encode_decode(&[(-1i64, "ffffffffffffffff")]);
    }

    #[test]
    fn floats() {
        encode_decode(&[(1.0f32, "0000803f"), (-2.5f32, "000020c0")]);
        encode_decode(&[(1.0f64, "000000000000f03f")]);
        assert!(f64::decode(f64::NAN.to_bytes()).is_nan());
    }

    #[test]
    fn truncated() {
        assert!(u32::try_decode(hex!("010203")).unwrap_err().is_underflow());
    }
}
