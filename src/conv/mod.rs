//! Core of the statically-typed binary-conversion API
//!
//! This module contains definitions for the transcoding traits `Encode` and
//! `Decode`, which map Rust types directly onto BARE wire encodings without
//! passing through the dynamic [`Value`](crate::value::Value) model. They are
//! motivationally equivalent to the `Serialize` and `Deserialize` traits of
//! `serde`, but fixed to a single wire format.
//!
//! The mapping between Rust types and BARE types is:
//!
//! | Rust                  | BARE                      |
//! |-----------------------|---------------------------|
//! | `u8`..`u64`, `i8`..`i64` | `U8`..`U64`, `I8`..`I64` |
//! | [`Uint`], [`Int`]     | `UInt`, `Int`             |
//! | `f32`, `f64`          | `F32`, `F64`              |
//! | `bool`                | `Bool`                    |
//! | `()`                  | `Void`                    |
//! | `String`              | `String`                  |
//! | [`Bytes`]             | `Data`                    |
//! | [`FixedBytes<N>`]     | `Data<N>`                 |
//! | `Option<T>`           | `Optional<T>`             |
//! | `Vec<T>`              | `[]T`                     |
//! | `[T; N]`              | `[N]T`                    |
//! | `BTreeMap<K, V>`      | `Map[K]V`                 |
//! | tuples, `#[derive]`d structs | struct            |
//! | `#[derive]`d enums    | enum or union             |
//!
//! The sub-module [`target`] defines [`Target`], the dual of
//! [`crate::parse::Parser`] that encoders write into.
//!
//! [`Uint`]: crate::varint::Uint
//! [`Int`]: crate::varint::Int
//! [`Bytes`]: crate::bytes::Bytes
//! [`FixedBytes<N>`]: crate::fixed::FixedBytes

use std::collections::BTreeMap;

use crate::parse::error::{InternalError, TokenError};
use crate::parse::{ParseResult, Parser, TryIntoParser, MAX_PREALLOC};
use crate::varint::{read_length, write_uint};

use self::target::Target;

pub mod error;
pub mod target;

pub use error::{DecodeError, DecodeResult};

/// Trait for types with a BARE binary encoding.
///
/// Implementing [`Encode`] requires only [`write_to`](Encode::write_to); the
/// other methods are conveniences built on top of it.
pub trait Encode {
    /// Appends the serialized bytes of this value to a generic buffer,
    /// returning the exact number of bytes written.
    ///
    /// Infallible: every value of an `Encode` type has an encoding.
    fn write_to<U: Target>(&self, buf: &mut U) -> usize;

    /// Appends the serialized bytes of this value to a `Vec<u8>`.
    #[inline]
    fn write_to_vec(&self, buf: &mut Vec<u8>) {
        let _ = self.write_to(buf);
    }

    /// Creates a new buffer of type `U` and fills it with the serialized
    /// bytes of this value.
    #[must_use]
    #[inline]
    fn encode<U: Target>(&self) -> U {
        let mut buf: U = U::create();
        let _ = self.write_to::<U>(&mut buf);
        buf
    }

    #[must_use]
    #[inline]
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to_vec(&mut buf);
        buf
    }
}

/// Extension trait for `Encode` that measures encodings without writing them.
pub trait EncodeLength: Encode {
    /// Computes, without allocation, the number of bytes in the serialized
    /// form of `self`, by writing it to a [`ByteCounter`](target::ByteCounter).
    #[must_use]
    #[inline]
    fn enc_len(&self) -> usize {
        self.write_to(&mut std::io::sink())
    }
}

impl<T: Encode + ?Sized> EncodeLength for T {}

/// Trait for types that can be read back from their BARE binary encoding.
///
/// Implementations are defined by one required method, [`parse`](Decode::parse),
/// which consumes exactly the bytes of one value from a [`Parser`].
///
/// # Example
///
/// ```
/// use bare::parse::{Parser, ParseResult};
/// use bare::Decode;
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i16,
///     visible: bool,
/// }
///
/// impl Decode for Point {
///     fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
///         Ok(Self { x: i16::parse(p)?, visible: bool::parse(p)? })
///     }
/// }
///
/// assert_eq!(Point::decode(vec![0xfe, 0xff, 0x01]), Point { x: -2, visible: true });
/// ```
pub trait Decode {
    /// Consumes and interprets a value of type `Self` from a `Parser`.
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self>
    where
        Self: Sized;

    /// Decodes a value of type `Self` from any input convertible into a
    /// [`ByteParser`](crate::parse::ByteParser).
    ///
    /// If the feature-flag `check_complete_parse` is enabled, it is an error
    /// for any bytes to remain in the input after the value has been parsed.
    fn try_decode<U>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        U: TryIntoParser,
    {
        Self::try_decode_with::<U, crate::parse::ByteParser>(input)
    }

    /// Generalization of [`try_decode`](Decode::try_decode) to any
    /// `Parser` type `P`.
    ///
    /// Completeness is only checked (under `check_complete_parse`) for
    /// parsers that know how many bytes remain.
    fn try_decode_with<U, P>(input: U) -> DecodeResult<Self>
    where
        Self: Sized,
        P: Parser,
        U: TryIntoParser<P>,
    {
        let mut p: P = input.try_into_parser()?;
        let ret = Self::parse(&mut p)?;
        #[cfg(feature = "check_complete_parse")]
        {
            if let Some(residual) = p.remainder().filter(|&n| n > 0) {
                return Err(DecodeError::NonEmpty {
                    offset: p.offset(),
                    residual,
                });
            }
        }
        Ok(ret)
    }

    /// Decodes a value of type `Self` using [`ByteParser`](crate::parse::ByteParser).
    ///
    /// # Panics
    ///
    /// Panics if the interior call to [`try_decode`](Decode::try_decode)
    /// returns an error.
    fn decode<U>(inp: U) -> Self
    where
        Self: Sized,
        U: TryIntoParser,
    {
        Self::try_decode(inp).unwrap_or_else(|err| {
            panic!(
                "<{} as Decode>::decode encountered error: {:?}",
                std::any::type_name::<Self>(),
                err
            )
        })
    }
}

impl Encode for String {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_prefixed(self.as_bytes()) + buf.resolve_zero()
    }
}

impl Encode for str {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        buf.push_prefixed(self.as_bytes()) + buf.resolve_zero()
    }
}

impl Decode for String {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = read_length(p)?;
        let buf: Vec<u8> = p.take_dynamic(len)?;
        Ok(String::from_utf8(buf)?)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        (match self {
            Some(val) => buf.push_one(0x01) + val.write_to(buf),
            None => buf.push_one(0x00),
        }) + crate::resolve_zero!(buf)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        if p.take_presence()? {
            Ok(Some(T::parse(p)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: Encode> Encode for Box<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.as_ref().write_to(buf)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Ok(Box::new(T::parse(p)?))
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.as_slice().write_to(buf)
    }
}

impl<T: Encode> Encode for [T] {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_uint(buf, self.len() as u64)
            + self.iter().map(|x| x.write_to(buf)).sum::<usize>()
            + buf.resolve_zero()
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = read_length(p)?;
        let mut ret = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            ret.push(T::parse(p)?);
        }
        Ok(ret)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.iter().map(|x| x.write_to(buf)).sum::<usize>() + buf.resolve_zero()
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let mut elems = Vec::with_capacity(N.min(MAX_PREALLOC));
        for _ in 0..N {
            elems.push(T::parse(p)?);
        }
        <[T; N]>::try_from(elems).map_err(|v| {
            InternalError::ArrayCoerceFailure {
                expected: N,
                actual: v.len(),
            }
            .into()
        })
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        write_uint(buf, self.len() as u64)
            + self
                .iter()
                .map(|(k, v)| k.write_to(buf) + v.write_to(buf))
                .sum::<usize>()
            + buf.resolve_zero()
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Ord + std::fmt::Debug,
    V: Decode,
{
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        let len = read_length(p)?;
        let mut ret = BTreeMap::new();
        for _ in 0..len {
            let key = K::parse(p)?;
            let val = V::parse(p)?;
            if ret.contains_key(&key) {
                return Err(TokenError::DuplicateMapKey(format!("{:?}", key)).into());
            }
            ret.insert(key, val);
        }
        Ok(ret)
    }
}

macro_rules! impl_tuple {
    ( $( $t:ident : $ix:tt ),+ ) => {
        impl<$( $t: Encode ),+> Encode for ( $( $t, )+ ) {
            fn write_to<U: Target>(&self, buf: &mut U) -> usize {
                $( self.$ix.write_to(buf) + )+ buf.resolve_zero()
            }
        }

        impl<$( $t: Decode ),+> Decode for ( $( $t, )+ ) {
            fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                Ok(( $( $t::parse(p)?, )+ ))
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hex, Builder, StrictBuilder};

    #[test]
    fn string_prefix() {
        assert_eq!(
            "abc".to_string().encode::<StrictBuilder>().into_hex(),
            "03616263"
        );
        assert_eq!(String::decode(hex!("03616263")), "abc");
        assert!(String::try_decode(hex!("02ffff")).is_err());
    }

    #[test]
    fn optional_presence() {
        assert_eq!(Some(0x2au8).to_bytes(), vec![0x01, 0x2a]);
        assert_eq!(None::<u8>.to_bytes(), vec![0x00]);
        assert_eq!(Option::<u8>::decode(vec![0x01, 0x2a]), Some(0x2a));
        assert!(Option::<u8>::try_decode(vec![0x02, 0x2a]).is_err());
    }

    #[test]
    fn sequences() {
        let v: Vec<u16> = vec![1, 2];
        assert_eq!(v.to_bytes(), vec![0x02, 0x01, 0x00, 0x02, 0x00]);
        assert_eq!(Vec::<u16>::decode(vec![0x02, 0x01, 0x00, 0x02, 0x00]), v);
        let a: [u8; 3] = [7, 8, 9];
        assert_eq!(a.to_bytes(), vec![7, 8, 9]);
        assert_eq!(<[u8; 3]>::decode(vec![7, 8, 9]), a);
        assert_eq!(v.enc_len(), 5);
    }

    #[test]
    fn maps() {
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), 1u8);
        m.insert("b".to_string(), 2u8);
        let bytes = m.to_bytes();
        assert_eq!(bytes, vec![0x02, 0x01, b'a', 0x01, 0x01, b'b', 0x02]);
        assert_eq!(BTreeMap::<String, u8>::decode(bytes), m);
        assert!(
            BTreeMap::<String, u8>::try_decode(vec![0x02, 0x01, b'a', 0x01, 0x01, b'a', 0x02])
                .is_err()
        );
    }

    #[test]
    fn tuples() {
        let t = (true, 0x0102u16, "x".to_string());
        assert_eq!(t.to_bytes(), vec![0x01, 0x02, 0x01, 0x01, b'x']);
        assert_eq!(<(bool, u16, String)>::decode(t.to_bytes()), t);
    }

    #[test]
    fn length_prefix_exceeds_input() {
        let err = Vec::<u8>::try_decode(vec![0xff, 0xff, 0x03, 0x00]).unwrap_err();
        assert!(err.is_underflow());
    }
}
