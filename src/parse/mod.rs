//! Incremental parsing of BARE-encoded bytes
//!
//! This module defines the [`Parser`] trait, the low-level cursor that every
//! `Decode` implementation and the schema-driven decoder read through, along
//! with its error hierarchy ([`error`]) and three implementors:
//!
//!   * [`ByteParser`], over an owned in-memory buffer
//!   * [`SliceParser`], over a borrowed byte-slice
//!   * [`ReadParser`], over any [`std::io::Read`] stream
//!
//! All multi-byte fixed-width reads are little-endian.

pub mod error;

mod byteparser;
mod readparser;
mod sliceparser;

pub use byteparser::ByteParser;
pub use readparser::ReadParser;
pub use sliceparser::SliceParser;

pub use self::error::ParseResult;

use self::error::{coerce_slice, ParseError, TokenError};

/// Upper bound on the number of elements pre-allocated from an untrusted
/// length prefix; longer sequences grow as they are parsed.
pub const MAX_PREALLOC: usize = 4096;

/// Byte-cursor over a source of BARE-encoded data.
///
/// A fresh parser has `offset() == 0`. Every successful consume operation
/// advances the offset by exactly the number of bytes returned, and a failed
/// consume operation leaves the offset where it was for in-memory sources.
pub trait Parser {
    /// Source type the parser is constructed over
    type Buffer;

    fn from_buffer(buf: Self::Buffer) -> Self;

    /// Number of bytes consumed so far.
    fn offset(&self) -> usize;

    /// Number of bytes remaining, if known.
    ///
    /// Stream-based parsers return `None`.
    fn remainder(&self) -> Option<usize>;

    /// Consumes and returns a single byte.
    fn consume_byte(&mut self) -> ParseResult<u8>;

    /// Consumes exactly `nbytes` bytes and returns a slice over them.
    ///
    /// Returns an error without consuming anything if fewer than `nbytes`
    /// bytes are available.
    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]>;

    #[inline]
    fn consume_arr<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        coerce_slice(self.consume(N)?)
    }

    #[inline]
    fn take_u8(&mut self) -> ParseResult<u8> {
        self.consume_byte()
    }

    #[inline]
    fn take_i8(&mut self) -> ParseResult<i8> {
        Ok(self.consume_byte()? as i8)
    }

    #[inline]
    fn take_u16(&mut self) -> ParseResult<u16> {
        Ok(u16::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_i16(&mut self) -> ParseResult<i16> {
        Ok(i16::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_u32(&mut self) -> ParseResult<u32> {
        Ok(u32::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_i32(&mut self) -> ParseResult<i32> {
        Ok(i32::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_u64(&mut self) -> ParseResult<u64> {
        Ok(u64::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_i64(&mut self) -> ParseResult<i64> {
        Ok(i64::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_f32(&mut self) -> ParseResult<f32> {
        Ok(f32::from_le_bytes(self.consume_arr()?))
    }

    #[inline]
    fn take_f64(&mut self) -> ParseResult<f64> {
        Ok(f64::from_le_bytes(self.consume_arr()?))
    }

    /// Consumes a byte and interprets it as a boolean.
    ///
    /// Returns `false` for `0x00` and `true` for `0x01`; any other byte
    /// is rejected with [`TokenError::InvalidBoolean`].
    #[inline]
    fn take_bool(&mut self) -> ParseResult<bool> {
        match self.consume_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            byte => Err(TokenError::InvalidBoolean(byte).into()),
        }
    }

    /// Consumes the presence byte of an optional value.
    #[inline]
    fn take_presence(&mut self) -> ParseResult<bool> {
        match self.consume_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            byte => Err(TokenError::InvalidPresence(byte).into()),
        }
    }

    /// Consumes and returns a `Vec<u8>` of length `nbytes`.
    #[inline]
    fn take_dynamic(&mut self, nbytes: usize) -> ParseResult<Vec<u8>> {
        self.consume(nbytes).map(Vec::from)
    }

    /// Consumes bytes until the predicate `is_terminal` is satisfied,
    /// returning every byte consumed up to and including the terminal one.
    ///
    /// If no terminal byte is found within `max_len` bytes, returns
    /// [`TokenError::NonTerminating`] holding the bytes consumed. If the
    /// source is exhausted first, the underlying buffer error is returned.
    fn take_self_terminating<F>(&mut self, is_terminal: F, max_len: usize) -> ParseResult<Vec<u8>>
    where
        F: Fn(u8) -> bool,
    {
        let mut ret: Vec<u8> = Vec::with_capacity(max_len);
        while ret.len() < max_len {
            match self.consume_byte() {
                Ok(byte) => {
                    ret.push(byte);
                    if is_terminal(byte) {
                        return Ok(ret);
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Err(TokenError::NonTerminating(ret).into())
    }
}

pub mod buffer {
    //! Buffer types for in-memory `Parser` implementors

    use crate::hexstring::HexString;

    /// Owned byte-buffer that backs a [`ByteParser`](super::ByteParser).
    #[derive(Clone, PartialEq, Eq, Default)]
    #[repr(transparent)]
    pub struct VecBuffer {
        buf: Vec<u8>,
    }

    impl VecBuffer {
        #[must_use]
        pub fn len(&self) -> usize {
            self.buf.len()
        }

        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.buf.is_empty()
        }

        #[must_use]
        pub fn as_slice(&self) -> &[u8] {
            &self.buf
        }
    }

    impl std::fmt::Debug for VecBuffer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            crate::hexstring::util::write_hex!(f, "VecBuffer:"; &self.buf)
        }
    }

    impl From<Vec<u8>> for VecBuffer {
        fn from(buf: Vec<u8>) -> Self {
            Self { buf }
        }
    }

    impl From<&Vec<u8>> for VecBuffer {
        fn from(buf: &Vec<u8>) -> Self {
            Self { buf: buf.clone() }
        }
    }

    impl From<&[u8]> for VecBuffer {
        fn from(bytes: &[u8]) -> Self {
            Self {
                buf: bytes.to_vec(),
            }
        }
    }

    impl<const N: usize> From<[u8; N]> for VecBuffer {
        fn from(bytes: [u8; N]) -> Self {
            Self {
                buf: bytes.to_vec(),
            }
        }
    }

    impl<const N: usize> From<&[u8; N]> for VecBuffer {
        fn from(bytes: &[u8; N]) -> Self {
            Self {
                buf: bytes.to_vec(),
            }
        }
    }

    impl From<HexString> for VecBuffer {
        fn from(hex: HexString) -> Self {
            Self {
                buf: hex.into_vec(),
            }
        }
    }

    impl TryFrom<&str> for VecBuffer {
        type Error = crate::error::HexConvError;

        /// Interprets the string as hex-encoded bytes.
        fn try_from(hex: &str) -> Result<Self, Self::Error> {
            Ok(Self::from(HexString::from_hex(hex)?))
        }
    }

    impl From<&HexString> for VecBuffer {
        fn from(hex: &HexString) -> Self {
            Self {
                buf: hex.as_bytes().to_vec(),
            }
        }
    }
}

/// Conversion of an input value into a parser of type `P` over its bytes.
///
/// When no generic argument is provided, the default `Parser` type
/// used is [`ByteParser`]
pub trait TryIntoParser<P = ByteParser>
where
    P: Parser,
{
    /// Attempts to produce a parser object of type `P` over the bytes
    /// represented by `self`.
    fn try_into_parser(self) -> ParseResult<P>;
}

impl<P, T> TryIntoParser<P> for T
where
    P: Parser,
    <P as Parser>::Buffer: TryFrom<T>,
    <<P as Parser>::Buffer as TryFrom<T>>::Error: Into<ParseError>,
{
    fn try_into_parser(self) -> ParseResult<P> {
        let buffer = <<P as Parser>::Buffer as TryFrom<T>>::try_from(self).map_err(Into::into)?;
        Ok(P::from_buffer(buffer))
    }
}

#[cfg(test)]
mod test {
    use super::error::BufferError;
    use super::*;

    #[test]
    fn little_endian_takes() {
        let mut p: ByteParser = [0x01, 0x02, 0xff, 0xff, 0xff, 0x7f, 0x00, 0x00, 0x80, 0x3f]
            .try_into_parser()
            .unwrap();
        assert_eq!(p.take_u16().unwrap(), 0x0201);
        assert_eq!(p.take_i32().unwrap(), i32::MAX);
        assert_eq!(p.take_f32().unwrap(), 1.0);
        assert_eq!(p.remainder(), Some(0));
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn consume_past_end() {
        let mut p: ByteParser = vec![0x00, 0x01].try_into_parser().unwrap();
        match p.take_u32() {
            Err(ParseError::Buffer(BufferError::ConsumeWouldExceedLimit {
                offset: 0,
                requested: 4,
                limit: 2,
            })) => (),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(p.offset(), 0);
        assert!(!p.take_bool().unwrap());
        assert!(p.take_bool().unwrap());
    }

    #[test]
    fn invalid_bool() {
        let mut p: ByteParser = [0x02].try_into_parser().unwrap();
        assert!(matches!(
            p.take_bool(),
            Err(ParseError::Token(TokenError::InvalidBoolean(0x02)))
        ));
    }

    #[test]
    fn self_terminating_exhausted() {
        let mut p: ByteParser = [0x80, 0x80].try_into_parser().unwrap();
        assert!(p
            .take_self_terminating(|b| b & 0x80 == 0, 10)
            .unwrap_err()
            .is_underflow());
    }

    #[test]
    fn self_terminating_limit() {
        let mut p: ByteParser = [0x80, 0x80, 0x80].try_into_parser().unwrap();
        match p.take_self_terminating(|b| b & 0x80 == 0, 2) {
            Err(ParseError::Token(TokenError::NonTerminating(buf))) => {
                assert_eq!(buf, vec![0x80, 0x80])
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
