//! Error types used to report failure in low-level parsing
//!
//! This module contains a hierarchy of types representing specific
//! classes of error that may arise as a result of calls to
//! [`Parser`](super::Parser) methods, or of the `Decode` implementations
//! layered on top of them.
//!
//! # Layout
//!
//! This module defines the primary type `ParseError` and the alias
//! `ParseResult<T>`; it additionally defines various type-level refinements of
//! `ParseError`, grouped according to similar provenance or nature.

use std::array::TryFromSliceError;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

use crate::error::{BoundsError, HexConvError};
use crate::hexstring::util::write_hex;

/// Enumeration type over all errors that may be encountered when calling
/// methods on `Parser` types, or implementation-specific helper types for
/// `Parser` implementors.
#[derive(Debug)]
pub enum ParseError {
    /// Error class encountered when the source runs out of bytes, or cannot be read from
    Buffer(BufferError),
    /// Error class encountered when internal invariants or preconditions are violated
    Internal(InternalError),
    /// Error class encountered when low-level parsing is successful but
    /// the resultant raw value cannot be converted into a legal value of
    /// a post-parse type
    External(ExternalError),
    /// Error class encountered when the bytes read do not form a legal token
    /// in the position they were read from.
    ///
    /// This includes out-of-range union tags and enum values, illegal values
    /// for boolean and presence bytes, and varints that fail to terminate
    /// within the permitted width.
    Token(TokenError),
}

impl ParseError {
    /// Returns `true` if this error was caused by the source running out
    /// of bytes before a value could be fully read.
    #[must_use]
    pub fn is_underflow(&self) -> bool {
        matches!(
            self,
            ParseError::Buffer(
                BufferError::ConsumeWouldExceedLimit { .. } | BufferError::EndOfStream { .. }
            )
        )
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::Buffer(err) => Display::fmt(err, f),
            ParseError::Internal(err) => Display::fmt(err, f),
            ParseError::External(err) => Display::fmt(err, f),
            ParseError::Token(err) => Display::fmt(err, f),
        }
    }
}

impl From<Infallible> for ParseError {
    fn from(void: Infallible) -> Self {
        match void {}
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Buffer(err) => Some(err),
            ParseError::Internal(err) => Some(err),
            ParseError::External(err) => Some(err),
            ParseError::Token(err) => Some(err),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors related to the availability of bytes in the source of a parser
#[derive(Debug)]
pub enum BufferError {
    /// A consume operation on an in-memory buffer requested more bytes
    /// than remain after the current offset.
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// A consume operation on a stream reached end-of-stream before the
    /// requested number of bytes could be read.
    EndOfStream { offset: usize, requested: usize },
    /// The underlying reader failed for a reason other than end-of-stream.
    Io(std::io::Error),
}

impl From<BufferError> for ParseError {
    fn from(err: BufferError) -> Self {
        Self::Buffer(err)
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::Buffer(BufferError::Io(err))
    }
}

impl Display for BufferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            BufferError::ConsumeWouldExceedLimit {
                limit,
                offset,
                requested,
            } => write!(
                f,
                "not enough bytes in buffer to decode: cannot consume {} bytes (currently at byte {} out of limit {})",
                requested, offset, limit
            ),
            BufferError::EndOfStream { offset, requested } => write!(
                f,
                "not enough bytes in buffer to decode: stream ended within {} bytes requested at byte {}",
                requested, offset
            ),
            BufferError::Io(err) => write!(f, "read failed: {}", err),
        }
    }
}

impl Error for BufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BufferError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors arising from unexpected tokens in the buffer
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenError {
    /// Byte parsed as a `Bool` was neither `0x00` nor `0x01`
    InvalidBoolean(u8),
    /// Presence byte of an `Optional` was neither `0x00` nor `0x01`
    InvalidPresence(u8),
    /// Union tag did not correspond to any declared member
    InvalidUnionTag(TagError),
    /// Enum value was not among the declared values
    InvalidEnumValue(TagError),
    /// Varint failed to terminate within the maximal width of 10 bytes
    NonTerminating(Vec<u8>),
    /// Varint terminated but its value cannot be held in 64 bits
    VarintOverflow(Vec<u8>),
    /// Map contained the same key more than once
    DuplicateMapKey(String),
}

impl From<TokenError> for ParseError {
    fn from(tok_e: TokenError) -> Self {
        Self::Token(tok_e)
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InvalidBoolean(byte) => write!(f, "invalid boolean encoding 0x{byte:02x}"),
            Self::InvalidPresence(byte) => {
                write!(f, "invalid optional presence byte 0x{byte:02x}")
            }
            Self::InvalidUnionTag(err) => write!(f, "invalid union tag: {}", err),
            Self::InvalidEnumValue(err) => write!(f, "invalid enum value: {}", err),
            Self::NonTerminating(buf) => write_hex!(f, "varint failed to terminate: "; buf),
            Self::VarintOverflow(buf) => write_hex!(f, "varint exceeds 64 bits: "; buf),
            Self::DuplicateMapKey(key) => write!(f, "duplicate map key {key}"),
        }
    }
}

impl Error for TokenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TokenError::InvalidUnionTag(err) | TokenError::InvalidEnumValue(err) => Some(err),
            _ => None,
        }
    }
}

/// Error representing an out-of-set discriminant, either a union tag or
/// an enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagError {
    actual: u64,
    for_type: String,
    expected: Option<Vec<u64>>,
}

impl TagError {
    /// Constructs a `TagError` value with the provided type-name `for_type` and
    /// set of valid values `expected`
    pub fn new(actual: u64, for_type: impl Into<String>, expected: Option<Vec<u64>>) -> Self {
        Self {
            actual,
            for_type: for_type.into(),
            expected,
        }
    }

    /// Constructs a `TagError` using an inferred type-name via
    /// [`type_name`](std::any::type_name)
    pub fn with_type<U: ?Sized>(actual: u64, expected: Option<Vec<u64>>) -> Self {
        Self::new(actual, std::any::type_name::<U>(), expected)
    }

    #[must_use]
    pub fn actual(&self) -> u64 {
        self.actual
    }

    #[must_use]
    pub fn expected(&self) -> Option<&[u64]> {
        self.expected.as_deref()
    }
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "unexpected discriminant {} for type {}",
            self.actual, self.for_type
        )?;
        if let Some(valid) = &self.expected {
            write!(f, " (expected one of {:?})", valid)?;
        }
        Ok(())
    }
}

impl Error for TagError {}

/// Implementation-internal errors
///
/// This error class represents certain 'impossible' cases, which signify
/// an implementation bug in either the implementation of a `Parser` type,
/// or a violation of a precondition for calling certain `Parser` methods.
#[derive(Debug, Clone, Copy)]
pub enum InternalError {
    SliceCoerceFailure(TryFromSliceError),
    /// Sequence of parsed elements did not match the length it was parsed for
    ArrayCoerceFailure { expected: usize, actual: usize },
}

impl From<TryFromSliceError> for InternalError {
    fn from(err: TryFromSliceError) -> Self {
        Self::SliceCoerceFailure(err)
    }
}

impl From<InternalError> for ParseError {
    fn from(err: InternalError) -> Self {
        Self::Internal(err)
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            InternalError::SliceCoerceFailure(_) => {
                write!(f, "failed to coerce from byte-slice to fixed-length array")
            }
            InternalError::ArrayCoerceFailure { expected, actual } => write!(
                f,
                "failed to coerce {actual} parsed elements into {expected}-element array"
            ),
        }
    }
}

impl Error for InternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InternalError::SliceCoerceFailure(err) => Some(err),
            InternalError::ArrayCoerceFailure { .. } => None,
        }
    }
}

/// Converts a borrowed byte-slice into an owned byte-array
///
/// Returns a [`ParseError`] corresponding to the reason for
/// failure if this conversion cannot be performed for any reason.
///
/// This error is guaranteed to be an `InternalError`.
pub(crate) fn coerce_slice<const N: usize>(bytes: &'_ [u8]) -> ParseResult<[u8; N]> {
    <[u8; N]>::try_from(bytes).map_err(|err| ParseError::from(InternalError::from(err)))
}

/// Enumerated type representing contextually invalid results obtained from otherwise
/// successfully executed method calls to a Parser object.
#[derive(Debug)]
pub enum ExternalError {
    /// Bytes of a `String` were not valid UTF-8
    UncoercableString(FromUtf8Error),
    /// Integral value parsed from the buffer could not be represented in the target type
    IntRangeViolation(BoundsError<i128>),
    /// Textual input was not a valid hex-string
    HexConversion(HexConvError),
}

impl From<ExternalError> for ParseError {
    fn from(err: ExternalError) -> Self {
        ParseError::External(err)
    }
}

impl From<FromUtf8Error> for ParseError {
    fn from(err: FromUtf8Error) -> Self {
        ParseError::External(ExternalError::UncoercableString(err))
    }
}

impl From<BoundsError<i128>> for ParseError {
    fn from(err: BoundsError<i128>) -> Self {
        ParseError::External(ExternalError::IntRangeViolation(err))
    }
}

impl From<HexConvError> for ParseError {
    fn from(err: HexConvError) -> Self {
        ParseError::External(ExternalError::HexConversion(err))
    }
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ExternalError::UncoercableString(err) => {
                write!(f, "parsed byte-array could not be coerced to String: {}", err)
            }
            ExternalError::IntRangeViolation(x) => write!(f, "{}", x),
            ExternalError::HexConversion(x) => write!(f, "{}", x),
        }
    }
}

impl Error for ExternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExternalError::UncoercableString(err) => Some(err),
            ExternalError::IntRangeViolation(err) => Some(err),
            ExternalError::HexConversion(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conv::Decode;
    use crate::parse::{ByteParser, TryIntoParser};

    #[test]
    fn external_errors_chain() {
        let err = String::try_decode(vec![0x01, 0xff]).unwrap_err();
        match err.parse_error() {
            Some(e @ ParseError::External(ExternalError::UncoercableString(_))) => {
                assert!(e.source().and_then(|ext| ext.source()).is_some());
                assert!(e.to_string().starts_with("parsed byte-array could not be coerced"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = TryIntoParser::<ByteParser>::try_into_parser("0g").unwrap_err();
        assert!(matches!(err, ParseError::External(ExternalError::HexConversion(_))));

        let err = ParseError::from(BoundsError::<i128>::Overflow { max: 255, val: 256 });
        assert!(matches!(err, ParseError::External(ExternalError::IntRangeViolation(_))));
    }
}
