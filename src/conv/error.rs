use crate::error::{HexConvError, Path, ValidationError, ValidationErrorKind};
use crate::parse::error::ParseError;

/// Top-level error for decoding operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// Hex-string input could not be converted to bytes
    Conv(HexConvError),
    /// Statically-typed decode failed
    Parse(ParseError),
    /// Schema-driven decode failed at the given location within the value
    At {
        path: Path,
        offset: usize,
        error: ParseError,
    },
    /// Bytes remained in the buffer after a complete value was decoded
    NonEmpty { offset: usize, residual: usize },
}

impl DecodeError {
    /// Returns the underlying parse error, if any.
    #[must_use]
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            DecodeError::Parse(error) | DecodeError::At { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns `true` if decoding failed because the input ran out of bytes.
    #[must_use]
    pub fn is_underflow(&self) -> bool {
        self.parse_error().map_or(false, ParseError::is_underflow)
    }
}

impl From<std::convert::Infallible> for DecodeError {
    fn from(void: std::convert::Infallible) -> Self {
        match void {}
    }
}

impl From<HexConvError> for DecodeError {
    fn from(err: HexConvError) -> Self {
        Self::Conv(err)
    }
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Conv(err) => write!(f, "hex conversion encountered error: {}", err),
            DecodeError::Parse(err) => write!(f, "parser encountered error: {}", err),
            DecodeError::At {
                path,
                offset,
                error,
            } => write!(f, "decoding {} failed at byte {}: {}", path, offset, error),
            DecodeError::NonEmpty { offset, residual } => write!(
                f,
                "{} unconsumed bytes remained after decoding {} bytes",
                residual, offset
            ),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Conv(err) => Some(err),
            DecodeError::Parse(err) | DecodeError::At { error: err, .. } => Some(err),
            DecodeError::NonEmpty { .. } => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Top-level error for schema-driven encoding operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum EncodeError {
    /// Value does not conform to the type it is being encoded as
    Invalid(ValidationError),
    /// No member of a union accepts the value at the given location
    UnresolvedUnion { path: Path, expected: String },
    /// Integer accepted by validation does not fit the width it is written at
    Overflow { value: i128, bare_type: &'static str },
    /// Writing the encoded bytes to an output stream failed
    Io(std::io::Error),
}

impl From<ValidationError> for EncodeError {
    fn from(err: ValidationError) -> Self {
        match err.kind {
            ValidationErrorKind::NoUnionMember => EncodeError::UnresolvedUnion {
                path: err.path,
                expected: err.expected,
            },
            _ => EncodeError::Invalid(err),
        }
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Invalid(err) => write!(f, "cannot encode invalid value: {}", err),
            EncodeError::UnresolvedUnion { path, expected } => write!(
                f,
                "unable to determine union member type for value at {} ({})",
                path, expected
            ),
            EncodeError::Overflow { value, bare_type } => {
                write!(f, "value {} does not fit in {}", value, bare_type)
            }
            EncodeError::Io(err) => write!(f, "failed to write encoded bytes: {}", err),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::Invalid(err) => Some(err),
            EncodeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

#[cfg(test)]
mod test {
    fn dummy<T: Send + Sync>() {}

    #[test]
    fn errors_threadsafe() {
        dummy::<super::DecodeError>();
        dummy::<super::EncodeError>();
    }
}
