//! General error types
//!
//! This module contains the error types that are not specific to either
//! direction of transcoding: byte-width and element-count constraint
//! failures, numeric range failures, hex-conversion failures, and the
//! two error types of the dynamic schema layer, [`SchemaError`] (rejected
//! type declarations) and [`ValidationError`] (values rejected by a
//! declared type).
//!
//! The error types produced by parsing live in [`crate::parse::error`], and
//! the top-level encode/decode errors in [`crate::conv::error`].

use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::num::TryFromIntError;

/// Byte-width failure of a `Data<N>` value.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum WidthError {
    WrongWidth { exact: usize, actual: usize },
}

impl Display for WidthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WidthError::WrongWidth { exact, actual } => {
                write!(
                    f,
                    "{actual}-byte value violated requirement of {exact} bytes"
                )
            }
        }
    }
}

impl Error for WidthError {}

/// Element-count failure of a fixed-length array or validated collection.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Restriction on maximum element-count exceeded
    TooLong { limit: usize, actual: usize },
    /// Positional access beyond the current element-count
    NoSuchIndex { index: usize, len: usize },
}

impl Display for LengthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooLong { limit, actual } => {
                write!(
                    f,
                    "{actual}-element value exceeded limit of {limit} elements"
                )
            }
            LengthError::NoSuchIndex { index, len } => {
                write!(f, "index {index} out of range for {len}-element sequence")
            }
        }
    }
}

impl Error for LengthError {}

/// Error type representing all possible conditions for invalidity
/// encountered when attempting to parse a string-type as a series
/// of hex-encoded bytes.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd)]
pub enum HexConvError {
    /// Error case for odd-length strings
    OddParity(String),
    /// Error case for strings containing non-hex characters,
    /// i.e. anything not in `[0-9a-fA-F]`.
    NonHex(String),
}

impl Debug for HexConvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(invalid) => {
                write!(f, "non-even length-parity for string `{}`", invalid)
            }
            Self::NonHex(invalid) => write!(f, "non-hex character found in string `{}`", invalid),
        }
    }
}

impl Display for HexConvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(_) => write!(f, "hex-conversion failed on odd-length string"),
            Self::NonHex(_) => write!(f, "hex-conversion failed on non-hex character"),
        }
    }
}

impl Error for HexConvError {}

/// Error type representing invalidity of (numeric) values
/// based on an implicit lower and upper bound.
///
/// * `Underflow {..}` contains the illegal value in question, as well as the lower bound it falls below
/// * `Overflow {..}` contains the illegal value in question, as well as the upper bound it falls above
///
/// The generic parameter `Ext` is a numeric type wide enough to hold both
/// the value under test and the bounds without perturbing their ordering.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BoundsError<Ext: Debug> {
    Underflow { min: Ext, val: Ext },
    Overflow { max: Ext, val: Ext },
    InvalidBounds { min: Ext, max: Ext },
    Failed(TryFromIntError),
}

impl<Ext: Debug> From<Infallible> for BoundsError<Ext> {
    fn from(void: Infallible) -> Self {
        match void {}
    }
}

impl<Ext: Debug> From<TryFromIntError> for BoundsError<Ext> {
    fn from(err: TryFromIntError) -> Self {
        Self::Failed(err)
    }
}

impl<Ext: Debug> BoundsError<Ext> {
    /// Checks that a value `val` falls into the inclusive range `[min, max]`,
    /// returning `Ok(val)` if this condition holds.
    ///
    /// If `val < min`, returns `Err(BoundsError::Underflow { .. })`
    ///
    /// If `val > max`, returns `Err(BoundsError::Overflow { .. })`
    ///
    /// All three values are first converted to `Ext` for comparison.
    pub fn restrict<T, U>(val: T, min: U, max: U) -> Result<T, Self>
    where
        Ext: PartialOrd + Copy,
        T: TryInto<Ext> + Copy,
        U: Into<Ext>,
        BoundsError<Ext>: From<T::Error>,
    {
        let min: Ext = min.into();
        let max: Ext = max.into();
        let val_ext: Ext = val.try_into()?;
        if min > max {
            Err(Self::InvalidBounds { min, max })
        } else if val_ext < min {
            Err(Self::Underflow { min, val: val_ext })
        } else if val_ext > max {
            Err(Self::Overflow { max, val: val_ext })
        } else {
            Ok(val)
        }
    }
}

impl BoundsError<f64> {
    /// Float analogue of [`BoundsError::restrict`].
    ///
    /// Non-finite values (infinities and NaN) are passed through unchanged,
    /// as they are representable at every IEEE width.
    pub fn restrict_float(val: f64, min: f64, max: f64) -> Result<f64, Self> {
        if min > max {
            Err(Self::InvalidBounds { min, max })
        } else if !val.is_finite() {
            Ok(val)
        } else if val < min {
            Err(Self::Underflow { min, val })
        } else if val > max {
            Err(Self::Overflow { max, val })
        } else {
            Ok(val)
        }
    }
}

impl<Ext: Debug + Display> Display for BoundsError<Ext> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundsError::Underflow { ref min, ref val } => {
                write!(f, "provided value {} less than minimum bound {}", val, min)
            }
            BoundsError::Overflow { ref max, ref val } => {
                write!(
                    f,
                    "provided value {} greater than maximum bound {}",
                    val, max
                )
            }
            BoundsError::InvalidBounds { ref min, ref max } => {
                write!(
                    f,
                    "min <= max is not satisfied for the range ({},{})",
                    min, max
                )
            }
            BoundsError::Failed(err) => {
                write!(f, "could not convert for bounds-checking: {}", err)
            }
        }
    }
}

impl<Ext: Display + Debug> Error for BoundsError<Ext> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Single step in a [`Path`] from the root of a value to one of its
/// descendants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// Named struct field
    Field(String),
    /// Position within an array
    Index(usize),
    /// Entry of a map, rendered through the key's display form
    Key(String),
    /// Member of a union, by tag
    Member(usize),
    /// Boundary of a named user type
    Named(String),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(ix) => write!(f, "[{ix}]"),
            PathSegment::Key(key) => write!(f, "{{{key}}}"),
            PathSegment::Member(tag) => write!(f, "<{tag}>"),
            PathSegment::Named(name) => write!(f, "({name})"),
        }
    }
}

/// Location of a sub-value relative to the value a walk was started on.
///
/// Rendered as `$` followed by each segment in order, e.g. `$.items[2].name`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(Vec<PathSegment>);

impl Path {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, seg: PathSegment) {
        self.0.push(seg)
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of `self` with `seg` prepended.
    #[must_use]
    pub fn under(&self, seg: PathSegment) -> Self {
        let mut ret = Vec::with_capacity(self.0.len() + 1);
        ret.push(seg);
        ret.extend(self.0.iter().cloned());
        Self(ret)
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("$")?;
        for seg in self.0.iter() {
            Display::fmt(seg, f)?;
        }
        Ok(())
    }
}

/// Errors raised when a type declaration is itself malformed.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaError {
    /// Union declared without any members
    EmptyUnion,
    /// Enum declared without any values
    EmptyEnum { name: String },
    /// Enum declaring the same name or numeric value twice
    DuplicateEnumValue { name: String, member: String, value: u64 },
    /// Struct declared without any fields
    EmptyStruct { name: String },
    /// Struct declaring the same field name twice
    DuplicateField { name: String, field: String },
    /// Fixed-length construct declared with length 0
    ZeroLength { bare_type: &'static str },
    /// Explicit default value rejected by the type it was attached to
    InvalidDefault(Box<ValidationError>),
    /// Validated collection requested for a non-collection type
    NotACollection { declared: String },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::EmptyUnion => write!(f, "union must declare at least one member"),
            SchemaError::EmptyEnum { name } => {
                write!(f, "enum {name} must declare at least one value")
            }
            SchemaError::DuplicateEnumValue { name, member, value } => {
                write!(f, "enum {name} redeclares member {member} or value {value}")
            }
            SchemaError::EmptyStruct { name } => {
                write!(f, "struct {name} must declare at least one field")
            }
            SchemaError::DuplicateField { name, field } => {
                write!(f, "struct {name} declares field `{field}` more than once")
            }
            SchemaError::ZeroLength { bare_type } => {
                write!(f, "{bare_type} must have a length greater than zero")
            }
            SchemaError::InvalidDefault(err) => write!(f, "invalid default value: {err}"),
            SchemaError::NotACollection { declared } => {
                write!(f, "{declared} is not an array or map type")
            }
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SchemaError::InvalidDefault(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Reason a value was rejected by a declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationErrorKind {
    /// Value is of the wrong shape altogether (e.g. a string for an integer type)
    TypeMismatch { found: &'static str },
    /// Integer outside of the range of the declared width
    OutOfRange(BoundsError<i128>),
    /// Finite float not representable at the declared width
    FloatOutOfRange(BoundsError<f64>),
    /// Byte-string of the wrong width for a `DataFixed`
    Width(WidthError),
    /// Sequence with too many elements, or positional access out of bounds
    Length(LengthError),
    /// Integer not among the declared values of an enum
    NotInEnum { value: i128 },
    /// No union member accepts the value
    NoUnionMember,
    /// Explicit union tag beyond the declared members
    UnionTagOutOfRange { tag: usize, members: usize },
    /// Struct value lacking a declared field
    MissingField(String),
    /// Field name not declared by the struct
    UnknownField(String),
}

impl Display for ValidationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { found } => write!(f, "found {found}"),
            Self::OutOfRange(err) => Display::fmt(err, f),
            Self::FloatOutOfRange(err) => Display::fmt(err, f),
            Self::Width(err) => Display::fmt(err, f),
            Self::Length(err) => Display::fmt(err, f),
            Self::NotInEnum { value } => write!(f, "{value} is not a declared value"),
            Self::NoUnionMember => write!(f, "unable to determine union member type for value"),
            Self::UnionTagOutOfRange { tag, members } => {
                write!(f, "tag {tag} exceeds the {members} declared members")
            }
            Self::MissingField(name) => write!(f, "missing field `{name}`"),
            Self::UnknownField(name) => write!(f, "no field named `{name}`"),
        }
    }
}

/// Error produced when a value does not conform to a declared type.
///
/// Carries the [`Path`] from the root of the value being validated to the
/// offending sub-value, and the rendered name of the type at that location.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
    pub path: Path,
    pub expected: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: Path, expected: impl ToString, kind: ValidationErrorKind) -> Self {
        Self {
            path,
            expected: expected.to_string(),
            kind,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value at {} is invalid for BARE type {}: {}",
            self.path, self.expected, self.kind
        )
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            ValidationErrorKind::OutOfRange(err) => Some(err),
            ValidationErrorKind::FloatOutOfRange(err) => Some(err),
            ValidationErrorKind::Width(err) => Some(err),
            ValidationErrorKind::Length(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn restrict_bounds() {
        assert_eq!(BoundsError::<i128>::restrict(255u64, 0u8, 255u8), Ok(255u64));
        assert_eq!(
            BoundsError::<i128>::restrict(256u64, 0u8, 255u8),
            Err(BoundsError::Overflow { max: 255, val: 256 })
        );
        assert_eq!(
            BoundsError::<i128>::restrict(-129i64, i8::MIN, i8::MAX),
            Err(BoundsError::Underflow { min: -128, val: -129 })
        );
        assert!(BoundsError::restrict_float(f64::INFINITY, f32::MIN as f64, f32::MAX as f64).is_ok());
        assert!(BoundsError::restrict_float(1e39, f32::MIN as f64, f32::MAX as f64).is_err());
    }

    #[test]
    fn path_display() {
        let mut path = Path::root();
        assert_eq!(path.to_string(), "$");
        path.push(PathSegment::Field("items".into()));
        path.push(PathSegment::Index(2));
        path.push(PathSegment::Key("\"k\"".into()));
        path.push(PathSegment::Member(1));
        assert_eq!(path.to_string(), "$.items[2]{\"k\"}<1>");
        assert_eq!(
            path.under(PathSegment::Field("outer".into())).to_string(),
            "$.outer.items[2]{\"k\"}<1>"
        );
    }
}
