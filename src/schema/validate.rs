//! Checking of dynamic values against declared types

use crate::error::{
    BoundsError, LengthError, Path, PathSegment, ValidationError, ValidationErrorKind, WidthError,
};
use crate::value::Value;

use super::{Kind, TypeNode};

cfg_if::cfg_if! {
    if #[cfg(feature = "u8_wide_range")] {
        /// Upper bound accepted for `U8` values.
        ///
        /// Widened to the range of `U16` for compatibility with producers that
        /// validated `U8` with the wrong bound; such values are rejected when
        /// packed.
        pub const U8_MAX: u16 = 0xffff;
    } else {
        /// Upper bound accepted for `U8` values.
        pub const U8_MAX: u16 = 0xff;
    }
}

impl TypeNode {
    /// Checks that `value` conforms to `self`, recursively.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] locating the first offending sub-value
    /// in depth-first order. Struct fields are visited in declaration order.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut path = Path::root();
        let ret = validate_at(self, value, &mut path);
        if let Err(err) = &ret {
            tracing::debug!(%err, "value rejected");
        }
        ret
    }

    /// Returns `true` if [`validate`](TypeNode::validate) would succeed.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        validate_at(self, value, &mut Path::root()).is_ok()
    }
}

/// Picks the union member `value` belongs to: its explicit tag if it is a
/// [`Value::Union`], otherwise the first member that accepts it.
pub(crate) fn resolve_member<'a>(
    members: &[TypeNode],
    value: &'a Value,
) -> Option<(usize, &'a Value)> {
    match value {
        Value::Union(u) if u.tag < members.len() => Some((u.tag, u.value.as_ref())),
        Value::Union(_) => None,
        _ => members
            .iter()
            .position(|m| m.is_valid(value))
            .map(|tag| (tag, value)),
    }
}

fn reject(node: &TypeNode, path: &Path, kind: ValidationErrorKind) -> ValidationError {
    ValidationError::new(path.clone(), node, kind)
}

fn mismatch(node: &TypeNode, path: &Path, value: &Value) -> ValidationError {
    reject(
        node,
        path,
        ValidationErrorKind::TypeMismatch {
            found: value.kind_name(),
        },
    )
}

fn check_int<U: Into<i128>>(
    node: &TypeNode,
    path: &Path,
    value: &Value,
    min: U,
    max: U,
) -> Result<(), ValidationError> {
    match value {
        Value::Int(i) => BoundsError::<i128>::restrict(*i, min, max)
            .map(|_| ())
            .map_err(|err| reject(node, path, ValidationErrorKind::OutOfRange(err))),
        other => Err(mismatch(node, path, other)),
    }
}

/// Validates `value` against `node`, where `path` locates `value` within
/// the value the walk was started on.
///
/// On success, `path` is restored to its state on entry.
pub(crate) fn validate_at(
    node: &TypeNode,
    value: &Value,
    path: &mut Path,
) -> Result<(), ValidationError> {
    match node.kind() {
        Kind::UInt => check_int(node, path, value, 0u64, u64::MAX),
        Kind::Int => check_int(node, path, value, i64::MIN, i64::MAX),
        Kind::U8 => check_int(node, path, value, 0u16, U8_MAX),
        Kind::U16 => check_int(node, path, value, u16::MIN, u16::MAX),
        Kind::U32 => check_int(node, path, value, u32::MIN, u32::MAX),
        Kind::U64 => check_int(node, path, value, u64::MIN, u64::MAX),
        Kind::I8 => check_int(node, path, value, i8::MIN, i8::MAX),
        Kind::I16 => check_int(node, path, value, i16::MIN, i16::MAX),
        Kind::I32 => check_int(node, path, value, i32::MIN, i32::MAX),
        Kind::I64 => check_int(node, path, value, i64::MIN, i64::MAX),
        Kind::F32 => match value {
            Value::Float(x) => {
                BoundsError::restrict_float(*x, f64::from(f32::MIN), f64::from(f32::MAX))
                    .map(|_| ())
                    .map_err(|err| reject(node, path, ValidationErrorKind::FloatOutOfRange(err)))
            }
            other => Err(mismatch(node, path, other)),
        },
        Kind::F64 => match value {
            Value::Float(_) => Ok(()),
            other => Err(mismatch(node, path, other)),
        },
        Kind::Bool => match value {
            Value::Bool(_) => Ok(()),
            other => Err(mismatch(node, path, other)),
        },
        Kind::String => match value {
            Value::String(_) => Ok(()),
            other => Err(mismatch(node, path, other)),
        },
        Kind::Data => match value {
            Value::Data(_) => Ok(()),
            other => Err(mismatch(node, path, other)),
        },
        Kind::Void => match value {
            Value::Void => Ok(()),
            other => Err(mismatch(node, path, other)),
        },
        Kind::DataFixed(len) => match value {
            Value::Data(bytes) if bytes.len() == *len => Ok(()),
            Value::Data(bytes) => Err(reject(
                node,
                path,
                ValidationErrorKind::Width(WidthError::WrongWidth {
                    exact: *len,
                    actual: bytes.len(),
                }),
            )),
            other => Err(mismatch(node, path, other)),
        },
        Kind::Optional(inner) => match value {
            Value::Void => Ok(()),
            other => validate_at(inner, other, path),
        },
        Kind::Array(elem) => match value {
            Value::Array(items) => validate_items(elem, items, path),
            other => Err(mismatch(node, path, other)),
        },
        Kind::ArrayFixed(elem, len) => match value {
            Value::Array(items) if items.len() > *len => Err(reject(
                node,
                path,
                ValidationErrorKind::Length(LengthError::TooLong {
                    limit: *len,
                    actual: items.len(),
                }),
            )),
            Value::Array(items) => validate_items(elem, items, path),
            other => Err(mismatch(node, path, other)),
        },
        Kind::Map(key_node, val_node) => match value {
            Value::Map(entries) => {
                for (key, val) in entries.iter() {
                    path.push(PathSegment::Key(key.to_string()));
                    validate_at(key_node, key, path)?;
                    validate_at(val_node, val, path)?;
                    path.pop();
                }
                Ok(())
            }
            other => Err(mismatch(node, path, other)),
        },
        Kind::Union(members) => match value {
            Value::Union(u) if u.tag >= members.len() => Err(reject(
                node,
                path,
                ValidationErrorKind::UnionTagOutOfRange {
                    tag: u.tag,
                    members: members.len(),
                },
            )),
            Value::Union(u) => {
                path.push(PathSegment::Member(u.tag));
                validate_at(&members[u.tag], &u.value, path)?;
                path.pop();
                Ok(())
            }
            other => match resolve_member(members, other) {
                Some(_) => Ok(()),
                None => Err(reject(node, path, ValidationErrorKind::NoUnionMember)),
            },
        },
        Kind::Struct(schema) => match value {
            Value::Struct(fields) => {
                for field in schema.fields() {
                    let val = fields.get(&field.name).ok_or_else(|| {
                        reject(
                            node,
                            path,
                            ValidationErrorKind::MissingField(field.name.clone()),
                        )
                    })?;
                    path.push(PathSegment::Field(field.name.clone()));
                    validate_at(&field.node, val, path)?;
                    path.pop();
                }
                match fields.iter().find(|(name, _)| schema.field(name).is_none()) {
                    Some((name, _)) => Err(reject(
                        node,
                        path,
                        ValidationErrorKind::UnknownField(name.to_owned()),
                    )),
                    None => Ok(()),
                }
            }
            other => Err(mismatch(node, path, other)),
        },
        Kind::Enum(schema) => match value {
            Value::Int(i) => match u64::try_from(*i) {
                Ok(raw) if schema.contains(raw) => Ok(()),
                _ => Err(reject(
                    node,
                    path,
                    ValidationErrorKind::NotInEnum { value: *i },
                )),
            },
            other => Err(mismatch(node, path, other)),
        },
        Kind::User(name, inner) => {
            path.push(PathSegment::Named(name.clone()));
            validate_at(inner, value, path)?;
            path.pop();
            Ok(())
        }
    }
}

fn validate_items(elem: &TypeNode, items: &[Value], path: &mut Path) -> Result<(), ValidationError> {
    for (ix, item) in items.iter().enumerate() {
        path.push(PathSegment::Index(ix));
        validate_at(elem, item, path)?;
        path.pop();
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::{EnumSchema, StructSchema};
    use crate::value::{MapValue, StructValue};

    fn kind_of(node: &TypeNode, value: impl Into<Value>) -> ValidationErrorKind {
        node.validate(&value.into()).unwrap_err().kind
    }

    #[test]
    fn integer_bounds() {
        let u8_node = TypeNode::u8();
        assert!(u8_node.is_valid(&Value::Int(0)));
        assert!(u8_node.is_valid(&Value::Int(255)));
        assert!(!u8_node.is_valid(&Value::Int(-1)));
        #[cfg(not(feature = "u8_wide_range"))]
        assert!(!u8_node.is_valid(&Value::Int(256)));

        let i8_node = TypeNode::i8();
        assert!(i8_node.is_valid(&Value::Int(-128)));
        assert!(i8_node.is_valid(&Value::Int(127)));
        assert_eq!(
            kind_of(&i8_node, 128),
            ValidationErrorKind::OutOfRange(BoundsError::Overflow { max: 127, val: 128 })
        );
        assert_eq!(
            kind_of(&i8_node, -129),
            ValidationErrorKind::OutOfRange(BoundsError::Underflow { min: -128, val: -129 })
        );

        assert!(TypeNode::uint().is_valid(&Value::Int(u64::MAX.into())));
        assert!(!TypeNode::uint().is_valid(&Value::Int(i128::from(u64::MAX) + 1)));
        assert!(!TypeNode::int().is_valid(&Value::Int(i128::from(i64::MIN) - 1)));
    }

    #[test]
    fn type_mismatch() {
        assert_eq!(
            kind_of(&TypeNode::u32(), "5"),
            ValidationErrorKind::TypeMismatch { found: "string" }
        );
        assert!(!TypeNode::f64().is_valid(&Value::Int(1)));
        assert!(!TypeNode::bool().is_valid(&Value::Int(1)));
        assert!(!TypeNode::void().is_valid(&Value::Bool(false)));
        assert!(!TypeNode::data().is_valid(&"bytes".into()));
    }

    #[test]
    fn floats() {
        assert!(TypeNode::f32().is_valid(&Value::Float(1.5)));
        assert!(TypeNode::f32().is_valid(&Value::Float(f64::NAN)));
        assert!(matches!(
            kind_of(&TypeNode::f32(), 1e300),
            ValidationErrorKind::FloatOutOfRange(_)
        ));
        assert!(TypeNode::f64().is_valid(&Value::Float(1e300)));
    }

    #[test]
    fn fixed_widths() {
        let node = TypeNode::data_fixed(4).unwrap();
        assert!(node.is_valid(&Value::data(vec![0; 4])));
        assert_eq!(
            kind_of(&node, Value::data(vec![0; 3])),
            ValidationErrorKind::Width(WidthError::WrongWidth { exact: 4, actual: 3 })
        );
        let arr = TypeNode::array(TypeNode::u8(), 3);
        assert!(arr.is_valid(&Value::Array(vec![1.into(), 2.into()])));
        assert!(!arr.is_valid(&Value::Array(vec![1.into(); 4])));
    }

    #[test]
    fn optional_accepts_void() {
        let node = TypeNode::optional(TypeNode::u32());
        assert!(node.is_valid(&Value::Void));
        assert!(node.is_valid(&Value::Int(5)));
        assert!(!node.is_valid(&Value::Int(-5)));
    }

    #[test]
    fn union_resolution() {
        let node = TypeNode::union([TypeNode::u8(), TypeNode::string()]).unwrap();
        assert!(node.is_valid(&Value::Int(7)));
        assert!(node.is_valid(&"hi".into()));
        assert!(node.is_valid(&Value::tagged(1, "hi")));
        assert_eq!(kind_of(&node, 1.5), ValidationErrorKind::NoUnionMember);
        assert_eq!(
            kind_of(&node, Value::tagged(2, 0)),
            ValidationErrorKind::UnionTagOutOfRange { tag: 2, members: 2 }
        );
        let err = node.validate(&Value::tagged(0, "hi")).unwrap_err();
        assert_eq!(err.path.to_string(), "$<0>");
        assert_eq!(err.expected, "U8");
    }

    #[test]
    fn struct_fields() {
        let node = TypeNode::structure(
            StructSchema::new(
                "Pair",
                [("a", TypeNode::u8()), ("b", TypeNode::array(TypeNode::u16(), 0))],
            )
            .unwrap(),
        );
        let ok = StructValue::new()
            .with("b", vec![Value::Int(1)])
            .with("a", 1);
        assert!(node.is_valid(&ok.clone().into()));

        let err = node
            .validate(&StructValue::new().with("b", Value::Array(vec![])).into())
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField("a".into()));

        let err = node
            .validate(&ok.clone().with("b", vec![Value::Int(1), Value::Int(-1)]).into())
            .unwrap_err();
        assert_eq!(err.path.to_string(), "$.b[1]");
        assert_eq!(err.expected, "U16");

        let err = node.validate(&ok.with("c", true).into()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownField("c".into()));
    }

    #[test]
    fn map_entries() {
        let node = TypeNode::map(TypeNode::string(), TypeNode::i16());
        let mut m = MapValue::new();
        m.insert("x", 1);
        assert!(node.is_valid(&m.clone().into()));
        m.insert("y", 40000);
        let err = node.validate(&m.into()).unwrap_err();
        assert_eq!(err.path.to_string(), "${\"y\"}");
    }

    #[test]
    fn enum_membership() {
        let node = TypeNode::enumeration(EnumSchema::from_values("E", [1, 5]).unwrap());
        assert!(node.is_valid(&Value::Int(5)));
        assert_eq!(kind_of(&node, 2), ValidationErrorKind::NotInEnum { value: 2 });
        assert_eq!(kind_of(&node, -1), ValidationErrorKind::NotInEnum { value: -1 });
    }

    #[test]
    fn user_type_in_path() {
        let node = TypeNode::array(TypeNode::user("Small", TypeNode::i8()), 0);
        let err = node
            .validate(&Value::Array(vec![Value::Int(1), Value::Int(300)]))
            .unwrap_err();
        assert_eq!(err.path.to_string(), "$[1](Small)");
        assert_eq!(
            err.to_string(),
            "value at $[1](Small) is invalid for BARE type I8: provided value 300 greater than maximum bound 127"
        );
    }
}
