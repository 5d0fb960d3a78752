//! Runtime descriptions of BARE types
//!
//! A [`TypeNode`] describes a BARE type at runtime: primitives, aggregates
//! (`Optional`, arrays, maps, unions, structs), enumerations and named user
//! types aliasing any of these. Values of the dynamic model
//! ([`Value`](crate::value::Value)) are checked against a node by
//! [`TypeNode::validate`], and transcoded by [`TypeNode::pack`] and
//! [`TypeNode::unpack`] (see [`codec`]).
//!
//! Nodes can only be obtained through the constructors on [`TypeNode`],
//! [`StructSchema`] and [`EnumSchema`], which reject malformed declarations
//! (zero-length fixed types, empty unions, enums and structs, duplicate field
//! names and enum values) with a [`SchemaError`]. A constructed node is
//! immutable and can be shared freely across threads.
//!
//! ```
//! use bare::schema::{StructSchema, TypeNode};
//! use bare::value::{StructValue, Value};
//!
//! let point = TypeNode::structure(
//!     StructSchema::new("Point", [("x", TypeNode::i16()), ("y", TypeNode::i16())]).unwrap(),
//! );
//! let val = Value::Struct(StructValue::new().with("x", 1).with("y", -1));
//! let bytes = point.pack(&val).unwrap();
//! assert_eq!(bytes, vec![0x01, 0x00, 0xff, 0xff]);
//! assert_eq!(point.unpack(bytes).unwrap(), val);
//! ```

use std::fmt::{Display, Formatter};

use crate::error::{Path, PathSegment, SchemaError, ValidationError, ValidationErrorKind};
use crate::value::{StructValue, Value};

pub mod codec;
pub mod validate;

use self::validate::resolve_member;

/// Structural kind of a [`TypeNode`]
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    UInt,
    Int,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Data,
    Void,
    /// `Data<N>`, exactly `N > 0` bytes with no length prefix
    DataFixed(usize),
    Optional(Box<TypeNode>),
    /// `[]T`, varint-prefixed
    Array(Box<TypeNode>),
    /// `[N]T`, exactly `N > 0` elements with no length prefix
    ArrayFixed(Box<TypeNode>, usize),
    Map(Box<TypeNode>, Box<TypeNode>),
    /// Tagged union; the tag of each member is its index
    Union(Vec<TypeNode>),
    Struct(StructSchema),
    Enum(EnumSchema),
    /// Named alias for another type
    User(String, Box<TypeNode>),
}

impl Kind {
    /// Unparameterized name of this kind
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::UInt => "UInt",
            Kind::Int => "Int",
            Kind::U8 => "U8",
            Kind::U16 => "U16",
            Kind::U32 => "U32",
            Kind::U64 => "U64",
            Kind::I8 => "I8",
            Kind::I16 => "I16",
            Kind::I32 => "I32",
            Kind::I64 => "I64",
            Kind::F32 => "F32",
            Kind::F64 => "F64",
            Kind::Bool => "Bool",
            Kind::String => "String",
            Kind::Data => "Data",
            Kind::Void => "Void",
            Kind::DataFixed(_) => "DataFixed",
            Kind::Optional(_) => "Optional",
            Kind::Array(_) => "Array",
            Kind::ArrayFixed(..) => "ArrayFixed",
            Kind::Map(..) => "Map",
            Kind::Union(_) => "Union",
            Kind::Struct(_) => "Struct",
            Kind::Enum(_) => "Enum",
            Kind::User(..) => "UserType",
        }
    }
}

/// Runtime description of a BARE type, with an optional default value.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeNode {
    kind: Kind,
    default: Option<Box<Value>>,
}

macro_rules! primitive_ctors {
    ( $( $name:ident => $kind:ident ),+ $(,)? ) => {
        $(
            #[must_use]
            pub const fn $name() -> Self {
                Self::from_kind(Kind::$kind)
            }
        )+
    };
}

impl TypeNode {
    const fn from_kind(kind: Kind) -> Self {
        Self {
            kind,
            default: None,
        }
    }

    primitive_ctors!(
        uint => UInt,
        int => Int,
        u8 => U8,
        u16 => U16,
        u32 => U32,
        u64 => U64,
        i8 => I8,
        i16 => I16,
        i32 => I32,
        i64 => I64,
        f32 => F32,
        f64 => F64,
        bool => Bool,
        string => String,
        data => Data,
        void => Void,
    );

    /// `Data<len>`
    pub fn data_fixed(len: usize) -> Result<Self, SchemaError> {
        if len == 0 {
            return Err(SchemaError::ZeroLength {
                bare_type: "DataFixed",
            });
        }
        Ok(Self::from_kind(Kind::DataFixed(len)))
    }

    #[must_use]
    pub fn optional(inner: TypeNode) -> Self {
        Self::from_kind(Kind::Optional(Box::new(inner)))
    }

    /// Array of `elem`, of exactly `length` elements, or of any number of
    /// elements when `length` is 0.
    #[must_use]
    pub fn array(elem: TypeNode, length: usize) -> Self {
        let elem = Box::new(elem);
        if length == 0 {
            Self::from_kind(Kind::Array(elem))
        } else {
            Self::from_kind(Kind::ArrayFixed(elem, length))
        }
    }

    #[must_use]
    pub fn map(key: TypeNode, val: TypeNode) -> Self {
        Self::from_kind(Kind::Map(Box::new(key), Box::new(val)))
    }

    pub fn union(members: impl IntoIterator<Item = TypeNode>) -> Result<Self, SchemaError> {
        let members: Vec<TypeNode> = members.into_iter().collect();
        if members.is_empty() {
            return Err(SchemaError::EmptyUnion);
        }
        Ok(Self::from_kind(Kind::Union(members)))
    }

    #[must_use]
    pub fn structure(schema: StructSchema) -> Self {
        Self::from_kind(Kind::Struct(schema))
    }

    #[must_use]
    pub fn enumeration(schema: EnumSchema) -> Self {
        Self::from_kind(Kind::Enum(schema))
    }

    /// Named alias for `inner`.
    #[must_use]
    pub fn user(name: impl Into<String>, inner: TypeNode) -> Self {
        Self::from_kind(Kind::User(name.into(), Box::new(inner)))
    }

    /// Attaches an explicit default value, which must be valid for `self`.
    pub fn with_default(mut self, default: impl Into<Value>) -> Result<Self, SchemaError> {
        let default = default.into();
        self.default = None;
        self.validate(&default)
            .map_err(|err| SchemaError::InvalidDefault(Box::new(err)))?;
        self.default = Some(Box::new(default));
        Ok(self)
    }

    #[must_use]
    pub const fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Follows user-type aliases down to the first non-alias node.
    #[must_use]
    pub fn resolved(&self) -> &TypeNode {
        match &self.kind {
            Kind::User(_, inner) => inner.resolved(),
            _ => self,
        }
    }

    /// Returns the explicit default value, if one was attached.
    #[must_use]
    pub fn explicit_default(&self) -> Option<&Value> {
        self.default.as_deref()
    }

    /// Value used for this type when none is supplied.
    ///
    /// This is the explicit default if one was attached, and otherwise the
    /// zero value of the type: `0`, `0.0`, `false`, empty strings, data and
    /// collections, zero-filled fixed data, `Void` for optionals, the
    /// element default repeated for fixed arrays, the first member of a
    /// union, the first declared value of an enum, and field-wise defaults
    /// for structs.
    #[must_use]
    pub fn default_value(&self) -> Value {
        if let Some(default) = &self.default {
            return default.as_ref().clone();
        }
        match &self.kind {
            Kind::UInt
            | Kind::Int
            | Kind::U8
            | Kind::U16
            | Kind::U32
            | Kind::U64
            | Kind::I8
            | Kind::I16
            | Kind::I32
            | Kind::I64 => Value::Int(0),
            Kind::F32 | Kind::F64 => Value::Float(0.0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::new()),
            Kind::Data => Value::Data(Vec::new()),
            Kind::DataFixed(len) => Value::Data(vec![0; *len]),
            Kind::Void | Kind::Optional(_) => Value::Void,
            Kind::Array(_) => Value::Array(Vec::new()),
            Kind::ArrayFixed(elem, len) => Value::Array(vec![elem.default_value(); *len]),
            Kind::Map(..) => Value::Map(Default::default()),
            Kind::Union(members) => members
                .first()
                .map_or(Value::Void, |m| Value::tagged(0, m.default_value())),
            Kind::Struct(schema) => Value::Struct(schema.default_value()),
            Kind::Enum(schema) => Value::Int(i128::from(schema.first_value())),
            Kind::User(_, inner) => inner.default_value(),
        }
    }

    /// Converts `value` into plain JSON-compatible data, as
    /// [`Value::to_dict`] does, but with the shape of `self` in hand.
    ///
    /// Struct fields come out in declaration order rather than the order
    /// they were set in, with any undeclared fields after them.
    #[must_use]
    pub fn to_dict(&self, value: &Value) -> serde_json::Value {
        use serde_json::Value as Json;

        match (self.resolved().kind(), value) {
            (Kind::Optional(inner), v) if !v.is_void() => inner.to_dict(v),
            (Kind::Array(elem) | Kind::ArrayFixed(elem, _), Value::Array(items)) => {
                Json::Array(items.iter().map(|v| elem.to_dict(v)).collect())
            }
            (Kind::Map(_, val), Value::Map(entries)) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.key_string(), val.to_dict(v)))
                    .collect(),
            ),
            (Kind::Union(members), v) => match resolve_member(members, v) {
                Some((tag, payload)) => members[tag].to_dict(payload),
                None => v.to_dict(),
            },
            (Kind::Struct(schema), Value::Struct(fields)) => {
                let mut obj = serde_json::Map::with_capacity(fields.len());
                for field in schema.fields() {
                    if let Some(v) = fields.get(&field.name) {
                        obj.insert(field.name.clone(), field.node.to_dict(v));
                    }
                }
                for (name, v) in fields.iter() {
                    if schema.field(name).is_none() {
                        obj.insert(name.to_owned(), v.to_dict());
                    }
                }
                Json::Object(obj)
            }
            (_, v) => v.to_dict(),
        }
    }
}

impl Display for TypeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            Kind::DataFixed(len) => write!(f, "Data<{len}>"),
            Kind::Optional(inner) => write!(f, "Optional<{inner}>"),
            Kind::Array(elem) => write!(f, "[]{elem}"),
            Kind::ArrayFixed(elem, len) => write!(f, "[{len}]{elem}"),
            Kind::Map(key, val) => write!(f, "Map[{key}]{val}"),
            Kind::Union(members) => {
                f.write_str("(")?;
                for (ix, member) in members.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(" | ")?;
                    }
                    Display::fmt(member, f)?;
                }
                f.write_str(")")
            }
            Kind::Struct(schema) => f.write_str(&schema.name),
            Kind::Enum(schema) => f.write_str(&schema.name),
            Kind::User(name, _) => f.write_str(name),
            other => f.write_str(other.name()),
        }
    }
}

/// Declared field of a struct type
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub node: TypeNode,
}

/// Named, ordered, non-empty collection of uniquely-named fields.
#[derive(Clone, Debug, PartialEq)]
pub struct StructSchema {
    name: String,
    fields: Vec<Field>,
}

impl StructSchema {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, TypeNode)>,
        S: Into<String>,
    {
        let name = name.into();
        let mut decl: Vec<Field> = Vec::new();
        for (field, node) in fields {
            let field = field.into();
            if decl.iter().any(|f| f.name == field) {
                return Err(SchemaError::DuplicateField { name, field });
            }
            decl.push(Field { name: field, node });
        }
        if decl.is_empty() {
            return Err(SchemaError::EmptyStruct { name });
        }
        Ok(Self { name, fields: decl })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&TypeNode> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.node)
    }

    /// Struct value with every field set to its default.
    #[must_use]
    pub fn default_value(&self) -> StructValue {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.node.default_value()))
            .collect()
    }

    fn reject(&self, path: Path, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(path, &self.name, kind)
    }

    /// Builds a struct value from field defaults, replacing those named in
    /// `overrides` after validating them.
    pub fn instantiate<I, S>(&self, overrides: I) -> Result<Value, ValidationError>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut ret = self.default_value();
        for (name, val) in overrides {
            let name = name.into();
            self.set(&mut ret, &name, val)?;
        }
        Ok(Value::Struct(ret))
    }

    /// Validates `val` against the declared type of field `name` and stores
    /// it in `target`, which is left untouched on error.
    pub fn set(
        &self,
        target: &mut StructValue,
        name: &str,
        val: impl Into<Value>,
    ) -> Result<(), ValidationError> {
        let val = val.into();
        let node = self.field(name).ok_or_else(|| {
            self.reject(
                Path::root(),
                ValidationErrorKind::UnknownField(name.to_owned()),
            )
        })?;
        let mut path = Path::root();
        path.push(PathSegment::Field(name.to_owned()));
        validate::validate_at(node, &val, &mut path)?;
        target.insert(name, val);
        Ok(())
    }
}

/// Declared member of an enum type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: u64,
}

/// Named, non-empty set of distinct unsigned values, each with a display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumSchema {
    name: String,
    members: Vec<EnumMember>,
}

impl EnumSchema {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let name = name.into();
        let mut decl: Vec<EnumMember> = Vec::new();
        for (member, value) in members {
            let member = member.into();
            if decl.iter().any(|m| m.name == member || m.value == value) {
                return Err(SchemaError::DuplicateEnumValue {
                    name,
                    member,
                    value,
                });
            }
            decl.push(EnumMember {
                name: member,
                value,
            });
        }
        if decl.is_empty() {
            return Err(SchemaError::EmptyEnum { name });
        }
        Ok(Self {
            name,
            members: decl,
        })
    }

    /// Enum whose members are named after their values.
    pub fn from_values(
        name: impl Into<String>,
        values: impl IntoIterator<Item = u64>,
    ) -> Result<Self, SchemaError> {
        Self::new(name, values.into_iter().map(|v| (v.to_string(), v)))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.members.iter().map(|m| m.value)
    }

    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        self.members.iter().any(|m| m.value == value)
    }

    #[must_use]
    pub fn name_of(&self, value: u64) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.value == value)
            .map(|m| m.name.as_str())
    }

    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<u64> {
        self.members.iter().find(|m| m.name == name).map(|m| m.value)
    }

    fn first_value(&self) -> u64 {
        self.members.first().map_or(0, |m| m.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn color() -> EnumSchema {
        EnumSchema::new("Color", [("Red", 0), ("Green", 1), ("Blue", 4)]).unwrap()
    }

    #[test]
    fn rejected_declarations() {
        assert_eq!(
            TypeNode::data_fixed(0),
            Err(SchemaError::ZeroLength {
                bare_type: "DataFixed"
            })
        );
        assert_eq!(TypeNode::union([]), Err(SchemaError::EmptyUnion));
        assert!(matches!(
            EnumSchema::new("E", Vec::<(&str, u64)>::new()),
            Err(SchemaError::EmptyEnum { .. })
        ));
        assert!(matches!(
            EnumSchema::new("E", [("A", 1), ("B", 1)]),
            Err(SchemaError::DuplicateEnumValue { value: 1, .. })
        ));
        assert!(matches!(
            StructSchema::new("S", Vec::<(&str, TypeNode)>::new()),
            Err(SchemaError::EmptyStruct { .. })
        ));
        assert!(matches!(
            StructSchema::new("S", [("a", TypeNode::u8()), ("a", TypeNode::u16())]),
            Err(SchemaError::DuplicateField { .. })
        ));
    }

    #[test]
    fn display() {
        let node = TypeNode::map(
            TypeNode::string(),
            TypeNode::union([
                TypeNode::optional(TypeNode::u32()),
                TypeNode::array(TypeNode::u8(), 3),
                TypeNode::array(TypeNode::data_fixed(4).unwrap(), 0),
            ])
            .unwrap(),
        );
        assert_eq!(
            node.to_string(),
            "Map[String](Optional<U32> | [3]U8 | []Data<4>)"
        );
        assert_eq!(TypeNode::enumeration(color()).to_string(), "Color");
        assert_eq!(TypeNode::user("Id", TypeNode::uint()).to_string(), "Id");
    }

    #[test]
    fn defaults() {
        assert_eq!(TypeNode::u64().default_value(), Value::Int(0));
        assert_eq!(TypeNode::f32().default_value(), Value::Float(0.0));
        assert_eq!(TypeNode::optional(TypeNode::u8()).default_value(), Value::Void);
        assert_eq!(
            TypeNode::data_fixed(2).unwrap().default_value(),
            Value::data(vec![0, 0])
        );
        assert_eq!(
            TypeNode::array(TypeNode::bool(), 2).default_value(),
            Value::Array(vec![false.into(), false.into()])
        );
        assert_eq!(
            TypeNode::union([TypeNode::string(), TypeNode::u8()])
                .unwrap()
                .default_value(),
            Value::tagged(0, "")
        );
        assert_eq!(TypeNode::enumeration(color()).default_value(), Value::Int(0));
        assert_eq!(
            TypeNode::user("Flag", TypeNode::bool()).default_value(),
            Value::Bool(false)
        );
    }

    #[test]
    fn explicit_default() {
        let node = TypeNode::u8().with_default(7).unwrap();
        assert_eq!(node.default_value(), Value::Int(7));
        assert!(matches!(
            TypeNode::u8().with_default(256),
            Err(SchemaError::InvalidDefault(_))
        ));
        assert!(TypeNode::u8().with_default("x").is_err());
    }

    #[test]
    fn instantiate_struct() {
        let schema = StructSchema::new(
            "S",
            [
                ("a", TypeNode::u8()),
                ("b", TypeNode::string().with_default("dflt").unwrap()),
            ],
        )
        .unwrap();
        let val = schema.instantiate([("a", Value::Int(4))]).unwrap();
        assert_eq!(
            val,
            Value::Struct(StructValue::new().with("a", 4).with("b", "dflt"))
        );

        let err = schema.instantiate([("c", Value::Int(1))]).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownField("c".into()));

        let err = schema.instantiate([("a", Value::Int(-1))]).unwrap_err();
        assert_eq!(err.path.to_string(), "$.a");

        let mut target = schema.default_value();
        assert!(schema.set(&mut target, "a", 300).is_err());
        assert_eq!(target.get("a"), Some(&Value::Int(0)));
        schema.set(&mut target, "a", 255).unwrap();
        assert_eq!(target.get("a"), Some(&Value::Int(255)));
    }

    #[test]
    fn to_dict_declaration_order() {
        let inner =
            StructSchema::new("In", [("y", TypeNode::u8()), ("x", TypeNode::u8())]).unwrap();
        let outer = TypeNode::structure(
            StructSchema::new(
                "Out",
                [
                    ("z", TypeNode::optional(TypeNode::structure(inner))),
                    ("a", TypeNode::bool()),
                ],
            )
            .unwrap(),
        );
        let value = Value::Struct(
            StructValue::new()
                .with("a", true)
                .with("z", StructValue::new().with("x", 1).with("y", 2)),
        );
        assert_eq!(
            serde_json::to_string(&outer.to_dict(&value)).unwrap(),
            r#"{"z":{"y":2,"x":1},"a":true}"#
        );
        assert_eq!(
            serde_json::to_string(&value.to_dict()).unwrap(),
            r#"{"a":true,"z":{"x":1,"y":2}}"#
        );
    }

    #[test]
    fn shareable() {
        fn dummy<T: Send + Sync>() {}
        dummy::<TypeNode>();
        dummy::<Value>();
    }

    #[test]
    fn enum_lookup() {
        let c = color();
        assert!(c.contains(4));
        assert!(!c.contains(2));
        assert_eq!(c.name_of(1), Some("Green"));
        assert_eq!(c.value_of("Blue"), Some(4));
        assert_eq!(c.values().collect::<Vec<_>>(), vec![0, 1, 4]);
    }
}
