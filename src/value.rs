//! Dynamic values of BARE types
//!
//! A [`Value`] is the in-memory form of a message described by a
//! [`TypeNode`](crate::schema::TypeNode). Values carry no reference to the type
//! they are meant for: the same `Value::Int(5)` is a valid `U8`, `I64` or
//! `UInt`, and it is only checked against a type when it is validated, packed,
//! or inserted into one of the validated collections defined here.
//!
//! Correspondence with BARE types:
//!
//! | BARE type                              | `Value`                 |
//! |----------------------------------------|-------------------------|
//! | `UInt`, `Int`, `U8`..`I64`, enums      | `Int`                   |
//! | `F32`, `F64`                           | `Float`                 |
//! | `Bool`                                 | `Bool`                  |
//! | `String`                               | `String`                |
//! | `Data`, `Data<N>`                      | `Data`                  |
//! | `Void`, absent `Optional`              | `Void`                  |
//! | present `Optional<T>`                  | the `T` value itself    |
//! | `[]T`, `[N]T`                          | `Array`                 |
//! | `Map[K]V`                              | `Map`                   |
//! | union                                  | `Union`, or any value one member accepts |
//! | struct                                 | `Struct`                |

use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::{LengthError, Path, PathSegment, SchemaError, ValidationError, ValidationErrorKind};
use crate::hexstring::util::hex_of_bytes;
use crate::schema::validate::validate_at;
use crate::schema::{Kind, TypeNode};

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Void,
    Bool(bool),
    Int(i128),
    Float(f64),
    String(String),
    Data(Vec<u8>),
    Array(Vec<Value>),
    Map(MapValue),
    Union(UnionValue),
    Struct(StructValue),
}

impl Value {
    /// Constructs a union value explicitly tagged with the index of the
    /// member it belongs to.
    pub fn tagged(tag: usize, value: impl Into<Value>) -> Self {
        Value::Union(UnionValue {
            tag,
            value: Box::new(value.into()),
        })
    }

    pub fn data(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Data(bytes.into())
    }

    /// Name of the variant, used in validation errors
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Data(_) => "data",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Union(_) => "union",
            Value::Struct(_) => "struct",
        }
    }

    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(d) => Some(d.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_union(&self) -> Option<&UnionValue> {
        match self {
            Value::Union(u) => Some(u),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Strips any number of explicit union tags, returning the innermost payload.
    #[must_use]
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Union(u) => u.value.untagged(),
            other => other,
        }
    }

    /// Recursively converts `self` into plain JSON-compatible data.
    ///
    /// Structs and maps become objects (map keys are stringified through
    /// [`Display`], strings without quotes), unions are replaced by their
    /// payload, data becomes an array of byte values, and `Void` becomes
    /// `null`. Integers outside of the 64-bit range, and non-finite floats,
    /// are rendered as strings.
    ///
    /// Struct fields appear in the order they were set; use
    /// [`TypeNode::to_dict`] to order them as declared.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Void => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => {
                if let Ok(i) = i64::try_from(*i) {
                    Json::from(i)
                } else if let Ok(u) = u64::try_from(*i) {
                    Json::from(u)
                } else {
                    Json::String(i.to_string())
                }
            }
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or_else(|| Json::String(f.to_string()), Json::Number),
            Value::String(s) => Json::String(s.clone()),
            Value::Data(d) => Json::Array(d.iter().map(|&b| Json::from(b)).collect()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_dict).collect()),
            Value::Map(m) => Json::Object(
                m.iter()
                    .map(|(k, v)| (k.key_string(), v.to_dict()))
                    .collect(),
            ),
            Value::Union(u) => u.value.to_dict(),
            Value::Struct(s) => Json::Object(
                s.iter()
                    .map(|(name, v)| (name.to_owned(), v.to_dict()))
                    .collect(),
            ),
        }
    }

    pub(crate) fn key_string(&self) -> String {
        match self.untagged() {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Hashes consistently with `PartialEq`: `0.0` and `-0.0` hash alike, and
/// maps and structs, whose equality ignores order, hash only their length.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Void => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(x) => {
                let x = if *x == 0.0 { 0.0 } else { *x };
                x.to_bits().hash(state)
            }
            Value::String(s) => s.hash(state),
            Value::Data(d) => d.hash(state),
            Value::Array(items) => items.hash(state),
            Value::Map(m) => m.len().hash(state),
            Value::Union(u) => {
                u.tag.hash(state);
                u.value.hash(state)
            }
            Value::Struct(s) => s.len().hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Void => f.write_str("void"),
            Value::Bool(b) => Display::fmt(b, f),
            Value::Int(i) => Display::fmt(i, f),
            Value::Float(x) => Display::fmt(x, f),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Data(d) => write!(f, "0x{}", hex_of_bytes(d)),
            Value::Array(items) => {
                f.write_str("[")?;
                for (ix, item) in items.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (ix, (k, v)) in m.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Union(u) => write!(f, "<{}>{}", u.tag, u.value),
            Value::Struct(s) => {
                f.write_str("{")?;
                for (ix, (name, v)) in s.iter().enumerate() {
                    if ix > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_int {
    ( $( $t:ty ),+ ) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Int(i128::from(i))
                }
            }
        )+
    };
}

impl_from_int!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Void
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Void, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<MapValue> for Value {
    fn from(m: MapValue) -> Self {
        Value::Map(m)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self {
        Value::Struct(s)
    }
}

impl From<UnionValue> for Value {
    fn from(u: UnionValue) -> Self {
        Value::Union(u)
    }
}

/// Union value tagged with the index of the member it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionValue {
    pub tag: usize,
    pub value: Box<Value>,
}

/// Opaque key of a [`MapValue`] entry, hashed consistently with `Value`
/// equality.
#[derive(Clone, Debug)]
pub struct MapKey(Value);

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

// Float keys compare with `==`, so a NaN key is never found again.
impl Eq for MapKey {}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl indexmap::Equivalent<MapKey> for Value {
    fn equivalent(&self, key: &MapKey) -> bool {
        *self == key.0
    }
}

/// Insertion-ordered map with unique keys.
///
/// Equality disregards ordering.
#[derive(Clone, Debug, Default)]
pub struct MapValue {
    entries: IndexMap<MapKey, Value>,
}

impl MapValue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(n),
        }
    }

    /// Inserts a key-value pair.
    ///
    /// If the key is already present, its value is replaced in place and the
    /// previous value is returned.
    pub fn insert(&mut self, key: impl Into<Value>, val: impl Into<Value>) -> Option<Value> {
        self.entries.insert(MapKey(key.into()), val.into())
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes an entry, preserving the order of the others.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for MapValue {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut ret = MapValue::new();
        for (k, v) in iter {
            ret.insert(k, v);
        }
        ret
    }
}

/// Named fields of a struct value, in the order they were set.
///
/// Equality disregards ordering.
#[derive(Clone, Debug, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style [`insert`](StructValue::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, val: impl Into<Value>) -> Self {
        self.insert(name, val);
        self
    }

    /// Sets a field without validation, returning its previous value.
    ///
    /// Use [`StructSchema::set`](crate::schema::StructSchema::set) to check
    /// the value against the field's declared type first.
    pub fn insert(&mut self, name: impl Into<String>, val: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let val = val.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, val)),
            None => {
                self.fields.push((name, val));
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let ix = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(ix).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(n, v)| other.get(n) == Some(v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StructValue {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut ret = StructValue::new();
        for (k, v) in iter {
            ret.insert(k, v);
        }
        ret
    }
}

/// Array value bound to an `Array` or `ArrayFixed` type, whose every
/// mutation is validated before it is applied.
#[derive(Clone, Debug)]
pub struct ValidatedArray<'s> {
    node: &'s TypeNode,
    elem: &'s TypeNode,
    limit: Option<usize>,
    items: Vec<Value>,
}

impl<'s> ValidatedArray<'s> {
    /// Creates an empty array bound to `node`, which must be an array type
    /// (possibly behind user-type aliases).
    pub fn new(node: &'s TypeNode) -> Result<Self, SchemaError> {
        let (elem, limit) = match node.resolved().kind() {
            Kind::Array(elem) => (elem.as_ref(), None),
            Kind::ArrayFixed(elem, len) => (elem.as_ref(), Some(*len)),
            _ => {
                return Err(SchemaError::NotACollection {
                    declared: node.to_string(),
                })
            }
        };
        Ok(Self {
            node,
            elem,
            limit,
            items: Vec::new(),
        })
    }

    fn check_capacity(&self, extra: usize) -> Result<(), ValidationError> {
        match self.limit {
            Some(limit) if self.items.len() + extra > limit => Err(ValidationError::new(
                Path::root(),
                self.node,
                ValidationErrorKind::Length(LengthError::TooLong {
                    limit,
                    actual: self.items.len() + extra,
                }),
            )),
            _ => Ok(()),
        }
    }

    fn check_elem(&self, index: usize, val: &Value) -> Result<(), ValidationError> {
        let mut path = Path::root();
        path.push(PathSegment::Index(index));
        validate_at(self.elem, val, &mut path)
    }

    /// Appends a value, leaving `self` unchanged if it is rejected.
    pub fn push(&mut self, val: impl Into<Value>) -> Result<(), ValidationError> {
        let val = val.into();
        self.check_capacity(1)?;
        self.check_elem(self.items.len(), &val)?;
        self.items.push(val);
        Ok(())
    }

    /// Appends every value of `iter`, or none of them if any is rejected.
    pub fn extend<I, T>(&mut self, iter: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let new: Vec<Value> = iter.into_iter().map(Into::into).collect();
        self.check_capacity(new.len())?;
        for (ix, val) in new.iter().enumerate() {
            self.check_elem(self.items.len() + ix, val)?;
        }
        self.items.extend(new);
        Ok(())
    }

    /// Replaces the value at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, val: impl Into<Value>) -> Result<Value, ValidationError> {
        let val = val.into();
        if index >= self.items.len() {
            return Err(ValidationError::new(
                Path::root(),
                self.node,
                ValidationErrorKind::Length(LengthError::NoSuchIndex {
                    index,
                    len: self.items.len(),
                }),
            ));
        }
        self.check_elem(index, &val)?;
        Ok(std::mem::replace(&mut self.items[index], val))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Array(self.items)
    }
}

/// Map value bound to a `Map` type, whose every mutation is validated
/// before it is applied.
#[derive(Clone, Debug)]
pub struct ValidatedMap<'s> {
    key: &'s TypeNode,
    val: &'s TypeNode,
    entries: MapValue,
}

impl<'s> ValidatedMap<'s> {
    pub fn new(node: &'s TypeNode) -> Result<Self, SchemaError> {
        match node.resolved().kind() {
            Kind::Map(key, val) => Ok(Self {
                key,
                val,
                entries: MapValue::new(),
            }),
            _ => Err(SchemaError::NotACollection {
                declared: node.to_string(),
            }),
        }
    }

    fn check_entry(&self, key: &Value, val: &Value) -> Result<(), ValidationError> {
        let mut path = Path::root();
        path.push(PathSegment::Key(key.to_string()));
        validate_at(self.key, key, &mut path)?;
        validate_at(self.val, val, &mut path)
    }

    /// Inserts or replaces an entry, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<Value>,
        val: impl Into<Value>,
    ) -> Result<Option<Value>, ValidationError> {
        let key = key.into();
        let val = val.into();
        self.check_entry(&key, &val)?;
        Ok(self.entries.insert(key, val))
    }

    /// Inserts every entry of `iter`, or none of them if any is rejected.
    pub fn update<I, K, V>(&mut self, iter: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let new: Vec<(Value, Value)> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for (k, v) in new.iter() {
            self.check_entry(k, v)?;
        }
        for (k, v) in new {
            self.entries.insert(k, v);
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(self.entries)
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Void => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i128(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Data(d) => serializer.serialize_bytes(d),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Union(u) => u.value.serialize(serializer),
            Value::Struct(s) => {
                let mut map = serializer.serialize_map(Some(s.len()))?;
                for (name, v) in s.iter() {
                    map.serialize_entry(name, v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::TypeNode;

    #[test]
    fn map_replaces_in_place() {
        let mut m = MapValue::new();
        assert_eq!(m.insert("a", 1), None);
        assert_eq!(m.insert("b", 2), None);
        assert_eq!(m.insert("a", 3), Some(Value::Int(1)));
        let keys: Vec<_> = m.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(m.get(&"a".into()), Some(&Value::Int(3)));
    }

    #[test]
    fn map_keys_by_value() {
        let mut m = MapValue::new();
        m.insert(0.0, "zero");
        assert_eq!(m.insert(-0.0, "neg"), Some(Value::from("zero")));
        let k1: StructValue = [("x", 1), ("y", 2)].into_iter().collect();
        let k2: StructValue = [("y", 2), ("x", 1)].into_iter().collect();
        m.insert(k1, 1);
        assert!(m.contains_key(&Value::Struct(k2)));
        m.insert(Value::tagged(1, "t"), 2);
        assert!(!m.contains_key(&Value::tagged(0, "t")));
        assert_eq!(m.len(), 3);
        assert_eq!(m.remove(&Value::Float(0.0)), Some(Value::from("neg")));
        assert_eq!(m.iter().next().map(|(_, v)| v), Some(&Value::Int(1)));
    }

    #[test]
    fn unordered_equality() {
        let a: StructValue = [("x", 1), ("y", 2)].into_iter().collect();
        let b: StructValue = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
        let m1: MapValue = [(1, "a"), (2, "b")].into_iter().collect();
        let m2: MapValue = [(2, "b"), (1, "a")].into_iter().collect();
        assert_eq!(m1, m2);
        assert_ne!(m1, MapValue::new());
    }

    #[test]
    fn validated_array_fixed() {
        let node = TypeNode::array(TypeNode::u8(), 3);
        let mut arr = ValidatedArray::new(&node).unwrap();
        arr.extend([1, 2, 3]).unwrap();
        let err = arr.push(4).unwrap_err();
        assert_eq!(
            err.kind,
            ValidationErrorKind::Length(LengthError::TooLong { limit: 3, actual: 4 })
        );
        assert_eq!(arr.len(), 3);
        assert!(arr.set(0, 256).is_err());
        assert!(arr.set(5, 1).is_err());
        assert_eq!(arr.set(0, 9), Ok(Value::Int(1)));
        assert_eq!(arr.into_value(), Value::from(vec![9.into(), 2.into(), 3.into()]));
    }

    #[test]
    fn validated_array_extend_atomic() {
        let node = TypeNode::array(TypeNode::string(), 0);
        let mut arr = ValidatedArray::new(&node).unwrap();
        arr.push("a").unwrap();
        let err = arr
            .extend(vec![Value::from("b"), Value::from(3)])
            .unwrap_err();
        assert_eq!(err.path.to_string(), "$[2]");
        assert_eq!(arr.len(), 1);
        assert!(ValidatedArray::new(&TypeNode::u8()).is_err());
    }

    #[test]
    fn validated_map() {
        let node = TypeNode::map(TypeNode::string(), TypeNode::u8());
        let mut m = ValidatedMap::new(&node).unwrap();
        assert_eq!(m.insert("a", 1), Ok(None));
        let err = m.insert("b", 300).unwrap_err();
        assert_eq!(err.path.to_string(), "${\"b\"}");
        assert!(m.insert(5, 1).is_err());
        assert!(m.update([("c", 1), ("d", 999)]).is_err());
        assert_eq!(m.len(), 1);
        m.update([("c", 1), ("a", 7)]).unwrap();
        assert_eq!(m.get(&"a".into()), Some(&Value::Int(7)));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn to_dict_flattens() {
        let inner: StructValue = [("n", Value::Int(1))].into_iter().collect();
        let mut m = MapValue::new();
        m.insert(1, Value::tagged(1, "x"));
        let v = Value::Struct(
            StructValue::new()
                .with("inner", inner)
                .with("map", m)
                .with("data", Value::data(vec![1u8, 2]))
                .with("none", Value::Void),
        );
        assert_eq!(
            v.to_dict(),
            serde_json::json!({
                "inner": { "n": 1 },
                "map": { "1": "x" },
                "data": [1, 2],
                "none": null,
            })
        );
    }
}
