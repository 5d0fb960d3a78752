//! Schema-driven transcoding of dynamic values
//!
//! [`TypeNode::pack`] validates a [`Value`] and writes its BARE encoding;
//! [`TypeNode::unpack`] reads one value of the node's type back. Both walk the
//! type tree depth-first, with the same wire layout as the statically-typed
//! [`Encode`](crate::Encode) and [`Decode`](crate::Decode) implementations,
//! which are reused for the leaves.

use std::io::{Read, Write};

use crate::conv::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::conv::target::{ByteCounter, Target};
use crate::conv::{Decode, Encode};
use crate::error::{Path, PathSegment, ValidationError, ValidationErrorKind};
use crate::parse::error::{ParseResult, TagError, TokenError};
use crate::parse::{Parser, ReadParser, TryIntoParser, MAX_PREALLOC};
use crate::value::{MapValue, StructValue, UnionValue, Value};
use crate::varint::{read_int, read_length, read_uint, write_int, write_uint};

use super::validate::resolve_member;
use super::{Kind, TypeNode};

impl TypeNode {
    /// Validates `value` and returns its BARE encoding.
    ///
    /// # Errors
    ///
    /// Fails with [`EncodeError::Invalid`] if the value does not conform to
    /// `self`, or [`EncodeError::UnresolvedUnion`] if no member of some union
    /// accepts the value given for it.
    pub fn pack(&self, value: &Value) -> EncodeResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.checked_emit(value, &mut buf)?;
        Ok(buf)
    }

    /// Validates `value` and appends its BARE encoding to `buf`, returning
    /// the number of bytes written.
    ///
    /// Nothing is written unless the whole value is encoded successfully.
    pub fn write_to<U: Target>(&self, value: &Value, buf: &mut U) -> EncodeResult<usize> {
        let bytes = self.pack(value)?;
        Ok(buf.push_all(&bytes) + buf.resolve_zero())
    }

    /// Validates `value` and writes its BARE encoding to an output stream.
    pub fn pack_into<W: Write>(&self, value: &Value, mut out: W) -> EncodeResult<usize> {
        let bytes = self.pack(value)?;
        out.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Number of bytes [`pack`](TypeNode::pack) would produce for `value`.
    pub fn encoded_len(&self, value: &Value) -> EncodeResult<usize> {
        self.checked_emit(value, &mut ByteCounter::create())
    }

    fn checked_emit<U: Target>(&self, value: &Value, buf: &mut U) -> EncodeResult<usize> {
        self.validate(value)?;
        let ret = emit(self, value, buf);
        match &ret {
            Ok(len) => tracing::trace!(bare_type = %self, len, "packed value"),
            Err(err) => tracing::debug!(bare_type = %self, %err, "pack failed"),
        }
        ret
    }

    /// Decodes one value of type `self` from any input convertible into a
    /// [`ByteParser`](crate::parse::ByteParser).
    ///
    /// Union values are always produced in tagged form
    /// ([`Value::Union`]), so that re-packing selects the same member.
    ///
    /// If the feature-flag `check_complete_parse` is enabled, it is an error
    /// for any bytes to remain in the input after the value has been parsed.
    pub fn unpack<U: TryIntoParser>(&self, input: U) -> DecodeResult<Value> {
        let mut p = input.try_into_parser()?;
        let ret = self.parse(&mut p)?;
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

    /// Decodes one value of type `self` from an input stream, reading no
    /// further than the end of that value.
    pub fn unpack_from<R: Read>(&self, input: R) -> DecodeResult<Value> {
        let mut p = ReadParser::new(input);
        self.parse(&mut p)
    }

    /// Decodes one value of type `self` from the current position of `p`.
    ///
    /// On failure, the error records the path within the value being decoded
    /// and the offset into `p` at which decoding stopped.
    pub fn parse<P: Parser>(&self, p: &mut P) -> DecodeResult<Value> {
        let start = p.offset();
        let mut path = Path::root();
        match read(self, p, &mut path) {
            Ok(value) => {
                tracing::trace!(bare_type = %self, len = p.offset() - start, "unpacked value");
                Ok(value)
            }
            Err(error) => {
                let err = DecodeError::At {
                    path,
                    offset: p.offset(),
                    error,
                };
                tracing::debug!(bare_type = %self, %err, "unpack failed");
                Err(err)
            }
        }
    }
}

fn unexpected(node: &TypeNode, value: &Value) -> EncodeError {
    EncodeError::Invalid(ValidationError::new(
        Path::root(),
        node,
        ValidationErrorKind::TypeMismatch {
            found: value.kind_name(),
        },
    ))
}

fn narrow<T: TryFrom<i128>>(value: i128, bare_type: &'static str) -> EncodeResult<T> {
    T::try_from(value).map_err(|_| EncodeError::Overflow { value, bare_type })
}

/// Writes a value already validated against `node`.
fn emit<U: Target>(node: &TypeNode, value: &Value, buf: &mut U) -> EncodeResult<usize> {
    let kind = node.kind();
    let ret = match (kind, value) {
        (Kind::UInt | Kind::Enum(_), Value::Int(i)) => write_uint(buf, narrow(*i, kind.name())?),
        (Kind::Int, Value::Int(i)) => write_int(buf, narrow(*i, kind.name())?),
        (Kind::U8, Value::Int(i)) => narrow::<u8>(*i, "U8")?.write_to(buf),
        (Kind::U16, Value::Int(i)) => narrow::<u16>(*i, "U16")?.write_to(buf),
        (Kind::U32, Value::Int(i)) => narrow::<u32>(*i, "U32")?.write_to(buf),
        (Kind::U64, Value::Int(i)) => narrow::<u64>(*i, "U64")?.write_to(buf),
        (Kind::I8, Value::Int(i)) => narrow::<i8>(*i, "I8")?.write_to(buf),
        (Kind::I16, Value::Int(i)) => narrow::<i16>(*i, "I16")?.write_to(buf),
        (Kind::I32, Value::Int(i)) => narrow::<i32>(*i, "I32")?.write_to(buf),
        (Kind::I64, Value::Int(i)) => narrow::<i64>(*i, "I64")?.write_to(buf),
        (Kind::F32, Value::Float(x)) => (*x as f32).write_to(buf),
        (Kind::F64, Value::Float(x)) => x.write_to(buf),
        (Kind::Bool, Value::Bool(b)) => b.write_to(buf),
        (Kind::Void, Value::Void) => buf.resolve_zero(),
        (Kind::String, Value::String(s)) => s.write_to(buf),
        (Kind::Data, Value::Data(bytes)) => buf.push_prefixed(bytes) + buf.resolve_zero(),
        (Kind::DataFixed(_), Value::Data(bytes)) => buf.push_all(bytes) + buf.resolve_zero(),
        (Kind::Optional(_), Value::Void) => buf.push_one(0x00) + buf.resolve_zero(),
        (Kind::Optional(inner), other) => buf.push_one(0x01) + emit(inner, other, buf)?,
        (Kind::Array(elem), Value::Array(items)) => {
            let mut len = write_uint(buf, items.len() as u64);
            for item in items {
                len += emit(elem, item, buf)?;
            }
            len
        }
        (Kind::ArrayFixed(elem, n), Value::Array(items)) => {
            let mut len = 0;
            for item in items {
                len += emit(elem, item, buf)?;
            }
            if items.len() < *n {
                let pad = elem.default_value();
                for _ in items.len()..*n {
                    len += emit(elem, &pad, buf)?;
                }
            }
            len
        }
        (Kind::Map(key_node, val_node), Value::Map(entries)) => {
            let mut len = write_uint(buf, entries.len() as u64);
            for (key, val) in entries.iter() {
                len += emit(key_node, key, buf)?;
                len += emit(val_node, val, buf)?;
            }
            len
        }
        (Kind::Union(members), other) => {
            let (tag, payload) =
                resolve_member(members, other).ok_or_else(|| EncodeError::UnresolvedUnion {
                    path: Path::root(),
                    expected: node.to_string(),
                })?;
            write_uint(buf, tag as u64) + emit(&members[tag], payload, buf)?
        }
        (Kind::Struct(schema), Value::Struct(fields)) => {
            let mut len = 0;
            for field in schema.fields() {
                let val = fields.get(&field.name).ok_or_else(|| {
                    EncodeError::Invalid(ValidationError::new(
                        Path::root(),
                        node,
                        ValidationErrorKind::MissingField(field.name.clone()),
                    ))
                })?;
                len += emit(&field.node, val, buf)?;
            }
            len
        }
        (Kind::User(_, inner), other) => emit(inner, other, buf)?,
        (_, other) => return Err(unexpected(node, other)),
    };
    Ok(ret)
}

/// Reads one value of type `node`, keeping `path` at the location of the
/// value being read so that it identifies the failure site on error.
fn read<P: Parser>(node: &TypeNode, p: &mut P, path: &mut Path) -> ParseResult<Value> {
    let ret = match node.kind() {
        Kind::UInt => Value::Int(read_uint(p)?.into()),
        Kind::Int => Value::Int(read_int(p)?.into()),
        Kind::U8 => Value::Int(p.take_u8()?.into()),
        Kind::U16 => Value::Int(p.take_u16()?.into()),
        Kind::U32 => Value::Int(p.take_u32()?.into()),
        Kind::U64 => Value::Int(p.take_u64()?.into()),
        Kind::I8 => Value::Int(p.take_i8()?.into()),
        Kind::I16 => Value::Int(p.take_i16()?.into()),
        Kind::I32 => Value::Int(p.take_i32()?.into()),
        Kind::I64 => Value::Int(p.take_i64()?.into()),
        Kind::F32 => Value::Float(p.take_f32()?.into()),
        Kind::F64 => Value::Float(p.take_f64()?),
        Kind::Bool => Value::Bool(p.take_bool()?),
        Kind::Void => Value::Void,
        Kind::String => Value::String(String::parse(p)?),
        Kind::Data => {
            let len = read_length(p)?;
            Value::Data(p.take_dynamic(len)?)
        }
        Kind::DataFixed(len) => Value::Data(p.take_dynamic(*len)?),
        Kind::Optional(inner) => {
            if p.take_presence()? {
                read(inner, p, path)?
            } else {
                Value::Void
            }
        }
        Kind::Array(elem) => {
            let len = read_length(p)?;
            Value::Array(read_items(elem, len, p, path)?)
        }
        Kind::ArrayFixed(elem, len) => Value::Array(read_items(elem, *len, p, path)?),
        Kind::Map(key_node, val_node) => {
            let len = read_length(p)?;
            let mut entries = MapValue::with_capacity(len.min(MAX_PREALLOC));
            for ix in 0..len {
                path.push(PathSegment::Key(format!("#{ix}")));
                let key = read(key_node, p, path)?;
                path.pop();
                path.push(PathSegment::Key(key.to_string()));
                if entries.contains_key(&key) {
                    return Err(TokenError::DuplicateMapKey(key.to_string()).into());
                }
                let val = read(val_node, p, path)?;
                path.pop();
                entries.insert(key, val);
            }
            Value::Map(entries)
        }
        Kind::Union(members) => {
            let raw = read_uint(p)?;
            let tag = match usize::try_from(raw) {
                Ok(tag) if tag < members.len() => tag,
                _ => {
                    return Err(TokenError::InvalidUnionTag(TagError::new(
                        raw,
                        node.to_string(),
                        Some((0..members.len() as u64).collect()),
                    ))
                    .into())
                }
            };
            path.push(PathSegment::Member(tag));
            let value = read(&members[tag], p, path)?;
            path.pop();
            Value::Union(UnionValue {
                tag,
                value: Box::new(value),
            })
        }
        Kind::Struct(schema) => {
            let mut fields = StructValue::new();
            for field in schema.fields() {
                path.push(PathSegment::Field(field.name.clone()));
                let val = read(&field.node, p, path)?;
                path.pop();
                fields.insert(field.name.clone(), val);
            }
            Value::Struct(fields)
        }
        Kind::Enum(schema) => {
            let raw = read_uint(p)?;
            if !schema.contains(raw) {
                return Err(TokenError::InvalidEnumValue(TagError::new(
                    raw,
                    schema.name(),
                    Some(schema.values().collect()),
                ))
                .into());
            }
            Value::Int(raw.into())
        }
        Kind::User(name, inner) => {
            path.push(PathSegment::Named(name.clone()));
            let val = read(inner, p, path)?;
            path.pop();
            val
        }
    };
    Ok(ret)
}

fn read_items<P: Parser>(
    elem: &TypeNode,
    len: usize,
    p: &mut P,
    path: &mut Path,
) -> ParseResult<Vec<Value>> {
    let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
    for ix in 0..len {
        path.push(PathSegment::Index(ix));
        items.push(read(elem, p, path)?);
        path.pop();
    }
    Ok(items)
}
