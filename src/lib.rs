//! Data model and binary codec for BARE messages
//!
//! # Overview
//!
//! BARE (Binary Application Record Encoding) is a compact, schema-driven
//! binary serialization format: values carry no type information on the wire,
//! so both ends of a transmission must agree on the type of every message in
//! advance. This crate models BARE types and transcodes values of those types
//! in two complementary ways.
//!
//! ## Static model
//!
//! The traits [`Encode`] and [`Decode`] map Rust types directly onto their
//! BARE encodings (see [`conv`] for the full correspondence). Structs and
//! enums gain implementations through `#[derive(Encode, Decode)]`:
//!
//! ```
//! use bare::{Decode, Encode};
//!
//! #[derive(Debug, PartialEq, Encode, Decode)]
//! struct Reading {
//!     sensor: u8,
//!     celsius: i16,
//!     label: Option<String>,
//! }
//!
//! let r = Reading { sensor: 1, celsius: 300, label: None };
//! let bytes = r.to_bytes();
//! assert_eq!(bytes, vec![0x01, 0x2c, 0x01, 0x00]);
//! assert_eq!(Reading::decode(bytes), r);
//! ```
//!
//! ## Dynamic model
//!
//! A [`TypeNode`] describes a BARE type at runtime, and a [`Value`] holds a
//! message whose shape is only known at runtime. Nodes validate values,
//! supply defaults, and pack and unpack them (see [`schema`] and [`value`]).
//!
//! Both models share the same wire-level machinery: the [`Parser`] trait and
//! its implementors in [`parse`], the [`Target`] trait of output buffers, and
//! the varint codec in [`varint`], so a derived type and the equivalent
//! `TypeNode` always agree byte-for-byte.
//!
//! # Features
//!
//! * `check_complete_parse`: decoding a value from an in-memory buffer fails
//!   with [`DecodeError::NonEmpty`] if any bytes remain afterwards.
//! * `u8_wide_range`: validation accepts `U8` values up to `0xFFFF`, for
//!   compatibility with producers that relied on that bound. Values above
//!   `0xFF` still cannot be packed.
//! * `serde_impls`: `serde::Serialize` for [`Value`], [`Bytes`] and
//!   [`FixedBytes`].

extern crate decode_derive;
extern crate encode_derive;
extern crate self as bare;

pub mod builder;
pub mod bytes;
pub mod conv;
pub mod error;
pub mod fixed;
pub mod hexstring;
pub mod parse;
pub mod prim;
pub mod schema;
pub mod value;
pub mod varint;

pub use crate::builder::{strict::StrictBuilder, Builder};
pub use crate::bytes::Bytes;
pub use crate::conv::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
pub use crate::conv::{
    target::{ByteCounter, Target},
    Decode, Encode, EncodeLength,
};
pub use crate::error::{Path, PathSegment, SchemaError, ValidationError, ValidationErrorKind};
pub use crate::fixed::FixedBytes;
pub use crate::hexstring::HexString;
pub use crate::parse::{
    error::ParseError, ByteParser, ParseResult, Parser, ReadParser, SliceParser, TryIntoParser,
};
pub use crate::schema::{EnumSchema, Kind, StructSchema, TypeNode};
pub use crate::value::{MapValue, StructValue, UnionValue, ValidatedArray, ValidatedMap, Value};
pub use crate::varint::{Int, Uint};

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct Header {
        version: u8,
        flags: u16,
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct Message {
        header: Header,
        id: Uint,
        tags: Vec<String>,
        digest: FixedBytes<4>,
        extra: Option<Bytes>,
        counts: BTreeMap<String, u32>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
    enum Level {
        Low = 1,
        High = 10,
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    enum Shape {
        Empty,
        Circle(f32),
        Label(String),
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct Pair<T>(T, T);

    fn message_node() -> TypeNode {
        let header = TypeNode::structure(
            StructSchema::new(
                "Header",
                [("version", TypeNode::u8()), ("flags", TypeNode::u16())],
            )
            .unwrap(),
        );
        TypeNode::structure(
            StructSchema::new(
                "Message",
                [
                    ("header", header),
                    ("id", TypeNode::uint()),
                    ("tags", TypeNode::array(TypeNode::string(), 0)),
                    ("digest", TypeNode::data_fixed(4).unwrap()),
                    ("extra", TypeNode::optional(TypeNode::data())),
                    ("counts", TypeNode::map(TypeNode::string(), TypeNode::u32())),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn derived_matches_schema() {
        let msg = Message {
            header: Header {
                version: 2,
                flags: 0x0102,
            },
            id: Uint(300),
            tags: vec!["a".into(), "bc".into()],
            digest: FixedBytes::from_array([0xde, 0xad, 0xbe, 0xef]),
            extra: Some(Bytes::from_vec(vec![7])),
            counts: [("k".to_string(), 5u32)].into_iter().collect(),
        };
        let bytes = msg.to_bytes();
        assert_eq!(Message::decode(bytes.clone()), msg);

        let mut counts = MapValue::new();
        counts.insert("k", 5);
        let value = Value::Struct(
            StructValue::new()
                .with(
                    "header",
                    StructValue::new().with("version", 2).with("flags", 0x0102),
                )
                .with("id", 300)
                .with("tags", vec![Value::from("a"), Value::from("bc")])
                .with("digest", Value::data(vec![0xde, 0xad, 0xbe, 0xef]))
                .with("extra", Value::data(vec![7]))
                .with("counts", counts),
        );
        let node = message_node();
        assert_eq!(node.pack(&value).unwrap(), bytes);
        assert_eq!(node.unpack(bytes).unwrap(), value);
    }

    #[test]
    fn derived_enum() {
        assert_eq!(Level::High.to_bytes(), vec![0x0a]);
        assert_eq!(Level::decode(vec![0x01]), Level::Low);
        match Level::try_decode(vec![0x02]) {
            Err(DecodeError::Parse(ParseError::Token(
                parse::error::TokenError::InvalidEnumValue(tag),
            ))) => {
                assert_eq!(tag.actual(), 2);
                assert_eq!(tag.expected(), Some(&[1, 10][..]));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn derived_union() {
        assert_eq!(Shape::Empty.to_bytes(), vec![0x00]);
        assert_eq!(
            Shape::Label("hi".into()).to_bytes(),
            vec![0x02, 0x02, 0x68, 0x69]
        );
        assert_eq!(Shape::decode(vec![0x01, 0x00, 0x00, 0x80, 0x3f]), Shape::Circle(1.0));
        assert!(Shape::try_decode(vec![0x03]).is_err());

        let node = TypeNode::union([
            TypeNode::void(),
            TypeNode::f32(),
            TypeNode::string(),
        ])
        .unwrap();
        assert_eq!(
            node.pack(&Value::tagged(2, "hi")).unwrap(),
            Shape::Label("hi".into()).to_bytes()
        );
    }

    #[test]
    fn derived_generic() {
        let p = Pair(1u16, 2u16);
        assert_eq!(p.to_bytes(), vec![0x01, 0x00, 0x02, 0x00]);
        assert_eq!(Pair::<u16>::decode(p.to_bytes()), p);
        assert_eq!(p.enc_len(), 4);
    }
}
