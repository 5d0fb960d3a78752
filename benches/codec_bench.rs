use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bare::{Decode, Encode, StructSchema, StructValue, TypeNode, Uint, Value};

#[derive(Encode, Decode)]
struct Record {
    id: Uint,
    name: String,
    samples: Vec<i32>,
    note: Option<String>,
}

fn record() -> Record {
    Record {
        id: Uint(1 << 40),
        name: String::from("sample record"),
        samples: (-64..64).collect(),
        note: Some(String::from("ok")),
    }
}

fn record_node() -> TypeNode {
    TypeNode::structure(
        StructSchema::new(
            "Record",
            [
                ("id", TypeNode::uint()),
                ("name", TypeNode::string()),
                ("samples", TypeNode::array(TypeNode::i32(), 0)),
                ("note", TypeNode::optional(TypeNode::string())),
            ],
        )
        .unwrap(),
    )
}

fn record_value() -> Value {
    Value::Struct(
        StructValue::new()
            .with("id", 1u64 << 40)
            .with("name", "sample record")
            .with("samples", (-64..64).map(Value::from).collect::<Vec<_>>())
            .with("note", "ok"),
    )
}

fn varint_bench(c: &mut Criterion) {
    let values: Vec<Uint> = (0..64).map(|i| Uint(1u64 << i)).collect();
    c.bench_function("varint_encode", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(640);
            for v in values.iter() {
                v.write_to_vec(&mut buf);
            }
            black_box(buf)
        })
    });
    let encoded = values.to_bytes();
    c.bench_function("varint_decode", |b| {
        b.iter(|| black_box(Vec::<Uint>::decode(encoded.as_slice())))
    });
}

fn static_bench(c: &mut Criterion) {
    let rec = record();
    c.bench_function("derived_encode", |b| b.iter(|| black_box(rec.to_bytes())));
    let bytes = rec.to_bytes();
    c.bench_function("derived_decode", |b| {
        b.iter(|| black_box(Record::decode(bytes.as_slice())))
    });
}

fn dynamic_bench(c: &mut Criterion) {
    let node = record_node();
    let value = record_value();
    c.bench_function("schema_pack", |b| {
        b.iter(|| black_box(node.pack(&value).unwrap()))
    });
    let bytes = node.pack(&value).unwrap();
    c.bench_function("schema_unpack", |b| {
        b.iter(|| black_box(node.unpack(bytes.as_slice()).unwrap()))
    });
}

criterion_group! {
    name = codec_benches;
    config = Criterion::default();
    targets = varint_bench, static_bench, dynamic_bench
}

criterion_main!(codec_benches);
