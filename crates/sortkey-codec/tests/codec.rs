// crates/sortkey-codec/tests/codec.rs
// ============================================================================
// Module: Sort Key Codec Tests
// Description: Tests for tuple encoding, decoding, and codec identity.
// ============================================================================
//! ## Overview
//! Validates round-trips across every scalar type, size and layout contract
//! errors, version gating of null flags, scratch reuse, and structural
//! codec equality.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::BigInt;
use proptest::prelude::*;
use sortkey_codec::CodecError;
use sortkey_codec::FormatVersion;
use sortkey_codec::SortKey;
use sortkey_codec::SortKeyCodec;
use sortkey_codec::Value;
use sortkey_types::NestedField;
use sortkey_types::PrimitiveType;
use sortkey_types::Schema;
use sortkey_types::SortField;
use sortkey_types::SortOrder;
use sortkey_types::StructType;
use sortkey_types::Transform;
use sortkey_types::TypeId;
use uuid::Uuid;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Primitive types covered by the round-trip layout, in field id order.
fn all_types() -> Vec<PrimitiveType> {
    vec![
        PrimitiveType::Boolean,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Date,
        PrimitiveType::Time,
        PrimitiveType::Timestamptz,
        PrimitiveType::String,
        PrimitiveType::Uuid,
        PrimitiveType::Fixed(4),
        PrimitiveType::Binary,
        PrimitiveType::Decimal {
            precision: 18,
            scale: 2,
        },
    ]
}

/// Builds a codec with one identity sort field per scalar type.
fn all_types_codec() -> SortKeyCodec {
    let types = all_types();
    let fields = (1..).zip(&types).map(|(id, ty)| NestedField::optional(id, format!("f{id}"), *ty));
    let schema = Schema::new(fields.collect()).unwrap();
    let order = SortOrder::new(
        1,
        (1..).take(types.len()).map(|id| SortField::asc(id, Transform::Identity)).collect(),
    );
    SortKeyCodec::new(schema, order).unwrap()
}

/// Builds an (int, long) codec at the given version.
fn int_long_codec(version: FormatVersion) -> SortKeyCodec {
    let schema = Schema::new(vec![
        NestedField::required(1, "a", PrimitiveType::Int),
        NestedField::required(2, "b", PrimitiveType::Long),
    ])
    .unwrap();
    let order = SortOrder::new(1, vec![
        SortField::asc(1, Transform::Identity),
        SortField::desc(2, Transform::Identity),
    ]);
    SortKeyCodec::with_version(schema, order, version).unwrap()
}

/// Strategy for the first seven positions of the round-trip layout.
fn leading_values() -> impl Strategy<Value = Vec<Option<Value>>> {
    (
        proptest::option::of(any::<bool>().prop_map(Value::Boolean)),
        proptest::option::of(any::<i32>().prop_map(Value::Int)),
        proptest::option::of(any::<i64>().prop_map(Value::Long)),
        proptest::option::of(any::<f32>().prop_map(Value::Float)),
        proptest::option::of(any::<f64>().prop_map(Value::Double)),
        proptest::option::of(any::<i32>().prop_map(Value::Int)),
        proptest::option::of(any::<i64>().prop_map(Value::Long)),
    )
        .prop_map(|(a, b, c, d, e, f, g)| vec![a, b, c, d, e, f, g])
}

/// Strategy for the last six positions of the round-trip layout.
fn trailing_values() -> impl Strategy<Value = Vec<Option<Value>>> {
    (
        proptest::option::of(any::<i64>().prop_map(Value::Long)),
        proptest::option::of("\\PC{0,24}".prop_map(Value::String)),
        proptest::option::of(any::<u128>().prop_map(|bits| Value::Uuid(Uuid::from_u128(bits)))),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 4).prop_map(Value::Binary)),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Binary)),
        proptest::option::of(
            (any::<i64>(), 0_i64..6)
                .prop_map(|(unscaled, scale)| {
                    Value::Decimal(BigDecimal::new(BigInt::from(unscaled), scale))
                }),
        ),
    )
        .prop_map(|(h, i, j, k, l, m)| vec![h, i, j, k, l, m])
}

// ============================================================================
// SECTION: Round Trip
// ============================================================================

proptest! {
    /// Tests every tuple, nulls included, survives encode then decode.
    #[test]
    fn test_round_trip_preserves_values_and_nulls(
        leading in leading_values(),
        trailing in trailing_values(),
    ) {
        let codec = all_types_codec();
        let mut values = leading;
        values.extend(trailing);
        let key = SortKey::from_values(values);

        let bytes = codec.encode_to_vec(&key).unwrap();
        let decoded = codec.decode(&mut bytes.as_slice()).unwrap();
        prop_assert_eq!(decoded, key);
    }
}

/// Tests a version 2 tuple writes a flag byte before every value.
#[test]
fn test_version_two_layout_has_null_flags() {
    let codec = int_long_codec(FormatVersion::V2);
    let key = SortKey::from_values(vec![None, Some(Value::Long(5))]);
    let bytes = codec.encode_to_vec(&key).unwrap();
    assert_eq!(bytes, vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 5]);
}

/// Tests null flags other than 0 and 1 are corruption.
#[test]
fn test_invalid_null_flag_rejected() {
    let codec = int_long_codec(FormatVersion::V2);
    let result = codec.decode(&mut [7_u8, 0, 0, 0, 0].as_slice());
    assert_eq!(result, Err(CodecError::InvalidFlag(7)));
}

/// Tests truncated input reports an early end.
#[test]
fn test_truncated_input_rejected() {
    let codec = int_long_codec(FormatVersion::V2);
    let result = codec.decode(&mut [0_u8, 0, 0].as_slice());
    assert_eq!(result, Err(CodecError::UnexpectedEof));
}

// ============================================================================
// SECTION: Version Gating
// ============================================================================

/// Tests version 1 writes no flag bytes and decodes back.
#[test]
fn test_version_one_has_no_flags() {
    let codec = int_long_codec(FormatVersion::V1);
    let key = SortKey::from_values(vec![Some(Value::Int(-1)), Some(Value::Long(2))]);
    let bytes = codec.encode_to_vec(&key).unwrap();
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[..4], &[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(codec.decode(&mut bytes.as_slice()).unwrap(), key);
}

/// Tests version 1 refuses nulls before writing anything.
#[test]
fn test_version_one_rejects_null_without_output() {
    let codec = int_long_codec(FormatVersion::V1);
    let key = SortKey::from_values(vec![Some(Value::Int(1)), None]);
    let mut sink = Vec::new();
    let result = codec.encode(&key, &mut sink);
    assert_eq!(result, Err(CodecError::NullInLegacyFormat {
        position: 1
    }));
    assert!(sink.is_empty());
}

/// Tests switching versions changes the wire form.
#[test]
fn test_set_version_and_restore_latest() {
    let mut codec = int_long_codec(FormatVersion::V2);
    let key = SortKey::from_values(vec![Some(Value::Int(1)), Some(Value::Long(1))]);
    codec.set_version(FormatVersion::V1);
    assert_eq!(codec.encode_to_vec(&key).unwrap().len(), 12);
    codec.restore_to_latest_version();
    assert_eq!(codec.version(), SortKeyCodec::latest_version());
    assert_eq!(codec.encode_to_vec(&key).unwrap().len(), 14);
}

// ============================================================================
// SECTION: Contract Errors
// ============================================================================

/// Tests encoding a tuple of the wrong size fails with both sizes.
#[test]
fn test_encode_size_mismatch() {
    let codec = int_long_codec(FormatVersion::V2);
    let mut sink = Vec::new();
    let result = codec.encode(&SortKey::new(3), &mut sink);
    assert_eq!(result, Err(CodecError::SizeMismatch {
        expected: 2,
        actual: 3
    }));
    assert!(sink.is_empty());
}

/// Tests decoding into a wrong-sized tuple leaves it untouched.
#[test]
fn test_decode_into_size_mismatch_does_not_mutate() {
    let codec = int_long_codec(FormatVersion::V2);
    let bytes = codec
        .encode_to_vec(&SortKey::from_values(vec![Some(Value::Int(9)), Some(Value::Long(9))]))
        .unwrap();
    let original = SortKey::from_values(vec![Some(Value::Int(1)), None, Some(Value::Long(3))]);
    let mut reuse = original.clone();
    let result = codec.decode_into(&mut reuse, &mut bytes.as_slice()).map(|key| key.clone());
    assert_eq!(result, Err(CodecError::SizeMismatch {
        expected: 2,
        actual: 3
    }));
    assert_eq!(reuse, original);
}

/// Tests values of the wrong kind are rejected before output.
#[test]
fn test_value_type_mismatch() {
    let codec = int_long_codec(FormatVersion::V2);
    let key = SortKey::from_values(vec![Some(Value::Long(1)), Some(Value::Long(1))]);
    let mut sink = Vec::new();
    assert_eq!(codec.encode(&key, &mut sink), Err(CodecError::ValueTypeMismatch {
        expected: TypeId::Integer,
        found: "long",
    }));
    assert!(sink.is_empty());
}

/// Tests composite layout types fail before bytes are written or consumed.
#[test]
fn test_composite_layout_is_unsupported() {
    let schema = Schema::new(vec![NestedField::optional(
        1,
        "point",
        StructType::new(vec![NestedField::required(2, "x", PrimitiveType::Int)]),
    )])
    .unwrap();
    let order = SortOrder::new(1, vec![SortField::asc(1, Transform::Identity)]);
    let codec = SortKeyCodec::new(schema, order).unwrap();

    let mut sink = Vec::new();
    assert_eq!(
        codec.encode(&SortKey::new(1), &mut sink),
        Err(CodecError::UnsupportedType(TypeId::Struct))
    );
    assert!(sink.is_empty());

    let bytes = [0_u8, 0, 0, 0, 1];
    let mut source = &bytes[..];
    assert_eq!(codec.decode(&mut source), Err(CodecError::UnsupportedType(TypeId::Struct)));
    assert_eq!(source.len(), bytes.len());
}

/// Tests fixed values must match the declared length.
#[test]
fn test_fixed_length_enforced() {
    let schema =
        Schema::new(vec![NestedField::required(1, "key", PrimitiveType::Fixed(4))]).unwrap();
    let order = SortOrder::new(1, vec![SortField::asc(1, Transform::Identity)]);
    let codec = SortKeyCodec::new(schema, order).unwrap();
    let key = SortKey::from_values(vec![Some(Value::Binary(vec![1, 2, 3]))]);
    assert_eq!(codec.encode_to_vec(&key), Err(CodecError::FixedLengthMismatch {
        expected: 4,
        actual: 3,
    }));
}

// ============================================================================
// SECTION: Reuse and Copy
// ============================================================================

/// Tests the scratch tuple is reused across decodes.
#[test]
fn test_decode_scratch_reuses_target() {
    let mut codec = int_long_codec(FormatVersion::V2);
    let first = SortKey::from_values(vec![Some(Value::Int(1)), Some(Value::Long(2))]);
    let second = SortKey::from_values(vec![None, Some(Value::Long(4))]);
    let mut bytes = codec.encode_to_vec(&first).unwrap();
    bytes.extend(codec.encode_to_vec(&second).unwrap());

    let mut source = bytes.as_slice();
    assert_eq!(codec.decode_scratch(&mut source).unwrap(), &first);
    assert_eq!(codec.decode_scratch(&mut source).unwrap(), &second);
    assert_eq!(codec.scratch_key().size(), 2);
}

/// Tests copy reproduces the encoded bytes.
#[test]
fn test_copy_reencodes_tuple() {
    let codec = int_long_codec(FormatVersion::V2);
    let key = SortKey::from_values(vec![Some(Value::Int(3)), None]);
    let bytes = codec.encode_to_vec(&key).unwrap();
    let mut copied = Vec::new();
    codec.copy(&mut bytes.as_slice(), &mut copied).unwrap();
    assert_eq!(copied, bytes);
}

/// Tests duplicates share definitions and keep the version.
#[test]
fn test_duplicate_keeps_configuration() {
    let codec = int_long_codec(FormatVersion::V1);
    let duplicate = codec.duplicate();
    assert_eq!(duplicate, codec);
    assert_eq!(duplicate.version(), FormatVersion::V1);
    assert_eq!(duplicate.layout(), codec.layout());
    assert_eq!(codec.snapshot_configuration().format_version(), FormatVersion::V1);
}

// ============================================================================
// SECTION: Structural Identity
// ============================================================================

/// Hashes a value with the default hasher.
fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Tests codecs compare by schema structure and sort order only.
#[test]
fn test_structural_equality_ignores_schema_metadata() {
    let fields = vec![
        NestedField::required(1, "a", PrimitiveType::Int),
        NestedField::required(2, "b", PrimitiveType::Long),
    ];
    let order = SortOrder::new(1, vec![SortField::asc(1, Transform::Identity)]);
    let left = Schema::with_schema_id(1, fields.clone()).unwrap();
    let right =
        Schema::with_schema_id(7, fields).unwrap().with_identifier_field_ids(vec![1]).unwrap();

    let left = SortKeyCodec::new(left, order.clone()).unwrap();
    let right = SortKeyCodec::with_version(right, order, FormatVersion::V1).unwrap();
    assert_eq!(left, right);
    assert_eq!(hash_of(&left), hash_of(&right));

    let other_order = SortOrder::new(1, vec![SortField::desc(1, Transform::Identity)]);
    let different = SortKeyCodec::new(left.schema().clone(), other_order).unwrap();
    assert_ne!(left, different);
}
