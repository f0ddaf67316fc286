// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic

//! Every schema rejection, through both the builder and the parser.

mod common;

use protolens::schema::{EnumDescriptorBuilder, MessageDescriptorBuilder};
use protolens::{ElementType, FieldKind, MessageDescriptor, ScalarType, Schema, SchemaError, Syntax};

fn parse_err(source: &str) -> SchemaError {
    Schema::parse(source).expect_err("schema should be rejected")
}

#[test]
fn test_bundled_schemas_load() {
    let tutorial = common::tutorial_schema();
    assert_eq!(tutorial.package(), Some("tutorial"));
    assert_eq!(tutorial.syntax(), Syntax::Proto3);
    assert!(tutorial.message("tutorial.Person.PhoneNumber").is_some());
    assert!(tutorial.message(".tutorial.AddressBook").is_some());
    assert!(tutorial.enum_type("tutorial.Person.PhoneType").is_some());

    let foo = common::foo_schema();
    assert_eq!(foo.syntax(), Syntax::Proto2);
    let packed = foo.message("foo.FooPacked").expect("packed");
    let unpacked = foo.message("foo.FooUnpacked").expect("unpacked");
    assert!(packed.field_by_name("num").expect("num").kind.is_packed());
    assert!(!unpacked.field_by_name("num").expect("num").kind.is_packed());
}

#[test]
fn test_builder_accepts_valid_message() {
    let descriptor = MessageDescriptor::builder("demo.Point")
        .field("x", 1, ScalarType::SInt32)
        .field("y", 2, ScalarType::SInt32)
        .packed("history", 3, ScalarType::Fixed32)
        .reserved_range(10, 20)
        .reserved_name("z")
        .build()
        .expect("valid");
    assert_eq!(descriptor.fields().len(), 3);
    assert!(descriptor.is_reserved_tag(15));
    assert_eq!(descriptor.field_by_tag(2).map(|f| f.name.as_str()), Some("y"));
}

#[test]
fn test_builder_rejections() {
    let err = MessageDescriptorBuilder::new("demo.M")
        .field("a", 1, ScalarType::Int32)
        .field("b", 1, ScalarType::Int32)
        .build()
        .expect_err("duplicate tag");
    assert!(matches!(err, SchemaError::DuplicateTag { tag: 1, .. }));

    let err = MessageDescriptorBuilder::new("demo.M")
        .field("a", 1, ScalarType::Int32)
        .field("a", 2, ScalarType::Int32)
        .build()
        .expect_err("duplicate name");
    assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));

    for tag in [0, 19_000, 19_999, 1 << 29] {
        let err = MessageDescriptorBuilder::new("demo.M")
            .field("a", tag, ScalarType::Int32)
            .build()
            .expect_err("invalid tag");
        assert!(matches!(err, SchemaError::InvalidTag { .. }), "tag {}", tag);
    }

    let err = MessageDescriptorBuilder::new("demo.M")
        .reserved_range(5, 9)
        .field("a", 7, ScalarType::Int32)
        .build()
        .expect_err("reserved tag");
    assert!(matches!(err, SchemaError::ReservedTag { tag: 7, .. }));

    let err = MessageDescriptorBuilder::new("demo.M")
        .reserved_name("legacy")
        .field("legacy", 1, ScalarType::Int32)
        .build()
        .expect_err("reserved name");
    assert!(matches!(err, SchemaError::ReservedName { .. }));

    let err = MessageDescriptorBuilder::new("demo.M")
        .reserved_range(9, 5)
        .build()
        .expect_err("backwards range");
    assert!(matches!(err, SchemaError::InvalidReservedRange { .. }));

    let err = MessageDescriptorBuilder::new("demo.M")
        .packed("names", 1, ScalarType::String)
        .build()
        .expect_err("packed string");
    assert!(matches!(err, SchemaError::InvalidPacked { .. }));

    let err = MessageDescriptorBuilder::new("demo.M")
        .with_field(protolens::FieldDescriptor::new(
            "children",
            1,
            FieldKind::PackedRepeated(ElementType::Message("demo.M".into())),
        ))
        .build()
        .expect_err("packed message");
    assert!(matches!(err, SchemaError::InvalidPacked { .. }));
}

#[test]
fn test_enum_rejections() {
    assert!(EnumDescriptorBuilder::new("demo.E").build().is_err());

    let err = EnumDescriptorBuilder::new("demo.E")
        .value("ONE", 1)
        .build()
        .expect_err("first must be zero");
    assert!(matches!(err, SchemaError::InvalidEnum { .. }));

    let err = EnumDescriptorBuilder::new("demo.E")
        .value("ZERO", 0)
        .value("NIL", 0)
        .build()
        .expect_err("alias without allow_alias");
    assert!(matches!(err, SchemaError::InvalidEnum { .. }));

    let aliased = EnumDescriptorBuilder::new("demo.E")
        .allow_alias(true)
        .value("ZERO", 0)
        .value("NIL", 0)
        .build()
        .expect("aliases allowed");
    assert_eq!(aliased.value_by_number(0).map(|v| v.name.as_str()), Some("ZERO"));
}

#[test]
fn test_schema_reference_checks() {
    let person = MessageDescriptorBuilder::new("demo.Person")
        .message("home", 1, "demo.Address")
        .build()
        .expect("descriptor");
    let err = Schema::builder()
        .message(person.clone())
        .build()
        .expect_err("dangling");
    assert!(matches!(err, SchemaError::UnresolvedType { .. }));

    let kind = EnumDescriptorBuilder::new("demo.Address")
        .value("NONE", 0)
        .build()
        .expect("enum");
    let err = Schema::builder()
        .message(person.clone())
        .enumeration(kind)
        .build()
        .expect_err("enum used as message");
    assert!(matches!(
        err,
        SchemaError::TypeKindMismatch {
            expected: "message",
            ..
        }
    ));

    let address = MessageDescriptor::builder("demo.Address")
        .field("street", 1, ScalarType::String)
        .build()
        .expect("address");
    let err = Schema::builder()
        .message(address.clone())
        .message(address.clone())
        .build()
        .expect_err("duplicate type");
    assert_eq!(err, SchemaError::DuplicateTypeName("demo.Address".into()));

    let schema = Schema::builder()
        .package("demo")
        .syntax(Syntax::Proto3)
        .message(person)
        .message(address)
        .build()
        .expect("complete");
    assert_eq!(schema.messages().len(), 2);
}

#[test]
fn test_parser_rejections() {
    assert!(matches!(
        parse_err("message M { int32 a = 1; int32 b = 1; }"),
        SchemaError::DuplicateTag { .. }
    ));
    assert!(matches!(
        parse_err("message M { int32 a = 0; }"),
        SchemaError::InvalidTag { tag: 0, .. }
    ));
    assert!(matches!(
        parse_err("message M { reserved 2 to 4; int32 a = 3; }"),
        SchemaError::ReservedTag { tag: 3, .. }
    ));
    assert!(matches!(
        parse_err("message M { reserved \"old\"; string old = 1; }"),
        SchemaError::ReservedName { .. }
    ));
    assert!(matches!(
        parse_err("message M { repeated string s = 1 [packed = true]; }"),
        SchemaError::InvalidPacked { .. }
    ));
    assert!(matches!(
        parse_err("message M { Missing m = 1; }"),
        SchemaError::UnresolvedType { .. }
    ));
    assert!(matches!(
        parse_err("enum E { A = 1; }"),
        SchemaError::InvalidEnum { .. }
    ));
    assert!(matches!(
        parse_err("message M { oneof pick { int32 a = 1; } }"),
        SchemaError::Unsupported { .. }
    ));
    assert!(matches!(
        parse_err("syntax = \"proto3\";\nmessage M { required int32 a = 1; }"),
        SchemaError::Parse { line: 2, .. }
    ));
}

#[test]
fn test_error_messages_name_the_culprit() {
    let err = parse_err("package p;\nmessage M { int32 a = 1; int32 b = 1; }");
    assert_eq!(err.to_string(), "p.M: tag 1 used by both 'a' and 'b'");
}
