//! End-to-end tests over synthetic packages
//!
//! Packages are produced by the writer from hand-built documents, then
//! decoded again through the public API.

use proptest::prelude::*;
use uasset_binary::package::summary::PackageSummary;
use uasset_binary::version::{EngineVersion, PACKAGE_FILE_TAG};
use uasset_binary::{
    BinaryError, BinaryWriter, BodySource, DecodeOptions, DiagnosticKind, EncodeOptions,
    PackageParser, decode_package, encode_document, verify_round_trip,
};
use uasset_core::document::{ThumbnailBlob, ThumbnailIndexEntry};
use uasset_core::{Document, ExportDesc, ImportDesc, Property, PropertyMap, PropertyValue};

const PACKAGE: &str = "/Game/Props/BP_Crate";

fn decode_options() -> DecodeOptions {
    DecodeOptions::default().with_package_name(PACKAGE)
}

fn editing() -> EncodeOptions {
    EncodeOptions::default().with_body_source(BodySource::PropertiesFirst)
}

fn document_with(properties: PropertyMap) -> Document {
    let mut doc = Document::new();
    let mut export = ExportDesc::new("/Script/Engine.StaticMeshActor");
    export.is_asset = true;
    export.value.properties = Some(properties);
    doc.exports.insert(format!("{}.BP_Crate", PACKAGE), export);
    doc
}

fn single(name: &str, property: Property) -> PropertyMap {
    let mut properties = PropertyMap::new();
    properties.insert(name.to_string(), property);
    properties
}

fn round_trip(doc: &Document) -> Document {
    let encoded = encode_document(doc, &editing()).unwrap();
    decode_package(&encoded.bytes, &decode_options()).unwrap().value
}

#[test]
fn test_empty_header_decodes_to_no_exports() {
    let summary = PackageSummary {
        legacy_file_version: -7,
        saved_by_engine_version: EngineVersion::new(4, 27, 2, 0, ""),
        ..Default::default()
    };
    let mut writer = BinaryWriter::default();
    summary.write_to(&mut writer).unwrap();

    let decoded = decode_package(writer.as_slice(), &decode_options()).unwrap();
    assert!(decoded.value.exports.is_empty());
    assert!(decoded.value.names.is_empty());
    assert!(decoded.diagnostics.is_empty());
}

#[test]
fn test_bool_property_has_no_value_bytes() {
    let doc = document_with(single(
        "bHidden",
        Property::new("BoolProperty", PropertyValue::Bool(true)),
    ));
    let decoded = round_trip(&doc);
    let export = &decoded.exports[0];

    let properties = export.value.properties.as_ref().unwrap();
    assert_eq!(properties["bHidden"].value, PropertyValue::Bool(true));

    // 26-byte tag followed directly by the 8-byte terminator
    let raw = export.value.raw_data.as_ref().unwrap().to_bytes().unwrap();
    assert_eq!(raw.len(), 34);
    assert_eq!(hex::encode(&raw[16..26]), "00000000000000000100");
}

#[test]
fn test_int_array_survives_reencoding() {
    let values = vec![
        PropertyValue::Int32(1),
        PropertyValue::Int32(2),
        PropertyValue::Int32(3),
    ];
    let doc = document_with(single(
        "Ids",
        Property::new("ArrayProperty", PropertyValue::Array(values.clone()))
            .with_inner_type("IntProperty"),
    ));

    let once = round_trip(&doc);
    let twice = round_trip(&once);
    for decoded in [&once, &twice] {
        let ids = &decoded.exports[0].value.properties.as_ref().unwrap()["Ids"];
        assert_eq!(ids.value, PropertyValue::Array(values.clone()));
        assert_eq!(ids.inner_type.as_deref(), Some("IntProperty"));
    }
}

#[test]
fn test_ui_widget_class_ignores_import_package() {
    let mut doc = document_with(PropertyMap::new());
    doc.imports = vec![
        ImportDesc {
            class_package: "/Script/CoreUObject".into(),
            class_name: "Package".into(),
            outer_index: 0,
            object_name: "/Game/Vendor/Widgets".into(),
        },
        ImportDesc {
            class_package: "/Script/CoreUObject".into(),
            class_name: "Class".into(),
            outer_index: -1,
            object_name: "CanvasPanel".into(),
        },
    ];
    doc.exports[0].class = "/Game/Vendor/Widgets.CanvasPanel".into();

    let decoded = round_trip(&doc);
    assert_eq!(decoded.exports[0].class, "/Script/UMG.CanvasPanel");
    assert_eq!(decoded.imports.len(), 2);
}

fn class_indices(bytes: &[u8]) -> Vec<i32> {
    let file = PackageParser::from_bytes(bytes).unwrap().value;
    file.exports.iter().map(|e| e.class_index.0).collect()
}

#[test]
fn test_widget_classes_keep_their_own_imports() {
    let mut doc = document_with(PropertyMap::new());
    let generated = |outer: i32, name: &str| ImportDesc {
        class_package: "/Script/UMG".into(),
        class_name: "WidgetBlueprintGeneratedClass".into(),
        outer_index: outer,
        object_name: name.into(),
    };
    let package = |name: &str| ImportDesc {
        class_package: "/Script/CoreUObject".into(),
        class_name: "Package".into(),
        outer_index: 0,
        object_name: name.into(),
    };
    doc.imports = vec![
        package("/Game/UI/WBP_A"),
        generated(-1, "WBP_A_C"),
        package("/Game/UI/WBP_B"),
        generated(-3, "WBP_B_C"),
    ];
    doc.exports[0].class = "Import[1]".into();
    let mut second = ExportDesc::new("Import[3]");
    second.value.properties = Some(PropertyMap::new());
    doc.exports.insert(format!("{}.Second", PACKAGE), second);

    let first = encode_document(&doc, &editing()).unwrap().bytes;
    assert_eq!(class_indices(&first), vec![-2, -4]);

    let decoded = decode_package(&first, &decode_options()).unwrap().value;
    let classes: Vec<&str> = decoded.exports.values().map(|e| e.class.as_str()).collect();
    assert_eq!(classes, vec!["/Script/UMG.UserWidget", "/Script/UMG.UserWidget"]);
    assert_eq!(
        decoded.exports[1].class_import.as_deref(),
        Some("/Game/UI/WBP_B.WBP_B_C")
    );

    let again = encode_document(&decoded, &EncodeOptions::default()).unwrap().bytes;
    assert_eq!(class_indices(&again), vec![-2, -4]);
    assert_eq!(again, first);
}

#[test]
fn test_encoding_is_a_fixed_point() {
    let mut properties = PropertyMap::new();
    properties.insert(
        "Label".into(),
        Property::new("StrProperty", PropertyValue::Str("Crate".into())),
    );
    properties.insert(
        "Mass".into(),
        Property::new("FloatProperty", PropertyValue::Float(12.5)),
    );
    let doc = document_with(properties);

    let first = encode_document(&doc, &editing()).unwrap().bytes;
    let decoded = decode_package(&first, &decode_options()).unwrap().value;
    let second = encode_document(&decoded, &EncodeOptions::default()).unwrap().bytes;
    assert_eq!(first, second);

    let report = verify_round_trip(&first, &decode_options(), &EncodeOptions::default()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.original_len, first.len());
    assert_eq!(report.exports_before, 1);
}

#[test]
fn test_document_text_round_trip_keeps_bytes() {
    let doc = document_with(single(
        "Health",
        Property::new("IntProperty", PropertyValue::Int32(250)),
    ));
    let bytes = encode_document(&doc, &editing()).unwrap().bytes;
    let decoded = decode_package(&bytes, &decode_options()).unwrap().value;

    let json = serde_json::to_string_pretty(&decoded).unwrap();
    let parsed: Document = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, decoded);

    let again = encode_document(&parsed, &EncodeOptions::default()).unwrap().bytes;
    assert_eq!(again, bytes);
}

#[test]
fn test_raw_first_ignores_property_edits() {
    let doc = document_with(single(
        "Health",
        Property::new("IntProperty", PropertyValue::Int32(250)),
    ));
    let mut decoded = round_trip(&doc);
    decoded.exports[0]
        .value
        .properties
        .as_mut()
        .unwrap()
        .insert(
            "Health".into(),
            Property::new("IntProperty", PropertyValue::Int32(1)),
        );

    let lossless = encode_document(&decoded, &EncodeOptions::default()).unwrap();
    let kept = decode_package(&lossless.bytes, &decode_options()).unwrap().value;
    let health = &kept.exports[0].value.properties.as_ref().unwrap()["Health"];
    assert_eq!(health.value, PropertyValue::Int32(250));

    let edited = round_trip(&decoded);
    let health = &edited.exports[0].value.properties.as_ref().unwrap()["Health"];
    assert_eq!(health.value, PropertyValue::Int32(1));
}

#[test]
fn test_scaffolding_is_not_written() {
    let mut doc = document_with(PropertyMap::new());
    doc.exports[0].class = "/Script/Engine.BlueprintGeneratedClass".into();

    let decoded = round_trip(&doc);
    assert_eq!(decoded.exports[0].value.sub_objects.len(), 2);

    let bytes = encode_document(&decoded, &EncodeOptions::default()).unwrap().bytes;
    let plain = encode_document(&doc, &editing()).unwrap().bytes;
    assert_eq!(bytes, plain);
}

#[test]
fn test_thumbnails_round_trip() {
    let mut doc = document_with(PropertyMap::new());
    doc.thumbnails.thumbnails.push(ThumbnailBlob {
        width: 2,
        height: 1,
        image: vec![0xFF, 0x00, 0xFF, 0x00],
    });
    doc.thumbnails.index.push(ThumbnailIndexEntry {
        object_class_name: "StaticMeshActor".into(),
        object_path_without_package_name: "BP_Crate".into(),
        blob: 0,
    });

    let decoded = round_trip(&doc);
    assert_eq!(decoded.thumbnails, doc.thumbnails);
}

#[test]
fn test_big_endian_package() {
    let mut doc = document_with(single(
        "Health",
        Property::new("IntProperty", PropertyValue::Int32(-3)),
    ));
    doc.summary.big_endian = true;

    let bytes = encode_document(&doc, &editing()).unwrap().bytes;
    assert_eq!(&bytes[..4], &PACKAGE_FILE_TAG.to_be_bytes());

    let decoded = decode_package(&bytes, &decode_options()).unwrap().value;
    assert!(decoded.summary.big_endian);
    let health = &decoded.exports[0].value.properties.as_ref().unwrap()["Health"];
    assert_eq!(health.value, PropertyValue::Int32(-3));
}

#[test]
fn test_missing_reference_is_reported() {
    let mut doc = document_with(PropertyMap::new());
    doc.exports[0].outer = Some("/Game/Elsewhere.Thing".into());

    let encoded = encode_document(&doc, &editing()).unwrap();
    assert_eq!(
        encoded
            .diagnostics
            .count_of(DiagnosticKind::UnresolvedReference),
        1
    );
}

#[test]
fn test_rejects_unsupported_inputs() {
    let err = decode_package(&[0u8; 64], &decode_options()).unwrap_err();
    assert!(matches!(err, BinaryError::InvalidSignature { .. }));

    let mut writer = BinaryWriter::default();
    writer.write_u32(PACKAGE_FILE_TAG).unwrap();
    writer.write_i32(-4).unwrap();
    let err = decode_package(writer.as_slice(), &decode_options()).unwrap_err();
    assert!(matches!(err, BinaryError::UnsupportedVersion(_)));

    let doc = document_with(PropertyMap::new());
    let bytes = encode_document(&doc, &editing()).unwrap().bytes;
    assert!(decode_package(&bytes[..40], &decode_options()).is_err());
}

proptest! {
    #[test]
    fn prop_int_arrays_keep_order(values in prop::collection::vec(any::<i32>(), 0..32)) {
        let items: Vec<PropertyValue> = values.iter().copied().map(PropertyValue::Int32).collect();
        let doc = document_with(single(
            "Values",
            Property::new("ArrayProperty", PropertyValue::Array(items.clone()))
                .with_inner_type("IntProperty"),
        ));
        let decoded = round_trip(&doc);
        let property = &decoded.exports[0].value.properties.as_ref().unwrap()["Values"];
        prop_assert_eq!(&property.value, &PropertyValue::Array(items));
    }
}
