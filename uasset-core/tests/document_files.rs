//! Document load/save through real files

use anyhow::Result;
use tempfile::TempDir;
use uasset_core::document::load_document;
use uasset_core::{
    Document, DocumentFormat, ExportDesc, Guid, Property, PropertyMap, PropertyValue, RawData,
    SyntheticObject,
};

fn sample() -> Document {
    let mut doc = Document::new();
    doc.names = vec!["None".into(), "Health".into(), "IntProperty".into()];
    doc.summary.guid = Guid::new([0xAB; 16]);

    let mut export = ExportDesc::new("/Script/Engine.BlueprintGeneratedClass");
    let mut properties = PropertyMap::new();
    properties.insert(
        "Health".into(),
        Property::new("IntProperty", PropertyValue::Int32(100)),
    );
    export.value.properties = Some(properties);
    export.value.raw_data = Some(RawData::from_bytes(&[7u8; 120]));
    export.value.sub_objects.insert(
        "DefaultSceneRoot".into(),
        SyntheticObject {
            class: "/Script/Engine.SceneComponent".into(),
        },
    );
    doc.exports.insert("/Game/BP_Door.BP_Door_C".into(), export);
    doc
}

#[test]
fn test_json_and_yaml_files() -> Result<()> {
    let dir = TempDir::new()?;
    let doc = sample();

    for name in ["door.json", "door.yaml", "door.yml"] {
        let path = dir.path().join(name);
        doc.save(&path)?;
        assert_eq!(load_document(&path)?, doc);
    }

    let json = std::fs::read_to_string(dir.path().join("door.json"))?;
    assert!(json.contains("\"Exports\""));
    assert!(json.contains("\"RawData\""));
    assert!(json.contains("\"SubObjects\""));
    assert!(json.contains(&"AB".repeat(16)));
    Ok(())
}

#[test]
fn test_raw_data_survives_files() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("door.json");
    sample().save(&path)?;

    let loaded = Document::load(&path)?;
    let raw = loaded.exports[0].value.raw_data.as_ref().unwrap();
    assert!(raw.verify()?);
    assert_eq!(raw.to_bytes()?, vec![7u8; 120]);
    Ok(())
}

#[test]
fn test_missing_document() {
    let dir = TempDir::new().unwrap();
    assert!(load_document(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_format_selection() {
    assert_eq!(DocumentFormat::from_path("a/b.YAML"), DocumentFormat::Yaml);
    assert_eq!(DocumentFormat::from_path("a/b.txt"), DocumentFormat::Json);
    assert_eq!(DocumentFormat::from_name("yml"), Some(DocumentFormat::Yaml));
    assert_eq!(DocumentFormat::from_name("xml"), None);
}
