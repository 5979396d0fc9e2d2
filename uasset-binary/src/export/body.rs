//! Export body decoding
//!
//! Every body yields its raw bytes. Properties are decoded alongside when the
//! body is non-empty; a failure part way keeps what was read before it.

use crate::context::DecodeContext;
use crate::diagnostics::DiagnosticKind;
use crate::options::DecodeOptions;
use crate::property::decode::decode_stream;
use crate::reader::{BinaryReader, ByteOrder};
use indexmap::IndexMap;
use uasset_core::constants::{is_blueprint_like_class, packages, scaffolding};
use uasset_core::{ExportValue, PropertyMap, RawData, SyntheticObject};

/// Decode one export body
///
/// `bytes` is `None` when the serial range falls outside the file.
pub fn decode_export_body(
    bytes: Option<&[u8]>,
    byte_order: ByteOrder,
    ctx: &mut DecodeContext,
    options: &DecodeOptions,
    class: &str,
    path: &str,
) -> ExportValue {
    let mark = ctx.diagnostics.len();
    let mut value = ExportValue::default();

    match bytes {
        Some(bytes) => {
            value.raw_data = Some(RawData::from_bytes_with_width(bytes, options.chunk_width));
            if !bytes.is_empty() {
                let mut reader = BinaryReader::new(bytes, byte_order);
                let mut properties = PropertyMap::new();
                if let Err(e) = decode_stream(&mut reader, ctx, 0, &mut properties) {
                    ctx.diagnostics.warn(
                        DiagnosticKind::NestedDecodeFailed,
                        path,
                        format!(
                            "Property stream stopped after {} properties: {}",
                            properties.len(),
                            e
                        ),
                    );
                }
                value.properties = Some(properties);
            }
        }
        None => ctx.diagnostics.warn(
            DiagnosticKind::IndexOutOfRange,
            path,
            "Serial range lies outside the file",
        ),
    }

    if options.synthesize_scaffolding {
        let short_class = class.rsplit('.').next().unwrap_or(class);
        if is_blueprint_like_class(short_class) {
            value.sub_objects = scaffolding_objects();
        }
    }

    value.diagnostics = ctx
        .diagnostics
        .since(mark)
        .iter()
        .map(|d| d.to_string())
        .collect();
    value
}

fn scaffolding_objects() -> IndexMap<String, SyntheticObject> {
    let object = |class: &str| SyntheticObject {
        class: format!("{}.{}", packages::ENGINE, class),
    };
    let mut objects = IndexMap::new();
    objects.insert(
        scaffolding::CONSTRUCTION_SCRIPT.to_string(),
        object("SimpleConstructionScript"),
    );
    objects.insert(scaffolding::SCENE_ROOT.to_string(), object("SceneComponent"));
    objects
}
