//! Class identities
//!
//! Imports name classes loosely (a generated `WBP_Menu_C`, a graph node, a
//! bare engine class). The document records one canonical `package.Class`
//! identity for each so that tools can group exports by what they are.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::export::path::import_path;
use crate::package::index::{IndexTarget, PackageIndex};
use uasset_core::constants::{
    ClassRule, ClassTarget, GENERATED_CLASS_RULES, GRAPH_CLASS_RULES, packages, is_ui_widget_class,
};
use uasset_core::{ImportDesc, NONE_NAME};

fn apply_rules(rules: &[ClassRule], name: &str) -> Option<String> {
    rules
        .iter()
        .find(|rule| rule.pattern.matches(name))
        .map(|rule| match rule.target {
            ClassTarget::Package(package) => format!("{}.{}", package, name),
            ClassTarget::Fixed(package, class) => format!("{}.{}", package, class),
        })
}

/// Canonical identity for a class name, given the package its import sits in
pub fn classify_class_name(name: &str, outer_package: Option<&str>) -> String {
    if is_ui_widget_class(name) {
        return format!("{}.{}", packages::UMG, name);
    }
    if let Some(identity) = apply_rules(GENERATED_CLASS_RULES, name) {
        return identity;
    }
    if let Some(identity) = apply_rules(GRAPH_CLASS_RULES, name) {
        return identity;
    }
    match outer_package {
        Some(package) if package.starts_with('/') => format!("{}.{}", package, name),
        _ => format!("{}.{}", packages::ENGINE, name),
    }
}

/// Package spelled inside a qualified class-name field (`/Script/X.Class`)
fn package_in_class_field(class_name: &str) -> Option<&str> {
    class_name
        .rsplit_once('.')
        .map(|(package, _)| package)
        .filter(|package| package.starts_with('/'))
}

/// Identity of the class an import stands for
///
/// The package comes from the import's class-name field when it is
/// qualified. Bare fields (`Class`) name the metaclass, so the outer
/// package import is used instead.
pub fn import_class_identity(imports: &[ImportDesc], index: usize) -> Option<String> {
    let import = imports.get(index)?;
    let outer = match PackageIndex(import.outer_index).target() {
        IndexTarget::Import(j) => imports.get(j).map(|o| o.object_name.as_str()),
        _ => None,
    };
    let package = package_in_class_field(&import.class_name).or(outer);
    Some(classify_class_name(&import.object_name, package))
}

/// Path of the import behind a class, when the identity hides it
///
/// Several generated classes share one identity, so the document keeps the
/// import path next to the class to write the same reference back.
pub fn class_import_path(
    class_index: PackageIndex,
    imports: &[ImportDesc],
    class: &str,
) -> Option<String> {
    match class_index.target() {
        IndexTarget::Import(i) if i < imports.len() => {
            let path = import_path(imports, i);
            (path != class).then_some(path)
        }
        _ => None,
    }
}

/// Class column of an export
///
/// Export classes resolve to the export's object name; imports go through
/// [`import_class_identity`]. Out-of-range references keep their placeholder.
pub fn resolve_class(
    class_index: PackageIndex,
    imports: &[ImportDesc],
    export_names: &[String],
    diagnostics: &mut Diagnostics,
    context: &str,
) -> String {
    let found = match class_index.target() {
        IndexTarget::Null => return NONE_NAME.to_string(),
        IndexTarget::Export(i) => export_names.get(i).cloned(),
        IndexTarget::Import(i) => import_class_identity(imports, i),
    };
    found.unwrap_or_else(|| {
        diagnostics.warn(
            DiagnosticKind::IndexOutOfRange,
            context,
            format!("Class {} outside its table", class_index),
        );
        class_index.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(package: &str, class: &str, outer: i32, name: &str) -> ImportDesc {
        ImportDesc {
            class_package: package.to_string(),
            class_name: class.to_string(),
            outer_index: outer,
            object_name: name.to_string(),
        }
    }

    #[test]
    fn test_classification_order() {
        assert_eq!(classify_class_name("CanvasPanel", Some("/Game/X")), "/Script/UMG.CanvasPanel");
        assert_eq!(classify_class_name("WBP_Menu_C", None), "/Script/UMG.UserWidget");
        assert_eq!(classify_class_name("W_Hud", None), "/Script/UMG.UserWidget");
        assert_eq!(
            classify_class_name("BP_Door_C", Some("/Game/BP_Door")),
            "/Script/Engine.BlueprintGeneratedClass"
        );
        assert_eq!(
            classify_class_name("K2Node_CallFunction", None),
            "/Script/BlueprintGraph.K2Node_CallFunction"
        );
        assert_eq!(
            classify_class_name("EdGraphSchema_K2", None),
            "/Script/BlueprintGraph.EdGraphSchema_K2"
        );
        assert_eq!(classify_class_name("EdGraph", None), "/Script/Engine.EdGraph");
        assert_eq!(
            classify_class_name("MaterialGraphNode", None),
            "/Script/UnrealEd.MaterialGraphNode"
        );
        assert_eq!(
            classify_class_name("StaticMesh", Some("/Script/Engine")),
            "/Script/Engine.StaticMesh"
        );
        assert_eq!(classify_class_name("Thing", Some("NotAPath")), "/Script/Engine.Thing");
        assert_eq!(classify_class_name("Thing", None), "/Script/Engine.Thing");
    }

    #[test]
    fn test_resolve_class() {
        let imports = vec![
            import("/Script/CoreUObject", "Package", 0, "/Script/Engine"),
            import("/Script/CoreUObject", "Class", -1, "Actor"),
        ];
        let export_names = vec!["MyStruct".to_string()];
        let mut diags = Diagnostics::new();

        assert_eq!(
            resolve_class(PackageIndex(-2), &imports, &export_names, &mut diags, "x"),
            "/Script/Engine.Actor"
        );
        assert_eq!(
            resolve_class(PackageIndex(1), &imports, &export_names, &mut diags, "x"),
            "MyStruct"
        );
        assert_eq!(
            resolve_class(PackageIndex(0), &imports, &export_names, &mut diags, "x"),
            "None"
        );
        assert!(diags.is_empty());

        assert_eq!(
            resolve_class(PackageIndex(-9), &imports, &export_names, &mut diags, "x"),
            "Import[8]"
        );
        assert_eq!(diags.count_of(DiagnosticKind::IndexOutOfRange), 1);
    }

    #[test]
    fn test_package_from_class_field() {
        let imports = vec![
            import("/Script/CoreUObject", "Package", 0, "/Script/Engine"),
            import("/Script/CoreUObject", "/Script/Niagara.NiagaraClass", -1, "NiagaraSystem"),
            import("/Script/CoreUObject", "Class", -1, "StaticMesh"),
            import("/Script/CoreUObject", "Class", 0, "Orphan"),
        ];
        assert_eq!(
            import_class_identity(&imports, 1).as_deref(),
            Some("/Script/Niagara.NiagaraSystem")
        );
        assert_eq!(
            import_class_identity(&imports, 2).as_deref(),
            Some("/Script/Engine.StaticMesh")
        );
        assert_eq!(
            import_class_identity(&imports, 3).as_deref(),
            Some("/Script/Engine.Orphan")
        );
        assert_eq!(import_class_identity(&imports, 4), None);
    }
}
