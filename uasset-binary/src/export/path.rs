//! Object paths
//!
//! An export's path is its outer chain joined under the package name:
//! `{package}.{outermost}` then `:` and the inner names joined with `.`.
//! Generated event-graph functions and class default objects are skipped as
//! ancestors. The widget tree and everything below it hangs off the primary
//! asset regardless of which object owns it on disk.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::package::exports::ExportEntry;
use crate::package::index::{IndexTarget, PackageIndex, join_object_path};
use crate::package::names::NameTable;
use std::collections::HashSet;
use uasset_core::ImportDesc;
use uasset_core::constants::{WIDGET_TREE_NAME, prefixes};

/// Ancestors with these names do not appear in paths
pub fn is_synthetic_ancestor(name: &str) -> bool {
    name.starts_with(prefixes::UBERGRAPH) || name.starts_with(prefixes::CLASS_DEFAULT_OBJECT)
}

/// Short asset name of a package (`/Game/UI/WBP_Menu` -> `WBP_Menu`)
pub fn asset_name(package_name: &str) -> &str {
    package_name.rsplit('/').next().unwrap_or(package_name)
}

/// Object name at the end of a path, ignoring a `#index` disambiguator
pub fn object_name_from_path(path: &str) -> &str {
    let path = match path.rsplit_once('#') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => path,
    };
    let tail = path.rsplit('/').next().unwrap_or(path);
    tail.rsplit(['.', ':']).next().unwrap_or(tail)
}

/// Paths for every export, in table order, made unique
pub fn build_export_paths(
    package_name: &str,
    exports: &[ExportEntry],
    names: &NameTable,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let asset = asset_name(package_name);
    let mut seen = HashSet::with_capacity(exports.len());
    let mut paths = Vec::with_capacity(exports.len());

    for (i, export) in exports.iter().enumerate() {
        let mut chain = vec![names.resolve(export.object_name)];
        let mut outer = export.outer_index;
        let mut steps = 0;

        while let IndexTarget::Export(j) = outer.target() {
            if steps > exports.len() {
                diagnostics.warn(
                    DiagnosticKind::IndexOutOfRange,
                    format!("Export[{}]", i),
                    "Outer chain loops back on itself",
                );
                break;
            }
            let Some(parent) = exports.get(j) else {
                diagnostics.warn(
                    DiagnosticKind::IndexOutOfRange,
                    format!("Export[{}]", i),
                    format!("Outer {} outside export table", outer),
                );
                break;
            };
            let name = names.resolve(parent.object_name);
            if !is_synthetic_ancestor(&name) {
                chain.push(name);
            }
            outer = parent.outer_index;
            steps += 1;
        }

        chain.reverse();
        if let Some(k) = chain.iter().position(|s| s == WIDGET_TREE_NAME) {
            chain.splice(..k, [asset.to_string()]);
        }

        let mut segments = Vec::with_capacity(chain.len() + 1);
        segments.push(package_name.to_string());
        segments.extend(chain);
        let mut path = join_object_path(&segments);

        if !seen.insert(path.clone()) {
            let unique = format!("{}#{}", path, i);
            diagnostics.warn(
                DiagnosticKind::DuplicatePath,
                &path,
                format!("Export {} renamed to {}", i, unique),
            );
            path = unique;
            seen.insert(path.clone());
        }
        paths.push(path);
    }

    paths
}

/// Full path of one import, following its outer imports
pub fn import_path(imports: &[ImportDesc], index: usize) -> String {
    let Some(import) = imports.get(index) else {
        return PackageIndex::from_import(index).to_string();
    };

    let mut chain = vec![import.object_name.as_str()];
    let mut outer = PackageIndex(import.outer_index);
    let mut steps = 0;
    while let IndexTarget::Import(j) = outer.target() {
        let Some(parent) = imports.get(j) else { break };
        if steps > imports.len() {
            break;
        }
        chain.push(parent.object_name.as_str());
        outer = PackageIndex(parent.outer_index);
        steps += 1;
    }
    chain.reverse();
    join_object_path(&chain)
}

pub fn build_import_paths(imports: &[ImportDesc]) -> Vec<String> {
    (0..imports.len()).map(|i| import_path(imports, i)).collect()
}

/// Turns cross-references into object paths
#[derive(Debug, Clone, Default)]
pub struct ObjectResolver {
    export_paths: Vec<String>,
    import_paths: Vec<String>,
}

impl ObjectResolver {
    pub fn new(export_paths: Vec<String>, import_paths: Vec<String>) -> Self {
        Self {
            export_paths,
            import_paths,
        }
    }

    pub fn export_paths(&self) -> &[String] {
        &self.export_paths
    }

    /// Path for a reference; `None` for null, `Export[i]`/`Import[i]` when out of range
    pub fn resolve(&self, index: PackageIndex) -> String {
        let found = match index.target() {
            IndexTarget::Null => return uasset_core::NONE_NAME.to_string(),
            IndexTarget::Export(i) => self.export_paths.get(i),
            IndexTarget::Import(i) => self.import_paths.get(i),
        };
        found.cloned().unwrap_or_else(|| index.to_string())
    }

    /// Resolve, recording out-of-range targets
    pub fn resolve_checked(
        &self,
        index: PackageIndex,
        diagnostics: &mut Diagnostics,
        context: &str,
    ) -> String {
        let in_range = match index.target() {
            IndexTarget::Null => true,
            IndexTarget::Export(i) => i < self.export_paths.len(),
            IndexTarget::Import(i) => i < self.import_paths.len(),
        };
        if !in_range {
            diagnostics.warn(
                DiagnosticKind::IndexOutOfRange,
                context,
                format!("Reference {} outside its table", index),
            );
        }
        self.resolve(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::names::NameReference;
    use proptest::prelude::*;

    fn names() -> NameTable {
        NameTable::new(
            [
                "None",
                "WBP_Menu",
                "WBP_Menu_C",
                "Default__WBP_Menu_C",
                "WidgetTree",
                "CanvasPanel",
                "ExecuteUbergraph_WBP_Menu",
                "K2Node_Event",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    fn export(name: i32, number: i32, outer: i32) -> ExportEntry {
        ExportEntry {
            object_name: NameReference::new(name, number),
            outer_index: PackageIndex(outer),
            ..Default::default()
        }
    }

    fn import(package: &str, class: &str, outer: i32, name: &str) -> ImportDesc {
        ImportDesc {
            class_package: package.to_string(),
            class_name: class.to_string(),
            outer_index: outer,
            object_name: name.to_string(),
        }
    }

    #[test]
    fn test_export_paths() {
        let exports = vec![
            export(1, 0, 0), // WBP_Menu
            export(2, 0, 0), // WBP_Menu_C
            export(3, 0, 0), // Default__WBP_Menu_C
            export(4, 0, 2), // WidgetTree under the generated class
            export(5, 1, 4), // CanvasPanel_0 under WidgetTree
            export(6, 0, 2), // ExecuteUbergraph_WBP_Menu
            export(7, 0, 6), // K2Node_Event under the ubergraph
        ];
        let mut diags = Diagnostics::new();
        let paths = build_export_paths("/Game/UI/WBP_Menu", &exports, &names(), &mut diags);

        assert_eq!(paths[0], "/Game/UI/WBP_Menu.WBP_Menu");
        assert_eq!(paths[1], "/Game/UI/WBP_Menu.WBP_Menu_C");
        assert_eq!(paths[2], "/Game/UI/WBP_Menu.Default__WBP_Menu_C");
        assert_eq!(paths[3], "/Game/UI/WBP_Menu.WBP_Menu:WidgetTree");
        assert_eq!(paths[4], "/Game/UI/WBP_Menu.WBP_Menu:WidgetTree.CanvasPanel_0");
        assert_eq!(paths[5], "/Game/UI/WBP_Menu.WBP_Menu_C:ExecuteUbergraph_WBP_Menu");
        assert_eq!(paths[6], "/Game/UI/WBP_Menu.WBP_Menu_C:K2Node_Event");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_duplicate_paths_are_disambiguated() {
        let exports = vec![export(5, 0, 0), export(5, 0, 0)];
        let mut diags = Diagnostics::new();
        let paths = build_export_paths("/Game/Pkg", &exports, &names(), &mut diags);
        assert_eq!(paths[0], "/Game/Pkg.CanvasPanel");
        assert_eq!(paths[1], "/Game/Pkg.CanvasPanel#1");
        assert_eq!(diags.count_of(DiagnosticKind::DuplicatePath), 1);
    }

    #[test]
    fn test_outer_cycle_terminates() {
        let exports = vec![export(1, 0, 2), export(2, 0, 1)];
        let mut diags = Diagnostics::new();
        let paths = build_export_paths("/Game/Pkg", &exports, &names(), &mut diags);
        assert_eq!(paths.len(), 2);
        assert!(diags.count_of(DiagnosticKind::IndexOutOfRange) >= 1);
    }

    #[test]
    fn test_import_paths() {
        let imports = vec![
            import("/Script/CoreUObject", "Package", 0, "/Script/UMG"),
            import("/Script/CoreUObject", "Class", -1, "CanvasPanel"),
            import("/Script/UMG", "CanvasPanel", -2, "Default__CanvasPanel"),
        ];
        let paths = build_import_paths(&imports);
        assert_eq!(paths[0], "/Script/UMG");
        assert_eq!(paths[1], "/Script/UMG.CanvasPanel");
        assert_eq!(paths[2], "/Script/UMG.CanvasPanel:Default__CanvasPanel");
    }

    #[test]
    fn test_object_name_from_path() {
        assert_eq!(object_name_from_path("/Game/UI/WBP_Menu.WBP_Menu"), "WBP_Menu");
        assert_eq!(
            object_name_from_path("/Game/UI/WBP_Menu.WBP_Menu:WidgetTree.Button_3"),
            "Button_3"
        );
        assert_eq!(object_name_from_path("/Game/Pkg.CanvasPanel#1"), "CanvasPanel");
        assert_eq!(object_name_from_path("Loose"), "Loose");
    }

    #[test]
    fn test_resolver_placeholders() {
        let resolver = ObjectResolver::new(vec!["/Game/A.A".into()], vec!["/Script/Engine".into()]);
        assert_eq!(resolver.resolve(PackageIndex(0)), "None");
        assert_eq!(resolver.resolve(PackageIndex(1)), "/Game/A.A");
        assert_eq!(resolver.resolve(PackageIndex(-1)), "/Script/Engine");
        assert_eq!(resolver.resolve(PackageIndex(4)), "Export[3]");
        assert_eq!(resolver.resolve(PackageIndex(-9)), "Import[8]");
    }

    proptest! {
        #[test]
        fn resolve_is_total(
            exports in 0usize..8,
            imports in 0usize..8,
            value in any::<i32>(),
        ) {
            let resolver = ObjectResolver::new(
                (0..exports).map(|i| format!("/Game/P.E{}", i)).collect(),
                (0..imports).map(|i| format!("/Script/M.I{}", i)).collect(),
            );
            let mut diags = Diagnostics::new();
            let text = resolver.resolve_checked(PackageIndex(value), &mut diags, "prop");
            match PackageIndex(value).target() {
                IndexTarget::Null => prop_assert_eq!(text, "None"),
                IndexTarget::Export(i) if i < exports => prop_assert_eq!(text, format!("/Game/P.E{}", i)),
                IndexTarget::Import(i) if i < imports => prop_assert_eq!(text, format!("/Script/M.I{}", i)),
                _ => prop_assert_eq!(diags.len(), 1),
            }
        }
    }
}
