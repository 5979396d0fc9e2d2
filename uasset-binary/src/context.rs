//! Per-pass state shared by the property codec
//!
//! Decoding borrows the parsed tables. Encoding builds them: names and
//! imports are collected while bodies are serialized, so every index handed
//! out stays valid when the tables are finally written.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::export::class::import_class_identity;
use crate::export::path::{ObjectResolver, import_path, object_name_from_path};
use crate::package::imports::ImportEntry;
use crate::package::index::PackageIndex;
use crate::package::names::{NameMap, NameReference, NameTable};
use std::collections::HashMap;
use uasset_core::ImportDesc;
use uasset_core::NONE_NAME;
use uasset_core::constants::{class_names, packages};

/// Read-side context for one package
pub struct DecodeContext<'a> {
    pub names: &'a NameTable,
    pub objects: &'a ObjectResolver,
    pub max_depth: usize,
    pub diagnostics: Diagnostics,
}

impl<'a> DecodeContext<'a> {
    pub fn new(names: &'a NameTable, objects: &'a ObjectResolver, max_depth: usize) -> Self {
        Self {
            names,
            objects,
            max_depth,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn name(&mut self, name: NameReference, context: &str) -> String {
        self.names.resolve_checked(name, &mut self.diagnostics, context)
    }

    pub fn object(&mut self, index: PackageIndex, context: &str) -> String {
        self.objects
            .resolve_checked(index, &mut self.diagnostics, context)
    }
}

/// Write-side context: the name map and import table under construction
#[derive(Debug, Default)]
pub struct WriteContext {
    pub names: NameMap,
    imports: Vec<ImportDesc>,
    import_lookup: HashMap<String, usize>,
    /// Canonical class identity -> import, for classes that were normalized on decode
    class_aliases: HashMap<String, usize>,
    export_lookup: HashMap<String, usize>,
    export_names: HashMap<String, usize>,
    pub max_depth: usize,
    pub diagnostics: Diagnostics,
}

impl WriteContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Add names verbatim, in order
    pub fn seed_names<'n, I: IntoIterator<Item = &'n str>>(&mut self, names: I) {
        for name in names {
            self.names.add(name);
        }
    }

    /// Keep existing imports at their original positions
    pub fn seed_imports(&mut self, imports: &[ImportDesc]) {
        for import in imports {
            self.register_import_names(import);
            self.imports.push(import.clone());
        }
        for i in 0..self.imports.len() {
            let path = import_path(&self.imports, i);
            self.import_lookup.entry(path).or_insert(i);

            let is_class = self.imports[i].class_name.ends_with(class_names::CLASS);
            if is_class && let Some(identity) = import_class_identity(&self.imports, i) {
                self.class_aliases.entry(identity).or_insert(i);
            }
        }
    }

    /// Make export paths resolvable, in table order
    pub fn register_exports<'p, I: IntoIterator<Item = &'p str>>(&mut self, paths: I) {
        for (i, path) in paths.into_iter().enumerate() {
            self.export_lookup.entry(path.to_string()).or_insert(i);
            self.export_names
                .entry(object_name_from_path(path).to_string())
                .or_insert(i);
        }
    }

    pub fn name(&mut self, text: &str) -> NameReference {
        self.names.reference(text)
    }

    pub fn imports(&self) -> &[ImportDesc] {
        &self.imports
    }

    /// Reference for an object path written in the document
    pub fn object_ref(&mut self, path: &str, context: &str) -> PackageIndex {
        if path.is_empty() || path == NONE_NAME {
            return PackageIndex::NULL;
        }
        if let Some(&i) = self.export_lookup.get(path) {
            return PackageIndex::from_export(i);
        }
        if let Some(&i) = self.import_lookup.get(path) {
            return PackageIndex::from_import(i);
        }
        if let Some(index) = PackageIndex::parse_placeholder(path) {
            return index;
        }
        self.diagnostics.warn(
            DiagnosticKind::UnresolvedReference,
            context,
            format!("No export or import at {}, written as None", path),
        );
        PackageIndex::NULL
    }

    /// Class reference of an export
    ///
    /// The recorded import wins while it still stands for `class`; an edited
    /// class goes through [`WriteContext::class_ref`].
    pub fn export_class_ref(
        &mut self,
        class: &str,
        class_import: Option<&str>,
        context: &str,
    ) -> PackageIndex {
        let recorded = class_import
            .and_then(|path| self.import_lookup.get(path).copied())
            .filter(|&i| import_class_identity(&self.imports, i).as_deref() == Some(class));
        match recorded {
            Some(i) => PackageIndex::from_import(i),
            None => self.class_ref(class, context),
        }
    }

    /// Reference for a class identity, adding imports when the class is new
    pub fn class_ref(&mut self, class: &str, context: &str) -> PackageIndex {
        if class.is_empty() || class == NONE_NAME {
            return PackageIndex::NULL;
        }
        if let Some(index) = PackageIndex::parse_placeholder(class) {
            return index;
        }
        if !class.contains('/') {
            if let Some(&i) = self.export_names.get(class) {
                return PackageIndex::from_export(i);
            }
            let qualified = format!("{}.{}", packages::ENGINE, class);
            return self.class_ref(&qualified, context);
        }
        if let Some(&i) = self.import_lookup.get(class) {
            return PackageIndex::from_import(i);
        }
        if let Some(&i) = self.class_aliases.get(class) {
            return PackageIndex::from_import(i);
        }

        let Some((package, name)) = class.rsplit_once('.') else {
            self.diagnostics.warn(
                DiagnosticKind::UnresolvedReference,
                context,
                format!("Class {} has no package, written as None", class),
            );
            return PackageIndex::NULL;
        };

        let package_index = match self.import_lookup.get(package) {
            Some(&i) => i,
            None => self.add_import(ImportDesc {
                class_package: packages::CORE_UOBJECT.to_string(),
                class_name: class_names::PACKAGE.to_string(),
                outer_index: 0,
                object_name: package.to_string(),
            }),
        };
        let class_index = self.add_import(ImportDesc {
            class_package: packages::CORE_UOBJECT.to_string(),
            class_name: class_names::CLASS.to_string(),
            outer_index: PackageIndex::from_import(package_index).0,
            object_name: name.to_string(),
        });
        self.class_aliases
            .entry(class.to_string())
            .or_insert(class_index);
        PackageIndex::from_import(class_index)
    }

    fn register_import_names(&mut self, import: &ImportDesc) {
        self.names.register(&import.class_package);
        self.names.register(&import.class_name);
        self.names.register(&import.object_name);
    }

    fn add_import(&mut self, import: ImportDesc) -> usize {
        self.register_import_names(&import);
        self.imports.push(import);
        let index = self.imports.len() - 1;
        let path = import_path(&self.imports, index);
        self.import_lookup.entry(path).or_insert(index);
        index
    }

    /// Import table entries; every name they use is already registered
    pub fn import_entries(&mut self) -> Vec<ImportEntry> {
        let imports = std::mem::take(&mut self.imports);
        let entries = imports
            .iter()
            .map(|import| ImportEntry {
                class_package: self.names.reference(&import.class_package),
                class_name: self.names.reference(&import.class_name),
                outer_index: PackageIndex(import.outer_index),
                object_name: self.names.reference(&import.object_name),
                extra: None,
            })
            .collect();
        self.imports = imports;
        entries
    }
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

    fn context() -> WriteContext {
        let mut ctx = WriteContext::new(8);
        ctx.seed_imports(&[
            import("/Script/CoreUObject", "Package", 0, "/Script/Engine"),
            import("/Script/CoreUObject", "Class", -1, "Actor"),
            import("/Script/CoreUObject", "Package", 0, "/Game/UI/WBP_Menu"),
            import("/Script/Engine", "WidgetBlueprintGeneratedClass", -3, "WBP_Menu_C"),
        ]);
        ctx.register_exports(["/Game/Pkg.Pkg", "/Game/Pkg.Pkg:WidgetTree"]);
        ctx
    }

    #[test]
    fn test_object_refs() {
        let mut ctx = context();
        assert_eq!(ctx.object_ref("None", "p"), PackageIndex::NULL);
        assert_eq!(ctx.object_ref("", "p"), PackageIndex::NULL);
        assert_eq!(ctx.object_ref("/Game/Pkg.Pkg:WidgetTree", "p"), PackageIndex(2));
        assert_eq!(ctx.object_ref("/Script/Engine.Actor", "p"), PackageIndex(-2));
        assert_eq!(ctx.object_ref("Import[40]", "p"), PackageIndex(-41));
        assert!(ctx.diagnostics.is_empty());

        assert_eq!(ctx.object_ref("/Game/Missing.Thing", "p"), PackageIndex::NULL);
        assert_eq!(ctx.diagnostics.count_of(DiagnosticKind::UnresolvedReference), 1);
    }

    #[test]
    fn test_class_refs_reuse_imports() {
        let mut ctx = context();
        assert_eq!(ctx.class_ref("/Script/Engine.Actor", "c"), PackageIndex(-2));
        // Normalized identity maps back to the original generated class import
        assert_eq!(ctx.class_ref("/Script/UMG.UserWidget", "c"), PackageIndex(-4));
        assert_eq!(ctx.class_ref("WidgetTree", "c"), PackageIndex(2));
        assert_eq!(ctx.imports().len(), 4);
    }

    #[test]
    fn test_export_class_ref_prefers_recorded_import() {
        let mut ctx = context();
        ctx.seed_imports(&[
            import("/Script/CoreUObject", "Package", 0, "/Game/UI/WBP_Pause"),
            import("/Script/Engine", "WidgetBlueprintGeneratedClass", -5, "WBP_Pause_C"),
        ]);
        let widget = "/Script/UMG.UserWidget";
        assert_eq!(ctx.class_ref(widget, "c"), PackageIndex(-4));
        assert_eq!(
            ctx.export_class_ref(widget, Some("/Game/UI/WBP_Pause.WBP_Pause_C"), "c"),
            PackageIndex(-6)
        );
        // An edited class no longer matches the recorded import
        assert_eq!(
            ctx.export_class_ref("/Script/Engine.Actor", Some("/Game/UI/WBP_Pause.WBP_Pause_C"), "c"),
            PackageIndex(-2)
        );
        assert_eq!(ctx.export_class_ref(widget, Some("/Game/Gone.Gone_C"), "c"), PackageIndex(-4));
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn test_class_refs_add_imports() {
        let mut ctx = context();
        let index = ctx.class_ref("/Script/UMG.CanvasPanel", "c");
        assert_eq!(index, PackageIndex(-6));
        let imports = ctx.imports();
        assert_eq!(imports.len(), 6);
        assert_eq!(imports[4].object_name, "/Script/UMG");
        assert_eq!(imports[4].class_name, "Package");
        assert_eq!(imports[5].object_name, "CanvasPanel");
        assert_eq!(imports[5].outer_index, -5);

        // Second lookup reuses the new import
        assert_eq!(ctx.class_ref("/Script/UMG.CanvasPanel", "c"), index);
        // Existing package import is reused for a sibling class
        let sibling = ctx.class_ref("/Script/Engine.Pawn", "c");
        assert_eq!(sibling, PackageIndex(-7));
        assert_eq!(ctx.imports()[6].outer_index, -1);
    }

    #[test]
    fn test_import_entries_use_registered_names() {
        let mut ctx = context();
        ctx.class_ref("/Script/UMG.TextBlock", "c");
        let before = ctx.names.len();
        let entries = ctx.import_entries();
        assert_eq!(ctx.names.len(), before);
        assert_eq!(entries.len(), ctx.imports().len());
        assert_eq!(entries[5].outer_index, PackageIndex(-5));
    }
}
