//! Import repair table
//!
//! Some producers write import entries whose class package is a placeholder
//! or whose strings still contain unexpanded template markers. The table
//! below recognizes those entries and maps them onto a known script package
//! chosen by class family. It is a lookup, not a parser: anything it does
//! not recognize is left alone.

use uasset_core::constants::{class_names, is_ui_widget_class, packages};

/// A class family and the script package it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassFamily {
    /// Member of the UI widget allowlist
    UiWidget,
    /// Class name contains the given substring
    Containing(&'static str),
}

impl ClassFamily {
    fn matches(&self, class: &str) -> bool {
        match self {
            ClassFamily::UiWidget => is_ui_widget_class(class),
            ClassFamily::Containing(needle) => class.contains(needle),
        }
    }
}

/// Result of a successful repair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFix {
    pub class_package: String,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRepairTable {
    /// Package strings that stand in for a missing value
    pub placeholder_packages: Vec<&'static str>,
    /// Substrings that mark an unexpanded template or resource reference
    pub markers: Vec<&'static str>,
    /// Checked in order; first match wins
    pub families: Vec<(ClassFamily, &'static str)>,
    pub default_package: &'static str,
    /// Replacement for a class string that is itself mangled
    pub fallback_class: &'static str,
}

impl Default for ImportRepairTable {
    fn default() -> Self {
        Self {
            placeholder_packages: vec!["", "None", "/Script/None"],
            markers: vec!["$(", "%", "TEXT(", "{{"],
            families: vec![
                (ClassFamily::UiWidget, packages::UMG),
                (ClassFamily::Containing("Blueprint"), packages::ENGINE),
            ],
            default_package: packages::CORE_UOBJECT,
            fallback_class: class_names::CLASS,
        }
    }
}

impl ImportRepairTable {
    fn has_marker(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m))
    }

    /// Whether a package string needs repair
    pub fn is_mangled_package(&self, package: &str) -> bool {
        self.placeholder_packages.contains(&package) || self.has_marker(package)
    }

    /// Whether a class string needs repair
    pub fn is_mangled_class(&self, class: &str) -> bool {
        class.is_empty() || self.has_marker(class)
    }

    /// Script package for a class name
    pub fn package_for_class(&self, class: &str) -> &'static str {
        self.families
            .iter()
            .find(|(family, _)| family.matches(class))
            .map(|(_, package)| *package)
            .unwrap_or(self.default_package)
    }

    /// Rewrite a (package, class) pair, or `None` if it looks fine
    pub fn repair(&self, raw_package: &str, raw_class: &str) -> Option<ImportFix> {
        let class_mangled = self.is_mangled_class(raw_class);
        if !self.is_mangled_package(raw_package) && !class_mangled {
            return None;
        }

        let class_name = if class_mangled {
            self.fallback_class
        } else {
            raw_class
        };

        Some(ImportFix {
            class_package: self.package_for_class(class_name).to_string(),
            class_name: class_name.to_string(),
        })
    }
}
