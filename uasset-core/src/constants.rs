//! Constants and lookup tables shared by the decoder and the writer
//!
//! The class tables here drive class-identity resolution and import repair.
//! They are plain data so a caller can swap them out without touching the
//! decoding logic.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Sentinel name that terminates a property stream and stands in for "no name"
pub const NONE_NAME: &str = "None";

/// Default width of one base64 line inside a raw data block
pub const DEFAULT_CHUNK_WIDTH: usize = 76;

/// Well-known script packages
pub mod packages {
    pub const CORE_UOBJECT: &str = "/Script/CoreUObject";
    pub const ENGINE: &str = "/Script/Engine";
    pub const UMG: &str = "/Script/UMG";
    pub const BLUEPRINT_GRAPH: &str = "/Script/BlueprintGraph";
    pub const UNREAL_ED: &str = "/Script/UnrealEd";
    pub const UMG_EDITOR: &str = "/Script/UMGEditor";
}

/// Class names used when building imports
pub mod class_names {
    pub const CLASS: &str = "Class";
    pub const PACKAGE: &str = "Package";
    pub const OBJECT: &str = "Object";
    pub const USER_WIDGET: &str = "UserWidget";
    pub const BLUEPRINT_GENERATED_CLASS: &str = "BlueprintGeneratedClass";
    pub const WIDGET_BLUEPRINT_GENERATED_CLASS: &str = "WidgetBlueprintGeneratedClass";
    pub const FUNCTION: &str = "Function";
    pub const SCENE_COMPONENT: &str = "SceneComponent";
}

/// Object name prefixes that never appear in a logical object path
pub mod prefixes {
    /// Generated event-graph function
    pub const UBERGRAPH: &str = "ExecuteUbergraph_";
    /// Class default object
    pub const CLASS_DEFAULT_OBJECT: &str = "Default__";
}

/// Root container of a widget hierarchy
pub const WIDGET_TREE_NAME: &str = "WidgetTree";

/// Suffix of compiled (generated) class exports
pub const GENERATED_CLASS_SUFFIX: &str = "_C";

/// Names of the synthesized blueprint sub-objects
pub mod scaffolding {
    pub const CONSTRUCTION_SCRIPT: &str = "UserConstructionScript";
    pub const SCENE_ROOT: &str = "DefaultSceneRoot";
}

/// Names every written package needs regardless of content
pub const BOOTSTRAP_NAMES: &[&str] = &[
    NONE_NAME,
    packages::CORE_UOBJECT,
    class_names::CLASS,
    class_names::PACKAGE,
    class_names::OBJECT,
];

/// UI widget classes that always live in the UMG script package
pub const UI_WIDGET_CLASSES: &[&str] = &[
    "Border",
    "Button",
    "CanvasPanel",
    "CanvasPanelSlot",
    "CheckBox",
    "CircularThrobber",
    "ComboBoxString",
    "EditableText",
    "EditableTextBox",
    "GridPanel",
    "GridSlot",
    "HorizontalBox",
    "HorizontalBoxSlot",
    "Image",
    "ListView",
    "MultiLineEditableTextBox",
    "NamedSlot",
    "Overlay",
    "OverlaySlot",
    "ProgressBar",
    "RetainerBox",
    "RichTextBlock",
    "ScaleBox",
    "ScrollBox",
    "ScrollBoxSlot",
    "SizeBox",
    "SizeBoxSlot",
    "Slider",
    "Spacer",
    "SpinBox",
    "TextBlock",
    "Throbber",
    "TileView",
    "UniformGridPanel",
    "UniformGridSlot",
    "VerticalBox",
    "VerticalBoxSlot",
    "WidgetAnimation",
    "WidgetSwitcher",
    "WidgetSwitcherSlot",
    "WidgetTree",
    "WrapBox",
    "WrapBoxSlot",
];

static UI_WIDGET_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| UI_WIDGET_CLASSES.iter().copied().collect());

/// Check whether a class name is on the UI widget allowlist
pub fn is_ui_widget_class(name: &str) -> bool {
    UI_WIDGET_SET.contains(name)
}

/// How a [`ClassRule`] matches a class name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Prefix(&'static str),
    Suffix(&'static str),
    Contains(&'static str),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Prefix(p) => name.starts_with(p),
            NameMatch::Suffix(s) => name.ends_with(s),
            NameMatch::Contains(c) => name.contains(c),
        }
    }
}

/// What a matching [`ClassRule`] resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassTarget {
    /// Keep the class name, place it in this package
    Package(&'static str),
    /// Replace the class with a fixed `package.Class` identity
    Fixed(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRule {
    pub pattern: NameMatch,
    pub target: ClassTarget,
}

/// Generated and user classes, mapped onto their engine equivalents
pub const GENERATED_CLASS_RULES: &[ClassRule] = &[
    ClassRule {
        pattern: NameMatch::Prefix("WBP_"),
        target: ClassTarget::Fixed(packages::UMG, class_names::USER_WIDGET),
    },
    ClassRule {
        pattern: NameMatch::Prefix("W_"),
        target: ClassTarget::Fixed(packages::UMG, class_names::USER_WIDGET),
    },
    ClassRule {
        pattern: NameMatch::Suffix(GENERATED_CLASS_SUFFIX),
        target: ClassTarget::Fixed(packages::ENGINE, class_names::BLUEPRINT_GENERATED_CLASS),
    },
];

/// Graph nodes and editor graphs, mapped to their owning module
pub const GRAPH_CLASS_RULES: &[ClassRule] = &[
    ClassRule {
        pattern: NameMatch::Prefix("K2Node_"),
        target: ClassTarget::Package(packages::BLUEPRINT_GRAPH),
    },
    ClassRule {
        pattern: NameMatch::Prefix("EdGraphSchema_K2"),
        target: ClassTarget::Package(packages::BLUEPRINT_GRAPH),
    },
    ClassRule {
        pattern: NameMatch::Prefix("EdGraph"),
        target: ClassTarget::Package(packages::ENGINE),
    },
    ClassRule {
        pattern: NameMatch::Prefix("MaterialGraph"),
        target: ClassTarget::Package(packages::UNREAL_ED),
    },
    ClassRule {
        pattern: NameMatch::Prefix("WidgetGraph"),
        target: ClassTarget::Package(packages::UMG_EDITOR),
    },
];

/// Check whether a class is blueprint-like and should get synthesized scaffolding
pub fn is_blueprint_like_class(class_name: &str) -> bool {
    class_name.contains("Blueprint") && !class_name.contains("WidgetBlueprint")
}
