//! Serialized form of a compiled schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Schema name.
    #[serde(default)]
    pub name: String,
    /// Schema version.
    #[serde(default)]
    pub version: Option<String>,
    /// Slots keyed by canonical name.
    #[serde(default)]
    pub slots: IndexMap<String, SlotDocument>,
    /// Enumerations keyed by name.
    #[serde(default)]
    pub enums: IndexMap<String, EnumDocument>,
    /// Per-package settings keyed by package name.
    #[serde(default)]
    pub packages: IndexMap<String, PackageDocument>,
}

/// One slot in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotDocument {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preferred_unit: Option<String>,
}

/// One enumeration in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDocument {
    pub permissible_values: PermissibleValues,
}

/// Permissible values, either as a plain list or as a map keyed by value
/// (the compiled LinkML form, whose per-value metadata is ignored).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissibleValues {
    List(Vec<String>),
    Map(IndexMap<String, serde_json::Value>),
}

impl PermissibleValues {
    pub fn into_values(self) -> Vec<String> {
        match self {
            PermissibleValues::List(values) => values,
            PermissibleValues::Map(map) => map.into_keys().collect(),
        }
    }
}

/// Package-specific overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDocument {
    /// Slot name to enumeration name, replacing the slot's own range when
    /// the sample belongs to this package.
    #[serde(default)]
    pub enum_overrides: IndexMap<String, String>,
}
