//! Read-only schema lookups.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{AnnotatorError, Result};

use super::document::SchemaDocument;
use super::package::package_key;
use super::slot::{Enumeration, SlotDefinition, SlotRange};

/// Schema shipped with the crate.
const BUNDLED_SCHEMA: &str = include_str!("../../schema/biosample.json");

/// Slot whose declared range is not `QuantityValue` but which always holds a
/// measurement.
const DEPTH_SLOT: &str = "depth";

static BUNDLED: OnceCell<Arc<SchemaIndex>> = OnceCell::new();

/// Normalize a field name to underscore form.
pub fn normalize_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Immutable index over a compiled schema.
#[derive(Debug)]
pub struct SchemaIndex {
    name: String,
    version: Option<String>,
    digest: String,
    slots: IndexMap<String, SlotDefinition>,
    /// Alias (raw and underscore forms) to canonical slot name.
    aliases: HashMap<String, String>,
    enums: IndexMap<String, Enumeration>,
    /// Package key to slot name to enumeration name.
    package_enums: HashMap<String, HashMap<String, String>>,
}

impl SchemaIndex {
    /// The bundled schema, parsed on first use and shared for the process
    /// lifetime.
    pub fn bundled() -> Result<Arc<SchemaIndex>> {
        BUNDLED
            .get_or_try_init(|| Self::from_json_str(BUNDLED_SCHEMA).map(Arc::new))
            .cloned()
    }

    /// Load a schema document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AnnotatorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse a schema document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        let digest = format!("sha256:{:x}", hasher.finalize());
        Self::from_document(document, digest)
    }

    /// Build the index from a parsed document.
    pub fn from_document(document: SchemaDocument, digest: impl Into<String>) -> Result<Self> {
        if document.slots.is_empty() {
            return Err(AnnotatorError::Schema(format!(
                "schema '{}' defines no slots",
                document.name
            )));
        }

        let mut enums = IndexMap::new();
        for (name, doc) in document.enums {
            let values = doc.permissible_values.into_values();
            if values.is_empty() {
                return Err(AnnotatorError::Schema(format!(
                    "enumeration '{}' has no permissible values",
                    name
                )));
            }
            enums.insert(name.clone(), Enumeration::new(name, values));
        }

        let mut slots = IndexMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();
        for (raw_name, doc) in document.slots {
            let name = normalize_name(&raw_name);
            let range = SlotRange::resolve(doc.range.as_deref(), |n| enums.contains_key(n));
            if let Some(declared) = doc.range.as_deref() {
                if range == SlotRange::Text && declared.ends_with("Enum") {
                    return Err(AnnotatorError::Schema(format!(
                        "slot '{}' references undefined enumeration '{}'",
                        name, declared
                    )));
                }
            }

            for alias in &doc.aliases {
                for key in [alias.trim().to_string(), normalize_name(alias)] {
                    match aliases.get(&key) {
                        Some(existing) if existing != &name => {
                            warn!(
                                alias = %key,
                                kept = %existing,
                                ignored = %name,
                                "duplicate slot alias"
                            );
                        }
                        Some(_) => {}
                        None => {
                            aliases.insert(key, name.clone());
                        }
                    }
                }
            }

            slots.insert(
                name.clone(),
                SlotDefinition {
                    name,
                    aliases: doc.aliases,
                    range,
                    required: doc.required,
                    description: doc.description,
                    preferred_unit: doc.preferred_unit,
                },
            );
        }

        let mut package_enums = HashMap::new();
        for (package, doc) in document.packages {
            let mut overrides = HashMap::new();
            for (slot, enum_name) in doc.enum_overrides {
                if !enums.contains_key(&enum_name) {
                    return Err(AnnotatorError::Schema(format!(
                        "package '{}' overrides '{}' with undefined enumeration '{}'",
                        package, slot, enum_name
                    )));
                }
                overrides.insert(normalize_name(&slot), enum_name);
            }
            package_enums.insert(package_key(&package), overrides);
        }

        let index = Self {
            name: document.name,
            version: document.version,
            digest: digest.into(),
            slots,
            aliases,
            enums,
            package_enums,
        };
        info!(
            schema = %index.name,
            slots = index.slots.len(),
            enums = index.enums.len(),
            digest = %index.digest,
            "schema loaded"
        );
        Ok(index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `sha256:<hex>` digest of the source document.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Look up a slot by name, optionally falling back to aliases.
    pub fn get_slot(&self, name: &str, use_aliases: bool) -> Option<&SlotDefinition> {
        let normalized = normalize_name(name);
        if let Some(slot) = self.slots.get(&normalized) {
            return Some(slot);
        }
        if !use_aliases {
            return None;
        }
        let canonical = self
            .aliases
            .get(&normalized)
            .or_else(|| self.aliases.get(&normalized.replace('_', " ")))?;
        debug!(field = name, canonical = %canonical, "resolved slot alias");
        self.slots.get(canonical)
    }

    /// Declared range of a slot.
    pub fn get_range(&self, name: &str) -> Option<&SlotRange> {
        self.get_slot(name, false).map(|s| &s.range)
    }

    /// True if the slot holds a measurement. `depth` always does.
    pub fn is_measurement_field(&self, name: &str) -> bool {
        if normalize_name(name) == DEPTH_SLOT {
            return true;
        }
        matches!(self.get_range(name), Some(SlotRange::Quantity))
    }

    /// Enumeration for the slot's range, if the range is an enumeration.
    pub fn get_enumerations(&self, name: &str) -> Option<&Enumeration> {
        match self.get_range(name)? {
            SlotRange::Enumeration(enum_name) => self.enums.get(enum_name),
            _ => None,
        }
    }

    /// Enumeration for a slot in the context of an environmental package.
    ///
    /// A package override takes precedence over the slot's own range.
    pub fn get_enumerations_for(&self, name: &str, package: Option<&str>) -> Option<&Enumeration> {
        let slot = self.get_slot(name, false)?;
        if let Some(overrides) = package.and_then(|p| self.package_enums.get(&package_key(p))) {
            if let Some(enum_name) = overrides.get(&slot.name) {
                return self.enums.get(enum_name);
            }
        }
        self.get_enumerations(&slot.name)
    }

    /// Enumeration by its own name.
    pub fn enumeration(&self, enum_name: &str) -> Option<&Enumeration> {
        self.enums.get(enum_name)
    }

    /// All slots, in document order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotDefinition> {
        self.slots.values()
    }

    /// Slots marked required.
    pub fn required_slots(&self) -> impl Iterator<Item = &SlotDefinition> {
        self.slots.values().filter(|s| s.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_SCHEMA: &str = r#"{
        "name": "test",
        "slots": {
            "lat_lon": {"range": "GeolocationValue", "aliases": ["latitude and longitude"], "required": true},
            "depth": {"range": "TextValue"},
            "temp": {"range": "QuantityValue", "aliases": ["temperature"], "preferred_unit": "degree Celsius"},
            "rel_to_oxygen": {"range": "RelToOxygenEnum", "aliases": ["oxygen_relationship"]},
            "cur_land_use": {"range": "string"}
        },
        "enums": {
            "RelToOxygenEnum": {"permissible_values": {"aerobe": {}, "anaerobe": {}}},
            "SoilLandUseEnum": {"permissible_values": ["farmstead", "rangeland"]}
        },
        "packages": {
            "soil": {"enum_overrides": {"cur_land_use": "SoilLandUseEnum"}}
        }
    }"#;

    fn index() -> SchemaIndex {
        SchemaIndex::from_json_str(SMALL_SCHEMA).unwrap()
    }

    #[test]
    fn test_exact_lookup_normalizes_spaces() {
        let idx = index();
        assert_eq!(idx.get_slot("lat lon", false).unwrap().name, "lat_lon");
        assert!(idx.get_slot("temperature", false).is_none());
    }

    #[test]
    fn test_alias_lookup_both_ways() {
        let idx = index();
        assert_eq!(idx.get_slot("temperature", true).unwrap().name, "temp");
        assert_eq!(idx.get_slot("latitude_and_longitude", true).unwrap().name, "lat_lon");
        assert_eq!(idx.get_slot("latitude and longitude", true).unwrap().name, "lat_lon");
        assert_eq!(idx.get_slot("oxygen relationship", true).unwrap().name, "rel_to_oxygen");
        assert!(idx.get_slot("no_such_field", true).is_none());
    }

    #[test]
    fn test_depth_is_always_a_measurement() {
        let idx = index();
        assert_eq!(idx.get_range("depth"), Some(&SlotRange::Text));
        assert!(idx.is_measurement_field("depth"));
        assert!(idx.is_measurement_field("temp"));
        assert!(!idx.is_measurement_field("lat_lon"));
        assert!(!idx.is_measurement_field("unknown"));
    }

    #[test]
    fn test_enumerations() {
        let idx = index();
        let e = idx.get_enumerations("rel_to_oxygen").unwrap();
        assert!(e.contains("aerobe"));
        assert!(idx.get_enumerations("temp").is_none());
        assert!(idx.get_enumerations("missing").is_none());
    }

    #[test]
    fn test_package_enum_override() {
        let idx = index();
        assert!(idx.get_enumerations_for("cur_land_use", None).is_none());
        assert!(idx.get_enumerations_for("cur_land_use", Some("water")).is_none());
        let e = idx.get_enumerations_for("cur_land_use", Some("Soil")).unwrap();
        assert_eq!(e.name, "SoilLandUseEnum");
    }

    #[test]
    fn test_rejects_undefined_enum() {
        let json = r#"{"slots": {"x": {"range": "MissingEnum"}}}"#;
        assert!(matches!(
            SchemaIndex::from_json_str(json),
            Err(AnnotatorError::Schema(_))
        ));
    }

    #[test]
    fn test_rejects_empty_schema() {
        assert!(SchemaIndex::from_json_str(r#"{"name": "empty"}"#).is_err());
        assert!(SchemaIndex::from_json_str("not json").is_err());
    }

    #[test]
    fn test_digest_is_stable() {
        let a = index();
        let b = index();
        assert!(a.digest().starts_with("sha256:"));
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_bundled_schema_is_shared() {
        let a = SchemaIndex::bundled().unwrap();
        let b = SchemaIndex::bundled().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.get_slot("lat_lon", false).is_some());
    }
}
