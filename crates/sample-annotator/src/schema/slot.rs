//! Slot and enumeration definitions.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared value range of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRange {
    /// Free text.
    Text,
    /// A named enumeration of permissible values.
    Enumeration(String),
    /// A measurement.
    Quantity,
    /// An ontology term reference.
    ControlledTerm,
    /// A coordinate pair.
    Geolocation,
    /// A point in time.
    Timestamp,
}

impl SlotRange {
    /// Resolve a range name from a schema document.
    ///
    /// `is_enum` reports whether the name refers to a declared enumeration.
    /// Primitive and unrecognized class ranges fall back to `Text`.
    pub fn resolve(name: Option<&str>, is_enum: impl Fn(&str) -> bool) -> Self {
        let Some(name) = name else {
            return SlotRange::Text;
        };
        let local = name.rsplit(':').next().unwrap_or(name);
        match local {
            "QuantityValue" => SlotRange::Quantity,
            "ControlledTermValue" | "ControlledIdentifiedTermValue" => SlotRange::ControlledTerm,
            "GeolocationValue" => SlotRange::Geolocation,
            "TimestampValue" | "datetime" | "date" => SlotRange::Timestamp,
            other if is_enum(other) => SlotRange::Enumeration(other.to_string()),
            _ => SlotRange::Text,
        }
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self, SlotRange::Enumeration(_))
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRange::Text => f.write_str("TextValue"),
            SlotRange::Enumeration(name) => f.write_str(name),
            SlotRange::Quantity => f.write_str("QuantityValue"),
            SlotRange::ControlledTerm => f.write_str("ControlledTermValue"),
            SlotRange::Geolocation => f.write_str("GeolocationValue"),
            SlotRange::Timestamp => f.write_str("TimestampValue"),
        }
    }
}

/// A named, typed field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDefinition {
    /// Canonical field name (underscore form).
    pub name: String,
    /// Alternative names accepted for this field.
    pub aliases: Vec<String>,
    /// Declared range.
    pub range: SlotRange,
    /// Whether the field is required.
    pub required: bool,
    /// Description of the field.
    pub description: Option<String>,
    /// Unit assumed for bare numbers in this field.
    pub preferred_unit: Option<String>,
}

impl SlotDefinition {
    /// Create a new slot with a range.
    pub fn new(name: impl Into<String>, range: SlotRange) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            range,
            required: false,
            description: None,
            preferred_unit: None,
        }
    }

    /// Add aliases.
    pub fn with_aliases(mut self, aliases: Vec<&str>) -> Self {
        self.aliases = aliases.into_iter().map(String::from).collect();
        self
    }

    /// Mark the slot as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the preferred unit.
    pub fn with_preferred_unit(mut self, unit: impl Into<String>) -> Self {
        self.preferred_unit = Some(unit.into());
        self
    }
}

/// A closed set of permissible raw-text values.
#[derive(Debug, Clone, Serialize)]
pub struct Enumeration {
    /// Enumeration name as declared in the schema.
    pub name: String,
    /// Permissible values in declaration order.
    pub permissible_values: Vec<String>,
    #[serde(skip)]
    lookup: HashSet<String>,
}

impl Enumeration {
    /// Create an enumeration from its values.
    pub fn new(
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let permissible_values: Vec<String> = values.into_iter().map(Into::into).collect();
        let lookup = permissible_values.iter().cloned().collect();
        Self {
            name: name.into(),
            permissible_values,
            lookup,
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, value: &str) -> bool {
        self.lookup.contains(value)
    }

    pub fn len(&self) -> usize {
        self.permissible_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissible_values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ranges() {
        let is_enum = |n: &str| n == "RelToOxygenEnum";
        assert_eq!(SlotRange::resolve(Some("QuantityValue"), is_enum), SlotRange::Quantity);
        assert_eq!(
            SlotRange::resolve(Some("nmdc:GeolocationValue"), is_enum),
            SlotRange::Geolocation
        );
        assert_eq!(
            SlotRange::resolve(Some("RelToOxygenEnum"), is_enum),
            SlotRange::Enumeration("RelToOxygenEnum".to_string())
        );
        assert_eq!(SlotRange::resolve(Some("float"), is_enum), SlotRange::Text);
        assert_eq!(SlotRange::resolve(None, is_enum), SlotRange::Text);
    }

    #[test]
    fn test_enumeration_is_case_sensitive() {
        let e = Enumeration::new("RelToOxygenEnum", ["aerobe", "anaerobe"]);
        assert!(e.contains("aerobe"));
        assert!(!e.contains("Aerobe"));
        assert!(!e.contains("Aerobic"));
    }
}
