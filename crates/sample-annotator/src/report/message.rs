//! Diagnostic messages produced while annotating a sample.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed taxonomy of message categories.
///
/// `Inapplicable` and `BadNull` have no producer among the current stages;
/// they are reserved for checks that flag values used outside their package
/// and non-standard null tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Sample identifier problems.
    Identifier,
    /// A core field is missing.
    MissingCore,
    /// Value not in the permissible set.
    ControlledVocabulary,
    /// Measurement text could not be parsed cleanly.
    MeasurementSyntax,
    /// Unit missing or guessed.
    Units,
    /// Field name not in the schema, or rewritten to its canonical name.
    UnknownField,
    /// Field does not apply to the sample's package.
    Inapplicable,
    /// Non-standard null value.
    BadNull,
    /// Geolocation problems and findings.
    Geo,
    /// Pipeline-level failures.
    Core,
    /// Anything else.
    Unclassified,
}

impl Category {
    /// Stable name used in tabular exports.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Identifier => "Identifier",
            Category::MissingCore => "MissingCore",
            Category::ControlledVocabulary => "ControlledVocabulary",
            Category::MeasurementSyntax => "MeasurementSyntax",
            Category::Units => "Units",
            Category::UnknownField => "UnknownField",
            Category::Inapplicable => "Inapplicable",
            Category::BadNull => "BadNull",
            Category::Geo => "Geo",
            Category::Core => "Core",
            Category::Unclassified => "Unclassified",
        }
    }

    /// All categories, in declaration order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Identifier,
            Category::MissingCore,
            Category::ControlledVocabulary,
            Category::MeasurementSyntax,
            Category::Units,
            Category::UnknownField,
            Category::Inapplicable,
            Category::BadNull,
            Category::Geo,
            Category::Core,
            Category::Unclassified,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-negative severity ordinal. Zero means informational.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Severity(pub u8);

impl Severity {
    /// No issue; informational only.
    pub const INFO: Severity = Severity(0);
    /// Minor issue, usually already repaired.
    pub const LOW: Severity = Severity(1);
    /// Issue that needs review.
    pub const MEDIUM: Severity = Severity(2);
    /// Issue that blocks the sample from passing review.
    pub const HIGH: Severity = Severity(3);

    /// True for anything above informational.
    pub fn is_issue(&self) -> bool {
        self.0 > 0
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self.0 {
            0 => "Info",
            1 => "Low",
            2 => "Medium",
            _ => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the condition a message reports was repaired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    /// The annotator changed the value to fix the condition.
    Repaired,
    /// The condition was left as found.
    NotRepaired,
    /// Repair is not meaningful for this message.
    #[default]
    NotApplicable,
}

impl RepairStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RepairStatus::Repaired => "true",
            RepairStatus::NotRepaired => "false",
            RepairStatus::NotApplicable => "",
        }
    }
}

impl From<Option<bool>> for RepairStatus {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => RepairStatus::Repaired,
            Some(false) => RepairStatus::NotRepaired,
            None => RepairStatus::NotApplicable,
        }
    }
}

/// One diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Human-readable description.
    pub description: String,
    /// Severity ordinal.
    pub severity: Severity,
    /// Category from the closed taxonomy.
    pub category: Category,
    /// Repair state.
    #[serde(default)]
    pub repaired: RepairStatus,
    /// Field the message refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Message {
    /// Create a new message.
    pub fn new(category: Category, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity,
            category,
            repaired: RepairStatus::NotApplicable,
            field: None,
        }
    }

    /// Informational message (severity 0).
    pub fn info(category: Category, description: impl Into<String>) -> Self {
        Self::new(category, Severity::INFO, description)
    }

    /// Attach a field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attach an optional field name.
    pub fn with_field_opt(mut self, field: Option<&str>) -> Self {
        self.field = field.map(str::to_string);
        self
    }

    /// Mark the condition as repaired.
    pub fn repaired(mut self) -> Self {
        self.repaired = RepairStatus::Repaired;
        self
    }

    /// Mark the condition as left unrepaired.
    pub fn unrepaired(mut self) -> Self {
        self.repaired = RepairStatus::NotRepaired;
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "[{}:{}] {}: {}",
                self.category, self.severity, field, self.description
            ),
            None => write!(f, "[{}:{}] {}", self.category, self.severity, self.description),
        }
    }
}
