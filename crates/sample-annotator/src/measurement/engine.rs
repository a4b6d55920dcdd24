//! Measurement repair: turn a raw field value into a [`QuantityValue`].

use std::collections::HashMap;

use tracing::debug;

use crate::report::{AnnotationReport, Category, Message, Severity};
use crate::sample::{QuantityValue, Value, format_number};

use super::extract::{Extraction, extract_quantities};
use super::units::UNIT_OVERRIDES;

/// Parses measurement values and records what it did on a report.
#[derive(Debug, Clone)]
pub struct MeasurementEngine {
    /// Detected unit name to corrected unit name.
    overrides: HashMap<String, String>,
}

impl MeasurementEngine {
    /// Create an engine with the built-in unit corrections.
    pub fn new() -> Self {
        Self {
            overrides: UNIT_OVERRIDES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Create an engine that accepts detected units as-is.
    pub fn without_overrides() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Add or replace a unit correction.
    pub fn with_override(
        mut self,
        detected: impl Into<String>,
        corrected: impl Into<String>,
    ) -> Self {
        self.overrides.insert(detected.into(), corrected.into());
        self
    }

    /// The correction applied to `unit`, if any.
    pub fn corrected_unit(&self, unit: &str) -> Option<&str> {
        self.overrides.get(unit).map(String::as_str)
    }

    /// Run the extraction heuristic without corrections or logging.
    pub fn extract(&self, text: &str) -> Vec<Extraction> {
        extract_quantities(text)
    }

    /// Repair a measurement value.
    ///
    /// Returns `None` when nothing numeric could be found; the caller decides
    /// what to do with the original value.
    pub fn repair(
        &self,
        value: &Value,
        default_unit: Option<&str>,
        report: &mut AnnotationReport,
    ) -> Option<QuantityValue> {
        self.repair_field(None, value, default_unit, report)
    }

    /// Like [`repair`](Self::repair), tagging every message with `field`.
    pub fn repair_field(
        &self,
        field: Option<&str>,
        value: &Value,
        default_unit: Option<&str>,
        report: &mut AnnotationReport,
    ) -> Option<QuantityValue> {
        match value {
            Value::Quantity(q) if q.is_incomplete() => {
                report.add_message(
                    Message::new(
                        Category::MeasurementSyntax,
                        Severity::LOW,
                        format!("incomplete info in quantity value '{}'", value),
                    )
                    .with_field_opt(field),
                );
                let raw = q.raw_value.as_deref()?;
                self.repair_text(field, raw, default_unit, report)
            }
            Value::Quantity(q) => Some(self.complete_quantity(field, q, default_unit, report)),
            Value::Number(n) => Some(self.bare_number(field, *n, None, default_unit, report)),
            Value::List(_) | Value::Null => None,
            other => {
                let text = other.as_text()?;
                self.repair_text(field, &text, default_unit, report)
            }
        }
    }

    fn repair_text(
        &self,
        field: Option<&str>,
        raw: &str,
        default_unit: Option<&str>,
        report: &mut AnnotationReport,
    ) -> Option<QuantityValue> {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Some(self.bare_number(field, n, Some(trimmed), default_unit, report));
            }
        }

        let Some(found) = extract_quantities(trimmed).into_iter().next() else {
            debug!(field = field.unwrap_or(""), raw = trimmed, "no quantity found");
            return None;
        };

        let Some(detected) = found.unit else {
            if let Some(token) = &found.unit_text {
                report.add_message(
                    Message::new(
                        Category::Units,
                        Severity::MEDIUM,
                        format!("unrecognized unit '{}' in '{}'", token, trimmed),
                    )
                    .with_field_opt(field)
                    .unrepaired(),
                );
                return Some(quantity_from(&found, None).with_raw_value(trimmed));
            }
            return Some(match found.value {
                Some(n) => self.bare_number(field, n, Some(trimmed), default_unit, report),
                None => {
                    match default_unit {
                        Some(unit) => report.add_message(adding_default_unit(field, unit, trimmed)),
                        None => report.add_message(missing_unit(field, trimmed)),
                    }
                    quantity_from(&found, default_unit.map(str::to_string)).with_raw_value(trimmed)
                }
            });
        };

        let mut description = String::new();
        let unit = match self.corrected_unit(detected) {
            Some(corrected) => {
                description = format!(" (unit '{}' read as '{}')", detected, corrected);
                corrected.to_string()
            }
            None => detected.to_string(),
        };
        let quantity = quantity_from(&found, Some(unit)).with_raw_value(trimmed);
        report.add_message(
            Message::new(
                Category::MeasurementSyntax,
                Severity::INFO,
                format!("parsed unit-value: '{}' -> {}{}", trimmed, quantity, description),
            )
            .with_field_opt(field)
            .repaired(),
        );
        debug!(
            field = field.unwrap_or(""),
            raw = trimmed,
            parsed = %quantity,
            "parsed measurement"
        );
        Some(quantity)
    }

    fn complete_quantity(
        &self,
        field: Option<&str>,
        quantity: &QuantityValue,
        default_unit: Option<&str>,
        report: &mut AnnotationReport,
    ) -> QuantityValue {
        let mut quantity = quantity.clone();
        match quantity.unit.clone() {
            Some(unit) => {
                if let Some(corrected) = self.corrected_unit(&unit) {
                    report.add_message(
                        Message::new(
                            Category::Units,
                            Severity::LOW,
                            format!("unit '{}' read as '{}'", unit, corrected),
                        )
                        .with_field_opt(field)
                        .repaired(),
                    );
                    quantity.unit = Some(corrected.to_string());
                }
            }
            None => match default_unit {
                Some(unit) => {
                    report.add_message(adding_default_unit(field, unit, &quantity.to_string()));
                    quantity.unit = Some(unit.to_string());
                }
                None => report.add_message(missing_unit(field, &quantity.to_string())),
            },
        }
        quantity
    }

    fn bare_number(
        &self,
        field: Option<&str>,
        n: f64,
        raw: Option<&str>,
        default_unit: Option<&str>,
        report: &mut AnnotationReport,
    ) -> QuantityValue {
        let raw = raw.map(str::to_string).unwrap_or_else(|| format_number(n));
        match default_unit {
            Some(unit) => {
                report.add_message(adding_default_unit(field, unit, &raw));
                QuantityValue::new(n, Some(unit.to_string())).with_raw_value(raw)
            }
            None => {
                report.add_message(missing_unit(field, &raw));
                QuantityValue::new(n, None).with_raw_value(raw)
            }
        }
    }
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn quantity_from(found: &Extraction, unit: Option<String>) -> QuantityValue {
    match (found.value, found.minimum, found.maximum) {
        (_, Some(lo), Some(hi)) => QuantityValue::bounded(lo, hi, unit),
        (Some(v), _, _) => QuantityValue::new(v, unit),
        _ => QuantityValue {
            unit,
            ..QuantityValue::default()
        },
    }
}

fn adding_default_unit(field: Option<&str>, unit: &str, raw: &str) -> Message {
    Message::new(
        Category::Units,
        Severity::LOW,
        format!("adding default unit '{}' to '{}'", unit, raw),
    )
    .with_field_opt(field)
    .repaired()
}

fn missing_unit(field: Option<&str>, raw: &str) -> Message {
    Message::new(
        Category::Units,
        Severity::MEDIUM,
        format!("missing unit for '{}' and no default unit", raw),
    )
    .with_field_opt(field)
    .unrepaired()
}
