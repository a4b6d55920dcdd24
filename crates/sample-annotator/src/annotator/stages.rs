//! Pipeline stages.

use tracing::debug;

use crate::error::Result;
use crate::identifier::{IDENTIFIER_FIELDS, check_curie};
use crate::measurement::convert_length;
use crate::report::{AnnotationReport, Category, Message, Severity};
use crate::sample::{GeolocationValue, QuantityValue, Sample, Value, format_number};
use crate::schema::{EnvPackage, normalize_name};

use super::SampleAnnotator;

const LAT_LON: &str = "lat_lon";
const ELEVATION: &str = "elev";

/// Parse `"<lat> <lon>"`.
pub(crate) fn parse_lat_lon(text: &str) -> Option<(f64, f64)> {
    let mut parts = text.split_whitespace();
    let lat = parts.next()?.parse::<f64>().ok()?;
    let lon = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    Some((lat, lon))
}

/// Numeric reading of an already-recorded elevation, with its unit when the
/// record states one.
fn recorded_elevation(value: &Value) -> Option<(f64, Option<String>)> {
    match value {
        Value::Number(n) => Some((*n, None)),
        Value::Quantity(q) => Some((q.numeric_value?, q.unit.clone())),
        other => Some((other.as_text()?.trim().parse().ok()?, None)),
    }
}

impl SampleAnnotator {
    pub(super) fn validate_identifier(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        let mut found: Option<(&str, String)> = None;
        for field in IDENTIFIER_FIELDS {
            let Some(text) = sample.get_present(field).and_then(Value::as_text) else {
                continue;
            };
            let text = text.trim().to_string();
            if let Some((first_field, first)) = &found {
                let description = if *first == text {
                    format!(
                        "duplicate identifier: {} repeats {} '{}'",
                        field, first_field, first
                    )
                } else {
                    format!(
                        "conflicting identifiers: using {} '{}', ignoring {} '{}'",
                        first_field, first, field, text
                    )
                };
                report.add_message(
                    Message::new(Category::Identifier, Severity::LOW, description)
                        .with_field(*field)
                        .unrepaired(),
                );
                continue;
            }
            found = Some((*field, text));
        }

        let Some((field, raw)) = found else {
            report.add_message(
                Message::new(
                    Category::MissingCore,
                    Severity::HIGH,
                    format!("no identifier in any of: {}", IDENTIFIER_FIELDS.join(", ")),
                )
                .with_field("id")
                .unrepaired(),
            );
            return Ok(());
        };

        let check = check_curie(&raw, field, self.registry.as_ref());
        for message in check.messages {
            report.add_message(message);
        }
        sample.insert("id", Value::text(check.identifier.clone()));
        report.identifier = Some(check.identifier);
        Ok(())
    }

    pub(super) fn infer_package(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        match sample.get_present("env_package").and_then(Value::as_text) {
            Some(raw) => {
                let raw = raw.trim();
                match EnvPackage::from_str_flexible(raw) {
                    Some(package) => report.package = Some(package.name().to_string()),
                    None => {
                        report.add_message(
                            Message::new(
                                Category::ControlledVocabulary,
                                Severity::LOW,
                                format!("unrecognized environmental package '{}'", raw),
                            )
                            .with_field("env_package")
                            .unrepaired(),
                        );
                        report.package = Some(raw.to_string());
                    }
                }
            }
            None => report.add_message(
                Message::new(Category::MissingCore, Severity::MEDIUM, "missing env_package")
                    .with_field("env_package")
                    .unrepaired(),
            ),
        }

        match sample.get_present("checklist").and_then(Value::as_text) {
            Some(raw) => report.checklist = Some(raw.trim().to_string()),
            None => report.add_message(
                Message::new(Category::MissingCore, Severity::MEDIUM, "missing checklist")
                    .with_field("checklist")
                    .unrepaired(),
            ),
        }
        Ok(())
    }

    pub(super) fn tidy_nulls(
        &self,
        sample: &mut Sample,
        _report: &mut AnnotationReport,
    ) -> Result<()> {
        let before = sample.len();
        sample.retain(|_, value| {
            value.prune_blank_items();
            !value.is_blank()
        });
        debug!(removed = before - sample.len(), "removed empty fields");
        Ok(())
    }

    pub(super) fn tidy_keys(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        let fields = std::mem::take(sample).into_fields();

        for (key, value) in fields {
            let target = if let Some(slot) = self.schema.get_slot(&key, false) {
                if key != slot.name {
                    report.add_message(
                        Message::new(
                            Category::UnknownField,
                            Severity::LOW,
                            format!("replaced spaces in key '{}' -> '{}'", key, slot.name),
                        )
                        .with_field(slot.name.clone())
                        .repaired(),
                    );
                }
                slot.name.clone()
            } else if let Some(slot) = self.schema.get_slot(&key, true) {
                report.add_message(
                    Message::new(
                        Category::UnknownField,
                        Severity::LOW,
                        format!("replaced alias '{}' with '{}'", key, slot.name),
                    )
                    .with_field(slot.name.clone())
                    .repaired(),
                );
                slot.name.clone()
            } else {
                let normalized = normalize_name(&key);
                if normalized != key {
                    report.add_message(
                        Message::new(
                            Category::UnknownField,
                            Severity::LOW,
                            format!("replaced spaces in key '{}' -> '{}'", key, normalized),
                        )
                        .with_field(normalized.clone())
                        .repaired(),
                    );
                }
                report.add_message(
                    Message::new(
                        Category::UnknownField,
                        Severity::LOW,
                        format!("unknown field '{}'", normalized),
                    )
                    .with_field(normalized.clone())
                    .unrepaired(),
                );
                normalized
            };

            if sample.contains_key(&target) {
                report.add_message(
                    Message::new(
                        Category::UnknownField,
                        Severity::LOW,
                        format!(
                            "key '{}' maps to '{}', which is already set; keeping the first value",
                            key, target
                        ),
                    )
                    .with_field(target)
                    .unrepaired(),
                );
                continue;
            }
            sample.insert(target, value);
        }
        Ok(())
    }

    pub(super) fn tidy_enumerations(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        let package = report.package.clone();
        for (key, value) in sample.iter() {
            let Some(enumeration) = self.schema.get_enumerations_for(key, package.as_deref()) else {
                continue;
            };
            let values: Vec<&Value> = match value {
                Value::List(items) => items.iter().collect(),
                single => vec![single],
            };
            for item in values {
                let Some(text) = item.as_text() else { continue };
                if !enumeration.contains(&text) {
                    report.add_message(
                        Message::new(
                            Category::ControlledVocabulary,
                            Severity::MEDIUM,
                            format!(
                                "'{}' is not a permissible value of {}",
                                text, enumeration.name
                            ),
                        )
                        .with_field(key.clone())
                        .unrepaired(),
                    );
                }
            }
        }
        Ok(())
    }

    pub(super) fn tidy_measurements(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        let fields: Vec<String> = sample
            .keys()
            .filter(|k| self.schema.is_measurement_field(k))
            .cloned()
            .collect();

        for field in fields {
            let Some(value) = sample.get(&field).cloned() else { continue };
            let default_unit = if self.config.use_preferred_units {
                self.schema
                    .get_slot(&field, false)
                    .and_then(|slot| slot.preferred_unit.as_deref())
            } else {
                None
            };

            match self
                .measurement
                .repair_field(Some(field.as_str()), &value, default_unit, report)
            {
                Some(quantity) => {
                    sample.insert(field, Value::Quantity(quantity));
                }
                None => report.add_message(
                    Message::new(
                        Category::MeasurementSyntax,
                        Severity::MEDIUM,
                        format!("could not parse a measurement from {} '{}'", value.kind(), value),
                    )
                    .with_field(field)
                    .unrepaired(),
                ),
            }
        }
        Ok(())
    }

    pub(super) fn perform_text_mining(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        for hook in &self.text_mining {
            debug!(hook = hook.name(), "running text-mining hook");
            hook.apply(sample, report)?;
        }
        Ok(())
    }

    pub(super) fn perform_geolocation_inference(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        let Some(value) = sample.get_present(LAT_LON) else {
            report.add_message(
                Message::new(Category::MissingCore, Severity::HIGH, "missing lat_lon")
                    .with_field(LAT_LON)
                    .unrepaired(),
            );
            return Ok(());
        };

        let raw = value.as_text().map(|t| t.trim().to_string());
        let coordinates = match value {
            Value::Geolocation(g) => g.coordinates(),
            _ => None,
        }
        .or_else(|| raw.as_deref().and_then(parse_lat_lon));

        let Some((latitude, longitude)) = coordinates else {
            report.add_message(
                Message::new(
                    Category::Geo,
                    Severity::HIGH,
                    format!("unable to parse lat_lon '{}'", value),
                )
                .with_field(LAT_LON)
                .unrepaired(),
            );
            return Ok(());
        };

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            report.add_message(
                Message::new(
                    Category::Geo,
                    Severity::HIGH,
                    format!(
                        "lat_lon '{} {}' is outside the valid coordinate range",
                        latitude, longitude
                    ),
                )
                .with_field(LAT_LON)
                .unrepaired(),
            );
            return Ok(());
        }

        let mut geolocation = GeolocationValue::new(latitude, longitude);
        geolocation.raw_value = raw;
        sample.insert(LAT_LON, Value::Geolocation(geolocation));
        report.add_message(
            Message::info(
                Category::Geo,
                format!("lat_lon resolved to latitude {} longitude {}", latitude, longitude),
            )
            .with_field(LAT_LON)
            .repaired(),
        );

        if !self.config.enable_geolocation {
            debug!("geolocation lookups disabled");
            return Ok(());
        }

        match self.geo_lookup(move |g| g.get_fao_soil_type(latitude, longitude)) {
            Ok(Some(soil)) if !soil.trim().is_empty() => report.add_message(
                Message::info(Category::Geo, format!("FAO soil type: {}", soil.trim()))
                    .with_field(LAT_LON),
            ),
            Ok(_) => {}
            Err(e) => report.add_message(
                Message::new(
                    Category::Geo,
                    Severity::LOW,
                    format!("soil type lookup failed: {}", e),
                )
                .with_field(LAT_LON),
            ),
        }

        let elevation = match self.geo_lookup(move |g| g.get_elevation(latitude, longitude)) {
            Ok(Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => return Ok(()),
            Err(e) => {
                report.add_message(
                    Message::new(
                        Category::Geo,
                        Severity::LOW,
                        format!("elevation lookup failed: {}", e),
                    )
                    .with_field(ELEVATION),
                );
                return Ok(());
            }
        };
        self.apply_elevation(&elevation, sample, report);
        Ok(())
    }

    fn apply_elevation(&self, elevation: &str, sample: &mut Sample, report: &mut AnnotationReport) {
        let Some(looked_up) = elevation.parse::<f64>().ok().filter(|v| v.is_finite()) else {
            report.add_message(
                Message::new(
                    Category::Geo,
                    Severity::LOW,
                    format!("geo engine returned an unreadable elevation '{}'", elevation),
                )
                .with_field(ELEVATION),
            );
            return;
        };
        let unit = self.config.elevation_unit.clone();
        let filled = QuantityValue::new(looked_up, Some(unit.clone())).with_raw_value(elevation);

        match sample.get_present(ELEVATION).map(recorded_elevation) {
            None => {
                sample.insert(ELEVATION, Value::Quantity(filled));
                report.add_message(
                    Message::info(
                        Category::Geo,
                        format!("filled elev with {} {}", format_number(looked_up), unit),
                    )
                    .with_field(ELEVATION)
                    .repaired(),
                );
            }
            Some(None) => {
                sample.insert(ELEVATION, Value::Quantity(filled));
                report.add_message(
                    Message::new(
                        Category::Geo,
                        Severity::LOW,
                        format!(
                            "replaced unreadable elev with {} {}",
                            format_number(looked_up),
                            unit
                        ),
                    )
                    .with_field(ELEVATION)
                    .repaired(),
                );
            }
            Some(Some((recorded, recorded_unit))) => {
                let recorded_unit = recorded_unit.unwrap_or_else(|| unit.clone());
                let Some(comparable) = convert_length(recorded, &recorded_unit, &unit) else {
                    debug!(
                        recorded_unit = %recorded_unit,
                        unit = %unit,
                        "elev unit is not comparable; skipping elevation check"
                    );
                    return;
                };
                if (comparable - looked_up).abs() > self.config.elevation_tolerance {
                    report.add_message(
                        Message::new(
                            Category::Geo,
                            Severity::LOW,
                            format!(
                                "recorded elev {} {} differs from looked-up elevation {} {}",
                                format_number(recorded),
                                recorded_unit,
                                format_number(looked_up),
                                unit
                            ),
                        )
                        .with_field(ELEVATION)
                        .unrepaired(),
                    );
                }
            }
        }
    }

    pub(super) fn perform_inference(
        &self,
        sample: &mut Sample,
        report: &mut AnnotationReport,
    ) -> Result<()> {
        for hook in &self.inference {
            debug!(hook = hook.name(), "running inference hook");
            hook.apply(sample, report)?;
        }
        Ok(())
    }
}
