//! Typed field values for sample records.
//!
//! Values arrive as loosely shaped JSON and are converted into a closed
//! tagged union. Structured values follow the NMDC wire shape
//! (`has_raw_value`, `has_numeric_value`, `has_unit`, ...), with an optional
//! `type` discriminator such as `nmdc:QuantityValue`.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

/// A single field value in a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum Value {
    /// Absent-value marker.
    Null,
    /// Free text.
    Text(String),
    /// A bare number with no unit.
    Number(f64),
    /// A measurement (value or bounds, plus unit).
    Quantity(QuantityValue),
    /// A reference to an ontology term.
    ControlledTerm(ControlledTermValue),
    /// A coordinate pair.
    Geolocation(GeolocationValue),
    /// A point in time.
    Timestamp(TimestampValue),
    /// Multiple values for one field.
    List(Vec<Value>),
}

impl Value {
    /// Create a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// True for values `tidy_nulls` removes: `Null`, whitespace-only text,
    /// lists holding nothing but blanks (at any depth), and structured values
    /// with blank raw text and no parsed content.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Number(_) => false,
            Value::Quantity(q) => q.is_blank(),
            Value::ControlledTerm(t) => {
                blank_text(&t.raw_value) && blank_text(&t.term_id) && blank_text(&t.term_label)
            }
            Value::Geolocation(g) => blank_text(&g.raw_value) && g.coordinates().is_none(),
            Value::Timestamp(t) => t.raw_value.trim().is_empty(),
            Value::List(items) => items.iter().all(Value::is_blank),
        }
    }

    /// Remove blank items from lists, recursively. A list that ends up empty
    /// is left in place for the caller to drop.
    pub(crate) fn prune_blank_items(&mut self) {
        if let Value::List(items) = self {
            for item in items.iter_mut() {
                item.prune_blank_items();
            }
            items.retain(|item| !item.is_blank());
        }
    }

    /// Borrow the inner string of a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual rendering used for matching and parsing.
    ///
    /// Structured values yield their raw text; lists and `Null` yield nothing.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Text(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(format_number(*n))),
            Value::Quantity(q) => q.raw_value.as_deref().map(Cow::Borrowed),
            Value::ControlledTerm(t) => t.raw_value.as_deref().map(Cow::Borrowed),
            Value::Geolocation(g) => g.raw_value.as_deref().map(Cow::Borrowed),
            Value::Timestamp(t) => Some(Cow::Borrowed(&t.raw_value)),
            Value::List(_) | Value::Null => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Quantity(_) => "quantity value",
            Value::ControlledTerm(_) => "controlled term value",
            Value::Geolocation(_) => "geolocation value",
            Value::Timestamp(_) => "timestamp value",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Quantity(q) => write!(f, "{}", q),
            Value::ControlledTerm(t) => match (&t.raw_value, &t.term_id) {
                (Some(raw), _) => write!(f, "{}", raw),
                (None, Some(id)) => write!(f, "{}", id),
                (None, None) => write!(f, ""),
            },
            Value::Geolocation(g) => match g.coordinates() {
                Some((lat, lon)) => write!(f, "{} {}", lat, lon),
                None => write!(f, "{}", g.raw_value.as_deref().unwrap_or("")),
            },
            Value::Timestamp(t) => write!(f, "{}", t.raw_value),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<QuantityValue> for Value {
    fn from(q: QuantityValue) -> Self {
        Value::Quantity(q)
    }
}

impl From<GeolocationValue> for Value {
    fn from(g: GeolocationValue) -> Self {
        Value::Geolocation(g)
    }
}

/// A normalized measurement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantityValue {
    /// Original text the quantity was parsed from.
    pub raw_value: Option<String>,
    /// Point value.
    pub numeric_value: Option<f64>,
    /// Lower bound, for ranges and uncertainties.
    pub minimum: Option<f64>,
    /// Upper bound, for ranges and uncertainties.
    pub maximum: Option<f64>,
    /// Canonical unit name.
    pub unit: Option<String>,
}

impl QuantityValue {
    /// A point value with an optional unit.
    pub fn new(numeric_value: f64, unit: Option<String>) -> Self {
        Self {
            numeric_value: Some(numeric_value),
            unit,
            ..Default::default()
        }
    }

    /// A bounded value with an optional unit.
    pub fn bounded(minimum: f64, maximum: f64, unit: Option<String>) -> Self {
        Self {
            minimum: Some(minimum),
            maximum: Some(maximum),
            unit,
            ..Default::default()
        }
    }

    /// Set the raw text.
    pub fn with_raw_value(mut self, raw: impl Into<String>) -> Self {
        self.raw_value = Some(raw.into());
        self
    }

    /// True when neither a numeric value nor a unit is present.
    pub fn is_incomplete(&self) -> bool {
        self.numeric_value.is_none() && self.unit.is_none()
    }

    /// True when the quantity carries bounds instead of a point value.
    pub fn is_range(&self) -> bool {
        self.minimum.is_some() && self.maximum.is_some()
    }

    /// True when there is no text, number, bound or unit to work with.
    pub fn is_blank(&self) -> bool {
        blank_text(&self.raw_value)
            && self.numeric_value.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && blank_text(&self.unit)
    }
}

fn blank_text(text: &Option<String>) -> bool {
    text.as_deref().is_none_or(|t| t.trim().is_empty())
}

impl fmt::Display for QuantityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = match (self.numeric_value, self.minimum, self.maximum) {
            (Some(v), _, _) => format_number(v),
            (None, Some(lo), Some(hi)) => format!("{}-{}", format_number(lo), format_number(hi)),
            _ => return write!(f, "{}", self.raw_value.as_deref().unwrap_or("")),
        };
        match &self.unit {
            Some(unit) => write!(f, "{} {}", number, unit),
            None => write!(f, "{}", number),
        }
    }
}

/// Raw text annotated with an ontology term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlledTermValue {
    /// Original text.
    pub raw_value: Option<String>,
    /// Term CURIE (e.g., "ENVO:00001998").
    pub term_id: Option<String>,
    /// Term label.
    pub term_label: Option<String>,
}

/// A coordinate pair, raw or resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeolocationValue {
    /// Original text.
    pub raw_value: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
}

impl GeolocationValue {
    /// A resolved coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            raw_value: None,
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Both coordinates, when resolved.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// A timestamp with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampValue {
    /// Original text.
    pub raw_value: String,
    /// Parsed instant, when the text is a recognized date format.
    pub parsed: Option<NaiveDateTime>,
}

impl TimestampValue {
    /// Parse a timestamp, keeping the raw text even if parsing fails.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw_value = raw.into();
        let trimmed = raw_value.trim();
        let parsed = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.naive_utc())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").ok())
            .or_else(|| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });
        Self { raw_value, parsed }
    }
}

/// Render a number without a trailing `.0` for integral values.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// =============================================================================
// JSON conversion
// =============================================================================

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Text(b.to_string()),
            JsonValue::Number(n) => n
                .as_f64()
                .map(Value::Number)
                .unwrap_or_else(|| Value::Text(n.to_string())),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(obj) => value_from_object(obj),
        }
    }
}

fn value_from_object(obj: Map<String, JsonValue>) -> Value {
    let type_name = obj
        .get("type")
        .and_then(JsonValue::as_str)
        .map(|t| t.rsplit(':').next().unwrap_or(t).to_string());

    match type_name.as_deref() {
        Some("QuantityValue") => return Value::Quantity(quantity_from_object(&obj)),
        Some("GeolocationValue") => return Value::Geolocation(geolocation_from_object(&obj)),
        Some("ControlledTermValue") | Some("ControlledIdentifiedTermValue") => {
            return Value::ControlledTerm(term_from_object(&obj));
        }
        Some("TimestampValue") => {
            return Value::Timestamp(TimestampValue::parse(
                get_str(&obj, "has_raw_value").unwrap_or_default(),
            ));
        }
        Some("TextValue") => {
            return Value::Text(get_str(&obj, "has_raw_value").unwrap_or_default());
        }
        _ => {}
    }

    if obj.contains_key("latitude") || obj.contains_key("longitude") {
        Value::Geolocation(geolocation_from_object(&obj))
    } else if obj.contains_key("has_numeric_value")
        || obj.contains_key("has_unit")
        || obj.contains_key("has_minimum_numeric_value")
        || obj.contains_key("has_maximum_numeric_value")
    {
        Value::Quantity(quantity_from_object(&obj))
    } else if obj.contains_key("term") {
        Value::ControlledTerm(term_from_object(&obj))
    } else if let Some(raw) = get_str(&obj, "has_raw_value") {
        Value::Text(raw)
    } else {
        Value::Text(JsonValue::Object(obj).to_string())
    }
}

fn get_str(obj: &Map<String, JsonValue>, key: &str) -> Option<String> {
    match obj.get(key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn get_f64(obj: &Map<String, JsonValue>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn quantity_from_object(obj: &Map<String, JsonValue>) -> QuantityValue {
    QuantityValue {
        raw_value: get_str(obj, "has_raw_value"),
        numeric_value: get_f64(obj, "has_numeric_value"),
        minimum: get_f64(obj, "has_minimum_numeric_value"),
        maximum: get_f64(obj, "has_maximum_numeric_value"),
        unit: get_str(obj, "has_unit"),
    }
}

fn geolocation_from_object(obj: &Map<String, JsonValue>) -> GeolocationValue {
    GeolocationValue {
        raw_value: get_str(obj, "has_raw_value"),
        latitude: get_f64(obj, "latitude"),
        longitude: get_f64(obj, "longitude"),
    }
}

fn term_from_object(obj: &Map<String, JsonValue>) -> ControlledTermValue {
    let (term_id, term_label) = match obj.get("term") {
        Some(JsonValue::String(id)) => (Some(id.clone()), None),
        Some(JsonValue::Object(term)) => (get_str(term, "id"), get_str(term, "name")),
        _ => (None, None),
    };
    ControlledTermValue {
        raw_value: get_str(obj, "has_raw_value"),
        term_id,
        term_label,
    }
}

fn insert_opt<T: Into<JsonValue>>(obj: &mut Map<String, JsonValue>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        obj.insert(key.to_string(), v.into());
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonValue::Null,
            Value::Text(s) => JsonValue::String(s),
            Value::Number(n) => json!(n),
            Value::Quantity(q) => {
                let mut obj = Map::new();
                insert_opt(&mut obj, "has_raw_value", q.raw_value);
                insert_opt(&mut obj, "has_numeric_value", q.numeric_value);
                insert_opt(&mut obj, "has_minimum_numeric_value", q.minimum);
                insert_opt(&mut obj, "has_maximum_numeric_value", q.maximum);
                insert_opt(&mut obj, "has_unit", q.unit);
                obj.insert("type".into(), "nmdc:QuantityValue".into());
                JsonValue::Object(obj)
            }
            Value::ControlledTerm(t) => {
                let mut obj = Map::new();
                insert_opt(&mut obj, "has_raw_value", t.raw_value);
                if t.term_id.is_some() || t.term_label.is_some() {
                    let mut term = Map::new();
                    insert_opt(&mut term, "id", t.term_id);
                    insert_opt(&mut term, "name", t.term_label);
                    obj.insert("term".into(), JsonValue::Object(term));
                }
                obj.insert("type".into(), "nmdc:ControlledIdentifiedTermValue".into());
                JsonValue::Object(obj)
            }
            Value::Geolocation(g) => {
                let mut obj = Map::new();
                insert_opt(&mut obj, "has_raw_value", g.raw_value);
                insert_opt(&mut obj, "latitude", g.latitude);
                insert_opt(&mut obj, "longitude", g.longitude);
                obj.insert("type".into(), "nmdc:GeolocationValue".into());
                JsonValue::Object(obj)
            }
            Value::Timestamp(t) => json!({
                "has_raw_value": t.raw_value,
                "type": "nmdc:TimestampValue",
            }),
            Value::List(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::text("   ").is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(!Value::text("soil").is_blank());
        assert!(!Value::Number(0.0).is_blank());
    }

    #[test]
    fn test_nested_and_structured_blanks() {
        let nested = Value::List(vec![Value::List(vec![Value::text("")]), Value::Null]);
        assert!(nested.is_blank());

        let empty_quantity = Value::from(json!({
            "type": "nmdc:QuantityValue",
            "has_raw_value": ""
        }));
        assert!(matches!(empty_quantity, Value::Quantity(_)));
        assert!(empty_quantity.is_blank());

        assert!(Value::ControlledTerm(ControlledTermValue::default()).is_blank());
        assert!(Value::Geolocation(GeolocationValue::default()).is_blank());
        assert!(!Value::Geolocation(GeolocationValue::new(1.0, 2.0)).is_blank());
        assert!(!Value::Quantity(QuantityValue::new(0.0, None)).is_blank());
    }

    #[test]
    fn test_prune_blank_items() {
        let mut value = Value::List(vec![
            Value::text("soil"),
            Value::List(vec![Value::text(" "), Value::text("sand")]),
            Value::List(vec![Value::text("")]),
        ]);
        value.prune_blank_items();
        assert_eq!(
            value,
            Value::List(vec![
                Value::text("soil"),
                Value::List(vec![Value::text("sand")]),
            ])
        );
    }

    #[test]
    fn test_quantity_from_json() {
        let json = json!({"has_numeric_value": 2.0, "has_unit": "meter"});
        let value = Value::from(json);
        match value {
            Value::Quantity(q) => {
                assert_eq!(q.numeric_value, Some(2.0));
                assert_eq!(q.unit.as_deref(), Some("meter"));
            }
            other => panic!("expected quantity, got {:?}", other),
        }
    }

    #[test]
    fn test_type_discriminator_wins() {
        let json = json!({"has_raw_value": "2021-06-01", "type": "nmdc:TimestampValue"});
        match Value::from(json) {
            Value::Timestamp(t) => {
                assert_eq!(t.raw_value, "2021-06-01");
                assert!(t.parsed.is_some());
            }
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_controlled_term_from_json() {
        let json = json!({
            "has_raw_value": "soil",
            "term": {"id": "ENVO:00001998", "name": "soil"}
        });
        match Value::from(json) {
            Value::ControlledTerm(t) => {
                assert_eq!(t.term_id.as_deref(), Some("ENVO:00001998"));
                assert_eq!(t.term_label.as_deref(), Some("soil"));
            }
            other => panic!("expected controlled term, got {:?}", other),
        }
    }

    #[test]
    fn test_geolocation_serializes_coordinates() {
        let json = JsonValue::from(Value::Geolocation(GeolocationValue::new(40.5, -73.25)));
        assert_eq!(json["latitude"], json!(40.5));
        assert_eq!(json["longitude"], json!(-73.25));
    }

    #[test]
    fn test_display_quantity_range() {
        let q = QuantityValue::bounded(4.5, 5.5, Some("meter".into()));
        assert_eq!(q.to_string(), "4.5-5.5 meter");
        assert_eq!(QuantityValue::new(2.0, None).to_string(), "2");
    }
}
