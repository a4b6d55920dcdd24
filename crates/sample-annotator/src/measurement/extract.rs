//! Quantity extraction from free text.
//!
//! Scans text for a number, optionally followed by an uncertainty (`± 0.5`,
//! `+/- 0.5`) or a range bound (`-20`, `- 20`, `to 20`), then matches the
//! longest known unit that follows. A hyphen with space before it but not
//! after it is the sign of the next number, not a range separator.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::units::{leading_token, match_leading_unit};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (?P<value>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)
        (?:
            \s*(?:±|\+/-|\+-)\s*(?P<unc>\d+\.?\d*|\.\d+)
          | (?:-\s*|\s+-\s+|\s*(?:–|to)\s*)(?P<hi>[-+]?(?:\d+\.?\d*|\.\d+))
        )?",
    )
    .unwrap()
});

static THOUSANDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d),(\d{3})\b").unwrap());

/// One quantity found in text.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Point value; `None` when the text gave bounds.
    pub value: Option<f64>,
    /// Lower bound from an uncertainty or range.
    pub minimum: Option<f64>,
    /// Upper bound from an uncertainty or range.
    pub maximum: Option<f64>,
    /// Canonical unit name, when a known unit followed the number.
    pub unit: Option<&'static str>,
    /// Unit text as written; for unknown units this is the unrecognized token.
    pub unit_text: Option<String>,
    /// Byte span in the normalized text.
    pub span: Range<usize>,
}

impl Extraction {
    /// True when the quantity was written as an uncertainty or range.
    pub fn is_bounded(&self) -> bool {
        self.minimum.is_some() && self.maximum.is_some()
    }
}

/// Normalize text before scanning: unicode minus and thousands separators.
fn normalize(text: &str) -> String {
    let text = text.replace('−', "-");
    THOUSANDS_RE.replace_all(&text, "$1$2").into_owned()
}

/// Parse a number, rejecting overflow to infinity.
fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Find every quantity in `text`, in order of appearance.
pub fn extract_quantities(text: &str) -> Vec<Extraction> {
    let normalized = normalize(text);
    let mut found = Vec::new();
    let mut consumed = 0;

    for caps in NUMBER_RE.captures_iter(&normalized) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() < consumed {
            continue;
        }
        let Some(value) = caps.name("value").and_then(|m| parse_finite(m.as_str())) else {
            continue;
        };

        let (point, minimum, maximum) = if let Some(unc) = caps.name("unc") {
            let Some(u) = parse_finite(unc.as_str()) else { continue };
            (None, Some(value - u), Some(value + u))
        } else if let Some(hi) = caps.name("hi") {
            let Some(h) = parse_finite(hi.as_str()) else { continue };
            (None, Some(value.min(h)), Some(value.max(h)))
        } else {
            (Some(value), None, None)
        };
        if [point, minimum, maximum].into_iter().flatten().any(|n| !n.is_finite()) {
            continue;
        }

        let rest = &normalized[whole.end()..];
        let (unit, unit_text, end) = match match_leading_unit(rest) {
            Some((name, len)) => (
                Some(name),
                Some(rest[..len].trim().to_string()),
                whole.end() + len,
            ),
            None => {
                let token = leading_token(rest)
                    .filter(|t| t.chars().next().is_some_and(char::is_alphabetic))
                    .map(str::to_string);
                (None, token, whole.end())
            }
        };

        consumed = end;
        found.push(Extraction {
            value: point,
            minimum,
            maximum,
            unit,
            unit_text,
            span: whole.start()..end,
        });
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(text: &str) -> Extraction {
        extract_quantities(text).into_iter().next().unwrap()
    }

    #[test]
    fn test_attached_unit() {
        let e = first("2cm");
        assert_eq!(e.value, Some(2.0));
        assert_eq!(e.unit, Some("centimeter"));
    }

    #[test]
    fn test_spelled_unit_with_context() {
        let e = first("approximately 15.5 degrees Celsius at collection");
        assert_eq!(e.value, Some(15.5));
        assert_eq!(e.unit, Some("degree Celsius"));
    }

    #[test]
    fn test_uncertainty_becomes_bounds() {
        let e = first("5 ± 0.5 m");
        assert_eq!(e.value, None);
        assert!((e.minimum.unwrap() - 4.5).abs() < 1e-9);
        assert!((e.maximum.unwrap() - 5.5).abs() < 1e-9);
        assert_eq!(e.unit, Some("meter"));

        let e = first("10 +/- 2 cm");
        assert_eq!(e.minimum, Some(8.0));
        assert_eq!(e.maximum, Some(12.0));
    }

    #[test]
    fn test_range_becomes_bounds() {
        let e = first("0-10 cm");
        assert_eq!(e.minimum, Some(0.0));
        assert_eq!(e.maximum, Some(10.0));
        assert_eq!(e.unit, Some("centimeter"));

        let e = first("20 to 10 m");
        assert_eq!(e.minimum, Some(10.0));
        assert_eq!(e.maximum, Some(20.0));
    }

    #[test]
    fn test_spaced_hyphen_range() {
        let e = first("0 - 10 cm");
        assert_eq!((e.minimum, e.maximum), (Some(0.0), Some(10.0)));
    }

    #[test]
    fn test_signed_number_is_not_a_range_bound() {
        let all = extract_quantities("10 -5 m");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, Some(10.0));
        assert!(!all[0].is_bounded());
        assert_eq!(all[1].value, Some(-5.0));
        assert_eq!(all[1].unit, Some("meter"));
    }

    #[test]
    fn test_overflowing_numbers_are_skipped() {
        assert!(extract_quantities("1e999 m").is_empty());
        let huge = format!("1{}", "0".repeat(400));
        assert!(extract_quantities(&format!("5 ± {} m", huge)).is_empty());
        assert!(extract_quantities(&format!("5 to {} m", huge)).is_empty());
        let near_max = format!("1{}", "0".repeat(308));
        assert!(extract_quantities(&format!("1.7e308 ± {} m", near_max)).is_empty());

        let all = extract_quantities("1e999 m or 3 m");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, Some(3.0));
    }

    #[test]
    fn test_thousands_separator() {
        let e = first("1,200 m");
        assert_eq!(e.value, Some(1200.0));
    }

    #[test]
    fn test_unknown_unit_token_is_kept() {
        let e = first("12 widgets");
        assert_eq!(e.unit, None);
        assert_eq!(e.unit_text.as_deref(), Some("widgets"));
    }

    #[test]
    fn test_multiple_quantities_in_order() {
        let all = extract_quantities("3 m then 4 cm");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].unit, Some("meter"));
        assert_eq!(all[1].value, Some(4.0));
    }

    #[test]
    fn test_no_number() {
        assert!(extract_quantities("not recorded").is_empty());
        assert!(extract_quantities("").is_empty());
    }
}
