//! Unit recognition tables.

/// A recognized unit: canonical name plus its surface forms.
struct UnitEntry {
    name: &'static str,
    /// Case-sensitive symbols ("m", "C", "mg/L").
    symbols: &'static [&'static str],
    /// Case-insensitive spelled-out forms.
    words: &'static [&'static str],
}

#[rustfmt::skip]
const UNITS: &[UnitEntry] = &[
    // length
    UnitEntry { name: "meter", symbols: &["m"], words: &["meter", "meters", "metre", "metres", "mtr"] },
    UnitEntry { name: "centimeter", symbols: &["cm"], words: &["centimeter", "centimeters", "centimetre", "centimetres"] },
    UnitEntry { name: "millimeter", symbols: &["mm"], words: &["millimeter", "millimeters", "millimetre", "millimetres"] },
    UnitEntry { name: "micrometer", symbols: &["µm", "μm", "um"], words: &["micrometer", "micrometers", "micron", "microns"] },
    UnitEntry { name: "kilometer", symbols: &["km"], words: &["kilometer", "kilometers", "kilometre", "kilometres"] },
    UnitEntry { name: "foot", symbols: &["ft"], words: &["foot", "feet"] },
    UnitEntry { name: "inch", symbols: &["\""], words: &["inch", "inches"] },
    // temperature
    UnitEntry { name: "degree Celsius", symbols: &["°C", "ºC", "℃", "°c", "c"], words: &["degree celsius", "degrees celsius", "celsius", "degree c", "degrees c", "deg c", "deg. c", "deg.c", "degc"] },
    UnitEntry { name: "degree Fahrenheit", symbols: &["°F", "ºF", "℉", "°f"], words: &["degree fahrenheit", "degrees fahrenheit", "fahrenheit", "degree f", "degrees f", "deg f", "deg. f", "deg.f", "degf"] },
    UnitEntry { name: "kelvin", symbols: &["K"], words: &["kelvin", "kelvins"] },
    // SI symbols that collide with temperature shorthand
    UnitEntry { name: "coulomb", symbols: &["C"], words: &["coulomb", "coulombs"] },
    UnitEntry { name: "farad", symbols: &["F"], words: &["farad", "farads"] },
    // mass
    UnitEntry { name: "gram", symbols: &["g"], words: &["gram", "grams", "gr"] },
    UnitEntry { name: "milligram", symbols: &["mg"], words: &["milligram", "milligrams"] },
    UnitEntry { name: "microgram", symbols: &["µg", "μg", "ug"], words: &["microgram", "micrograms"] },
    UnitEntry { name: "kilogram", symbols: &["kg"], words: &["kilogram", "kilograms"] },
    // volume
    UnitEntry { name: "liter", symbols: &["L", "l"], words: &["liter", "liters", "litre", "litres"] },
    UnitEntry { name: "milliliter", symbols: &["mL", "ml"], words: &["milliliter", "milliliters", "millilitre", "millilitres"] },
    UnitEntry { name: "microliter", symbols: &["µL", "μL", "uL", "ul"], words: &["microliter", "microliters", "microlitre", "microlitres"] },
    // concentration
    UnitEntry { name: "milligram per liter", symbols: &["mg/L", "mg/l", "mg L-1", "mg l-1"], words: &["milligrams per liter", "milligram per liter", "milligrams per litre"] },
    UnitEntry { name: "microgram per liter", symbols: &["µg/L", "μg/L", "ug/L", "ug/l"], words: &["micrograms per liter", "microgram per liter"] },
    UnitEntry { name: "gram per liter", symbols: &["g/L", "g/l", "g L-1"], words: &["grams per liter", "gram per liter"] },
    UnitEntry { name: "milligram per kilogram", symbols: &["mg/kg", "mg kg-1"], words: &["milligrams per kilogram"] },
    UnitEntry { name: "gram per cubic centimeter", symbols: &["g/cm3", "g/cm^3", "g cm-3"], words: &["grams per cubic centimeter"] },
    UnitEntry { name: "molar", symbols: &["M"], words: &["molar"] },
    UnitEntry { name: "millimolar", symbols: &["mM"], words: &["millimolar"] },
    UnitEntry { name: "micromolar", symbols: &["µM", "μM", "uM"], words: &["micromolar"] },
    UnitEntry { name: "part per million", symbols: &["ppm"], words: &["parts per million", "part per million"] },
    UnitEntry { name: "part per thousand", symbols: &["ppt", "‰"], words: &["parts per thousand", "part per thousand", "per mille"] },
    UnitEntry { name: "percent", symbols: &["%"], words: &["percent", "pct", "per cent"] },
    UnitEntry { name: "practical salinity unit", symbols: &["psu", "PSU"], words: &["practical salinity unit", "practical salinity units"] },
    // conductivity
    UnitEntry { name: "millisiemens per centimeter", symbols: &["mS/cm"], words: &["millisiemens per centimeter"] },
    UnitEntry { name: "microsiemens per centimeter", symbols: &["µS/cm", "μS/cm", "uS/cm"], words: &["microsiemens per centimeter"] },
    // pressure
    UnitEntry { name: "atmosphere", symbols: &["atm"], words: &["atmosphere", "atmospheres"] },
    UnitEntry { name: "bar", symbols: &["bar"], words: &["bar", "bars"] },
    UnitEntry { name: "pascal", symbols: &["Pa"], words: &["pascal", "pascals"] },
    UnitEntry { name: "kilopascal", symbols: &["kPa"], words: &["kilopascal", "kilopascals"] },
    UnitEntry { name: "megapascal", symbols: &["MPa"], words: &["megapascal", "megapascals"] },
    // time
    UnitEntry { name: "second", symbols: &["s", "sec"], words: &["second", "seconds"] },
    UnitEntry { name: "minute", symbols: &["min"], words: &["minute", "minutes"] },
    UnitEntry { name: "hour", symbols: &["h", "hr", "hrs"], words: &["hour", "hours"] },
    UnitEntry { name: "day", symbols: &["d"], words: &["day", "days"] },
    UnitEntry { name: "year", symbols: &["yr", "yrs"], words: &["year", "years"] },
];

/// Corrections for units the recognizer reports when the text means
/// something else. `C` and `F` are the SI symbols for coulomb and farad, but
/// in sample metadata they are temperatures.
pub(crate) const UNIT_OVERRIDES: &[(&str, &str)] = &[
    ("coulomb", "degree Celsius"),
    ("farad", "degree Fahrenheit"),
];

/// Meters per unit, for the length units elevations and depths use.
const METERS_PER: &[(&str, f64)] = &[
    ("meter", 1.0),
    ("centimeter", 0.01),
    ("millimeter", 0.001),
    ("kilometer", 1000.0),
    ("foot", 0.3048),
    ("inch", 0.0254),
];

/// Convert a length between two canonical unit names.
///
/// Returns `None` when either unit is not a known length unit.
pub fn convert_length(value: f64, from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(value);
    }
    let factor = |unit: &str| METERS_PER.iter().find(|(name, _)| *name == unit).map(|(_, f)| *f);
    Some(value * factor(from)? / factor(to)?)
}

/// Longest number of whitespace-separated words a unit may span.
const MAX_UNIT_WORDS: usize = 3;

/// Look up a single unit surface form.
pub fn lookup_unit(surface: &str) -> Option<&'static str> {
    let surface = surface.trim();
    if surface.is_empty() {
        return None;
    }
    let compact = surface.replace("° ", "°").replace("º ", "º");
    if let Some(entry) = UNITS.iter().find(|u| u.symbols.contains(&compact.as_str())) {
        return Some(entry.name);
    }
    let lower = compact.to_lowercase();
    UNITS
        .iter()
        .find(|u| u.words.contains(&lower.as_str()) || u.name.to_lowercase() == lower)
        .map(|u| u.name)
}

/// Match the longest unit at the start of `text`.
///
/// Returns the canonical name and the number of bytes consumed, or `None`
/// when `text` does not start with a known unit.
pub fn match_leading_unit(text: &str) -> Option<(&'static str, usize)> {
    let start = text.len() - text.trim_start().len();
    let words: Vec<(usize, &str)> = word_spans(&text[start..])
        .into_iter()
        .map(|(offset, word)| (start + offset, word))
        .take(MAX_UNIT_WORDS)
        .collect();

    for n in (1..=words.len()).rev() {
        let (last_offset, last_word) = words[n - 1];
        let end = last_offset + last_word.len();
        let candidate = text[start..end].trim_end_matches(['.', ',', ';', ':']);
        if let Some(name) = lookup_unit(candidate) {
            return Some((name, end));
        }
    }
    None
}

/// The first whitespace-delimited token, stopping at separators.
pub fn leading_token(text: &str) -> Option<&str> {
    let token = text
        .trim_start()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')'))
        .next()?;
    if token.is_empty() { None } else { Some(token) }
}

fn word_spans(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        let boundary = c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')');
        match (start, boundary) {
            (None, false) => start = Some(idx),
            (Some(s), true) => {
                spans.push((s, &text[s..idx]));
                start = None;
                if c != ' ' && c != '\t' {
                    break;
                }
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, &text[s..]));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_case_sensitive() {
        assert_eq!(lookup_unit("m"), Some("meter"));
        assert_eq!(lookup_unit("M"), Some("molar"));
        assert_eq!(lookup_unit("mM"), Some("millimolar"));
        assert_eq!(lookup_unit("C"), Some("coulomb"));
    }

    #[test]
    fn test_words_ignore_case() {
        assert_eq!(lookup_unit("Centimeters"), Some("centimeter"));
        assert_eq!(lookup_unit("Degrees Celsius"), Some("degree Celsius"));
        assert_eq!(lookup_unit("° C"), Some("degree Celsius"));
        assert_eq!(lookup_unit("samples"), None);
    }

    #[test]
    fn test_abbreviated_temperature_spellings() {
        assert_eq!(lookup_unit("c"), Some("degree Celsius"));
        assert_eq!(lookup_unit("degrees C"), Some("degree Celsius"));
        assert_eq!(lookup_unit("Degree C"), Some("degree Celsius"));
        assert_eq!(lookup_unit("deg. C"), Some("degree Celsius"));
        assert_eq!(lookup_unit("degrees F"), Some("degree Fahrenheit"));
        assert_eq!(
            match_leading_unit(" degrees C at the surface"),
            Some(("degree Celsius", 10))
        );
        assert_eq!(match_leading_unit(" deg. C"), Some(("degree Celsius", 7)));
    }

    #[test]
    fn test_longest_leading_match() {
        assert_eq!(
            match_leading_unit(" degrees celsius at noon"),
            Some(("degree Celsius", 16))
        );
        assert_eq!(match_leading_unit("cm"), Some(("centimeter", 2)));
        assert_eq!(match_leading_unit("mg/L, filtered"), Some(("milligram per liter", 4)));
        assert_eq!(match_leading_unit("m."), Some(("meter", 2)));
        assert_eq!(match_leading_unit("widgets"), None);
    }

    #[test]
    fn test_convert_length() {
        assert_eq!(convert_length(3.0, "meter", "meter"), Some(3.0));
        assert_eq!(convert_length(250.0, "centimeter", "meter"), Some(2.5));
        let feet = convert_length(100.0, "meter", "foot").unwrap();
        assert!((feet - 328.083_989_501_312_3).abs() < 1e-9);
        assert_eq!(convert_length(1.0, "meter", "degree Celsius"), None);
        assert_eq!(convert_length(1.0, "widget", "widget"), Some(1.0));
    }

    #[test]
    fn test_leading_token() {
        assert_eq!(leading_token("  widgets total"), Some("widgets"));
        assert_eq!(leading_token("   "), None);
    }

    #[test]
    fn test_overrides_target_known_units() {
        for (detected, corrected) in UNIT_OVERRIDES {
            assert!(lookup_unit(detected).is_some());
            assert!(lookup_unit(corrected).is_some());
        }
    }
}
