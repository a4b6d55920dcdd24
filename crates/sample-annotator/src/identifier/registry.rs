//! CURIE prefix registry.
//!
//! Maps prefix spellings seen in the wild (`NCBI.BioSample`, `BIOSAMPLE`,
//! `biosample`) to one canonical prefix, and holds the local-id pattern for
//! each prefix. Patterns for the NCBI/INSDC archives follow their published
//! accession formats.

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::error::{AnnotatorError, Result};

/// Resolves CURIE prefixes and their local-id patterns.
pub trait PrefixRegistry: Send + Sync {
    /// Canonical spelling of `prefix`, or `None` if the prefix is unknown.
    fn normalize_prefix(&self, prefix: &str) -> Option<String>;

    /// Pattern a local id under the canonical `prefix` must match.
    fn get_pattern(&self, prefix: &str) -> Option<&Regex>;
}

/// A registered prefix.
#[derive(Debug, Clone)]
pub struct PrefixEntry {
    pub prefix: String,
    pub synonyms: Vec<String>,
    pub pattern: Option<Regex>,
}

impl PrefixEntry {
    /// Create an entry, compiling its local-id pattern.
    pub fn new(
        prefix: impl Into<String>,
        synonyms: &[&str],
        pattern: Option<&str>,
    ) -> Result<Self> {
        let prefix = prefix.into();
        let pattern = pattern
            .map(|p| {
                Regex::new(p).map_err(|e| AnnotatorError::Registry {
                    prefix: prefix.clone(),
                    message: e.to_string(),
                })
            })
            .transpose()?;
        Ok(Self {
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            prefix,
            pattern,
        })
    }
}

/// Built-in prefixes: (canonical, synonyms, local-id pattern).
const BUILTIN_PREFIXES: &[(&str, &[&str], Option<&str>)] = &[
    (
        "biosample",
        &["ncbi.biosample", "ncbibiosample", "biosample_id", "samn"],
        Some(r"^SAM[NED][A-Z]?\d+$"),
    ),
    (
        "bioproject",
        &["ncbi.bioproject", "ncbibioproject", "prjna"],
        Some(r"^PRJ[NED][A-Z]?\d+$"),
    ),
    (
        "insdc.sra",
        &["sra", "ncbi.sra", "insdc_sra"],
        Some(r"^[SED]R[APRSXZ]\d+$"),
    ),
    (
        "gold",
        &["jgi.gold", "goldid", "gold_id"],
        Some(r"^G[abps]\d+$"),
    ),
    (
        "igsn",
        &["igsn.org"],
        Some(r"^[A-Za-z]{2,5}[A-Za-z0-9.\-]+$"),
    ),
    (
        "nmdc",
        &["nmdc.id"],
        Some(r"^[a-z]{1,6}-[0-9a-z]{1,6}-[0-9a-z]+(\.\d+)*$"),
    ),
    ("emsl", &["emsl.project", "emsl_project"], Some(r"^\d+$")),
    ("ENVO", &["envo", "obo.envo"], Some(r"^\d{7,8}$")),
    ("NCBITaxon", &["ncbitaxon", "taxon", "ncbi.taxon"], Some(r"^\d+$")),
    ("img.taxon", &["img", "img_taxon"], Some(r"^\d+$")),
];

/// A fixed table of prefixes, with case-insensitive synonym matching.
#[derive(Debug, Clone)]
pub struct StaticPrefixRegistry {
    entries: IndexMap<String, PrefixEntry>,
    /// Lower-cased spelling to canonical prefix.
    lookup: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    prefixes: IndexMap<String, PrefixDocument>,
}

#[derive(Debug, Deserialize)]
struct PrefixDocument {
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    pattern: Option<String>,
}

impl StaticPrefixRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
            lookup: HashMap::new(),
        }
    }

    /// Registry with the built-in biosample-related prefixes.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (prefix, synonyms, pattern) in BUILTIN_PREFIXES {
            // Built-in patterns are literals covered by tests.
            if let Ok(entry) = PrefixEntry::new(*prefix, synonyms, *pattern) {
                registry.register(entry);
            }
        }
        registry
    }

    /// Load prefixes from a JSON document:
    /// `{"prefixes": {"biosample": {"synonyms": [...], "pattern": "..."}}}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: RegistryDocument = serde_json::from_str(json)?;
        let mut registry = Self::empty();
        for (prefix, doc) in document.prefixes {
            if prefix.trim().is_empty() || prefix.contains(':') {
                return Err(AnnotatorError::Registry {
                    prefix,
                    message: "prefix must be non-empty and contain no ':'".to_string(),
                });
            }
            let synonyms: Vec<&str> = doc.synonyms.iter().map(String::as_str).collect();
            registry.register(PrefixEntry::new(prefix, &synonyms, doc.pattern.as_deref())?);
        }
        info!(prefixes = registry.len(), "prefix registry loaded");
        Ok(registry)
    }

    /// Load prefixes from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AnnotatorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&contents)
    }

    /// Add or replace a prefix.
    pub fn register(&mut self, entry: PrefixEntry) {
        self.lookup
            .insert(entry.prefix.to_lowercase(), entry.prefix.clone());
        for synonym in &entry.synonyms {
            self.lookup
                .entry(synonym.to_lowercase())
                .or_insert_with(|| entry.prefix.clone());
        }
        self.entries.insert(entry.prefix.clone(), entry);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_entry(mut self, entry: PrefixEntry) -> Self {
        self.register(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical prefixes, in registration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for StaticPrefixRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PrefixRegistry for StaticPrefixRegistry {
    fn normalize_prefix(&self, prefix: &str) -> Option<String> {
        let prefix = prefix.trim();
        if self.entries.contains_key(prefix) {
            return Some(prefix.to_string());
        }
        self.lookup.get(&prefix.to_lowercase()).cloned()
    }

    fn get_pattern(&self, prefix: &str) -> Option<&Regex> {
        self.entries.get(prefix)?.pattern.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_patterns_compile() {
        let registry = StaticPrefixRegistry::builtin();
        assert_eq!(registry.len(), BUILTIN_PREFIXES.len());
    }

    #[test]
    fn test_normalize_prefix() {
        let registry = StaticPrefixRegistry::builtin();
        assert_eq!(registry.normalize_prefix("biosample").as_deref(), Some("biosample"));
        assert_eq!(registry.normalize_prefix("BIOSAMPLE").as_deref(), Some("biosample"));
        assert_eq!(registry.normalize_prefix("NCBI.BioSample").as_deref(), Some("biosample"));
        assert_eq!(registry.normalize_prefix("envo").as_deref(), Some("ENVO"));
        assert_eq!(registry.normalize_prefix("sra").as_deref(), Some("insdc.sra"));
        assert!(registry.normalize_prefix("nosuchdb").is_none());
    }

    #[test]
    fn test_patterns() {
        let registry = StaticPrefixRegistry::builtin();
        let biosample = registry.get_pattern("biosample").unwrap();
        assert!(biosample.is_match("SAMN12345678"));
        assert!(!biosample.is_match("12345678"));
        assert!(registry.get_pattern("gold").unwrap().is_match("Gb0110115"));
        assert!(registry.get_pattern("nmdc").unwrap().is_match("bsm-11-abc123"));
        assert!(registry.get_pattern("BIOSAMPLE").is_none());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"prefixes": {"lab": {"synonyms": ["LAB_ID"], "pattern": "^L\\d+$"}, "free": {}}}"#;
        let registry = StaticPrefixRegistry::from_json_str(json).unwrap();
        assert_eq!(registry.normalize_prefix("lab_id").as_deref(), Some("lab"));
        assert!(registry.get_pattern("lab").unwrap().is_match("L42"));
        assert!(registry.get_pattern("free").is_none());
    }

    #[test]
    fn test_from_json_rejects_bad_pattern() {
        let json = r#"{"prefixes": {"lab": {"pattern": "(unclosed"}}}"#;
        assert!(matches!(
            StaticPrefixRegistry::from_json_str(json),
            Err(AnnotatorError::Registry { .. })
        ));
        let json = r#"{"prefixes": {"a:b": {}}}"#;
        assert!(StaticPrefixRegistry::from_json_str(json).is_err());
    }
}
