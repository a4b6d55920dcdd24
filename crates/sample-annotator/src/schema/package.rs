//! MIxS environmental packages.
//!
//! Reference: https://genomicsstandardsconsortium.github.io/mixs/

use serde::{Deserialize, Serialize};

/// MIxS environmental package types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvPackage {
    Agriculture,
    Air,
    BuiltEnvironment,
    HostAssociated,
    HumanAssociated,
    HumanGut,
    HumanOral,
    HumanSkin,
    HumanVaginal,
    HydrocarbonResourcesCores,
    HydrocarbonResourcesFluidsSwabs,
    MicrobialMatBiofilm,
    Miscellaneous,
    PlantAssociated,
    Sediment,
    Soil,
    SymbiontAssociated,
    WastewaterSludge,
    Water,
}

/// Canonical name and accepted spellings (compared after `package_key`).
const PACKAGE_NAMES: &[(EnvPackage, &str, &[&str])] = &[
    (EnvPackage::Agriculture, "agriculture", &["agricultural"]),
    (EnvPackage::Air, "air", &[]),
    (EnvPackage::BuiltEnvironment, "built environment", &["built", "indoor"]),
    (EnvPackage::HostAssociated, "host-associated", &["host"]),
    (EnvPackage::HumanAssociated, "human-associated", &["human"]),
    (EnvPackage::HumanGut, "human-gut", &["gut", "stool", "fecal"]),
    (EnvPackage::HumanOral, "human-oral", &["oral", "saliva"]),
    (EnvPackage::HumanSkin, "human-skin", &["skin"]),
    (EnvPackage::HumanVaginal, "human-vaginal", &["vaginal"]),
    (
        EnvPackage::HydrocarbonResourcesCores,
        "hydrocarbon resources-cores",
        &["hydrocarbon cores"],
    ),
    (
        EnvPackage::HydrocarbonResourcesFluidsSwabs,
        "hydrocarbon resources-fluids/swabs",
        &["hydrocarbon fluids", "hydrocarbon swabs"],
    ),
    (
        EnvPackage::MicrobialMatBiofilm,
        "microbial mat/biofilm",
        &["microbial mat", "biofilm"],
    ),
    (
        EnvPackage::Miscellaneous,
        "miscellaneous natural or artificial environment",
        &["miscellaneous", "misc"],
    ),
    (EnvPackage::PlantAssociated, "plant-associated", &["plant"]),
    (EnvPackage::Sediment, "sediment", &[]),
    (EnvPackage::Soil, "soil", &[]),
    (EnvPackage::SymbiontAssociated, "symbiont-associated", &["symbiont"]),
    (
        EnvPackage::WastewaterSludge,
        "wastewater/sludge",
        &["wastewater", "sludge", "sewage"],
    ),
    (EnvPackage::Water, "water", &["aquatic", "freshwater", "marine"]),
];

/// Comparison key for package names: lowercase with separators removed.
pub(crate) fn package_key(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '/'))
        .collect()
}

impl EnvPackage {
    /// Canonical MIxS package name.
    pub fn name(&self) -> &'static str {
        PACKAGE_NAMES
            .iter()
            .find(|(pkg, _, _)| pkg == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("")
    }

    /// Parse a package name, ignoring case and separators, accepting common
    /// shorthand ("gut", "sewage", ...).
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let key = package_key(s);
        if key.is_empty() {
            return None;
        }
        PACKAGE_NAMES
            .iter()
            .find(|(_, name, synonyms)| {
                package_key(name) == key || synonyms.iter().any(|syn| package_key(syn) == key)
            })
            .map(|(pkg, _, _)| *pkg)
    }

    /// All packages.
    pub fn all() -> impl Iterator<Item = EnvPackage> {
        PACKAGE_NAMES.iter().map(|(pkg, _, _)| *pkg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_from_string() {
        assert_eq!(EnvPackage::from_str_flexible("soil"), Some(EnvPackage::Soil));
        assert_eq!(EnvPackage::from_str_flexible("SOIL"), Some(EnvPackage::Soil));
        assert_eq!(EnvPackage::from_str_flexible("human_gut"), Some(EnvPackage::HumanGut));
        assert_eq!(EnvPackage::from_str_flexible("stool"), Some(EnvPackage::HumanGut));
        assert_eq!(
            EnvPackage::from_str_flexible("Wastewater/Sludge"),
            Some(EnvPackage::WastewaterSludge)
        );
        assert_eq!(EnvPackage::from_str_flexible("lunar regolith"), None);
        assert_eq!(EnvPackage::from_str_flexible("  "), None);
    }

    #[test]
    fn test_every_package_has_a_name() {
        for pkg in EnvPackage::all() {
            assert!(!pkg.name().is_empty());
            assert_eq!(EnvPackage::from_str_flexible(pkg.name()), Some(pkg));
        }
    }
}
