//! Identifier (CURIE) validation.

mod registry;

pub use registry::{PrefixEntry, PrefixRegistry, StaticPrefixRegistry};

use crate::report::{Category, Message, Severity};

/// Fields that may carry the sample identifier, in priority order.
pub const IDENTIFIER_FIELDS: &[&str] = &["id", "source_mat_id", "identifier"];

/// Outcome of checking one identifier against a prefix registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CurieCheck {
    /// The identifier, with its prefix rewritten to canonical form when the
    /// registry knew a better spelling.
    pub identifier: String,
    /// Canonical prefix, when one was resolved.
    pub prefix: Option<String>,
    pub messages: Vec<Message>,
}

impl CurieCheck {
    /// True when no message reports an issue.
    pub fn is_clean(&self) -> bool {
        self.messages.iter().all(|m| !m.severity.is_issue())
    }
}

/// Check `raw` as a CURIE.
///
/// Never fails: every problem is a message on the result, and the identifier
/// is kept (possibly with a rewritten prefix).
pub fn check_curie(raw: &str, field: &str, registry: &dyn PrefixRegistry) -> CurieCheck {
    let raw = raw.trim();
    let mut messages = Vec::new();

    let Some((prefix, local)) = raw.split_once(':') else {
        messages.push(
            Message::info(
                Category::Identifier,
                format!("identifier '{}' is not a CURIE", raw),
            )
            .with_field(field),
        );
        return CurieCheck {
            identifier: raw.to_string(),
            prefix: None,
            messages,
        };
    };

    if local.contains(':') {
        messages.push(
            Message::new(
                Category::Identifier,
                Severity::MEDIUM,
                format!("CURIE syntax error: '{}' has more than one ':'", raw),
            )
            .with_field(field)
            .unrepaired(),
        );
    }
    if prefix.trim().is_empty() || local.trim().is_empty() {
        messages.push(
            Message::new(
                Category::Identifier,
                Severity::MEDIUM,
                format!("CURIE syntax error: '{}' has an empty prefix or local id", raw),
            )
            .with_field(field)
            .unrepaired(),
        );
    }

    let Some(canonical) = registry.normalize_prefix(prefix) else {
        messages.push(
            Message::new(
                Category::Identifier,
                Severity::HIGH,
                format!("unable to normalize prefix '{}'", prefix),
            )
            .with_field(field)
            .unrepaired(),
        );
        return CurieCheck {
            identifier: raw.to_string(),
            prefix: None,
            messages,
        };
    };

    let identifier = if canonical != prefix {
        let rewritten = format!("{}:{}", canonical, local);
        messages.push(
            Message::new(
                Category::Identifier,
                Severity::LOW,
                format!("normalized prefix: '{}' -> '{}'", raw, rewritten),
            )
            .with_field(field)
            .repaired(),
        );
        rewritten
    } else {
        raw.to_string()
    };

    if let Some(pattern) = registry.get_pattern(&canonical) {
        if !pattern.is_match(local) {
            messages.push(
                Message::new(
                    Category::Identifier,
                    Severity::MEDIUM,
                    format!(
                        "local id '{}' does not match pattern {} for prefix '{}'",
                        local,
                        pattern.as_str(),
                        canonical
                    ),
                )
                .with_field(field)
                .unrepaired(),
            );
        }
    }

    CurieCheck {
        identifier,
        prefix: Some(canonical),
        messages,
    }
}
