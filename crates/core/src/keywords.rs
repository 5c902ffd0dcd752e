use serde::{Deserialize, Serialize};

/// Labels that open a total-declaration line on Indonesian receipts.
pub const DEFAULT_TOTAL_LABELS: &[&str] = &["TOTAL", "TAGIHAN", "JUMLAH"];

/// Tokens that disqualify a line from being a purchased item.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "SUBTOTAL", "DISKON", "PPN", "TUNAI", "KEMBALI", "CHANGE", "TOTAL", "TAGIHAN",
];

/// Case-insensitive keyword configuration for line classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSet {
    pub total_labels: Vec<String>,
    pub exclusions: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            total_labels: DEFAULT_TOTAL_LABELS.iter().map(|s| s.to_string()).collect(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl KeywordSet {
    pub fn new<L, E>(total_labels: L, exclusions: E) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            total_labels: total_labels.into_iter().map(Into::into).collect(),
            exclusions: exclusions.into_iter().map(Into::into).collect(),
        }
    }

    /// Upper-cased, trimmed, non-empty exclusion tokens.
    pub fn normalized_exclusions(&self) -> Vec<String> {
        normalize_tokens(&self.exclusions)
    }

    /// Upper-cased, trimmed, non-empty total labels.
    pub fn normalized_total_labels(&self) -> Vec<String> {
        normalize_tokens(&self.total_labels)
    }
}

fn normalize_tokens(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_indonesian() {
        let k = KeywordSet::default();
        assert_eq!(k.total_labels, vec!["TOTAL", "TAGIHAN", "JUMLAH"]);
        assert!(k.exclusions.iter().any(|e| e == "KEMBALI"));
    }

    #[test]
    fn normalization_uppercases_and_drops_blanks() {
        let k = KeywordSet::new(["total ", "  "], ["Tax", ""]);
        assert_eq!(k.normalized_total_labels(), vec!["TOTAL"]);
        assert_eq!(k.normalized_exclusions(), vec!["TAX"]);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let k: KeywordSet = toml::from_str(r#"exclusions = ["TAX", "CASH"]"#).unwrap();
        assert_eq!(k.exclusions, vec!["TAX", "CASH"]);
        assert_eq!(k.total_labels, KeywordSet::default().total_labels);
    }
}
