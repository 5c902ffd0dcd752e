use std::sync::OnceLock;

use regex::Regex;
use struk_core::{KeywordSet, LineItem, ParseResult};
use thiserror::Error;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

// Shortest leading text, then whitespace, then a numeric run that ends the line.
re!(re_item_line, r"^(.+?)\s+([0-9.,]+)$");

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// How a single receipt line was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// A labeled total line, with its normalized amount.
    Total(u64),
    Item(LineItem),
    Noise,
}

// ── Numeric normalization ────────────────────────────────────────────────────

/// Strip `.`/`,` grouping separators and read what remains as an integer.
///
/// Anything that is not a plain run of ASCII digits after stripping yields 0.
/// A digit run too large for `u64` saturates at `u64::MAX`.
pub fn normalize_amount(token: &str) -> u64 {
    let digits: String = token.chars().filter(|c| !matches!(c, '.' | ',')).collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

// ── Public extraction API ─────────────────────────────────────────────────────

pub struct Extractor {
    /// `None` when no total labels are configured.
    total_line: Option<Regex>,
    exclusions: Vec<String>,
}

impl Extractor {
    pub fn new(keywords: &KeywordSet) -> Result<Self, ParserError> {
        let labels = keywords.normalized_total_labels();
        let total_line = if labels.is_empty() {
            None
        } else {
            let alternation = labels
                .iter()
                .map(|l| regex::escape(l))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(
                r"(?i)^(?:{alternation})\s*[:\s]?\s*([0-9.,]+)"
            ))?)
        };

        Ok(Self {
            total_line,
            exclusions: keywords.normalized_exclusions(),
        })
    }

    /// Extractor for the built-in Indonesian keyword set, compiled once per process.
    pub fn default_ref() -> &'static Extractor {
        static DEFAULT: OnceLock<Extractor> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            Extractor::new(&KeywordSet::default()).expect("default keyword patterns compile")
        })
    }

    /// Extract items and a total from raw OCR text. Never fails: lines that
    /// cannot be classified are dropped.
    pub fn extract(&self, raw_text: &str) -> ParseResult {
        let mut items = Vec::new();
        let mut total = 0u64;
        let mut total_lines = 0usize;

        for line in raw_text.lines() {
            match self.classify_line(line) {
                LineClass::Total(amount) => {
                    // Later total lines override earlier ones.
                    total = amount;
                    total_lines += 1;
                }
                LineClass::Item(item) => items.push(item),
                LineClass::Noise => {}
            }
        }

        // Best-effort: an unreadable total line is usually the largest amount printed.
        let fell_back = total == 0 && !items.is_empty();
        if fell_back {
            total = items.iter().map(|i| i.price).max().unwrap_or(0);
        }

        tracing::debug!(
            items = items.len(),
            total,
            total_lines,
            fell_back,
            "parsed receipt text"
        );

        ParseResult { items, total }
    }

    /// Classify one line. Total detection takes precedence over item detection.
    pub fn classify_line(&self, line: &str) -> LineClass {
        if let Some(amount) = self.match_total(line) {
            return LineClass::Total(amount);
        }

        let Some(c) = re_item_line().captures(line) else {
            return LineClass::Noise;
        };
        let (Some(name), Some(price)) = (c.get(1), c.get(2)) else {
            return LineClass::Noise;
        };
        let name = name
            .as_str()
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        let price = normalize_amount(price.as_str());

        if name.is_empty() {
            tracing::trace!(line, "discarded: empty item name");
            return LineClass::Noise;
        }
        if let Some(keyword) = self.excluded_by(name) {
            tracing::trace!(line, keyword, "discarded: non-item keyword");
            return LineClass::Noise;
        }
        if starts_with_integer(name) {
            tracing::trace!(line, "discarded: numeric name");
            return LineClass::Noise;
        }
        if price == 0 {
            tracing::trace!(line, "discarded: zero price");
            return LineClass::Noise;
        }

        LineClass::Item(LineItem::new(name, price))
    }

    fn match_total(&self, line: &str) -> Option<u64> {
        let c = self.total_line.as_ref()?.captures(line)?;
        Some(normalize_amount(c.get(1)?.as_str()))
    }

    fn excluded_by(&self, name: &str) -> Option<&str> {
        let upper = name.to_uppercase();
        self.exclusions
            .iter()
            .find(|k| upper.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Parse with the default keyword set.
pub fn parse(raw_text: &str) -> ParseResult {
    Extractor::default_ref().extract(raw_text)
}

/// True when the name reads as a leading integer (`"12"`, `"2x Kopi"`, `"-5 A"`).
fn starts_with_integer(name: &str) -> bool {
    let unsigned = name.strip_prefix(['+', '-']).unwrap_or(name);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
