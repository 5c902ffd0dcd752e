use serde::{Deserialize, Serialize};

use crate::money::Amount;

/// One purchasable product line recognized on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    /// Price in the smallest currency unit.
    pub price: u64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: u64) -> Self {
        Self { name: name.into(), price }
    }
}

/// Structured data recovered from one receipt's OCR text.
///
/// `total` is derived independently of `items` and is never checked
/// against their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub items: Vec<LineItem>,
    pub total: u64,
}

impl ParseResult {
    /// No item line was recognized. Callers show the raw text instead.
    pub fn is_empty_extraction(&self) -> bool {
        self.items.is_empty()
    }

    /// Neither items nor a total could be recovered.
    pub fn is_blank(&self) -> bool {
        self.items.is_empty() && self.total == 0
    }

    pub fn total_amount(&self) -> Amount {
        Amount(self.total)
    }
}
