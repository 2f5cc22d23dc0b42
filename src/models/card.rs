use serde::{Deserialize, Serialize};

/// Read-only view of one rendered signal card.
///
/// Implemented by adapters over whatever produced the page; the parser only
/// ever sees these four accessors.
pub trait Card {
    /// Full visible text of the card.
    fn text(&self) -> &str;
    /// Class attribute, space separated.
    fn tags(&self) -> &str;
    /// Text of the instrument link, e.g. `BTC/USDT`.
    fn symbol_text(&self) -> &str;
    /// Value cells in page order.
    fn sub_values(&self) -> &[SubValue];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubValue {
    #[serde(default)]
    pub label: String,
    pub text: String,
}

impl SubValue {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Plain card snapshot as delivered by a page source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCard {
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "class")]
    pub classes: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub values: Vec<SubValue>,
}

impl Card for RawCard {
    fn text(&self) -> &str {
        &self.text
    }

    fn tags(&self) -> &str {
        &self.classes
    }

    fn symbol_text(&self) -> &str {
        &self.symbol
    }

    fn sub_values(&self) -> &[SubValue] {
        &self.values
    }
}
