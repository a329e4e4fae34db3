use std::fmt;
use std::str::FromStr;

use crate::ColorError;

/// Dynamic scheme variants offered by Material Color Utilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeCategory {
    Content,
    Expressive,
    Fidelity,
    FruitSalad,
    Monochrome,
    Neutral,
    Rainbow,
    TonalSpot,
    Vibrant,
}

const ALL: [SchemeCategory; 9] = [
    SchemeCategory::Content,
    SchemeCategory::Expressive,
    SchemeCategory::Fidelity,
    SchemeCategory::FruitSalad,
    SchemeCategory::Monochrome,
    SchemeCategory::Neutral,
    SchemeCategory::Rainbow,
    SchemeCategory::TonalSpot,
    SchemeCategory::Vibrant,
];

const ALIASES: &[(&str, SchemeCategory)] = &[
    ("content", SchemeCategory::Content),
    ("expressive", SchemeCategory::Expressive),
    ("fidelity", SchemeCategory::Fidelity),
    ("fruit-salad", SchemeCategory::FruitSalad),
    ("fruitsalad", SchemeCategory::FruitSalad),
    ("monochrome", SchemeCategory::Monochrome),
    ("neutral", SchemeCategory::Neutral),
    ("neutrals", SchemeCategory::Neutral),
    ("rainbow", SchemeCategory::Rainbow),
    ("tonal-spot", SchemeCategory::TonalSpot),
    ("tonalspot", SchemeCategory::TonalSpot),
    ("vibrant", SchemeCategory::Vibrant),
];

impl SchemeCategory {
    pub fn all() -> &'static [SchemeCategory] {
        &ALL
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Expressive => "expressive",
            Self::Fidelity => "fidelity",
            Self::FruitSalad => "fruit-salad",
            Self::Monochrome => "monochrome",
            Self::Neutral => "neutral",
            Self::Rainbow => "rainbow",
            Self::TonalSpot => "tonal-spot",
            Self::Vibrant => "vibrant",
        }
    }
}

impl fmt::Display for SchemeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical category names, in display order.
pub fn supported_categories() -> Vec<&'static str> {
    ALL.iter().map(|c| c.as_str()).collect()
}

/// `"content", "expressive", ...` for error and schema descriptions.
pub fn quoted_supported_categories() -> String {
    ALL.iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lowercase and collapse runs of `_`/whitespace into single dashes.
fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if c == '_' || c.is_whitespace() {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

impl FromStr for SchemeCategory {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, category)| *category)
            .ok_or_else(|| ColorError::UnsupportedCategory(s.to_string()))
    }
}
