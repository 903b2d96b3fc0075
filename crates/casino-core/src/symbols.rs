//! Symbol definitions

use serde::{Deserialize, Serialize};

/// Symbol classification.
///
/// A symbol is exactly one of these, so "wild and scatter at once" cannot be
/// configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    #[default]
    Regular,
    /// Wild - substitutes for others on a payline
    Wild,
    /// Scatter - pays on grid-wide count, ignores paylines
    Scatter,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID (e.g., "seven", "wild")
    pub id: String,
    /// Display name
    pub name: String,
    /// Pay value, scaled by the count multiplier tables
    pub value: f64,
    /// Relative weight on the virtual reel (0 = never appears)
    pub frequency: u32,
    /// Symbol kind
    #[serde(default)]
    pub kind: SymbolKind,
    /// Extra multiplier applied when a wild contributed to this symbol's run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl Symbol {
    /// Create a regular symbol
    pub fn regular(id: impl Into<String>, name: impl Into<String>, value: f64, frequency: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
            frequency,
            kind: SymbolKind::Regular,
            multiplier: None,
        }
    }

    /// Create a wild symbol
    pub fn wild(id: impl Into<String>, name: impl Into<String>, value: f64, frequency: u32) -> Self {
        Self {
            kind: SymbolKind::Wild,
            ..Self::regular(id, name, value, frequency)
        }
    }

    /// Create a scatter symbol
    pub fn scatter(id: impl Into<String>, name: impl Into<String>, value: f64, frequency: u32) -> Self {
        Self {
            kind: SymbolKind::Scatter,
            ..Self::regular(id, name, value, frequency)
        }
    }

    /// Attach a multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }

    pub fn is_scatter(&self) -> bool {
        self.kind == SymbolKind::Scatter
    }

    /// Two symbols line up on a payline: same ID, or either one is wild
    pub fn matches(&self, other: &Symbol) -> bool {
        self.id == other.id || self.is_wild() || other.is_wild()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_kinds() {
        let seven = Symbol::regular("seven", "7", 100.0, 2);
        let wild = Symbol::wild("wild", "Wild", 0.0, 3).with_multiplier(2.0);
        let scatter = Symbol::scatter("scatter", "Scatter", 5.0, 5);

        assert!(!seven.is_wild() && !seven.is_scatter());
        assert!(wild.is_wild() && !wild.is_scatter());
        assert!(scatter.is_scatter() && !scatter.is_wild());
        assert_eq!(wild.multiplier, Some(2.0));
    }

    #[test]
    fn test_symbol_matching() {
        let seven = Symbol::regular("seven", "7", 100.0, 2);
        let bar = Symbol::regular("bar", "BAR", 50.0, 4);
        let wild = Symbol::wild("wild", "Wild", 0.0, 3);

        assert!(seven.matches(&seven.clone()));
        assert!(!seven.matches(&bar));
        assert!(seven.matches(&wild));
        assert!(wild.matches(&bar));
    }

    #[test]
    fn test_kind_defaults_to_regular() {
        let json = r#"{ "id": "lemon", "name": "Lemon", "value": 15, "frequency": 10 }"#;
        let symbol: Symbol = serde_json::from_str(json).unwrap();
        assert_eq!(symbol.kind, SymbolKind::Regular);
        assert!(symbol.multiplier.is_none());

        let json = r#"{ "id": "w", "name": "Wild", "value": 0, "frequency": 3, "kind": "wild", "multiplier": 2 }"#;
        let symbol: Symbol = serde_json::from_str(json).unwrap();
        assert!(symbol.is_wild());
        assert_eq!(symbol.multiplier, Some(2.0));
    }
}
