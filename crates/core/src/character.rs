use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RewardMode {
    Fixed,
    Range,
    Formula,
    /// Computed exactly like `Range`; shown to players as an approximation.
    Indeterminate,
}

impl RewardMode {
    pub const ALL: [RewardMode; 4] = [
        RewardMode::Fixed,
        RewardMode::Range,
        RewardMode::Formula,
        RewardMode::Indeterminate,
    ];

    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "range" => Some(Self::Range),
            "formula" => Some(Self::Formula),
            "indeterminate" => Some(Self::Indeterminate),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Range => "range",
            Self::Formula => "formula",
            Self::Indeterminate => "indeterminate",
        }
    }
}

impl fmt::Display for RewardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.keyword())
    }
}

/// Admin-authored reward configuration. The engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_text: String,
    pub reward_mode: RewardMode,
    #[serde(default)]
    pub fixed_value: Option<i64>,
    #[serde(default)]
    pub min_value: Option<i64>,
    #[serde(default)]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub formula_text: Option<String>,
    #[serde(default = "default_weight")]
    pub probability_weight: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

fn default_weight() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

impl Character {
    fn blank(id: &str, name: &str, mode: RewardMode) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            display_text: String::new(),
            reward_mode: mode,
            fixed_value: None,
            min_value: None,
            max_value: None,
            formula_text: None,
            probability_weight: default_weight(),
            enabled: true,
            created_by: None,
            updated_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn fixed(id: &str, name: &str, value: i64) -> Self {
        let mut character = Self::blank(id, name, RewardMode::Fixed);
        character.fixed_value = Some(value);
        character.display_text = value.to_string();
        character
    }

    pub fn range(id: &str, name: &str, min: i64, max: i64) -> Self {
        let mut character = Self::blank(id, name, RewardMode::Range);
        character.min_value = Some(min);
        character.max_value = Some(max);
        character.display_text = format!("{min}-{max}");
        character
    }

    pub fn indeterminate(id: &str, name: &str, min: i64, max: i64, display: &str) -> Self {
        let mut character = Self::blank(id, name, RewardMode::Indeterminate);
        character.min_value = Some(min);
        character.max_value = Some(max);
        character.display_text = display.to_string();
        character
    }

    pub fn formula(id: &str, name: &str, formula: &str) -> Self {
        let mut character = Self::blank(id, name, RewardMode::Formula);
        character.formula_text = Some(formula.to_string());
        character
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.probability_weight = weight;
        self
    }

    pub fn bounds(&self) -> Option<(i64, i64)> {
        Some((self.min_value?, self.max_value?))
    }
}
