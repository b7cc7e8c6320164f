use bounty_core::{
    compute_reward, Character, RandomSource, RewardInputs, RewardLog, RewardMode, RewardOutcome,
};
use serde::{Deserialize, Serialize};

/// One stored roster row. Rows whose mode tag is not a known [`RewardMode`]
/// are kept so they can still be listed and resolve to a zero reward.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterEntry {
    Character(Character),
    UnknownMode {
        id: String,
        name: String,
        tag: String,
    },
}

impl RosterEntry {
    pub fn id(&self) -> &str {
        match self {
            Self::Character(character) => &character.id,
            Self::UnknownMode { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Character(character) => &character.name,
            Self::UnknownMode { name, .. } => name,
        }
    }

    pub fn mode_tag(&self) -> &str {
        match self {
            Self::Character(character) => character.reward_mode.keyword(),
            Self::UnknownMode { tag, .. } => tag,
        }
    }

    pub fn character(&self) -> Option<&Character> {
        match self {
            Self::Character(character) => Some(character),
            Self::UnknownMode { .. } => None,
        }
    }

    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        inputs: RewardInputs,
        rng: &mut R,
    ) -> RewardOutcome {
        match self {
            Self::Character(character) => compute_reward(character, inputs, rng),
            Self::UnknownMode { tag, .. } => RewardOutcome::unknown_mode(tag),
        }
    }

    pub fn reward_log(&self, user_id: &str, outcome: &RewardOutcome, seed: Option<u64>) -> RewardLog {
        RewardLog::from_outcome(self.id(), user_id, self.mode_tag(), outcome, seed)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEntryHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub reward_mode: String,
}

impl RawEntryHeader {
    pub fn known_mode(&self) -> Option<RewardMode> {
        RewardMode::from_keyword(&self.reward_mode)
    }
}

/// Defaults for a reward run; CLI flags override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_base_value")]
    pub base_value: f64,
    #[serde(default = "default_level")]
    pub level: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_base_value() -> f64 {
    bounty_core::DEFAULT_BASE_VALUE
}

fn default_level() -> f64 {
    bounty_core::DEFAULT_LEVEL
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_value: default_base_value(),
            level: default_level(),
            seed: None,
            user_id: default_user_id(),
        }
    }
}

impl EngineConfig {
    pub fn inputs(&self) -> RewardInputs {
        RewardInputs::new(self.base_value, self.level)
    }
}
