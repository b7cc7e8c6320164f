use crate::{Character, RewardOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// One disbursement, built once per reward event and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardLog {
    pub character_id: String,
    pub user_id: String,
    pub actual_value: i64,
    /// Mode keyword, or the raw stored tag when it was not recognised.
    pub mode_used: String,
    pub metadata: RewardMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

impl RewardLog {
    pub fn from_outcome(
        character_id: &str,
        user_id: &str,
        mode_tag: &str,
        outcome: &RewardOutcome,
        seed: Option<u64>,
    ) -> Self {
        let mode_used = outcome
            .mode_keyword()
            .map(str::to_string)
            .unwrap_or_else(|| mode_tag.to_string());
        Self {
            character_id: character_id.to_string(),
            user_id: user_id.to_string(),
            actual_value: outcome.value,
            mode_used,
            metadata: RewardMetadata {
                formula_result: outcome.formula_trace.clone(),
                seed,
                failure: outcome.failure.as_ref().map(ToString::to_string),
            },
            created_at: None,
        }
    }

    pub fn for_character(
        character: &Character,
        user_id: &str,
        outcome: &RewardOutcome,
        seed: Option<u64>,
    ) -> Self {
        Self::from_outcome(
            &character.id,
            user_id,
            character.reward_mode.keyword(),
            outcome,
            seed,
        )
    }

    pub fn at(mut self, created_at: u64) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// Before/after change record for an admin edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub user_id: String,
    pub action: AuditAction,
    pub target_table: String,
    pub target_id: String,
    pub before: Value,
    pub after: Value,
    pub timestamp: u64,
}

pub const CHARACTERS_TABLE: &str = "characters";

impl AuditLog {
    /// Records a character edit. The action follows from which sides exist:
    /// only `after` is a create, only `before` is a delete. Returns `None`
    /// when both sides are missing.
    pub fn character_change(
        user_id: &str,
        before: Option<&Character>,
        after: Option<&Character>,
        timestamp: u64,
    ) -> Option<Self> {
        let (action, target_id) = match (before, after) {
            (None, Some(after)) => (AuditAction::Create, after.id.clone()),
            (Some(before), None) => (AuditAction::Delete, before.id.clone()),
            (Some(_), Some(after)) => (AuditAction::Update, after.id.clone()),
            (None, None) => return None,
        };
        Some(Self {
            user_id: user_id.to_string(),
            action,
            target_table: CHARACTERS_TABLE.to_string(),
            target_id,
            before: snapshot(before),
            after: snapshot(after),
            timestamp,
        })
    }
}

fn snapshot(character: Option<&Character>) -> Value {
    character
        .and_then(|character| serde_json::to_value(character).ok())
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compute_reward, RewardInputs, RngState};

    #[test]
    fn reward_log_carries_trace_and_seed() {
        let character = Character::formula("4", "Golem", "base * 2 + rand(1000, 5000)");
        let mut rng = RngState::from_seed(77);
        let outcome = compute_reward(&character, RewardInputs::default(), &mut rng);
        let log = RewardLog::for_character(&character, "player-1", &outcome, Some(rng.seed()));
        assert_eq!(log.mode_used, "formula");
        assert_eq!(log.actual_value, outcome.value);
        assert_eq!(log.metadata.seed, Some(77));
        let trace = log.metadata.formula_result.expect("formula trace");
        assert!(trace.starts_with("base * 2 + "));
        assert!(log.metadata.failure.is_none());
    }

    #[test]
    fn reward_log_json_uses_camel_case() {
        let character = Character::fixed("2", "Goblin", 5000);
        let outcome = compute_reward(&character, RewardInputs::default(), &mut RngState::from_seed(1));
        let log = RewardLog::for_character(&character, "u", &outcome, None).at(1_700_000_000_000);
        let json = serde_json::to_value(&log).expect("serialize");
        assert_eq!(json["characterId"], "2");
        assert_eq!(json["actualValue"], 5000);
        assert_eq!(json["modeUsed"], "fixed");
        assert_eq!(json["createdAt"], 1_700_000_000_000u64);
        assert!(json["metadata"].get("seed").is_none());
    }

    #[test]
    fn unknown_mode_log_keeps_raw_tag() {
        let outcome = RewardOutcome::unknown_mode("jackpot");
        let log = RewardLog::from_outcome("9", "u", "jackpot", &outcome, None);
        assert_eq!(log.mode_used, "jackpot");
        assert_eq!(log.actual_value, 0);
        assert_eq!(
            log.metadata.failure.as_deref(),
            Some("unknown reward mode 'jackpot'")
        );
    }

    #[test]
    fn audit_action_follows_sides() {
        let before = Character::fixed("2", "Goblin", 5000);
        let mut after = before.clone();
        after.fixed_value = Some(6000);

        let update = AuditLog::character_change("admin", Some(&before), Some(&after), 10)
            .expect("update entry");
        assert_eq!(update.action, AuditAction::Update);
        assert_eq!(update.before["fixedValue"], 5000);
        assert_eq!(update.after["fixedValue"], 6000);
        assert_eq!(update.target_table, CHARACTERS_TABLE);

        let create = AuditLog::character_change("admin", None, Some(&after), 11).expect("create");
        assert_eq!(create.action, AuditAction::Create);
        assert!(create.before.is_null());

        let delete = AuditLog::character_change("admin", Some(&before), None, 12).expect("delete");
        assert_eq!(delete.action, AuditAction::Delete);
        assert_eq!(delete.target_id, "2");

        assert!(AuditLog::character_change("admin", None, None, 13).is_none());
    }
}
