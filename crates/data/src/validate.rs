use crate::schema::RosterEntry;
use bounty_core::{check_formula, Character, RewardMode};
use std::collections::HashSet;
use std::fmt;

/// Authoring-time problem with one roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub character_id: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character {}: {}", self.character_id, self.message)
    }
}

pub fn validate_character(character: &Character) -> Vec<String> {
    let mut problems = Vec::new();
    if character.id.trim().is_empty() {
        problems.push("id is empty".to_string());
    }
    if !(character.probability_weight.is_finite() && character.probability_weight > 0.0) {
        problems.push(format!(
            "probabilityWeight must be positive, got {}",
            character.probability_weight
        ));
    }
    match character.reward_mode {
        RewardMode::Fixed => {
            if character.fixed_value.is_none() {
                problems.push("fixed mode requires fixedValue".to_string());
            }
        }
        RewardMode::Range | RewardMode::Indeterminate => match character.bounds() {
            None => problems.push(format!(
                "{} mode requires minValue and maxValue",
                character.reward_mode
            )),
            Some((min, max)) if min > max => {
                problems.push(format!("minValue {} exceeds maxValue {}", min, max))
            }
            Some(_) => {}
        },
        RewardMode::Formula => match character.formula_text.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                if let Err(err) = check_formula(text) {
                    problems.push(format!("formula '{}' is invalid: {}", text, err));
                }
            }
            _ => problems.push("formula mode requires formulaText".to_string()),
        },
    }
    problems
}

pub fn validate_roster(entries: &[RosterEntry]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for entry in entries {
        let id = entry.id().to_string();
        if !seen.insert(id.clone()) {
            issues.push(ValidationIssue {
                character_id: id.clone(),
                message: "duplicate id".to_string(),
            });
        }
        let problems = match entry {
            RosterEntry::Character(character) => validate_character(character),
            RosterEntry::UnknownMode { tag, .. } => vec![format!("unknown reward mode '{}'", tag)],
        };
        issues.extend(problems.into_iter().map(|message| ValidationIssue {
            character_id: id.clone(),
            message,
        }));
    }
    issues
}
