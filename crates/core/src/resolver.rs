use crate::{
    evaluate, sample_range, Bindings, Character, FormulaError, RandomSource, RewardError,
    RewardMode,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_VALUE: f64 = 1000.0;
pub const DEFAULT_LEVEL: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardInputs {
    pub base_value: f64,
    pub level: f64,
}

impl Default for RewardInputs {
    fn default() -> Self {
        Self {
            base_value: DEFAULT_BASE_VALUE,
            level: DEFAULT_LEVEL,
        }
    }
}

impl RewardInputs {
    pub fn new(base_value: f64, level: f64) -> Self {
        Self { base_value, level }
    }

    pub fn bindings(&self) -> Bindings {
        Bindings::new(self.base_value, self.level)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewardOutcome {
    pub value: i64,
    pub mode: Option<RewardMode>,
    pub raw_value: i64,
    pub formula_trace: Option<String>,
    pub failure: Option<RewardError>,
}

impl RewardOutcome {
    fn granted(mode: RewardMode, raw_value: i64, formula_trace: Option<String>) -> Self {
        Self {
            value: raw_value.max(0),
            mode: Some(mode),
            raw_value,
            formula_trace,
            failure: None,
        }
    }

    fn failed(mode: Option<RewardMode>, failure: RewardError) -> Self {
        Self {
            value: 0,
            mode,
            raw_value: 0,
            formula_trace: None,
            failure: Some(failure),
        }
    }

    pub fn unknown_mode(tag: &str) -> Self {
        let failure = RewardError::UnknownMode(tag.to_string());
        log::warn!("reward resolved to 0: {failure}");
        Self::failed(None, failure)
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn mode_keyword(&self) -> Option<&'static str> {
        self.mode.map(RewardMode::keyword)
    }
}

/// Resolves a character's reward. Never fails: configuration and formula
/// errors resolve to a reward of 0 with the reason attached.
pub fn compute_reward<R: RandomSource + ?Sized>(
    character: &Character,
    inputs: RewardInputs,
    rng: &mut R,
) -> RewardOutcome {
    let mode = character.reward_mode;
    match resolve(character, inputs, rng) {
        Ok((raw, trace)) => {
            log::debug!("character {} ({mode}) rewarded {raw}", character.id);
            RewardOutcome::granted(mode, raw, trace)
        }
        Err(err) => {
            log::warn!(
                "character {} ({mode}) reward resolved to 0: {err}",
                character.id
            );
            RewardOutcome::failed(Some(mode), err)
        }
    }
}

pub fn compute_reward_value<R: RandomSource + ?Sized>(
    character: &Character,
    inputs: RewardInputs,
    rng: &mut R,
) -> i64 {
    compute_reward(character, inputs, rng).value
}

fn resolve<R: RandomSource + ?Sized>(
    character: &Character,
    inputs: RewardInputs,
    rng: &mut R,
) -> Result<(i64, Option<String>), RewardError> {
    let mode = character.reward_mode;
    match mode {
        RewardMode::Fixed => character
            .fixed_value
            .map(|value| (value, None))
            .ok_or(RewardError::MissingParameter {
                mode,
                field: "fixedValue",
            }),
        RewardMode::Range | RewardMode::Indeterminate => {
            let (min, max) = character.bounds().ok_or(RewardError::MissingParameter {
                mode,
                field: "minValue/maxValue",
            })?;
            sample_range(rng, min, max).map(|value| (value, None))
        }
        RewardMode::Formula => {
            let formula = character
                .formula_text
                .as_deref()
                .filter(|text| !text.trim().is_empty())
                .ok_or(RewardError::MissingParameter {
                    mode,
                    field: "formulaText",
                })?;
            let evaluation = evaluate(formula, &inputs.bindings(), rng).map_err(|source| {
                RewardError::Formula {
                    formula: formula.to_string(),
                    source,
                }
            })?;
            let floored = evaluation.value.floor();
            // i64::MAX as f64 rounds up to 2^63, which is already out of range.
            if floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
                return Err(RewardError::Formula {
                    formula: formula.to_string(),
                    source: FormulaError::NonFinite(evaluation.value),
                });
            }
            let value = floored as i64;
            Ok((value, Some(format!("{} = {}", evaluation.expanded, value))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, RngState};

    #[test]
    fn fixed_ignores_inputs() {
        let character = Character::fixed("2", "Goblin", 5000);
        let mut rng = RngState::from_seed(1);
        for (base, level) in [(0.0, 0.0), (1000.0, 1.0), (-5.0, 99.0)] {
            let outcome = compute_reward(&character, RewardInputs::new(base, level), &mut rng);
            assert_eq!(outcome.value, 5000);
            assert!(outcome.is_success());
        }
    }

    #[test]
    fn fixed_without_value_is_configuration_error() {
        let mut character = Character::fixed("2", "Goblin", 5000);
        character.fixed_value = None;
        let outcome = compute_reward(&character, RewardInputs::default(), &mut RngState::from_seed(1));
        assert_eq!(outcome.value, 0);
        assert_eq!(
            outcome.failure.map(|err| err.kind()),
            Some(ErrorKind::Configuration)
        );
    }

    #[test]
    fn range_without_bounds_resolves_to_zero() {
        let mut character = Character::range("3", "Mage", 10, 20);
        character.max_value = None;
        let outcome = compute_reward(&character, RewardInputs::default(), &mut RngState::from_seed(1));
        assert_eq!(outcome.value, 0);
        assert!(matches!(
            outcome.failure,
            Some(RewardError::MissingParameter { mode: RewardMode::Range, .. })
        ));
    }

    #[test]
    fn reversed_bounds_resolve_to_zero() {
        let character = Character::range("3", "Mage", 20, 10);
        let outcome = compute_reward(&character, RewardInputs::default(), &mut RngState::from_seed(1));
        assert_eq!(outcome.value, 0);
        assert_eq!(
            outcome.failure,
            Some(RewardError::InvalidBounds { min: 20, max: 10 })
        );
    }

    #[test]
    fn formula_binds_multiplier_from_level() {
        let character = Character::formula("4", "Golem", "base * multiplier");
        let outcome = compute_reward(
            &character,
            RewardInputs::new(1000.0, 3.0),
            &mut RngState::from_seed(1),
        );
        assert_eq!(outcome.value, 1500);
        assert_eq!(outcome.formula_trace.as_deref(), Some("base * multiplier = 1500"));
    }

    #[test]
    fn formula_result_is_floored() {
        let character = Character::formula("4", "Golem", "base / 3");
        let value = compute_reward_value(
            &character,
            RewardInputs::new(1000.0, 1.0),
            &mut RngState::from_seed(1),
        );
        assert_eq!(value, 333);
    }

    #[test]
    fn negative_formula_result_clamps_to_zero() {
        let character = Character::formula("4", "Golem", "0.5 - base");
        let outcome = compute_reward(
            &character,
            RewardInputs::new(10.0, 1.0),
            &mut RngState::from_seed(1),
        );
        assert_eq!(outcome.value, 0);
        assert_eq!(outcome.raw_value, -10);
        assert!(outcome.is_success());
    }

    #[test]
    fn formula_failure_keeps_text_and_reason() {
        let character = Character::formula("4", "Golem", "base/0");
        let outcome = compute_reward(&character, RewardInputs::default(), &mut RngState::from_seed(1));
        assert_eq!(outcome.value, 0);
        let failure = outcome.failure.expect("failure recorded");
        assert_eq!(failure.kind(), ErrorKind::Evaluation);
        assert_eq!(
            failure,
            RewardError::Formula {
                formula: "base/0".to_string(),
                source: FormulaError::DivisionByZero,
            }
        );
    }

    #[test]
    fn blank_formula_is_configuration_error() {
        let character = Character::formula("4", "Golem", "  ");
        let outcome = compute_reward(&character, RewardInputs::default(), &mut RngState::from_seed(1));
        assert_eq!(outcome.value, 0);
        assert_eq!(
            outcome.failure.map(|err| err.kind()),
            Some(ErrorKind::Configuration)
        );
    }

    #[test]
    fn unknown_mode_outcome() {
        let outcome = RewardOutcome::unknown_mode("jackpot");
        assert_eq!(outcome.value, 0);
        assert_eq!(outcome.mode_keyword(), None);
        assert_eq!(
            outcome.failure,
            Some(RewardError::UnknownMode("jackpot".to_string()))
        );
    }
}
