use crate::RewardError;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::thread_rng().gen())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for RngState {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Uniform integer over the closed interval `[min, max]`, computed as
/// `floor(u * (max - min + 1)) + min`.
pub fn sample_range<R: RandomSource + ?Sized>(
    rng: &mut R,
    min: i64,
    max: i64,
) -> Result<i64, RewardError> {
    if min > max {
        return Err(RewardError::InvalidBounds { min, max });
    }
    let span = (i128::from(max) - i128::from(min) + 1) as f64;
    let offset = (rng.next_unit() * span).floor() as i128;
    // f64 rounding on very wide spans can land one past the end.
    let value = (i128::from(min) + offset).min(i128::from(max));
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedUnit(f64);

    impl RandomSource for FixedUnit {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn lowest_draw_hits_min() {
        assert_eq!(sample_range(&mut FixedUnit(0.0), 10, 20).unwrap(), 10);
    }

    #[test]
    fn highest_draw_hits_max() {
        let draw = 1.0 - f64::EPSILON;
        assert_eq!(sample_range(&mut FixedUnit(draw), 10, 20).unwrap(), 20);
    }

    #[test]
    fn single_point_range() {
        assert_eq!(sample_range(&mut FixedUnit(0.7), -3, -3).unwrap(), -3);
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let err = sample_range(&mut FixedUnit(0.5), 5, 1).unwrap_err();
        assert_eq!(err, RewardError::InvalidBounds { min: 5, max: 1 });
    }

    #[test]
    fn full_i64_span_stays_in_range() {
        let draw = 1.0 - f64::EPSILON;
        let value = sample_range(&mut FixedUnit(draw), i64::MIN, i64::MAX).unwrap();
        assert!(value > i64::MAX / 2);
        let value = sample_range(&mut FixedUnit(0.0), i64::MIN, i64::MAX).unwrap();
        assert_eq!(value, i64::MIN);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RngState::from_seed(42);
        let mut b = RngState::from_seed(42);
        for _ in 0..32 {
            assert_eq!(
                sample_range(&mut a, 0, 1_000_000).unwrap(),
                sample_range(&mut b, 0, 1_000_000).unwrap()
            );
        }
        assert_eq!(a.seed(), 42);
    }
}
