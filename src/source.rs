//! Injected value generation for producers.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_VALUE_RANGE: RangeInclusive<u32> = 1..=100;

/// Something a producer can draw its next value from.
pub trait ValueSource: Send {
    fn next_value(&mut self) -> u32;
}

/// Uniformly distributed values over an inclusive range.
pub struct RandomSource {
    rng: StdRng,
    range: RangeInclusive<u32>,
}

impl RandomSource {
    pub fn new(range: RangeInclusive<u32>) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            range,
        }
    }

    pub fn seeded(seed: u64, range: RangeInclusive<u32>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            range,
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_RANGE)
    }
}

impl ValueSource for RandomSource {
    fn next_value(&mut self) -> u32 {
        self.rng.gen_range(self.range.clone())
    }
}

/// Replays a fixed list of values, starting over once the list is exhausted.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<u32>,
    next: usize,
}

impl SequenceSource {
    /// # Panics
    ///
    /// Panics if `values` is empty.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        let values = values.into();
        assert!(!values.is_empty(), "SequenceSource needs at least one value");
        Self { values, next: 0 }
    }
}

impl ValueSource for SequenceSource {
    fn next_value(&mut self) -> u32 {
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_source_stays_in_range() {
        let mut source = RandomSource::default();
        for _ in 0..1_000 {
            let value = source.next_value();
            assert!(DEFAULT_VALUE_RANGE.contains(&value));
        }
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = RandomSource::seeded(7, 1..=100);
        let mut b = RandomSource::seeded(7, 1..=100);
        let first: Vec<_> = (0..20).map(|_| a.next_value()).collect();
        let second: Vec<_> = (0..20).map(|_| b.next_value()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_value_range() {
        let mut source = RandomSource::seeded(1, 5..=5);
        assert!((0..10).all(|_| source.next_value() == 5));
    }

    #[test]
    fn test_sequence_source_cycles() {
        let mut source = SequenceSource::new(vec![37, 12, 90]);
        let drawn: Vec<_> = (0..5).map(|_| source.next_value()).collect();
        assert_eq!(drawn, vec![37, 12, 90, 37, 12]);
    }

    #[test]
    #[should_panic(expected = "at least one value")]
    fn test_sequence_source_rejects_empty() {
        SequenceSource::new(Vec::new());
    }
}
