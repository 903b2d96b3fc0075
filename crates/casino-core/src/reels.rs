//! Virtual reels built from weighted symbol sets

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::random::RandomSource;
use crate::symbols::Symbol;

/// A shuffled virtual reel strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualReel {
    /// Physical reel index
    pub reel_index: usize,
    /// Indices into the configured symbol list, in strip order
    pub stops: Vec<usize>,
}

impl VirtualReel {
    /// Shuffled copy of an expanded strip
    pub fn shuffled<R: RandomSource>(rng: &mut R, reel_index: usize, strip: &[usize]) -> Self {
        let mut stops = strip.to_vec();
        shuffle(rng, &mut stops);
        Self { reel_index, stops }
    }

    /// Symbol index at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> usize {
        self.stops[position % self.stops.len()]
    }

    /// `rows` consecutive symbol indices starting at `stop`, wrapping circularly
    pub fn window(&self, stop: usize, rows: usize) -> Vec<usize> {
        (0..rows).map(|row| self.symbol_at(stop + row)).collect()
    }

    /// Total strip length
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Expands a symbol table into independently shuffled reel strips
#[derive(Debug, Clone, Copy)]
pub struct WeightedReelBuilder<'a> {
    symbols: &'a [Symbol],
}

impl<'a> WeightedReelBuilder<'a> {
    /// Reject symbol sets that cannot produce a reel
    pub fn new(symbols: &'a [Symbol]) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if symbols.iter().all(|s| s.frequency == 0) {
            return Err(ConfigError::EmptyReel);
        }
        Ok(Self { symbols })
    }

    /// Strip length, the sum of all frequencies
    pub fn strip_len(&self) -> usize {
        self.symbols.iter().map(|s| s.frequency as usize).sum()
    }

    /// Unshuffled weighted expansion: each symbol index `frequency` times
    pub fn expand(&self) -> Vec<usize> {
        let mut stops = Vec::with_capacity(self.strip_len());
        for (index, symbol) in self.symbols.iter().enumerate() {
            stops.extend(std::iter::repeat_n(index, symbol.frequency as usize));
        }
        stops
    }

    /// Build one shuffled reel
    pub fn build_reel<R: RandomSource>(&self, rng: &mut R, reel_index: usize) -> VirtualReel {
        VirtualReel::shuffled(rng, reel_index, &self.expand())
    }

    /// Build `reel_count` reels, each shuffled independently
    pub fn build<R: RandomSource>(&self, rng: &mut R, reel_count: usize) -> Vec<VirtualReel> {
        build_from_strip(rng, &self.expand(), reel_count)
    }
}

/// `reel_count` independently shuffled copies of an expanded strip
pub fn build_from_strip<R: RandomSource>(rng: &mut R, strip: &[usize], reel_count: usize) -> Vec<VirtualReel> {
    (0..reel_count)
        .map(|reel_index| VirtualReel::shuffled(rng, reel_index, strip))
        .collect()
}

/// Fisher–Yates: swap position `i` with a uniform draw from `[0, i]`, `i` descending
pub fn shuffle<T, R: RandomSource>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.next_int(0, i as i64) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SecureRandomSource;

    fn symbols() -> Vec<Symbol> {
        vec![
            Symbol::regular("seven", "7", 100.0, 2),
            Symbol::regular("bar", "BAR", 50.0, 4),
            Symbol::regular("ghost", "Ghost", 10.0, 0),
            Symbol::wild("wild", "Wild", 0.0, 3),
        ]
    }

    fn composition(reel: &VirtualReel, symbol_count: usize) -> Vec<usize> {
        let mut counts = vec![0; symbol_count];
        for &stop in &reel.stops {
            counts[stop] += 1;
        }
        counts
    }

    #[test]
    fn test_reel_strip_wrap() {
        let reel = VirtualReel { reel_index: 0, stops: vec![1, 2, 3, 4, 5] };
        assert_eq!(reel.symbol_at(0), 1);
        assert_eq!(reel.symbol_at(5), 1);
        assert_eq!(reel.symbol_at(7), 3);
        assert_eq!(reel.window(4, 3), vec![5, 1, 2]);
    }

    #[test]
    fn test_shuffle_preserves_composition() {
        let symbols = symbols();
        let builder = WeightedReelBuilder::new(&symbols).unwrap();
        let mut rng = SecureRandomSource::from_seed(21);

        for reel in builder.build(&mut rng, 5) {
            assert_eq!(reel.len(), 9);
            assert_eq!(composition(&reel, symbols.len()), vec![2, 4, 0, 3]);
        }
    }

    #[test]
    fn test_zero_frequency_never_appears() {
        let symbols = symbols();
        let builder = WeightedReelBuilder::new(&symbols).unwrap();
        let mut rng = SecureRandomSource::from_seed(8);
        for _ in 0..50 {
            let reel = builder.build_reel(&mut rng, 0);
            assert!(!reel.stops.contains(&2));
        }
    }

    #[test]
    fn test_reels_shuffled_independently() {
        let symbols: Vec<Symbol> = (0..10)
            .map(|i| Symbol::regular(format!("s{i}"), format!("S{i}"), 1.0, 5))
            .collect();
        let builder = WeightedReelBuilder::new(&symbols).unwrap();
        let mut rng = SecureRandomSource::from_seed(1234);
        let reels = builder.build(&mut rng, 3);

        assert_ne!(reels[0].stops, reels[1].stops);
        assert_ne!(reels[1].stops, reels[2].stops);
        assert_eq!(reels[2].reel_index, 2);
    }

    #[test]
    fn test_build_from_strip_matches_builder() {
        let symbols = symbols();
        let builder = WeightedReelBuilder::new(&symbols).unwrap();
        let strip = builder.expand();

        let from_builder = builder.build(&mut SecureRandomSource::from_seed(77), 3);
        let from_strip = build_from_strip(&mut SecureRandomSource::from_seed(77), &strip, 3);
        assert_eq!(from_builder, from_strip);
    }

    #[test]
    fn test_empty_symbol_set_is_config_error() {
        assert!(matches!(WeightedReelBuilder::new(&[]), Err(ConfigError::NoSymbols)));

        let all_zero = vec![Symbol::regular("a", "A", 1.0, 0)];
        assert!(matches!(WeightedReelBuilder::new(&all_zero), Err(ConfigError::EmptyReel)));
    }
}
