//! Inter-clip delay scheduling.
//!
//! Clips are separated by a randomized pause so the liquidation pattern
//! is harder for other market participants to anticipate. The source is
//! a trait so tests can substitute a deterministic implementation.

use rand::Rng;
use std::time::Duration;

/// Source of inter-clip delays.
pub trait DelaySource: Send {
    /// Produce the next delay. Calls are independent; implementations
    /// carry no memory of prior delays.
    fn next_delay(&mut self) -> Duration;
}

/// Uniformly distributed delay in `[min_ms, max_ms]`, both inclusive.
#[derive(Debug, Clone, Copy)]
pub struct UniformDelay {
    min_ms: u64,
    max_ms: u64,
}

impl UniformDelay {
    /// Create a scheduler over the inclusive range `[min_ms, max_ms]`.
    /// A max below min collapses the range to min.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms,
            max_ms: max_ms.max(min_ms),
        }
    }
}

impl DelaySource for UniformDelay {
    fn next_delay(&mut self) -> Duration {
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }
}

/// Constant delay, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl DelaySource for FixedDelay {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_stay_within_bounds() {
        let mut source = UniformDelay::new(2000, 7000);
        for _ in 0..1000 {
            let d = source.next_delay().as_millis() as u64;
            assert!((2000..=7000).contains(&d), "delay {d} out of bounds");
        }
    }

    #[test]
    fn test_delays_are_not_constant() {
        let mut source = UniformDelay::new(0, 10_000);
        let first = source.next_delay();
        let varied = (0..100).any(|_| source.next_delay() != first);
        assert!(varied, "wide uniform range produced 101 equal draws");
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let mut source = UniformDelay::new(5000, 5000);
        for _ in 0..10 {
            assert_eq!(source.next_delay(), Duration::from_millis(5000));
        }
    }

    #[test]
    fn test_inverted_range_collapses_to_min() {
        let mut source = UniformDelay::new(5000, 1000);
        assert_eq!(source.next_delay(), Duration::from_millis(5000));
    }
}
