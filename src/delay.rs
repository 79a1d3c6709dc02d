use rand::{rngs::StdRng, Rng, SeedableRng};

/// Chooses how long the surface stays red before arming, in whole seconds
pub trait DelayPicker {
    fn pick_secs(&mut self, min_secs: u64, max_secs: u64) -> u64;
}

/// Uniform integer delay in `[min, max]`
#[derive(Debug, Clone)]
pub struct RandomDelay {
    rng: StdRng,
}

impl RandomDelay {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DelayPicker for RandomDelay {
    fn pick_secs(&mut self, min_secs: u64, max_secs: u64) -> u64 {
        if min_secs >= max_secs {
            return min_secs;
        }
        self.rng.gen_range(min_secs..=max_secs)
    }
}

/// Always the same delay; ignores the configured range
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub u64);

impl DelayPicker for FixedDelay {
    fn pick_secs(&mut self, _min_secs: u64, _max_secs: u64) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_delay_stays_in_range() {
        let mut picker = RandomDelay::new(Some(7));
        for _ in 0..500 {
            let secs = picker.pick_secs(1, 8);
            assert!((1..=8).contains(&secs), "{secs} out of range");
        }
    }

    #[test]
    fn random_delay_covers_both_ends() {
        let mut picker = RandomDelay::new(Some(42));
        let picks: Vec<u64> = (0..1_000).map(|_| picker.pick_secs(1, 8)).collect();
        assert!(picks.contains(&1));
        assert!(picks.contains(&8));
    }

    #[test]
    fn seeded_delays_repeat() {
        let mut a = RandomDelay::new(Some(3));
        let mut b = RandomDelay::new(Some(3));
        for _ in 0..20 {
            assert_eq!(a.pick_secs(1, 8), b.pick_secs(1, 8));
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        let mut picker = RandomDelay::new(Some(1));
        assert_eq!(picker.pick_secs(4, 4), 4);
    }

    #[test]
    fn fixed_delay_ignores_range() {
        let mut picker = FixedDelay(2);
        assert_eq!(picker.pick_secs(1, 8), 2);
    }
}
