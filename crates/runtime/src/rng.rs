//! `rand`-backed combat RNG for live hosts.
//!
//! Tests and replays use the core's `PcgRng`/`ScriptedRng`; a live host
//! that does not need reproducibility seeds from the OS instead.

use arena_core::CombatRng;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Adapter exposing any [`RngCore`] as a [`CombatRng`].
#[derive(Debug, Clone)]
pub struct RandRng<R = StdRng> {
    inner: R,
}

impl RandRng<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl<R: RngCore> RandRng<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: RngCore + Send> CombatRng for RandRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn roll_unit(&mut self) -> f32 {
        self.inner.r#gen::<f32>()
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.inner.gen_range(1..=sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_repeat() {
        let mut a = RandRng::seeded(9);
        let mut b = RandRng::seeded(9);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn rolls_stay_in_range() {
        let mut rng = RandRng::seeded(3);
        for _ in 0..500 {
            let unit = rng.roll_unit();
            assert!((0.0..1.0).contains(&unit));
            let die = rng.roll_die(20);
            assert!((1..=20).contains(&die));
        }
        assert_eq!(rng.roll_die(0), 0);
    }
}
