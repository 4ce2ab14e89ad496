//! Scalar tug-of-war momentum meter.
//!
//! The home team pushes the meter positive, the away team negative.
//! Contributions in the direction the meter already leans are damped by how
//! close it is to the cap; at `±cap` the favored team gets a swing and the
//! meter resets to zero.

use crate::config::TugConfig;
use crate::state::TeamId;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TugOfWar {
    value: f32,
}

impl TugOfWar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Push the meter toward `team` by `raw` before damping.
    pub fn contribute(&mut self, team: TeamId, raw: f32, config: &TugConfig) {
        if raw <= 0.0 || config.cap <= 0.0 {
            return;
        }
        let sign = if team == TeamId::HOME { 1.0 } else { -1.0 };
        let damp = if self.value * sign > 0.0 {
            (1.0 - config.damping * self.value.abs() / config.cap).max(0.0)
        } else {
            1.0
        };
        self.value += sign * raw * damp;
    }

    /// Returns the favored team and resets if the meter hit a cap.
    pub fn check_swing(&mut self, config: &TugConfig) -> Option<TeamId> {
        let favored = if self.value >= config.cap {
            TeamId::HOME
        } else if self.value <= -config.cap {
            TeamId::AWAY
        } else {
            return None;
        };
        self.value = 0.0;
        Some(favored)
    }

    /// Round-end decay toward zero.
    pub fn decay(&mut self, config: &TugConfig) {
        self.value *= config.decay.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_direction_contributions_are_damped() {
        let config = TugConfig::default();
        let mut tug = TugOfWar::new();
        tug.contribute(TeamId::HOME, 50.0, &config);
        assert_eq!(tug.value(), 50.0);

        // 50 × (1 − 0.5 × 50/100) = 37.5
        tug.contribute(TeamId::HOME, 50.0, &config);
        assert!((tug.value() - 87.5).abs() < 1e-4);

        // opposing pushes are not damped
        tug.contribute(TeamId::AWAY, 20.0, &config);
        assert!((tug.value() - 67.5).abs() < 1e-4);
    }

    #[test]
    fn swing_at_cap_resets_to_zero() {
        let config = TugConfig::default();
        let mut tug = TugOfWar::new();
        tug.contribute(TeamId::AWAY, 150.0, &config);
        assert_eq!(tug.check_swing(&config), Some(TeamId::AWAY));
        assert_eq!(tug.value(), 0.0);
        assert_eq!(tug.check_swing(&config), None);
    }

    #[test]
    fn decay_shrinks_toward_zero() {
        let config = TugConfig::default();
        let mut tug = TugOfWar::new();
        tug.contribute(TeamId::HOME, 40.0, &config);
        tug.decay(&config);
        assert!((tug.value() - 36.0).abs() < 1e-4);
    }
}
