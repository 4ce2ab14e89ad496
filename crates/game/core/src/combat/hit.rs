//! Hit chance and critical strike checks.

/// Chance that an enemy-directed damaging action lands.
///
/// # Formula
///
/// ```text
/// hit_chance = accuracy × (1 − dodge)
/// ```
///
/// Accuracy is expected in `[0, 2]` and dodge in `[0, 1]` (already clamped by
/// the dynamic stat getters), so the chance may exceed 1.0 and always hit.
pub fn hit_chance(accuracy: f32, dodge: f32) -> f32 {
    accuracy.max(0.0) * (1.0 - dodge.clamp(0.0, 1.0))
}

/// `roll` is uniform in `[0, 1)`; the attack hits when `roll <= hit_chance`.
pub fn check_hit(accuracy: f32, dodge: f32, roll: f32) -> bool {
    roll <= hit_chance(accuracy, dodge)
}

/// Crit lands when `roll < crit_rate`.
pub fn check_crit(crit_rate: f32, roll: f32) -> bool {
    roll < crit_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_accuracy_no_dodge_always_hits() {
        assert!(check_hit(1.0, 0.0, 0.999));
    }

    #[test]
    fn full_dodge_never_hits() {
        assert!(!check_hit(2.0, 1.0, 0.001));
    }

    #[test]
    fn partial_chance_compares_inclusive() {
        // 0.8 × (1 − 0.5) = 0.4
        assert!(check_hit(0.8, 0.5, 0.4));
        assert!(!check_hit(0.8, 0.5, 0.41));
    }

    #[test]
    fn crit_is_strict_less_than() {
        assert!(!check_crit(0.0, 0.0));
        assert!(check_crit(0.25, 0.24));
        assert!(!check_crit(0.25, 0.25));
    }
}
