//! Round-based attrition.
//!
//! Long battles bleed every living actor a fraction of current or max HP at
//! round start, as true damage.

use crate::config::{AttritionBasis, AttritionTier};
use crate::state::Actor;

/// Damage the tier deals to `actor`. At least 1 while the tier is active.
pub fn attrition_damage(tier: &AttritionTier, actor: &Actor) -> u32 {
    if tier.percent <= 0.0 || !actor.is_alive() {
        return 0;
    }
    let basis = match tier.basis {
        AttritionBasis::CurrentHp => actor.hp,
        AttritionBasis::MaxHp => actor.max_hp,
    };
    ((basis as f32 * tier.percent).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ArchetypeId, TeamId};

    fn tier(percent: f32, basis: AttritionBasis) -> AttritionTier {
        AttritionTier {
            from_round: 1,
            percent,
            basis,
        }
    }

    #[test]
    fn uses_the_configured_basis() {
        let mut actor = Actor::new("a", ArchetypeId(0), TeamId::HOME, 200);
        actor.hp = 60;
        assert_eq!(attrition_damage(&tier(0.1, AttritionBasis::CurrentHp), &actor), 6);
        assert_eq!(attrition_damage(&tier(0.1, AttritionBasis::MaxHp), &actor), 20);
    }

    #[test]
    fn floors_at_one_point() {
        let mut actor = Actor::new("a", ArchetypeId(0), TeamId::HOME, 200);
        actor.hp = 3;
        assert_eq!(attrition_damage(&tier(0.05, AttritionBasis::CurrentHp), &actor), 1);
        assert_eq!(attrition_damage(&tier(0.0, AttritionBasis::CurrentHp), &actor), 0);
    }
}
