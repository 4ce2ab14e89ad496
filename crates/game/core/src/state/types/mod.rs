pub mod abilities;
pub mod actor;
pub mod common;
pub mod status;
pub mod turn;

pub use abilities::{
    Abilities, Ability, AbilityCategory, AbilitySlots, DamageScaling,
    DebuffCountScaling, MissingHpScaling, TargetingMode,
};
pub use actor::{Actor, BaseStats, TurnInstruction};
pub use common::{ActorId, ArchetypeId, EffectId, TeamId};
pub use status::{EffectDuration, StatusEffect, StatusEffects, StatusKind, StatusTemplate};
pub use turn::{TurnPhase, TurnState};
