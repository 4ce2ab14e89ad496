//! Deterministic combat rules for turn-based team battles.
//!
//! `arena-core` defines the canonical battle model (actors, abilities, status
//! effects, passive rules, the optional affinity layer) and exposes it
//! through one context object, [`engine::Battle`]. All state mutation flows
//! through the battle; the runtime and content crates depend on the types
//! re-exported here.
pub mod affinity;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod passive;
pub mod rng;
pub mod state;
pub mod stats;

pub use affinity::{AffinityMeter, FusionKind, TugOfWar};
pub use combat::{
    DamageCategory, InvariantViolation, OutcomeFlags, ResolutionOutcome, ResolutionPlan,
    ResolveError, TargetOutcome,
};
pub use config::{AffinityConfig, AttritionBasis, AttritionTier, BattleConfig, TugConfig};
pub use engine::{
    ActionReport, AdvanceLock, Battle, BattleBuilder, BattleError, TurnError, TurnStartOutcome,
};
pub use error::{ErrorSeverity, GameError};
pub use events::{BattleEvent, EventBus, ReplicationFilter, SkipReason, SubscriptionId, Topic};
pub use passive::{IncomingDamage, PassiveContext, PassiveHooks, PassiveRegistry, PassiveRule};
pub use rng::{CombatRng, PcgRng, ScriptedRng};
pub use state::{
    Ability, AbilityCategory, Actor, ActorId, ArchetypeId, BaseStats, BattleState, DamageScaling,
    EffectDuration, EffectId, StateError, StatusEffect, StatusKind, StatusTemplate, TargetingMode,
    TeamId, TurnPhase, TurnState,
};
pub use stats::{CombatStats, StatKind};
