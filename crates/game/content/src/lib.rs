//! Roster data and match setup.
//!
//! This crate describes archetypes as plain records, turns them into battle
//! actors, and owns the built-in passive rule table. With the `loaders`
//! feature it also reads rosters from RON and match setups from TOML.
//!
//! Content is consumed when a battle is built and never appears in battle state.

pub mod matchup;
pub mod roster;
pub mod rules;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use matchup::{MatchConfig, MatchError};
pub use roster::{
    ArchetypeRecord, EffectRecord, MoveRecord, ResistanceRecord, Roster, RosterError, ScalingSpec,
};
pub use rules::{RuleSpec, build_registry};

#[cfg(feature = "loaders")]
pub use loaders::{ContentFactory, LoadResult, MatchLoader, RosterLoader};
