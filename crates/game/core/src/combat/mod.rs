//! Combat resolution system.
//!
//! Pure damage/hit math lives in [`damage`] and [`hit`]; the stateful
//! ability pipeline lives in [`resolver`].
//!
//! # Core Functions
//!
//! - `mitigate`: resistance scaling, skipped for true damage
//! - `split_shield`: shield absorbs before HP
//! - `check_hit` / `check_crit`: roll comparisons
//! - `resolver::plan` / `resolver::commit`: two-phase ability resolution

pub mod damage;
mod errors;
pub mod hit;
pub mod resolver;
pub mod result;

pub use damage::{DamageCategory, ShieldSplit, mitigate, scale, split_shield};
pub use errors::{InvariantViolation, ResolveError};
pub use hit::{check_crit, check_hit, hit_chance};
pub use resolver::{ResolveContext, ValidatedUse};
pub use result::{HitRoll, OutcomeFlags, ResolutionOutcome, ResolutionPlan, TargetOutcome};
