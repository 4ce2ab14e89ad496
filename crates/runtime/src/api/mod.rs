//! Public runtime API surface.
//!
//! Re-exports the command DTOs, the cloneable host handle, and the error
//! type so clients can depend on a single module.
mod commands;
mod errors;
mod handle;

pub use commands::{AbilityCommand, HydratedAbility, SkipTurnCommand};
pub use errors::{Result, RuntimeError};
pub use handle::{HostHandle, Reply};
