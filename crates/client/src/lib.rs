//! Headless team-arena runner.
//!
//! ```text
//! roster.ron + match.toml ──▶ ContentFactory ──▶ Battle ──▶ Host (worker task)
//!                                                            │ HostMessage bytes
//!                                          Simulation ◀──────┘
//!                                  (one ObserverMirror per seat + spectator)
//! ```
//!
//! The runner never touches the authoritative battle directly: seats act
//! on mirrored snapshots and submit commands through a [`HostHandle`].
//!
//! [`HostHandle`]: arena_runtime::HostHandle

pub mod cli;
pub mod report;
pub mod simulation;
pub mod strategy;

pub use report::{ActorTally, MatchReport, Verdict};
pub use simulation::{Outcome, Simulation, SimulationBuilder};
pub use strategy::{GreedyStrategy, Strategy, health_percentage};
