//! Common error infrastructure for arena-core.
//!
//! This module provides shared types and traits used across all error types in
//! the crate. Domain-specific errors (e.g. `ResolveError`, `TurnError`) are
//! defined in their respective modules alongside the operations they guard.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error type with specific variants
//! - **No partial mutation**: An operation that returns `Err` has not touched state
//! - **Severity Classification**: Errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: The caller may retry with a corrected command
/// - **Validation**: Malformed input, should not be retried as-is
/// - **Internal**: An invariant was about to be violated; the operation was aborted
/// - **Fatal**: Reserved; the engine itself never produces fatal errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Rejected action - state is unchanged, caller may retry.
    ///
    /// Examples: ability on cooldown, not enough charge
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown caster id, no target ids resolve
    Validation,

    /// Internal error - an invariant violation was detected and the
    /// operation aborted before mutating state.
    ///
    /// Examples: negative incoming damage, caster without a matching ability
    Internal,

    /// Fatal error - never produced by the engine, kept for callers that
    /// classify transport failures alongside engine errors.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all arena-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Used as the `reason` of diagnostic events and in logs.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
