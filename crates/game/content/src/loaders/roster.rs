//! Roster loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::roster::Roster;

/// Loader for the archetype roster from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Load and validate a roster.
    ///
    /// RON format: `Roster(archetypes: [ArchetypeRecord, ...])`
    pub fn load(path: &Path) -> LoadResult<Roster> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Roster> {
        let roster: Roster = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;
        roster.validate()?;
        Ok(roster)
    }
}
