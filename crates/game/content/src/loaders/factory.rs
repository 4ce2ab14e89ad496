//! Content factory for loading a match from a data directory.

use std::path::{Path, PathBuf};

use arena_core::{Actor, PassiveRegistry};

use crate::loaders::{LoadResult, MatchLoader, RosterLoader};
use crate::matchup::MatchConfig;
use crate::roster::Roster;

/// Content factory that loads all match content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── roster.ron
/// └── match.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the archetype roster from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<Roster> {
        RosterLoader::load(&self.data_dir.join("roster.ron"))
    }

    /// Load the match setup from `match.toml`.
    pub fn load_match(&self) -> LoadResult<MatchConfig> {
        MatchLoader::load(&self.data_dir.join("match.toml"))
    }

    /// Load both files and spawn the teams.
    pub fn assemble(&self) -> LoadResult<(MatchConfig, Vec<Actor>, PassiveRegistry)> {
        let roster = self.load_roster()?;
        let config = self.load_match()?;
        let (actors, passives) = config.assemble(&roster)?;
        Ok((config, actors, passives))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"
Roster(archetypes: [
    (key: "knight", id: 1, name: "Knight", hp: 300, speed: 8.0, charge_required: 100,
     passive: (name: "Oath"), normal: (name: "Slash", damage: 20),
     skill: (name: "Bash", damage: 15, cooldown: 2), signature: (name: "Judgement", damage: 80),
     rules: [SurviveFatalHit]),
    (key: "mage", id: 2, name: "Mage", hp: 180, speed: 14.0, charge_required: 80,
     passive: (name: "Focus"), normal: (name: "Bolt", damage: 25, damage_category: Frost),
     skill: (name: "Hex", damage: 10, damage_category: Shadow), signature: (name: "Nova", damage: 60, max_targets: 3)),
])
"#;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn assemble_loads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("roster.ron"), ROSTER).unwrap();
        std::fs::write(
            dir.path().join("match.toml"),
            "seed = 7\nhome = [\"knight\"]\naway = [\"mage\", \"mage\"]\n",
        )
        .unwrap();

        let (config, actors, passives) = ContentFactory::new(dir.path()).assemble().unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(actors.len(), 3);
        assert_eq!(passives.len(), 1);
    }

    #[test]
    fn assemble_surfaces_unknown_archetypes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("roster.ron"), ROSTER).unwrap();
        std::fs::write(
            dir.path().join("match.toml"),
            "home = [\"knight\"]\naway = [\"lich\"]\n",
        )
        .unwrap();

        let err = ContentFactory::new(dir.path()).assemble().unwrap_err();
        assert!(err.to_string().contains("lich"));
    }
}
