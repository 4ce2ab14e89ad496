//! Match configuration loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::matchup::MatchConfig;

/// Loader for match configuration from TOML files.
pub struct MatchLoader;

impl MatchLoader {
    pub fn load(path: &Path) -> LoadResult<MatchConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<MatchConfig> {
        let config: MatchConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse match TOML: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{AttritionBasis, BattleConfig};

    #[test]
    fn minimal_match_keeps_battle_defaults() {
        let config = MatchLoader::parse(
            r#"
home = ["knight"]
away = ["mage", "mage"]
"#,
        )
        .unwrap();
        assert_eq!(config.seed, 0);
        assert_eq!(config.away.len(), 2);
        assert_eq!(config.battle, BattleConfig::default());
        assert_eq!(config.max_rounds, None);
    }

    #[test]
    fn battle_overrides_are_applied() {
        let config = MatchLoader::parse(
            r#"
seed = 42
max_rounds = 30
home = ["knight"]
away = ["mage"]

[battle]
initiative_die = 12
affinity_enabled = true

[[battle.attrition]]
from_round = 5
percent = 0.1
basis = "MaxHp"
"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_rounds, Some(30));
        assert_eq!(config.battle.initiative_die, 12);
        assert!(config.battle.affinity_enabled);
        assert_eq!(config.battle.speed_divisor, BattleConfig::DEFAULT_SPEED_DIVISOR);
        assert_eq!(config.battle.attrition.len(), 1);
        assert_eq!(config.battle.attrition[0].basis, AttritionBasis::MaxHp);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MatchLoader::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
