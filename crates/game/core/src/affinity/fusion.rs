//! Per-team affinity accumulators and fusion scheduling.
//!
//! # Window semantics
//!
//! - An accumulator locks when it reaches the threshold and records a
//!   trigger `(category, round)`; a locked accumulator gains no marks.
//! - Triggers belong to a rolling window of `window_rounds` rounds. When the
//!   last trigger in the window ages out, the window resets: combo flags
//!   clear and locked accumulators unlock at zero.
//! - On a trigger, with `n` distinct categories in the window:
//!   - `n >= 3` and the triple has not fired: pending singles and duals are
//!     cancelled, a cataclysm is scheduled and both combo flags lock.
//!   - else `n >= 2` and the dual has not fired: pending singles are
//!     cancelled and a dual of the two newest categories is scheduled.
//!   - else, if no combo has fired in this window: a single is scheduled.
//!
//! Triggers are processed one at a time, so two categories locking on the
//! same tick yield one single then one dual, never two duals.

use crate::combat::DamageCategory;
use crate::config::AffinityConfig;
use crate::state::{AbilityCategory, TeamId};

/// A bonus team-wide effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FusionKind {
    Single(DamageCategory),
    Dual(DamageCategory, DamageCategory),
    Cataclysm,
}

impl FusionKind {
    pub fn is_combo(self) -> bool {
        !matches!(self, Self::Single(_))
    }

    pub fn label(self) -> String {
        match self {
            Self::Single(category) => format!("{category} surge"),
            Self::Dual(a, b) => format!("{a}/{b} fusion"),
            Self::Cataclysm => "cataclysm".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    pub category: DamageCategory,
    pub round: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingFusion {
    pub kind: FusionKind,
    pub fires_at_round: u32,
}

/// What recording marks did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkReport {
    pub marks: u32,
    pub total: u32,
    pub scheduled: Option<PendingFusion>,
    pub cancelled: Vec<PendingFusion>,
}

/// One team's accumulators and window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamAffinity {
    pub marks: [u32; 4],
    pub locked: [bool; 4],
    pub triggers: Vec<Trigger>,
    pub dual_fired: bool,
    pub triple_fired: bool,
    pub pending: Vec<PendingFusion>,
}

impl TeamAffinity {
    /// Credit one resolved ability. Returns `None` for untracked categories
    /// and locked accumulators.
    pub fn record(
        &mut self,
        category: DamageCategory,
        ability: AbilityCategory,
        bonus_flags: u32,
        round: u32,
        config: &AffinityConfig,
    ) -> Option<MarkReport> {
        let index = category.accumulator_index()?;
        if self.locked[index] {
            return None;
        }
        let marks = config.base_marks(ability) + config.bonus_marks_per_flag * bonus_flags;
        if marks == 0 {
            return None;
        }
        self.marks[index] += marks;

        let mut report = MarkReport {
            marks,
            total: self.marks[index],
            ..MarkReport::default()
        };
        if self.marks[index] >= config.threshold {
            self.locked[index] = true;
            self.triggers.push(Trigger { category, round });
            self.schedule(round, config, &mut report);
        }
        Some(report)
    }

    fn schedule(&mut self, round: u32, config: &AffinityConfig, report: &mut MarkReport) {
        let fires_at_round = round + config.fusion_delay_rounds;
        let distinct = self.triggers.len();

        let kind = if distinct >= 3 && !self.triple_fired {
            report.cancelled = self.cancel_pending(|_| true);
            self.triple_fired = true;
            self.dual_fired = true;
            FusionKind::Cataclysm
        } else if distinct >= 2 && !self.dual_fired && !self.triple_fired {
            report.cancelled = self.cancel_pending(|k| matches!(k, FusionKind::Single(_)));
            self.dual_fired = true;
            let newest = &self.triggers[distinct - 2..];
            FusionKind::Dual(newest[0].category, newest[1].category)
        } else if !self.dual_fired && !self.triple_fired {
            let Some(last) = self.triggers.last() else {
                return;
            };
            FusionKind::Single(last.category)
        } else {
            return;
        };

        let pending = PendingFusion {
            kind,
            fires_at_round,
        };
        self.pending.push(pending);
        report.scheduled = Some(pending);
    }

    fn cancel_pending<F>(&mut self, mut cancel: F) -> Vec<PendingFusion>
    where
        F: FnMut(FusionKind) -> bool,
    {
        let (cancelled, kept): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| cancel(p.kind));
        self.pending = kept;
        cancelled
    }

    /// Remove and return fusions due at `round`.
    pub fn take_due(&mut self, round: u32) -> Vec<PendingFusion> {
        let (due, later): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|p| p.fires_at_round <= round);
        self.pending = later;
        due
    }

    /// Drop triggers older than the window. Returns true if the window reset.
    pub fn age_window(&mut self, round: u32, window_rounds: u32) -> bool {
        if self.triggers.is_empty() {
            return false;
        }
        self.triggers
            .retain(|t| round.saturating_sub(t.round) < window_rounds);
        if !self.triggers.is_empty() {
            return false;
        }
        self.dual_fired = false;
        self.triple_fired = false;
        for index in 0..self.locked.len() {
            if self.locked[index] {
                self.locked[index] = false;
                self.marks[index] = 0;
            }
        }
        true
    }
}

/// Affinity state for both teams.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffinityLedger {
    pub teams: [TeamAffinity; 2],
}

impl AffinityLedger {
    pub fn team(&self, team: TeamId) -> Option<&TeamAffinity> {
        self.teams.get(team.index())
    }

    pub fn team_mut(&mut self, team: TeamId) -> Option<&mut TeamAffinity> {
        self.teams.get_mut(team.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AffinityConfig {
        AffinityConfig {
            threshold: 4,
            signature_marks: 4,
            bonus_marks_per_flag: 0,
            window_rounds: 3,
            fusion_delay_rounds: 1,
            ..AffinityConfig::default()
        }
    }

    fn lock(team: &mut TeamAffinity, category: DamageCategory, round: u32) -> MarkReport {
        team.record(category, AbilityCategory::Signature, 0, round, &config())
            .unwrap()
    }

    #[test]
    fn single_trigger_schedules_single_after_delay() {
        let mut team = TeamAffinity::default();
        let report = lock(&mut team, DamageCategory::Fire, 2);
        assert_eq!(
            report.scheduled,
            Some(PendingFusion {
                kind: FusionKind::Single(DamageCategory::Fire),
                fires_at_round: 3
            })
        );
        assert!(team.take_due(2).is_empty());
        assert_eq!(team.take_due(3).len(), 1);
    }

    #[test]
    fn locked_accumulator_gains_nothing() {
        let mut team = TeamAffinity::default();
        lock(&mut team, DamageCategory::Fire, 1);
        assert!(
            team.record(DamageCategory::Fire, AbilityCategory::Signature, 0, 1, &config())
                .is_none()
        );
        assert_eq!(team.marks[1], 4);
    }

    #[test]
    fn true_damage_is_not_tracked() {
        let mut team = TeamAffinity::default();
        assert!(
            team.record(DamageCategory::True, AbilityCategory::Signature, 3, 1, &config())
                .is_none()
        );
    }

    #[test]
    fn same_tick_double_lock_yields_one_dual() {
        let mut team = TeamAffinity::default();
        lock(&mut team, DamageCategory::Fire, 1);
        let second = lock(&mut team, DamageCategory::Frost, 1);

        assert_eq!(
            second.scheduled.map(|p| p.kind),
            Some(FusionKind::Dual(DamageCategory::Fire, DamageCategory::Frost))
        );
        assert_eq!(second.cancelled.len(), 1);
        let kinds: Vec<FusionKind> = team.pending.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![FusionKind::Dual(DamageCategory::Fire, DamageCategory::Frost)]
        );
    }

    #[test]
    fn four_categories_in_window_fire_cataclysm_instead_of_dual() {
        let mut team = TeamAffinity::default();
        lock(&mut team, DamageCategory::Physical, 1);
        lock(&mut team, DamageCategory::Fire, 1);
        let third = lock(&mut team, DamageCategory::Frost, 1);
        let fourth = lock(&mut team, DamageCategory::Shadow, 1);

        assert_eq!(third.scheduled.map(|p| p.kind), Some(FusionKind::Cataclysm));
        assert!(fourth.scheduled.is_none());
        assert!(team.dual_fired && team.triple_fired);

        let due: Vec<FusionKind> = team.take_due(2).into_iter().map(|p| p.kind).collect();
        assert_eq!(due, vec![FusionKind::Cataclysm]);
    }

    #[test]
    fn flags_hold_until_last_trigger_ages_out() {
        let mut team = TeamAffinity::default();
        lock(&mut team, DamageCategory::Physical, 1);
        lock(&mut team, DamageCategory::Fire, 2);
        lock(&mut team, DamageCategory::Frost, 2);
        assert!(team.triple_fired);

        // round 4: trigger from round 1 ages out, round-2 triggers remain
        assert!(!team.age_window(4, 3));
        assert!(team.triple_fired);
        assert!(team.locked[0]);

        // round 5: everything aged out, window resets
        assert!(team.age_window(5, 3));
        assert!(!team.dual_fired && !team.triple_fired);
        assert_eq!(team.locked, [false; 4]);
        assert_eq!(team.marks, [0; 4]);
    }
}
