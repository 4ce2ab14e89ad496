//! Affinity/fusion meta layer (optional mode).
//!
//! Observes committed events and reacts through the same mutation surface as
//! passive rules. Enabled by [`BattleConfig::affinity_enabled`].
//!
//! [`BattleConfig::affinity_enabled`]: crate::config::BattleConfig::affinity_enabled

mod fusion;
mod tug;

pub use fusion::{AffinityLedger, FusionKind, MarkReport, PendingFusion, TeamAffinity, Trigger};
pub use tug::TugOfWar;

use crate::combat::DamageCategory;
use crate::events::BattleEvent;
use crate::passive::PassiveContext;
use crate::state::{AbilityCategory, ActorId, EffectDuration, StatusKind, StatusTemplate, TeamId};

/// Affinity accumulators for both teams plus the momentum meter.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffinityMeter {
    pub ledger: AffinityLedger,
    pub tug: TugOfWar,
}

impl AffinityMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to one committed event.
    pub fn observe(&mut self, event: &BattleEvent, ctx: &mut PassiveContext<'_>) {
        if let BattleEvent::AbilityResolved {
            team,
            category,
            damage_category,
            flags,
            ..
        } = event
        {
            self.record_marks(*team, *damage_category, *category, flags.bonus_count(), ctx);
        }
        self.feed_tug(event, ctx);
    }

    fn record_marks(
        &mut self,
        team: TeamId,
        damage_category: DamageCategory,
        category: AbilityCategory,
        bonus_flags: u32,
        ctx: &mut PassiveContext<'_>,
    ) {
        let round = ctx.state.turn.round;
        let Some(report) = self.ledger.team_mut(team).and_then(|t| {
            t.record(damage_category, category, bonus_flags, round, &ctx.config.affinity)
        }) else {
            return;
        };

        ctx.events.emit(BattleEvent::AffinityMarked {
            team,
            category: damage_category,
            marks: report.marks,
            total: report.total,
        });
        for cancelled in &report.cancelled {
            tracing::debug!(
                target: "arena::affinity",
                %team,
                fusion = %cancelled.kind.label(),
                "pending fusion superseded"
            );
        }
        if let Some(pending) = report.scheduled {
            tracing::info!(
                target: "arena::affinity",
                %team,
                fusion = %pending.kind.label(),
                fires_at_round = pending.fires_at_round,
                "fusion scheduled"
            );
            ctx.events.emit(BattleEvent::FusionScheduled {
                team,
                fusion: pending.kind,
                fires_at_round: pending.fires_at_round,
            });
        }
    }

    fn feed_tug(&mut self, event: &BattleEvent, ctx: &mut PassiveContext<'_>) {
        let config = ctx.config;
        let tug = &config.affinity.tug;
        let team_of = |id: ActorId| ctx.state.actor(id).map(|a| a.team);
        let push = match event {
            BattleEvent::DamageDealt {
                source: Some(source),
                amount,
                ..
            } => team_of(*source).map(|t| (t, tug.damage_weight * *amount as f32)),
            BattleEvent::Healed { target, amount, .. } => {
                team_of(*target).map(|t| (t, tug.heal_weight * *amount as f32))
            }
            BattleEvent::ShieldGained { target, amount, .. } => {
                team_of(*target).map(|t| (t, tug.shield_weight * *amount as f32))
            }
            BattleEvent::CriticalHit { source, .. } => {
                team_of(*source).map(|t| (t, tug.crit_weight))
            }
            BattleEvent::StatusApplied {
                source: Some(source),
                ..
            } => team_of(*source).map(|t| (t, tug.status_weight)),
            _ => None,
        };
        let Some((team, raw)) = push else {
            return;
        };

        self.tug.contribute(team, raw, tug);
        if let Some(favored) = self.tug.check_swing(tug) {
            let swing_charge = tug.swing_charge;
            tracing::info!(target: "arena::affinity", %favored, "momentum swing");
            ctx.events.emit(BattleEvent::MomentumSwing { favored });
            let members: Vec<ActorId> = ctx.state.living(favored).map(|a| a.id).collect();
            for member in members {
                ctx.grant_charge(member, swing_charge);
            }
        }
    }

    /// Round boundary: decay momentum, fire due fusions, age the windows.
    pub fn begin_round(&mut self, round: u32, ctx: &mut PassiveContext<'_>) {
        if round > 1 {
            self.tug.decay(&ctx.config.affinity.tug);
        }
        for team in [TeamId::HOME, TeamId::AWAY] {
            let due = self
                .ledger
                .team_mut(team)
                .map(|t| t.take_due(round))
                .unwrap_or_default();
            for pending in due {
                fire(team, pending.kind, ctx);
            }
            let window = ctx.config.affinity.window_rounds;
            if self
                .ledger
                .team_mut(team)
                .is_some_and(|t| t.age_window(round, window))
            {
                tracing::debug!(target: "arena::affinity", %team, round, "fusion window reset");
            }
        }
    }
}

fn fire(team: TeamId, kind: FusionKind, ctx: &mut PassiveContext<'_>) {
    tracing::info!(target: "arena::affinity", %team, fusion = %kind.label(), "fusion fires");
    ctx.events.emit(BattleEvent::FusionTriggered { team, fusion: kind });

    let config = ctx.config;
    let config = &config.affinity;
    match kind {
        FusionKind::Single(category) => surge(team, category, config.single_power, ctx),
        FusionKind::Dual(a, b) => {
            let power = config.single_power * config.dual_multiplier;
            surge(team, a, power, ctx);
            surge(team, b, power, ctx);
        }
        FusionKind::Cataclysm => {
            for (id, max_hp) in members(team.opponent(), ctx) {
                let amount = (max_hp as f32 * config.cataclysm_percent).round() as i32;
                ctx.deal_damage(id, amount, DamageCategory::True, None);
            }
        }
    }

    ctx.events.emit(BattleEvent::FusionUnleashed { team, fusion: kind });
}

/// Single-category team effect.
fn surge(team: TeamId, category: DamageCategory, power: f32, ctx: &mut PassiveContext<'_>) {
    let scaled = |max_hp: u32| (max_hp as f32 * power).round() as u32;
    match category {
        DamageCategory::Physical => {
            for (id, max_hp) in members(team, ctx) {
                ctx.add_shield(id, scaled(max_hp), None);
            }
        }
        DamageCategory::Fire => {
            for (id, max_hp) in members(team.opponent(), ctx) {
                ctx.deal_damage(id, scaled(max_hp) as i32, DamageCategory::Fire, None);
            }
        }
        DamageCategory::Frost => {
            let chill = StatusTemplate::new(
                "Frostbite",
                StatusKind::Speed,
                EffectDuration::Turns(2),
                -(power * 20.0),
            )
            .debuff();
            for (id, _) in members(team.opponent(), ctx) {
                ctx.apply_status(id, &chill, None);
            }
        }
        DamageCategory::Shadow => {
            for (id, max_hp) in members(team, ctx) {
                ctx.heal(id, scaled(max_hp), None);
            }
        }
        DamageCategory::True => {}
    }
}

fn members(team: TeamId, ctx: &PassiveContext<'_>) -> Vec<(ActorId, u32)> {
    ctx.state.living(team).map(|a| (a.id, a.max_hp)).collect()
}
