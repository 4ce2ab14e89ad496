//! Ability use through the battle.
//!
//! `use_ability` is `plan_ability` followed by `commit_plan`. Callers that
//! animate between roll and impact call the two halves themselves; while a
//! plan is outstanding no other action is accepted.
use super::{Battle, BattleError, TurnStartOutcome};
use crate::combat::{ResolutionOutcome, ResolutionPlan, ResolveError, resolver};
use crate::state::{AbilityCategory, Actor, ActorId, TurnPhase};

/// Result of a committed ability use.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionReport {
    pub outcome: ResolutionOutcome,
    /// What happened once the caster's turn closed.
    pub next: TurnStartOutcome,
}

impl Battle {
    /// Resolve an ability in one step and end the caster's turn.
    pub fn use_ability(
        &mut self,
        caster: ActorId,
        category: AbilityCategory,
        targets: &[ActorId],
    ) -> Result<ActionReport, BattleError> {
        let plan = self.plan_ability(caster, category, targets)?;
        self.commit_plan(&plan)
    }

    /// Validate the use and freeze its hit rolls.
    ///
    /// On success the plan is held as outstanding until
    /// [`commit_plan`](Self::commit_plan).
    pub fn plan_ability(
        &mut self,
        caster: ActorId,
        category: AbilityCategory,
        targets: &[ActorId],
    ) -> Result<ResolutionPlan, ResolveError> {
        if let Err(error) = self.check_turn_owner(caster) {
            resolver::reject(&mut self.core.events, Some(caster), &error);
            self.settle();
            return Err(error);
        }

        let result = {
            let mut ctx = self.core.resolve_context(&self.passives);
            resolver::plan(&mut ctx, caster, category, targets)
        };
        if let Ok(plan) = &result {
            tracing::debug!(
                target: "arena::combat",
                %caster,
                ability = %plan.ability,
                targets = plan.hits.len(),
                hits = plan.hit_count(),
                "ability planned"
            );
            self.outstanding = Some(plan.clone());
            self.core.state.turn.phase = TurnPhase::Resolving;
        }
        self.settle();
        result
    }

    /// Apply the outstanding plan, then close the caster's turn.
    ///
    /// `plan` must be the one last returned by `plan_ability`.
    pub fn commit_plan(&mut self, plan: &ResolutionPlan) -> Result<ActionReport, BattleError> {
        match &self.outstanding {
            Some(outstanding) if outstanding == plan => {}
            Some(_) => return Err(ResolveError::StalePlan.into()),
            None if self.is_over() => return Err(ResolveError::BattleOver.into()),
            None => return Err(ResolveError::StalePlan.into()),
        }
        self.outstanding = None;

        let result = {
            let mut ctx = self.core.resolve_context(&self.passives);
            resolver::commit(&mut ctx, plan)
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                self.core.state.turn.phase = TurnPhase::AwaitingAction;
                self.settle();
                return Err(error.into());
            }
        };
        self.core.state.turn.phase = TurnPhase::AwaitingAction;
        self.settle();

        let next = match self.over_outcome() {
            Some(over) => over,
            None => {
                self.finish_turn(plan.caster);
                self.request_advance()?
            }
        };
        Ok(ActionReport { outcome, next })
    }

    fn check_turn_owner(&self, caster: ActorId) -> Result<(), ResolveError> {
        let turn = &self.core.state.turn;
        if turn.is_over() {
            return Err(ResolveError::BattleOver);
        }
        if self.outstanding.is_some() {
            return Err(ResolveError::ResolutionInProgress);
        }
        if turn.phase != TurnPhase::AwaitingAction || turn.current != Some(caster) {
            return Err(ResolveError::NotCastersTurn(caster));
        }
        if self.core.state.actor(caster).is_some_and(Actor::is_stunned) {
            return Err(ResolveError::CasterStunned(caster));
        }
        Ok(())
    }
}
