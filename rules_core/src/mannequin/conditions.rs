//! Generic ability condition checks

use super::MannequinState;
use crate::data::Ability;

/// Evaluates the generic activation conditions of an ability
///
/// The build pipeline only models a subset of the game's conditions. Callers
/// that track more state (health thresholds, targets, cooldowns) plug in their
/// own check here.
pub trait ConditionCheck {
    fn check_all(&self, ability: &Ability, state: &MannequinState) -> bool;
}

/// Treats every generic condition as satisfied
#[derive(Debug, Clone, Copy, Default)]
pub struct AllConditionsPass;

impl ConditionCheck for AllConditionsPass {
    fn check_all(&self, _ability: &Ability, _state: &MannequinState) -> bool {
        true
    }
}

impl<F> ConditionCheck for F
where
    F: Fn(&Ability, &MannequinState) -> bool,
{
    fn check_all(&self, ability: &Ability, state: &MannequinState) -> bool {
        self(ability, state)
    }
}
