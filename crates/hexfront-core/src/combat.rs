use hexfront_protocol::{Hex, Terrain, UnitId};
use thiserror::Error;

use crate::{rules::CompiledRules, state::GameState, unit::Unit};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CombatError {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("no tile at {0}")]
    MissingTile(Hex),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatOutcome {
    pub damage: i32,
    pub counter_damage: Option<i32>,
    pub attacker_destroyed: bool,
    pub defender_destroyed: bool,
}

/// Class-specific attack plus the attacker tile's attack bonus.
pub fn attack_power(
    attacker: &Unit,
    defender: &Unit,
    attacker_terrain: Terrain,
    rules: &CompiledRules,
) -> i32 {
    attacker.attack_against(defender.class) + rules.terrain(attacker_terrain).attack_bonus
}

/// Class-specific defense plus the defender tile's cover. Indirect fire ignores cover.
pub fn defense_power(
    defender: &Unit,
    attacker: &Unit,
    defender_terrain: Terrain,
    rules: &CompiledRules,
) -> i32 {
    let base = defender.defense_against(attacker.class);
    if attacker.kind.is_indirect_fire() {
        base
    } else {
        base + rules.terrain(defender_terrain).defense_bonus
    }
}

/// Deterministic damage of one strike; never below 1.
pub fn compute_damage(
    attacker: &Unit,
    attacker_terrain: Terrain,
    defender: &Unit,
    defender_terrain: Terrain,
    rules: &CompiledRules,
) -> i32 {
    let attack = attack_power(attacker, defender, attacker_terrain, rules);
    let defense = defense_power(defender, attacker, defender_terrain, rules);
    (attack - defense).max(1)
}

struct Engagement<'a> {
    attacker: &'a Unit,
    defender: &'a Unit,
    attacker_terrain: Terrain,
    defender_terrain: Terrain,
}

fn engagement(
    state: &GameState,
    attacker_id: UnitId,
    defender_id: UnitId,
) -> Result<Engagement<'_>, CombatError> {
    let attacker = state
        .units
        .get(&attacker_id)
        .ok_or(CombatError::UnknownUnit(attacker_id))?;
    let defender = state
        .units
        .get(&defender_id)
        .ok_or(CombatError::UnknownUnit(defender_id))?;
    let attacker_terrain = state
        .board
        .terrain(attacker.position)
        .ok_or(CombatError::MissingTile(attacker.position))?;
    let defender_terrain = state
        .board
        .terrain(defender.position)
        .ok_or(CombatError::MissingTile(defender.position))?;
    Ok(Engagement {
        attacker,
        defender,
        attacker_terrain,
        defender_terrain,
    })
}

/// Primary damage the attack would deal right now. Nothing is mutated.
pub fn preview_damage(
    state: &GameState,
    rules: &CompiledRules,
    attacker_id: UnitId,
    defender_id: UnitId,
) -> Result<i32, CombatError> {
    let e = engagement(state, attacker_id, defender_id)?;
    Ok(compute_damage(
        e.attacker,
        e.attacker_terrain,
        e.defender,
        e.defender_terrain,
        rules,
    ))
}

/// Resolves one attack and its counter-attack, removing destroyed units.
///
/// Range and legality are the caller's concern. On error nothing has been mutated.
pub fn resolve_attack(
    state: &mut GameState,
    rules: &CompiledRules,
    attacker_id: UnitId,
    defender_id: UnitId,
) -> Result<CombatOutcome, CombatError> {
    let e = engagement(state, attacker_id, defender_id)?;
    let damage = compute_damage(
        e.attacker,
        e.attacker_terrain,
        e.defender,
        e.defender_terrain,
        rules,
    );
    let counter_allowed = e.defender.can_counter_attack && !e.attacker.kind.is_indirect_fire();
    let (attacker_terrain, defender_terrain) = (e.attacker_terrain, e.defender_terrain);
    let xp_cap = rules.tuning.xp_cap;

    let mut defender = state
        .units
        .remove(&defender_id)
        .ok_or(CombatError::UnknownUnit(defender_id))?;
    let Some(attacker) = state.units.get_mut(&attacker_id) else {
        state.units.insert(defender_id, defender);
        return Err(CombatError::UnknownUnit(attacker_id));
    };

    let defender_destroyed = defender.take_damage(damage);
    attacker.gain_xp(damage, xp_cap);
    attacker.exhaust();

    let mut counter_damage = None;
    let mut attacker_destroyed = false;
    if !defender_destroyed && counter_allowed {
        let counter = compute_damage(&defender, defender_terrain, attacker, attacker_terrain, rules);
        attacker_destroyed = attacker.take_damage(counter);
        defender.gain_xp(counter, xp_cap);
        counter_damage = Some(counter);
    }

    if attacker_destroyed {
        state.units.remove(&attacker_id);
    }
    if !defender_destroyed {
        state.units.insert(defender_id, defender);
    }

    tracing::debug!(
        attacker = %attacker_id,
        defender = %defender_id,
        damage,
        counter = ?counter_damage,
        attacker_destroyed,
        defender_destroyed,
        "attack resolved"
    );

    Ok(CombatOutcome {
        damage,
        counter_damage,
        attacker_destroyed,
        defender_destroyed,
    })
}
