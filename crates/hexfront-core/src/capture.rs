use rand::Rng;
use thiserror::Error;

use hexfront_protocol::{Hex, Team, UnitClass, UnitId};

use crate::board::{CaptureProgress, Tile};
use crate::rules::{CompiledRules, DamageRange, Tuning};
use crate::state::GameState;
use crate::unit::Unit;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("{0} does not belong to the active team")]
    NotActiveTeam(UnitId),
    #[error("{0} is not infantry")]
    NotInfantry(UnitId),
    #[error("{0} has already attacked this turn")]
    AlreadyAttacked(UnitId),
    #[error("no city at {0}")]
    NotOnCity(Hex),
    #[error("city at {0} already belongs to {1}")]
    AlreadyOwned(Hex, Team),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Damaged {
        at: Hex,
        damage: i32,
        hp: i32,
        turns_remaining: u32,
    },
    Captured {
        at: Hex,
        damage: i32,
        previous_owner: Option<Team>,
    },
}

/// High tier while the unit is above half strength.
pub fn capture_tier(unit: &Unit, tuning: &Tuning) -> DamageRange {
    if unit.hp * 2 > unit.max_hp {
        tuning.capture_damage_high
    } else {
        tuning.capture_damage_low
    }
}

/// Capture actions left for a city at `hp` if every roll lands on the tier minimum.
pub fn turns_remaining(hp: i32, tier: DamageRange) -> u32 {
    let min = tier.min.max(1);
    (hp.max(0) + min - 1).div_euclid(min) as u32
}

/// Validates a capture attempt and returns the city hex.
pub fn check_capture(state: &GameState, unit_id: UnitId) -> Result<Hex, CaptureError> {
    let unit = state
        .units
        .get(&unit_id)
        .ok_or(CaptureError::UnknownUnit(unit_id))?;
    if unit.team != state.active_team {
        return Err(CaptureError::NotActiveTeam(unit_id));
    }
    if unit.class != UnitClass::Infantry {
        return Err(CaptureError::NotInfantry(unit_id));
    }
    if unit.attacked {
        return Err(CaptureError::AlreadyAttacked(unit_id));
    }
    let at = unit.position;
    let city = state
        .board
        .get(at)
        .and_then(Tile::city_state)
        .ok_or(CaptureError::NotOnCity(at))?;
    if city.owner == Some(unit.team) {
        return Err(CaptureError::AlreadyOwned(at, unit.team));
    }
    Ok(at)
}

/// Rolls capture damage against the city under the unit and consumes the unit's activation.
pub fn capture<R: Rng + ?Sized>(
    state: &mut GameState,
    rules: &CompiledRules,
    rng: &mut R,
    unit_id: UnitId,
) -> Result<CaptureOutcome, CaptureError> {
    let at = check_capture(state, unit_id)?;
    let unit = state
        .units
        .get_mut(&unit_id)
        .ok_or(CaptureError::UnknownUnit(unit_id))?;
    let city = state
        .board
        .get_mut(at)
        .and_then(Tile::city_state_mut)
        .ok_or(CaptureError::NotOnCity(at))?;

    let tier = capture_tier(unit, &rules.tuning);
    let damage = rng.gen_range(tier.min..=tier.max);
    let team = unit.team;
    unit.exhaust();

    city.hp = (city.hp - damage).max(0);
    if city.hp == 0 {
        let previous_owner = city.owner.replace(team);
        city.hp = city.max_hp;
        city.capture = None;
        tracing::info!(at = %at, team = %team, unit = %unit_id, "city captured");
        return Ok(CaptureOutcome::Captured {
            at,
            damage,
            previous_owner,
        });
    }

    let turns_remaining = turns_remaining(city.hp, tier);
    city.capture = Some(CaptureProgress {
        unit: unit_id,
        team,
        turns_remaining,
    });
    tracing::debug!(at = %at, damage, hp = city.hp, turns_remaining, "city damaged");
    Ok(CaptureOutcome::Damaged {
        at,
        damage,
        hp: city.hp,
        turns_remaining,
    })
}

#[cfg(test)]
mod tests {
    use hexfront_protocol::{Terrain, UnitType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::board::Board;
    use crate::rules::{load_rules, RulesSource};

    fn siege(kind: UnitType, owner: Option<Team>) -> (GameState, CompiledRules) {
        let rules = load_rules(RulesSource::Embedded).expect("rules load");
        let mut board = Board::hexagon(2, Terrain::Plains);
        board.set(Tile::city(Hex::new(0, 0), owner, rules.tuning.city_hp));
        let state = GameState::new(
            board,
            [Unit::from_rules(UnitId(1), kind, Team::Blue, Hex::new(0, 0), &rules)],
        );
        (state, rules)
    }

    fn city(state: &GameState) -> &crate::board::CityState {
        state
            .board
            .get(Hex::new(0, 0))
            .and_then(Tile::city_state)
            .expect("city")
    }

    #[test]
    fn repeated_captures_flip_ownership_and_reset_hp() {
        let (mut state, rules) = siege(UnitType::Infantry, Some(Team::Red));
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let (damage, hp, turns_remaining) =
            match capture(&mut state, &rules, &mut rng, UnitId(1)).expect("capture") {
                CaptureOutcome::Damaged {
                    damage,
                    hp,
                    turns_remaining,
                    ..
                } => (damage, hp, turns_remaining),
                other => panic!("a full-hp city survives one capture: {other:?}"),
            };
        assert!((6..=8).contains(&damage));
        assert_eq!(hp, 10 - damage);
        assert_eq!(turns_remaining, 1);
        assert_eq!(city(&state).owner, Some(Team::Red));
        assert_eq!(
            city(&state).capture.as_ref().map(|c| c.unit),
            Some(UnitId(1))
        );

        let unit = state.units.get_mut(&UnitId(1)).unwrap();
        assert!(unit.moved && unit.attacked);
        unit.ready();

        let second = capture(&mut state, &rules, &mut rng, UnitId(1)).expect("capture");
        assert!(matches!(
            second,
            CaptureOutcome::Captured {
                previous_owner: Some(Team::Red),
                ..
            }
        ));
        let city = city(&state);
        assert_eq!(city.owner, Some(Team::Blue));
        assert_eq!(city.hp, city.max_hp);
        assert_eq!(city.capture, None);
    }

    #[test]
    fn wounded_infantry_rolls_the_low_tier() {
        let (mut state, rules) = siege(UnitType::Infantry, None);
        state.units.get_mut(&UnitId(1)).unwrap().hp = 5;
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        match capture(&mut state, &rules, &mut rng, UnitId(1)).expect("capture") {
            CaptureOutcome::Damaged {
                damage,
                turns_remaining,
                hp,
                ..
            } => {
                assert!((3..=5).contains(&damage));
                assert_eq!(turns_remaining, turns_remaining_for(hp, 3));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    fn turns_remaining_for(hp: i32, min: i32) -> u32 {
        ((hp + min - 1) / min) as u32
    }

    #[test]
    fn illegal_captures_are_rejected() {
        let (state, _) = siege(UnitType::Tank, None);
        assert_eq!(
            check_capture(&state, UnitId(1)),
            Err(CaptureError::NotInfantry(UnitId(1)))
        );

        let (state, _) = siege(UnitType::Infantry, Some(Team::Blue));
        assert_eq!(
            check_capture(&state, UnitId(1)),
            Err(CaptureError::AlreadyOwned(Hex::new(0, 0), Team::Blue))
        );

        let (mut state, _) = siege(UnitType::Infantry, None);
        state.units.get_mut(&UnitId(1)).unwrap().position = Hex::new(1, 0);
        assert_eq!(
            check_capture(&state, UnitId(1)),
            Err(CaptureError::NotOnCity(Hex::new(1, 0)))
        );

        let (mut state, _) = siege(UnitType::Infantry, None);
        state.active_team = Team::Red;
        assert_eq!(
            check_capture(&state, UnitId(1)),
            Err(CaptureError::NotActiveTeam(UnitId(1)))
        );
    }

    #[test]
    fn turns_remaining_rounds_up() {
        let tier = DamageRange { min: 3, max: 5 };
        assert_eq!(turns_remaining(10, tier), 4);
        assert_eq!(turns_remaining(9, tier), 3);
        assert_eq!(turns_remaining(1, tier), 1);
        assert_eq!(turns_remaining(0, tier), 0);
    }
}
