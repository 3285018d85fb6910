use rand::Rng;

use hexfront_protocol::{Event, UnitId};

use crate::rules::CompiledRules;
use crate::state::GameState;
use crate::{victory, weather};

/// Hands the turn to the other team and runs upkeep. Returns the events in the order they happened.
pub fn end_turn<R: Rng + ?Sized>(
    state: &mut GameState,
    rules: &CompiledRules,
    rng: &mut R,
) -> Vec<Event> {
    let tuning = &rules.tuning;
    let outgoing = state.active_team;
    let incoming = outgoing.opponent();
    let mut events = vec![Event::TurnEnded {
        turn: state.turn,
        team: outgoing,
    }];

    state.active_team = incoming;

    // Incoming units standing on their own cities heal and refuel.
    let mut resupplied: Vec<UnitId> = Vec::new();
    for unit in state.units.values_mut() {
        if unit.team != incoming {
            continue;
        }
        let Some(tile) = state.board.get(unit.position) else {
            continue;
        };
        if tile.owner() != Some(incoming) {
            continue;
        }
        unit.heal(tuning.unit_heal_hp);
        if tuning.refuel_in_city {
            unit.refuel();
        }
        resupplied.push(unit.id);
    }
    if !resupplied.is_empty() {
        events.push(Event::UnitsResupplied {
            team: incoming,
            units: resupplied,
        });
    }

    for tile in state.board.iter_mut() {
        let hex = tile.hex();
        let Some(city) = tile.city_state_mut() else {
            continue;
        };
        if city.owner != Some(outgoing) {
            city.hp = (city.hp + tuning.city_heal_rate).min(city.max_hp);
        }
        let stale = city.capture.as_ref().is_some_and(|progress| {
            state
                .units
                .get(&progress.unit)
                .map_or(true, |unit| unit.position != hex)
        });
        if stale {
            city.capture = None;
        }
    }

    if incoming == state.first_team {
        state.turn += 1;
        state.weather = weather::next_weather(rng, &tuning.weather.weights);
        state.weather_duration =
            weather::advance_duration(state.weather_duration, state.weather, &tuning.weather);
        events.push(Event::WeatherChanged {
            weather: state.weather,
            duration: state.weather_duration,
        });
        if let Some(shift) = weather::apply_terrain_effects(
            &mut state.board,
            state.weather,
            state.weather_duration,
            &tuning.weather,
        ) {
            tracing::debug!(
                from = %shift.from,
                to = %shift.to,
                tiles = shift.tiles.len(),
                "terrain changed"
            );
            events.push(Event::TerrainChanged {
                from: shift.from,
                to: shift.to,
                tiles: shift.tiles,
            });
        }
    }

    for unit in state.units.values_mut() {
        unit.ready();
    }
    state.selected_unit = None;

    tracing::info!(
        turn = state.turn,
        team = %incoming,
        weather = ?state.weather,
        "turn started"
    );
    events.push(Event::TurnStarted {
        turn: state.turn,
        team: incoming,
    });

    if let Some(ended) = victory::update_status(state) {
        events.push(ended);
    }
    events
}

#[cfg(test)]
mod tests {
    use hexfront_protocol::{Hex, Team, Terrain, UnitType, Weather};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::board::{Board, CaptureProgress, Tile};
    use crate::rules::{load_rules, RulesSource};
    use crate::unit::Unit;

    fn setup() -> (GameState, CompiledRules) {
        let rules = load_rules(RulesSource::Embedded).expect("rules load");
        let mut board = Board::hexagon(4, Terrain::Plains);
        board.set(Tile::city(Hex::new(-2, 0), Some(Team::Blue), 10));
        board.set(Tile::city(Hex::new(2, 0), Some(Team::Red), 10));
        board.set(Tile::city(Hex::new(0, 2), None, 10));
        let state = GameState::new(
            board,
            [
                Unit::from_rules(UnitId(1), UnitType::Infantry, Team::Blue, Hex::new(-2, 0), &rules),
                Unit::from_rules(UnitId(2), UnitType::Tank, Team::Blue, Hex::new(-1, 0), &rules),
                Unit::from_rules(UnitId(3), UnitType::Infantry, Team::Red, Hex::new(2, 0), &rules),
                Unit::from_rules(UnitId(4), UnitType::Tank, Team::Red, Hex::new(1, 0), &rules),
            ],
        );
        (state, rules)
    }

    #[test]
    fn end_turn_flips_team_and_resets_flags() {
        let (mut state, rules) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for unit in state.units.values_mut() {
            unit.exhaust();
        }
        state.selected_unit = Some(UnitId(1));

        let events = end_turn(&mut state, &rules, &mut rng);
        assert_eq!(state.active_team, Team::Red);
        assert_eq!(state.turn, 1);
        assert_eq!(state.selected_unit, None);
        assert!(state.units.values().all(|u| !u.moved && !u.attacked));
        assert_eq!(
            events.first(),
            Some(&Event::TurnEnded {
                turn: 1,
                team: Team::Blue
            })
        );
        assert!(events.contains(&Event::TurnStarted {
            turn: 1,
            team: Team::Red
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::WeatherChanged { .. })));
    }

    #[test]
    fn round_rollover_advances_turn_and_weather() {
        let (mut state, rules) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        end_turn(&mut state, &rules, &mut rng);
        let events = end_turn(&mut state, &rules, &mut rng);
        assert_eq!(state.active_team, Team::Blue);
        assert_eq!(state.turn, 2);
        let duration = events.iter().find_map(|e| match e {
            Event::WeatherChanged { weather, duration } => Some((*weather, *duration)),
            _ => None,
        });
        let (weather, duration) = duration.expect("weather event");
        assert_eq!(weather, state.weather);
        let expected = match weather {
            Weather::Clear => 0,
            Weather::Rain => 1,
            Weather::HeavyRain => 2,
        };
        assert_eq!(duration, expected);
    }

    #[test]
    fn incoming_units_on_own_cities_heal_and_refuel() {
        let (mut state, rules) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        {
            let infantry = state.units.get_mut(&UnitId(3)).unwrap();
            infantry.hp = 5;
            infantry.fuel = 3;
        }
        state.units.get_mut(&UnitId(4)).unwrap().hp = 10;

        let events = end_turn(&mut state, &rules, &mut rng);
        let infantry = &state.units[&UnitId(3)];
        assert_eq!((infantry.hp, infantry.fuel), (7, 60));
        // Tank stands on plains.
        assert_eq!(state.units[&UnitId(4)].hp, 10);
        assert!(events.contains(&Event::UnitsResupplied {
            team: Team::Red,
            units: vec![UnitId(3)]
        }));
    }

    #[test]
    fn cities_not_held_by_outgoing_team_regenerate() {
        let (mut state, rules) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for hex in [Hex::new(-2, 0), Hex::new(2, 0), Hex::new(0, 2)] {
            state
                .board
                .get_mut(hex)
                .and_then(Tile::city_state_mut)
                .unwrap()
                .hp = 5;
        }

        end_turn(&mut state, &rules, &mut rng);
        let hp = |hex| {
            state
                .board
                .get(hex)
                .and_then(Tile::city_state)
                .map(|c| c.hp)
                .unwrap()
        };
        assert_eq!(hp(Hex::new(-2, 0)), 5);
        assert_eq!(hp(Hex::new(2, 0)), 7);
        assert_eq!(hp(Hex::new(0, 2)), 7);
    }

    #[test]
    fn stale_capture_progress_is_cleared() {
        let (mut state, rules) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let city = state
            .board
            .get_mut(Hex::new(0, 2))
            .and_then(Tile::city_state_mut)
            .unwrap();
        city.capture = Some(CaptureProgress {
            unit: UnitId(1),
            team: Team::Blue,
            turns_remaining: 1,
        });

        end_turn(&mut state, &rules, &mut rng);
        let city = state.board.get(Hex::new(0, 2)).and_then(Tile::city_state).unwrap();
        assert_eq!(city.capture, None);
    }

    #[test]
    fn sustained_rain_turns_plains_to_mud() {
        let (mut state, mut rules) = setup();
        rules.tuning.weather.weights = crate::rules::WeatherWeights {
            clear: 0,
            rain: 0,
            heavy_rain: 1,
        };
        state.weather = Weather::HeavyRain;
        state.weather_duration = 2;
        state.active_team = Team::Red;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let events = end_turn(&mut state, &rules, &mut rng);
        assert_eq!(state.weather_duration, 4);
        assert_eq!(state.board.terrain(Hex::new(0, 0)), Some(Terrain::Mud));
        assert_eq!(state.board.terrain(Hex::new(2, 0)), Some(Terrain::City));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::TerrainChanged { to: Terrain::Mud, .. })));
    }

    #[test]
    fn end_turn_detects_elimination() {
        let (mut state, rules) = setup();
        state.units.retain(|_, u| u.team == Team::Blue);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let events = end_turn(&mut state, &rules, &mut rng);
        assert_eq!(state.status.winner(), Some(Team::Blue));
        assert!(matches!(events.last(), Some(Event::GameEnded { .. })));
    }
}
