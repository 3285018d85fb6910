use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hexfront_protocol::{Hex, Scenario, Team, Terrain, UnitId, VictoryReason, Weather};

use crate::board::{Board, CityState, Tile};
use crate::history::History;
use crate::rules::CompiledRules;
use crate::unit::Unit;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Playing,
    GameOver {
        winner: Team,
        reason: VictoryReason,
    },
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::GameOver { .. })
    }

    pub fn winner(self) -> Option<Team> {
        match self {
            GameStatus::Playing => None,
            GameStatus::GameOver { winner, .. } => Some(winner),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("duplicate unit id {0}")]
    DuplicateUnit(UnitId),
    #[error("unit {unit} placed off-board at {at}")]
    UnitOffBoard { unit: UnitId, at: Hex },
    #[error("units {first} and {second} share hex {at}")]
    StackedUnits {
        at: Hex,
        first: UnitId,
        second: UnitId,
    },
    #[error("unit {unit} has invalid {field}: {value}")]
    InvalidUnitState {
        unit: UnitId,
        field: &'static str,
        value: i32,
    },
}

const SKIRMISH_JSON: &str = include_str!("../data/scenarios/skirmish.json");

/// Parses a scenario document.
pub fn parse_scenario(json: &str) -> Result<Scenario, serde_json::Error> {
    serde_json::from_str(json)
}

/// The compiled-in two-team skirmish map.
pub fn skirmish_scenario() -> Result<Scenario, serde_json::Error> {
    parse_scenario(SKIRMISH_JSON)
}

/// Everything the engine mutates. Serializable so a save/load layer can persist it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub units: BTreeMap<UnitId, Unit>,
    pub turn: u32,
    pub active_team: Team,
    pub first_team: Team,
    pub status: GameStatus,
    pub weather: Weather,
    pub weather_duration: u32,
    pub selected_unit: Option<UnitId>,
    #[serde(default)]
    pub history: History,
}

impl GameState {
    /// Turn 1, Blue to move, clear skies.
    pub fn new(board: Board, units: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            board,
            units: units.into_iter().map(|u| (u.id, u)).collect(),
            turn: 1,
            active_team: Team::Blue,
            first_team: Team::Blue,
            status: GameStatus::Playing,
            weather: Weather::Clear,
            weather_duration: 0,
            selected_unit: None,
            history: History::default(),
        }
    }

    pub fn from_scenario(scenario: &Scenario, rules: &CompiledRules) -> Result<Self, ScenarioError> {
        let mut board = Board::new();
        for spec in &scenario.tiles {
            let hex = spec.hex();
            let tile = if spec.terrain == Terrain::City {
                let max_hp = spec.max_hp.unwrap_or(rules.tuning.city_hp).max(1);
                let hp = spec.hp.unwrap_or(max_hp).clamp(0, max_hp);
                Tile::from_city_state(
                    hex,
                    CityState {
                        owner: spec.owner,
                        hp,
                        max_hp,
                        capture: None,
                    },
                )
            } else {
                if spec.owner.is_some() || spec.hp.is_some() || spec.max_hp.is_some() {
                    tracing::warn!(
                        hex = %hex,
                        terrain = %spec.terrain,
                        "dropping city fields on non-city tile"
                    );
                }
                Tile::new(hex, spec.terrain)
            };
            board.set(tile);
        }

        let mut units = BTreeMap::new();
        let mut occupied: HashMap<Hex, UnitId> = HashMap::new();
        for spec in &scenario.units {
            let hex = spec.hex();
            if units.contains_key(&spec.id) {
                return Err(ScenarioError::DuplicateUnit(spec.id));
            }
            if !board.contains(hex) {
                return Err(ScenarioError::UnitOffBoard {
                    unit: spec.id,
                    at: hex,
                });
            }
            if let Some(&first) = occupied.get(&hex) {
                return Err(ScenarioError::StackedUnits {
                    at: hex,
                    first,
                    second: spec.id,
                });
            }

            let mut unit = Unit::from_rules(spec.id, spec.kind, spec.team, hex, rules);
            if let Some(hp) = spec.hp {
                if hp < 1 || hp > unit.max_hp {
                    return Err(ScenarioError::InvalidUnitState {
                        unit: spec.id,
                        field: "hp",
                        value: hp,
                    });
                }
                unit.hp = hp;
            }
            if let Some(fuel) = spec.fuel {
                unit.fuel = fuel.clamp(0, unit.max_fuel);
            }
            if let Some(xp) = spec.xp {
                unit.xp = xp.clamp(0, rules.tuning.xp_cap);
            }

            occupied.insert(hex, spec.id);
            units.insert(spec.id, unit);
        }

        let first_team = scenario.first_team.unwrap_or(Team::Blue);
        let state = Self {
            board,
            units,
            turn: scenario.turn.unwrap_or(1).max(1),
            active_team: scenario.active_team.unwrap_or(first_team),
            first_team,
            status: GameStatus::Playing,
            weather: scenario.weather.unwrap_or_default(),
            weather_duration: scenario.weather_duration.unwrap_or(0),
            selected_unit: None,
            history: History::default(),
        };
        tracing::debug!(
            name = %scenario.name,
            tiles = state.board.len(),
            units = state.units.len(),
            "scenario loaded"
        );
        Ok(state)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn units_of(&self, team: Team) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.team == team)
    }

    /// Positions of every live unit.
    pub fn occupancy(&self) -> HashMap<Hex, UnitId> {
        self.units.values().map(|u| (u.position, u.id)).collect()
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }
}
