use serde::{Deserialize, Serialize};

use crate::{Hex, Team, Terrain, UnitId, UnitType, Weather};

/// Read-only view of a unit at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub kind: UnitType,
    pub team: Team,
    pub position: Hex,
    pub hp: i32,
    pub max_hp: i32,
    pub fuel: i32,
    pub xp: i32,
}

/// Outcome of one attack, with the combatants as they stood before it resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub attacker: UnitSnapshot,
    pub defender: UnitSnapshot,
    /// Terrain under the defender.
    pub terrain: Terrain,
    pub damage: i32,
    pub counter_damage: Option<i32>,
    pub attacker_destroyed: bool,
    pub defender_destroyed: bool,
    /// Human-readable account; produced by the narrative collaborator or its template fallback.
    pub report: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryReason {
    Elimination,
    CityControl,
}

/// All possible engine→player events. Fully serializable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // Selection
    UnitSelected {
        unit: UnitId,
    },
    SelectionCleared,

    // Units
    /// `path` is the cheapest terrain route, priced without zone of control, so it may cross
    /// tiles next to an enemy. `fuel_spent` is the terrain cost of that route.
    UnitMoved {
        unit: UnitId,
        path: Vec<Hex>,
        fuel_spent: i32,
        fuel_left: i32,
    },
    CombatResolved {
        report: BattleReport,
    },
    UnitDestroyed {
        unit: UnitId,
        at: Hex,
        killer: Option<UnitId>,
    },
    UnitWaited {
        unit: UnitId,
    },
    UnitsResupplied {
        team: Team,
        units: Vec<UnitId>,
    },

    // Cities
    CityDamaged {
        at: Hex,
        by: UnitId,
        damage: i32,
        hp: i32,
        turns_remaining: u32,
    },
    CityCaptured {
        at: Hex,
        team: Team,
        previous_owner: Option<Team>,
    },

    // Turn flow
    TurnEnded {
        turn: u32,
        team: Team,
    },
    TurnStarted {
        turn: u32,
        team: Team,
    },
    WeatherChanged {
        weather: Weather,
        duration: u32,
    },
    TerrainChanged {
        from: Terrain,
        to: Terrain,
        tiles: Vec<Hex>,
    },
    GameEnded {
        winner: Team,
        reason: VictoryReason,
    },

    // History
    UndoApplied {
        turn: u32,
        team: Team,
        remaining: usize,
    },
}
