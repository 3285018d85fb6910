//! Already-deserialized scenario documents handed to the engine by map/deployment collaborators.

use serde::{Deserialize, Serialize};

use crate::{Hex, Team, Terrain, UnitId, UnitType, Weather};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub q: i32,
    pub r: i32,
    pub terrain: Terrain,
    /// City tiles only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
}

impl TileSpec {
    pub fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

/// A unit placement. Stats come from the rules tables; only runtime state may be overridden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    pub kind: UnitType,
    pub team: Team,
    pub q: i32,
    pub r: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<i32>,
}

impl UnitSpec {
    pub fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Team that opens every round. Defaults to Blue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_duration: Option<u32>,
    pub tiles: Vec<TileSpec>,
    pub units: Vec<UnitSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_scenario_parses_with_defaults() {
        let json = r#"{
            "tiles": [
                {"q": 0, "r": 0, "terrain": "plains"},
                {"q": 1, "r": 0, "terrain": "city", "owner": "red", "hp": 7}
            ],
            "units": [
                {"id": 1, "kind": "tank", "team": "blue", "q": 0, "r": 0}
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.first_team, None);
        assert_eq!(scenario.tiles[1].owner, Some(Team::Red));
        assert_eq!(scenario.tiles[1].hp, Some(7));
        assert_eq!(scenario.units[0].hex(), Hex::new(0, 0));
        assert_eq!(scenario.units[0].hp, None);
    }
}
