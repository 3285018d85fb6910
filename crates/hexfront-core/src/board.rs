use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hexfront_protocol::{Hex, Team, Terrain, UnitId};

/// A city siege in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureProgress {
    pub unit: UnitId,
    pub team: Team,
    /// Estimated capture actions left at the minimum damage of the current tier.
    pub turns_remaining: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityState {
    pub owner: Option<Team>,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureProgress>,
}

impl CityState {
    pub const DEFAULT_HP: i32 = 10;

    pub fn new(owner: Option<Team>, max_hp: i32) -> Self {
        Self {
            owner,
            hp: max_hp,
            max_hp,
            capture: None,
        }
    }
}

/// One board cell. City data is present exactly when the terrain is [`Terrain::City`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTile")]
pub struct Tile {
    hex: Hex,
    terrain: Terrain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<CityState>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TileError {
    #[error("city tile {0} has no city state")]
    CityWithoutState(Hex),
    #[error("{terrain} tile {hex} carries city state")]
    StrayCityState { hex: Hex, terrain: Terrain },
}

/// Wire shape of a [`Tile`] before the city invariant is checked.
#[derive(Deserialize)]
struct RawTile {
    hex: Hex,
    terrain: Terrain,
    #[serde(default)]
    city: Option<CityState>,
}

impl TryFrom<RawTile> for Tile {
    type Error = TileError;

    fn try_from(raw: RawTile) -> Result<Self, Self::Error> {
        let RawTile { hex, terrain, city } = raw;
        match (terrain == Terrain::City, city.is_some()) {
            (true, false) => Err(TileError::CityWithoutState(hex)),
            (false, true) => Err(TileError::StrayCityState { hex, terrain }),
            _ => Ok(Self { hex, terrain, city }),
        }
    }
}

impl Tile {
    /// City terrain gets a neutral city at `CityState::DEFAULT_HP`; prefer [`Tile::city`] for cities.
    pub fn new(hex: Hex, terrain: Terrain) -> Self {
        let city = (terrain == Terrain::City).then(|| CityState::new(None, CityState::DEFAULT_HP));
        Self { hex, terrain, city }
    }

    pub fn city(hex: Hex, owner: Option<Team>, max_hp: i32) -> Self {
        Self {
            hex,
            terrain: Terrain::City,
            city: Some(CityState::new(owner, max_hp)),
        }
    }

    pub fn from_city_state(hex: Hex, city: CityState) -> Self {
        Self {
            hex,
            terrain: Terrain::City,
            city: Some(city),
        }
    }

    #[inline]
    pub fn hex(&self) -> Hex {
        self.hex
    }

    #[inline]
    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn city_state(&self) -> Option<&CityState> {
        self.city.as_ref()
    }

    pub fn city_state_mut(&mut self) -> Option<&mut CityState> {
        self.city.as_mut()
    }

    pub fn owner(&self) -> Option<Team> {
        self.city.as_ref().and_then(|c| c.owner)
    }

    /// Swap non-city terrain in place. Cities and conversions into cities are refused.
    pub(crate) fn retexture(&mut self, terrain: Terrain) -> bool {
        if self.city.is_some() || terrain == Terrain::City {
            return false;
        }
        self.terrain = terrain;
        true
    }
}

/// Finite set of tiles keyed by coordinate. Anything not in the map is off-board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct Board {
    tiles: BTreeMap<Hex, Tile>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hexagon of `terrain` tiles around the origin.
    pub fn hexagon(radius: i32, terrain: Terrain) -> Self {
        Hex::new(0, 0)
            .ring_inclusive(radius)
            .map(|hex| Tile::new(hex, terrain))
            .collect()
    }

    /// Inserts or replaces the tile at `tile.hex()`.
    pub fn set(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(tile.hex, tile)
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    pub fn get_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        self.tiles.get_mut(&hex)
    }

    #[inline]
    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains_key(&hex)
    }

    pub fn terrain(&self, hex: Hex) -> Option<Terrain> {
        self.get(hex).map(Tile::terrain)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    pub fn neighbors(&self, hex: Hex) -> impl Iterator<Item = &Tile> + '_ {
        hex.neighbors().filter_map(move |n| self.get(n))
    }

    pub fn cities(&self) -> impl Iterator<Item = (&Tile, &CityState)> {
        self.tiles
            .values()
            .filter_map(|tile| tile.city.as_ref().map(|city| (tile, city)))
    }
}

impl FromIterator<Tile> for Board {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().map(|tile| (tile.hex, tile)).collect(),
        }
    }
}

impl From<Vec<Tile>> for Board {
    fn from(tiles: Vec<Tile>) -> Self {
        tiles.into_iter().collect()
    }
}

impl From<Board> for Vec<Tile> {
    fn from(board: Board) -> Self {
        board.tiles.into_values().collect()
    }
}
