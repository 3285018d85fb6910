//! Weather draws and their effect on terrain. The turn machine composes these.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use hexfront_protocol::{Hex, Terrain, Weather};

use crate::board::Board;
use crate::rules::{WeatherTuning, WeatherWeights};

/// Draws the next weather from the configured weights.
///
/// Loaded rules never carry all-zero weights (`RulesError::ZeroWeatherWeights`); hand-built ones
/// that do fall back to `Clear`.
pub fn next_weather<R: Rng + ?Sized>(rng: &mut R, weights: &WeatherWeights) -> Weather {
    let table = [
        (Weather::Clear, weights.clear),
        (Weather::Rain, weights.rain),
        (Weather::HeavyRain, weights.heavy_rain),
    ];
    match WeightedIndex::new(table.iter().map(|(_, w)| *w)) {
        Ok(dist) => table[dist.sample(rng)].0,
        Err(_) => Weather::Clear,
    }
}

/// Consecutive adverse-weather intensity after a draw of `weather`.
pub fn advance_duration(duration: u32, weather: Weather, tuning: &WeatherTuning) -> u32 {
    match weather {
        Weather::Clear => 0,
        Weather::Rain => duration.saturating_add(tuning.rain_increment),
        Weather::HeavyRain => duration.saturating_add(tuning.heavy_rain_increment),
    }
}

/// The terrain conversion a given weather state calls for, if any.
pub fn terrain_shift(
    weather: Weather,
    duration: u32,
    tuning: &WeatherTuning,
) -> Option<(Terrain, Terrain)> {
    if !weather.is_adverse() {
        Some((Terrain::Mud, Terrain::Plains))
    } else if duration >= tuning.mud_threshold {
        Some((Terrain::Plains, Terrain::Mud))
    } else {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainShift {
    pub from: Terrain,
    pub to: Terrain,
    pub tiles: Vec<Hex>,
}

/// Rewrites Plains and Mud tiles for the current weather. `None` when nothing changed.
pub fn apply_terrain_effects(
    board: &mut Board,
    weather: Weather,
    duration: u32,
    tuning: &WeatherTuning,
) -> Option<TerrainShift> {
    let (from, to) = terrain_shift(weather, duration, tuning)?;
    let tiles: Vec<Hex> = board
        .iter_mut()
        .filter(|tile| tile.terrain() == from)
        .filter_map(|tile| tile.retexture(to).then_some(tile.hex()))
        .collect();
    if tiles.is_empty() {
        return None;
    }
    Some(TerrainShift { from, to, tiles })
}
