use hexfront_protocol::{AttackRange, ClassTable, Terrain, UnitClass, UnitType};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainStats {
    pub terrain: Terrain,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    /// `None` means the class cannot enter.
    pub move_cost: ClassTable<Option<i32>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitStats {
    pub kind: UnitType,
    pub class: UnitClass,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub movement: i32,
    pub attack_range: AttackRange,
    pub max_fuel: i32,
    pub can_counter_attack: bool,
    pub attack_vs: ClassTable<Option<i32>>,
    pub defense_vs: ClassTable<Option<i32>>,
}

/// Inclusive damage band for city capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct DamageRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct WeatherWeights {
    pub clear: u32,
    pub rain: u32,
    pub heavy_rain: u32,
}

impl WeatherWeights {
    pub fn total(&self) -> u32 {
        self.clear + self.rain + self.heavy_rain
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WeatherTuning {
    pub weights: WeatherWeights,
    pub rain_increment: u32,
    pub heavy_rain_increment: u32,
    /// Consecutive adverse-weather turns after which plains turn to mud.
    pub mud_threshold: u32,
}

impl Default for WeatherTuning {
    fn default() -> Self {
        Self {
            weights: WeatherWeights {
                clear: 1,
                rain: 1,
                heavy_rain: 1,
            },
            rain_increment: 1,
            heavy_rain_increment: 2,
            mud_threshold: 3,
        }
    }
}

/// Scalar balance knobs. Every field falls back to its default when absent from `tuning.yaml`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Extra movement cost for entering a tile adjacent to an enemy.
    pub zoc_surcharge: i32,
    pub xp_cap: i32,
    pub city_hp: i32,
    pub city_heal_rate: i32,
    pub unit_heal_hp: i32,
    pub refuel_in_city: bool,
    pub capture_damage_high: DamageRange,
    pub capture_damage_low: DamageRange,
    pub weather: WeatherTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            zoc_surcharge: 2,
            xp_cap: 100,
            city_hp: 10,
            city_heal_rate: 2,
            unit_heal_hp: 2,
            refuel_in_city: true,
            capture_damage_high: DamageRange { min: 6, max: 8 },
            capture_damage_low: DamageRange { min: 3, max: 5 },
            weather: WeatherTuning::default(),
        }
    }
}

/// Rule tables indexed by enum discriminant. Built by [`crate::load_rules`].
#[derive(Clone, Debug)]
pub struct CompiledRules {
    pub terrains: Vec<TerrainStats>,
    pub units: Vec<UnitStats>,
    pub tuning: Tuning,
}

impl CompiledRules {
    #[inline]
    pub fn terrain(&self, terrain: Terrain) -> &TerrainStats {
        &self.terrains[terrain.index()]
    }

    #[inline]
    pub fn unit(&self, kind: UnitType) -> &UnitStats {
        &self.units[kind.index()]
    }

    #[inline]
    pub fn move_cost(&self, terrain: Terrain, class: UnitClass) -> Option<i32> {
        self.terrain(terrain).move_cost.get(class)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTerrain {
    #[serde(default)]
    pub attack_bonus: i32,
    #[serde(default)]
    pub defense_bonus: i32,
    #[serde(default)]
    pub move_cost: ClassTable<Option<i32>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUnit {
    pub class: UnitClass,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub movement: i32,
    pub attack_range: AttackRange,
    pub max_fuel: i32,
    #[serde(default = "default_true")]
    pub can_counter_attack: bool,
    #[serde(default)]
    pub attack_vs: ClassTable<Option<i32>>,
    #[serde(default)]
    pub defense_vs: ClassTable<Option<i32>>,
}

fn default_true() -> bool {
    true
}

impl RawTerrain {
    pub fn compile(self, terrain: Terrain) -> TerrainStats {
        TerrainStats {
            terrain,
            attack_bonus: self.attack_bonus,
            defense_bonus: self.defense_bonus,
            move_cost: self.move_cost,
        }
    }
}

impl RawUnit {
    pub fn compile(self, kind: UnitType) -> UnitStats {
        UnitStats {
            kind,
            class: self.class,
            max_hp: self.max_hp,
            attack: self.attack,
            defense: self.defense,
            movement: self.movement,
            attack_range: self.attack_range,
            max_fuel: self.max_fuel,
            can_counter_attack: self.can_counter_attack,
            attack_vs: self.attack_vs,
            defense_vs: self.defense_vs,
        }
    }
}
