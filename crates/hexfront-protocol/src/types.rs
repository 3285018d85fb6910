use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Plains,
    Forest,
    Mountain,
    River,
    Road,
    Bridge,
    City,
    Mud,
    Sea,
}

impl Terrain {
    pub const ALL: [Terrain; 9] = [
        Terrain::Plains,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::River,
        Terrain::Road,
        Terrain::Bridge,
        Terrain::City,
        Terrain::Mud,
        Terrain::Sea,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Terrain::Plains => "Plains",
            Terrain::Forest => "Forest",
            Terrain::Mountain => "Mountain",
            Terrain::River => "River",
            Terrain::Road => "Road",
            Terrain::Bridge => "Bridge",
            Terrain::City => "City",
            Terrain::Mud => "Mud",
            Terrain::Sea => "Sea",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad matchup class. Terrain costs and attack/defense overrides are keyed by class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Infantry,
    Vehicle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Infantry,
    Tank,
    ArmoredCar,
    AntiTank,
    Artillery,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Infantry,
        UnitType::Tank,
        UnitType::ArmoredCar,
        UnitType::AntiTank,
        UnitType::Artillery,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Indirect fire ignores terrain cover and never draws a counter-attack.
    #[inline]
    pub const fn is_indirect_fire(self) -> bool {
        matches!(self, UnitType::Artillery)
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitType::Infantry => "Infantry",
            UnitType::Tank => "Tank",
            UnitType::ArmoredCar => "ArmoredCar",
            UnitType::AntiTank => "AntiTank",
            UnitType::Artillery => "Artillery",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    HeavyRain,
}

impl Weather {
    #[inline]
    pub const fn is_adverse(self) -> bool {
        !matches!(self, Weather::Clear)
    }
}

/// Inclusive hex-distance band a unit can fire at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackRange {
    pub min: i32,
    pub max: i32,
}

impl AttackRange {
    #[inline]
    pub const fn contains(self, distance: i32) -> bool {
        distance >= self.min && distance <= self.max
    }
}

/// A value per [`UnitClass`], stored as a fixed pair. A missing `Option` slot reads as `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassTable<T> {
    pub infantry: T,
    pub vehicle: T,
}

impl<T: Copy> ClassTable<T> {
    #[inline]
    pub const fn get(&self, class: UnitClass) -> T {
        match class {
            UnitClass::Infantry => self.infantry,
            UnitClass::Vehicle => self.vehicle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_table_indexes_by_class() {
        let table = ClassTable {
            infantry: Some(4),
            vehicle: None,
        };
        assert_eq!(table.get(UnitClass::Infantry), Some(4));
        assert_eq!(table.get(UnitClass::Vehicle), None);
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        let json = serde_json::to_string(&UnitType::ArmoredCar).unwrap();
        assert_eq!(json, "\"armored_car\"");
        let weather: Weather = serde_json::from_str("\"heavy_rain\"").unwrap();
        assert_eq!(weather, Weather::HeavyRain);
    }

    #[test]
    fn attack_range_is_inclusive() {
        let range = AttackRange { min: 2, max: 5 };
        assert!(!range.contains(1));
        assert!(range.contains(2));
        assert!(range.contains(5));
        assert!(!range.contains(6));
    }
}
