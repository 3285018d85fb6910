use std::collections::BTreeMap;

use hexfront_protocol::{Terrain, UnitType};
use thiserror::Error;

use crate::rules::{CompiledRules, RawTerrain, RawUnit, Tuning};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing rules entry: {0}")]
    MissingEntry(String),
    #[error("invalid range for {what}: min {min} > max {max} or min below {floor}")]
    InvalidRange {
        what: String,
        min: i32,
        max: i32,
        floor: i32,
    },
    #[error("invalid value for {what}: {value}")]
    InvalidValue { what: String, value: i32 },
    #[error("weather weights must not all be zero")]
    ZeroWeatherWeights,
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub enum RulesSource<'a> {
    Embedded,
    /// Directory holding `terrain.yaml`, `units.yaml` and optionally `tuning.yaml`.
    Path(String),
    Bytes {
        terrain: &'a [u8],
        units: &'a [u8],
        tuning: Option<&'a [u8]>,
    },
}

struct RawRules {
    terrains: BTreeMap<Terrain, RawTerrain>,
    units: BTreeMap<UnitType, RawUnit>,
    tuning: Tuning,
}

pub fn load_rules(source: RulesSource<'_>) -> Result<CompiledRules, RulesError> {
    let raw = match source {
        RulesSource::Embedded => {
            let terrain_yaml = include_str!("../../data/base/terrain.yaml");
            let units_yaml = include_str!("../../data/base/units.yaml");
            let tuning_yaml = include_str!("../../data/base/tuning.yaml");
            parse_raw_rules(terrain_yaml, units_yaml, Some(tuning_yaml))?
        }
        RulesSource::Path(path) => {
            let terrain_yaml = std::fs::read_to_string(format!("{path}/terrain.yaml"))?;
            let units_yaml = std::fs::read_to_string(format!("{path}/units.yaml"))?;
            let tuning_yaml = std::fs::read_to_string(format!("{path}/tuning.yaml")).ok();
            parse_raw_rules(&terrain_yaml, &units_yaml, tuning_yaml.as_deref())?
        }
        RulesSource::Bytes {
            terrain,
            units,
            tuning,
        } => parse_raw_rules(
            std::str::from_utf8(terrain)?,
            std::str::from_utf8(units)?,
            tuning.map(std::str::from_utf8).transpose()?,
        )?,
    };

    compile_rules(raw)
}

fn parse_raw_rules(
    terrain_yaml: &str,
    units_yaml: &str,
    tuning_yaml: Option<&str>,
) -> Result<RawRules, RulesError> {
    let terrains = serde_yaml::from_str(terrain_yaml)?;
    let units = serde_yaml::from_str(units_yaml)?;
    let tuning = match tuning_yaml {
        Some(s) => serde_yaml::from_str(s)?,
        None => Tuning::default(),
    };
    Ok(RawRules {
        terrains,
        units,
        tuning,
    })
}

fn compile_rules(mut raw: RawRules) -> Result<CompiledRules, RulesError> {
    let mut terrains = Vec::with_capacity(Terrain::ALL.len());
    for terrain in Terrain::ALL {
        let entry = raw
            .terrains
            .remove(&terrain)
            .ok_or_else(|| RulesError::MissingEntry(format!("terrain `{terrain}`")))?;
        for cost in [entry.move_cost.infantry, entry.move_cost.vehicle]
            .into_iter()
            .flatten()
        {
            if cost < 1 {
                return Err(RulesError::InvalidValue {
                    what: format!("move cost on `{terrain}`"),
                    value: cost,
                });
            }
        }
        terrains.push(entry.compile(terrain));
    }

    let mut units = Vec::with_capacity(UnitType::ALL.len());
    for kind in UnitType::ALL {
        let entry = raw
            .units
            .remove(&kind)
            .ok_or_else(|| RulesError::MissingEntry(format!("unit `{kind}`")))?;
        check_range(
            &format!("attack range of `{kind}`"),
            entry.attack_range.min,
            entry.attack_range.max,
            1,
        )?;
        for (what, value) in [
            ("max_hp", entry.max_hp),
            ("movement", entry.movement),
            ("max_fuel", entry.max_fuel),
        ] {
            if value < 1 {
                return Err(RulesError::InvalidValue {
                    what: format!("{what} of `{kind}`"),
                    value,
                });
            }
        }
        units.push(entry.compile(kind));
    }

    let tuning = raw.tuning;
    check_range(
        "capture_damage_high",
        tuning.capture_damage_high.min,
        tuning.capture_damage_high.max,
        1,
    )?;
    check_range(
        "capture_damage_low",
        tuning.capture_damage_low.min,
        tuning.capture_damage_low.max,
        1,
    )?;
    if tuning.city_hp < 1 {
        return Err(RulesError::InvalidValue {
            what: "city_hp".to_string(),
            value: tuning.city_hp,
        });
    }
    for (what, value) in [
        ("zoc_surcharge", tuning.zoc_surcharge),
        ("city_heal_rate", tuning.city_heal_rate),
        ("unit_heal_hp", tuning.unit_heal_hp),
        ("xp_cap", tuning.xp_cap),
    ] {
        if value < 0 {
            return Err(RulesError::InvalidValue {
                what: what.to_string(),
                value,
            });
        }
    }
    if tuning.weather.weights.total() == 0 {
        return Err(RulesError::ZeroWeatherWeights);
    }

    tracing::debug!(
        terrains = terrains.len(),
        units = units.len(),
        zoc_surcharge = tuning.zoc_surcharge,
        "rules compiled"
    );

    Ok(CompiledRules {
        terrains,
        units,
        tuning,
    })
}

fn check_range(what: &str, min: i32, max: i32, floor: i32) -> Result<(), RulesError> {
    if min < floor || min > max {
        return Err(RulesError::InvalidRange {
            what: what.to_string(),
            min,
            max,
            floor,
        });
    }
    Ok(())
}
