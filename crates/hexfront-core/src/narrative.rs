//! Battle narration. The engine calls a [`Narrator`] after combat has been committed and falls
//! back to [`TemplateNarrator`] when it fails.

use thiserror::Error;

use hexfront_protocol::{Terrain, UnitSnapshot};

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative source unavailable: {0}")]
    Unavailable(String),
    #[error("narrative source returned an empty report")]
    Empty,
}

/// Facts a narrator may describe. Units are as they stood before the attack.
#[derive(Clone, Copy, Debug)]
pub struct BattleFacts<'a> {
    pub attacker: &'a UnitSnapshot,
    pub defender: &'a UnitSnapshot,
    pub terrain: Terrain,
    pub damage: i32,
    pub counter_damage: Option<i32>,
}

pub trait Narrator {
    fn narrate(&self, facts: &BattleFacts<'_>) -> Result<String, NarrativeError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateNarrator;

impl Narrator for TemplateNarrator {
    fn narrate(&self, facts: &BattleFacts<'_>) -> Result<String, NarrativeError> {
        Ok(template_report(facts))
    }
}

pub fn template_report(facts: &BattleFacts<'_>) -> String {
    let mut report = format!(
        "{} attacks {} for {} damage!",
        facts.attacker.kind, facts.defender.kind, facts.damage
    );
    if let Some(counter) = facts.counter_damage {
        report.push_str(&format!(
            "\n\nCounter-attack! {} attacks {} for {} damage!",
            facts.defender.kind, facts.attacker.kind, counter
        ));
    }
    report
}

/// Asks `narrator` for a report; any failure or blank answer yields the template text.
pub fn narrate_or_fallback(narrator: &dyn Narrator, facts: &BattleFacts<'_>) -> String {
    match narrator.narrate(facts) {
        Ok(report) if !report.trim().is_empty() => report,
        Ok(_) => {
            tracing::warn!(error = %NarrativeError::Empty, "narrator fallback");
            template_report(facts)
        }
        Err(err) => {
            tracing::warn!(error = %err, "narrator fallback");
            template_report(facts)
        }
    }
}

#[cfg(test)]
mod tests {
    use hexfront_protocol::{Hex, Team, UnitId, UnitType};

    use super::*;

    struct Offline;

    impl Narrator for Offline {
        fn narrate(&self, _facts: &BattleFacts<'_>) -> Result<String, NarrativeError> {
            Err(NarrativeError::Unavailable("timeout".into()))
        }
    }

    struct Blank;

    impl Narrator for Blank {
        fn narrate(&self, _facts: &BattleFacts<'_>) -> Result<String, NarrativeError> {
            Ok("   ".into())
        }
    }

    fn snapshot(id: u32, kind: UnitType, team: Team) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId(id),
            kind,
            team,
            position: Hex::new(0, 0),
            hp: 10,
            max_hp: 10,
            fuel: 40,
            xp: 0,
        }
    }

    #[test]
    fn template_mentions_counter_attack() {
        let tank = snapshot(1, UnitType::Tank, Team::Blue);
        let infantry = snapshot(2, UnitType::Infantry, Team::Red);
        let facts = BattleFacts {
            attacker: &tank,
            defender: &infantry,
            terrain: Terrain::Forest,
            damage: 3,
            counter_damage: Some(1),
        };
        assert_eq!(
            template_report(&facts),
            "Tank attacks Infantry for 3 damage!\n\nCounter-attack! Infantry attacks Tank for 1 damage!"
        );
    }

    #[test]
    fn failing_narrators_fall_back_to_template() {
        let artillery = snapshot(1, UnitType::Artillery, Team::Blue);
        let infantry = snapshot(2, UnitType::Infantry, Team::Red);
        let facts = BattleFacts {
            attacker: &artillery,
            defender: &infantry,
            terrain: Terrain::City,
            damage: 6,
            counter_damage: None,
        };
        let expected = "Artillery attacks Infantry for 6 damage!";
        assert_eq!(narrate_or_fallback(&Offline, &facts), expected);
        assert_eq!(narrate_or_fallback(&Blank, &facts), expected);
        assert_eq!(narrate_or_fallback(&TemplateNarrator, &facts), expected);
    }
}
