use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use hexfront_protocol::{Team, UnitId};

use crate::state::GameState;
use crate::unit::Unit;

/// Unit roster plus turn bookkeeping as it stood before a committing action.
/// Board state (terrain, cities) is not part of the snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub units: BTreeMap<UnitId, Unit>,
    pub turn: u32,
    pub active_team: Team,
    pub selected_unit: Option<UnitId>,
}

impl GameStateSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            units: state.units.clone(),
            turn: state.turn,
            active_team: state.active_team,
            selected_unit: state.selected_unit,
        }
    }

    pub fn restore(self, state: &mut GameState) {
        state.units = self.units;
        state.turn = self.turn;
        state.active_team = self.active_team;
        state.selected_unit = self.selected_unit;
    }
}

/// LIFO stack of snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    snapshots: Vec<GameStateSnapshot>,
}

impl History {
    pub fn push(&mut self, snapshot: GameStateSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<GameStateSnapshot> {
        self.snapshots.pop()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Pops the latest snapshot and restores it. Returns false when there is nothing to undo.
pub fn undo(state: &mut GameState) -> bool {
    match state.history.pop() {
        Some(snapshot) => {
            snapshot.restore(state);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::{load_rules, RulesSource};
    use hexfront_protocol::{Hex, Terrain, UnitType};

    fn state() -> GameState {
        let rules = load_rules(RulesSource::Embedded).expect("rules load");
        GameState::new(
            Board::hexagon(3, Terrain::Plains),
            [
                Unit::from_rules(UnitId(1), UnitType::Tank, Team::Blue, Hex::new(0, 0), &rules),
                Unit::from_rules(UnitId(2), UnitType::Infantry, Team::Red, Hex::new(2, 0), &rules),
            ],
        )
    }

    fn record(state: &mut GameState) {
        let snapshot = GameStateSnapshot::capture(state);
        state.history.push(snapshot);
    }

    #[test]
    fn undo_on_empty_history_is_a_no_op() {
        let mut state = state();
        let before = state.clone();
        assert!(!undo(&mut state));
        assert_eq!(state, before);
    }

    #[test]
    fn two_undos_rewind_two_actions() {
        let mut state = state();
        let original = state.units.clone();

        record(&mut state);
        state.units.get_mut(&UnitId(1)).unwrap().position = Hex::new(1, 0);
        let after_first = state.units.clone();

        record(&mut state);
        state.units.get_mut(&UnitId(1)).unwrap().hp = 3;
        state.selected_unit = Some(UnitId(1));

        assert!(undo(&mut state));
        assert_eq!(state.units, after_first);
        assert_eq!(state.selected_unit, None);

        assert!(undo(&mut state));
        assert_eq!(state.units, original);
        assert!(state.history.is_empty());
    }

    #[test]
    fn undo_leaves_board_untouched() {
        let mut state = state();
        record(&mut state);
        state.board.set(crate::board::Tile::new(Hex::new(1, 1), Terrain::Mud));
        assert!(undo(&mut state));
        assert_eq!(state.board.terrain(Hex::new(1, 1)), Some(Terrain::Mud));
    }
}
