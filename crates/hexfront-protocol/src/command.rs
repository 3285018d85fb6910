use serde::{Deserialize, Serialize};

use crate::{Hex, UnitId};

/// All possible player→engine commands. Fully serializable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    // Selection
    SelectUnit { unit: UnitId },
    Deselect,

    // Unit actions (each one commits and can be undone)
    MoveUnit { unit: UnitId, to: Hex },
    Attack { attacker: UnitId, target: UnitId },
    Wait { unit: UnitId },
    Capture { unit: UnitId },

    // Turn flow
    EndTurn,
    Undo,
}

impl Command {
    /// Whether a successful application leaves an undo snapshot of the state before it.
    pub const fn is_committing(&self) -> bool {
        matches!(
            self,
            Command::MoveUnit { .. }
                | Command::Attack { .. }
                | Command::Wait { .. }
                | Command::Capture { .. }
        )
    }
}
