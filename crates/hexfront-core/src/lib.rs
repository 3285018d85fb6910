mod board;
pub mod capture;
pub mod combat;
mod game;
pub mod history;
pub mod movement;
mod narrative;
mod rules;
mod state;
pub mod turn;
mod unit;
pub mod victory;
pub mod weather;

pub use crate::board::*;
pub use crate::capture::{CaptureError, CaptureOutcome};
pub use crate::combat::{CombatError, CombatOutcome};
pub use crate::game::*;
pub use crate::history::{GameStateSnapshot, History};
pub use crate::narrative::*;
pub use crate::rules::*;
pub use crate::state::*;
pub use crate::unit::*;
pub use crate::weather::TerrainShift;
