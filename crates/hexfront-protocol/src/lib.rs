mod command;
mod event;
mod hex;
mod ids;
mod scenario;
mod types;

pub use crate::command::*;
pub use crate::event::*;
pub use crate::hex::*;
pub use crate::ids::*;
pub use crate::scenario::*;
pub use crate::types::*;
