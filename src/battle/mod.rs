pub mod arena;
mod errors;
pub mod scoring;

pub use arena::{BattleArena, MAX_COMBATANTS};
pub use errors::BattleError;
pub use scoring::{score, win_probability};
