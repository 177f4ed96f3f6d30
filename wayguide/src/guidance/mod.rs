//! Turn-by-turn guidance: step location, instruction building, announce policy
//! and wrong-direction detection.

mod deviation;
mod turn_by_turn;

pub use deviation::DeviationDetector;
pub use turn_by_turn::{locate_current_step, StepLocation, TurnByTurnEngine};
