pub mod reports;
pub mod simulation;

pub use simulation::{RunStats, ScriptedCombat, SimulationConfig, generate_world, run_simulation};
