//! Game simulation modules

pub mod commands;
pub mod cooldown;
pub mod physics;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod world;

pub use commands::{CommandOutcome, CommandProcessor};
pub use session::SessionManager;
pub use simulation::Simulation;
pub use world::{PlayerId, SharedWorld, WorldState};
