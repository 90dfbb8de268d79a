//! Game Logic Module
//!
//! All simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `tile`: Tile bytes and the tile metadata table
//! - `masks`: Ball and ramp collision masks
//! - `level`: Tile grid, moving spikes, respawn point
//! - `ring`: Ring pair and checkpoint rewrites
//! - `ball`: Ball data and physics constants
//! - `input`: Direction bits and per-tick input frames
//! - `events`: Game events and the hook queries
//! - `collision`: Collision detection and tile effects
//! - `physics`: Ball integrator and state machine
//! - `session`: Score, lives, rings and exit door
//! - `state`: The owned simulation value
//! - `tick`: Fixed-timestep driver and replay

pub mod tile;
pub mod masks;
pub mod level;
pub mod ring;
pub mod ball;
pub mod input;
pub mod events;
pub mod collision;
pub mod physics;
pub mod session;
pub mod state;
pub mod tick;

// Re-export key types
pub use ball::{Ball, Lifecycle, SizeState};
pub use collision::CollisionOutcome;
pub use events::{GameEvent, GameEventData, GameHooks};
pub use input::InputFrame;
pub use level::{Level, LevelError, MovingObject};
pub use session::GameSession;
pub use state::Simulation;
pub use tick::TickResult;
