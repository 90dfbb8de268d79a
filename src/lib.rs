//! # Bounce Physics
//!
//! Deterministic tile-based ball platformer physics and collision core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      BOUNCE PHYSICS                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── arith.rs    - Integer division and shift rounding       │
//! │  ├── vec2.rs     - Integer pixel vector                      │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── tile.rs     - Tile bytes and metadata table             │
//! │  ├── level.rs    - Tile grid, moving spikes, respawn         │
//! │  ├── ball.rs     - Ball state and physics constants          │
//! │  ├── collision.rs- Collision detection and tile effects      │
//! │  ├── physics.rs  - Integrator and ball state machine         │
//! │  ├── session.rs  - Score, lives, rings, exit door            │
//! │  ├── state.rs    - Owned simulation value                    │
//! │  └── tick.rs     - Fixed-timestep driver and replay          │
//! │                                                              │
//! │  config.rs       - Session rules and logging (JSON)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - Integer arithmetic only, with every rounding step named
//! - No system time dependencies
//! - No randomness
//!
//! Given an identical level and input recording, the simulation produces
//! **identical state hashes** on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use config::{ConfigError, SessionConfig, SimConfig};
pub use core::vec2::IVec2;
pub use core::hash::StateHash;
pub use game::input::InputFrame;
pub use game::level::Level;
pub use game::state::Simulation;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logical tick length in milliseconds
pub const TICK_MS: u32 = 30;
