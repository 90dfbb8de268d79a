//! Core deterministic primitives.
//!
//! Integer-only helpers shared by the simulation. No floating point, no
//! wall clock, no randomness.

pub mod arith;
pub mod vec2;
pub mod hash;

// Re-export core types
pub use vec2::IVec2;
pub use hash::{compute_state_hash, HashDomain, StateHash, StateHasher};
