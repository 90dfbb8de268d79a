//! State Hashing
//!
//! SHA-256 digests of simulation state and input recordings. Two runs of the
//! same level and recording must produce the same digest.

use sha2::{Sha256, Digest};
use super::vec2::IVec2;

/// 32-byte SHA-256 digest
pub type StateHash = [u8; 32];

/// What a digest covers. The tag is hashed first so a state digest can
/// never equal a recording digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashDomain {
    /// Ball, level and session
    Simulation,
    /// A sequence of input frames
    InputRecording,
}

impl HashDomain {
    const fn tag(self) -> &'static [u8] {
        match self {
            HashDomain::Simulation => b"BOUNCE_STATE_V1",
            HashDomain::InputRecording => b"BOUNCE_INPUTS_V1",
        }
    }
}

/// Incremental hasher. Integers are fed little-endian; order matters.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Start a digest in `domain`.
    pub fn new(domain: HashDomain) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain.tag());
        Self { hasher }
    }

    /// Feed one byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Feed a bonus counter.
    #[inline]
    pub fn update_u16(&mut self, value: u16) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Feed a count or score.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Feed a coordinate or speed.
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Feed both components, x first.
    #[inline]
    pub fn update_vec2(&mut self, value: IVec2) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Feed a flag as one byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Feed raw grid cells in order.
    pub fn update_cells(&mut self, cells: impl IntoIterator<Item = u8>) {
        let mut chunk = [0u8; 64];
        let mut len = 0;
        for cell in cells {
            chunk[len] = cell;
            len += 1;
            if len == chunk.len() {
                self.hasher.update(chunk);
                len = 0;
            }
        }
        self.hasher.update(&chunk[..len]);
    }

    /// Finish the digest.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Digest of the simulation at `tick`; `add_state` feeds everything else.
pub fn compute_state_hash<F>(tick: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::new(HashDomain::Simulation);
    hasher.update_u32(tick);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matters() {
        let digest = |a: i32, b: i32| {
            let mut h = StateHasher::new(HashDomain::Simulation);
            h.update_i32(a);
            h.update_i32(b);
            h.finalize()
        };
        assert_eq!(digest(1, 2), digest(1, 2));
        assert_ne!(digest(1, 2), digest(2, 1));
    }

    #[test]
    fn test_domains_differ() {
        let state = StateHasher::new(HashDomain::Simulation).finalize();
        let inputs = StateHasher::new(HashDomain::InputRecording).finalize();
        assert_ne!(state, inputs);
    }

    #[test]
    fn test_cells_match_across_chunk_boundary() {
        let cells: Vec<u8> = (0..150u32).map(|i| (i % 55) as u8).collect();

        let mut chunked = StateHasher::new(HashDomain::Simulation);
        chunked.update_cells(cells.iter().copied());

        let mut bytewise = StateHasher::new(HashDomain::Simulation);
        for &cell in &cells {
            bytewise.update_u8(cell);
        }
        assert_eq!(chunked.finalize(), bytewise.finalize());
    }

    #[test]
    fn test_tick_leads_state_hash() {
        let at = |tick| compute_state_hash(tick, |h| h.update_vec2(IVec2::new(5, 6)));
        assert_eq!(at(100), at(100));
        assert_ne!(at(100), at(101));
    }
}
