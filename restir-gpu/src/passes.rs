use bytemuck::{Pod, Zeroable};

use crate::{wang_hash, WhiteNoise};

/// Per-dispatch parameters shared by all of the DI passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DiPassParams {
    /// Frame-level seed, drawn by the host; expected to be non-zero
    pub seed: u32,
    pub frame: u32,

    /// Index of the pass within the frame (see: `Self::PASS_*`)
    pub pass: u32,

    /// When non-zero, the random numbers don't change between frames
    pub freeze_random: u32,
}

impl DiPassParams {
    pub const PASS_INITIAL_CANDIDATES: u32 = 0;
    pub const PASS_TEMPORAL: u32 = 1;
    pub const PASS_SPATIAL: u32 = 2;

    /// Returns params for the `nth` spatial pass of the frame.
    pub fn spatial(self, nth: u32) -> Self {
        self.with_pass(Self::PASS_SPATIAL + nth)
    }

    pub fn with_pass(mut self, pass: u32) -> Self {
        self.pass = pass;
        self
    }

    pub fn is_random_frozen(&self) -> bool {
        self.freeze_random != 0
    }

    /// Returns the white-noise generator of given pixel.
    pub fn wnoise(&self, idx: usize) -> WhiteNoise {
        let idx = (idx as u32).wrapping_add(1);

        let seed = if self.is_random_frozen() {
            wang_hash(idx)
        } else {
            wang_hash(
                idx.wrapping_mul(self.frame.wrapping_add(1))
                    .wrapping_mul(self.seed),
            )
        };

        WhiteNoise::new(seed ^ wang_hash(self.pass))
    }
}
