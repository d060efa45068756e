use log::warn;

use crate::gpu::DiSettings;

/// Settings of the whole renderer, as seen by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RendererSettings {
    pub di: DiSettings,

    /// Seed of the per-frame random number generator; when `None`, the
    /// generator is seeded from the operating system's entropy
    pub seed: Option<u64>,

    /// When set, the per-pixel random numbers don't change between frames
    /// (useful for debugging and for reproducible tests)
    pub freeze_random: bool,
}

impl RendererSettings {
    /// Fixes settings the passes couldn't work with, warning about each
    /// adjustment.
    pub fn sanitize(&mut self) {
        for adjustment in self.di.sanitize() {
            warn!("Invalid renderer settings: {}", adjustment);
        }
    }
}
