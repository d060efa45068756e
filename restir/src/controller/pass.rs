use glam::UVec2;
use log::debug;
use rayon::prelude::*;

use crate::gpu::{Camera, DiReservoir};
use crate::Metrics;

/// Kernel dispatched over all pixels of the viewport, one logical thread per
/// pixel.
#[derive(Debug)]
pub struct ComputePass {
    label: &'static str,
}

impl ComputePass {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    /// Runs `kernel` for each active pixel, storing its result into the
    /// pixel's slot of `output`.
    ///
    /// Pixels are processed in parallel; each one writes only its own slot,
    /// and the pass finishes only after all of them are done.
    pub fn run<F>(
        &self,
        metrics: &mut Metrics,
        camera: &Camera,
        active: Option<&[bool]>,
        output: &mut [DiReservoir],
        kernel: F,
    ) where
        F: Fn(UVec2) -> DiReservoir + Sync,
    {
        assert_eq!(
            camera.pixel_count(),
            output.len(),
            "pass `{}`: output has {} reservoirs, but viewport has {} pixels",
            self.label,
            output.len(),
            camera.pixel_count(),
        );

        if let Some(active) = active {
            assert_eq!(
                output.len(),
                active.len(),
                "pass `{}`: active mask has {} entries, but viewport has {} pixels",
                self.label,
                active.len(),
                output.len(),
            );
        }

        debug!("Running pass: {}", self.label);

        metrics.measure(self.label, || {
            output
                .par_iter_mut()
                .enumerate()
                .for_each(|(idx, reservoir)| {
                    if active.map_or(true, |active| active[idx]) {
                        *reservoir = kernel(camera.idx_to_screen(idx));
                    }
                });
        });
    }
}
