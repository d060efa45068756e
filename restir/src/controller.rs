mod buffers;
mod pass;
mod passes;

use glam::UVec2;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use self::buffers::*;
pub use self::pass::*;
pub use self::passes::*;
use crate::gpu::{DiPassParams, DiReservoir, Scene};
use crate::{FrameInput, Metrics, RendererSettings};

/// Drives the ReSTIR DI passes over consecutive frames of a single viewport.
///
/// Each frame runs initial-candidates generation, then (if enabled and there
/// is a valid history) temporal resampling, then the configured number of
/// spatial passes; the result becomes the history of the next frame.
#[derive(Debug)]
pub struct DiController {
    settings: RendererSettings,
    size: UVec2,
    buffers: DiBuffers,
    passes: DiPasses,
    rng: StdRng,
    metrics: Metrics,
    frame: u32,
    history_valid: bool,
}

impl DiController {
    pub fn new(mut settings: RendererSettings, size: UVec2) -> Self {
        assert_viewport(size);

        info!("Creating DI controller: {}x{}", size.x, size.y);

        settings.sanitize();

        let buffers = DiBuffers::new(size);
        let passes = DiPasses::new();
        let rng = build_rng(&settings);

        debug!("DI controller created");

        Self {
            settings,
            size,
            buffers,
            passes,
            rng,
            metrics: Default::default(),
            frame: 0,
            history_valid: false,
        }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Replaces settings; takes effect from the next frame.
    ///
    /// Changing the seed restarts the random number generator.
    pub fn set_settings(&mut self, mut settings: RendererSettings) {
        settings.sanitize();

        if settings.seed != self.settings.seed {
            self.rng = build_rng(&settings);
        }

        self.settings = settings;
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Returns the number of frames rendered so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_alternate(&self) -> bool {
        self.frame % 2 == 1
    }

    /// Changes the viewport size; reallocates all buffers, dropping the
    /// history.
    pub fn resize(&mut self, size: UVec2) {
        assert_viewport(size);

        if size == self.size {
            return;
        }

        info!(
            "Resizing DI controller: {}x{} -> {}x{}",
            self.size.x, self.size.y, size.x, size.y
        );

        self.size = size;
        self.buffers = DiBuffers::new(size);
        self.history_valid = false;
    }

    /// Makes the next frame skip temporal resampling, e.g. after a camera
    /// cut.
    pub fn reset_history(&mut self) {
        debug!("Resetting DI history");

        self.history_valid = false;
    }

    /// Renders a frame and returns its final reservoirs.
    pub fn render<S>(&mut self, frame: &FrameInput<S>) -> &[DiReservoir]
    where
        S: Scene,
    {
        self.validate(frame);

        let alternate = self.is_alternate();
        let settings = self.settings.di;

        let params = DiPassParams {
            seed: self.rng.gen::<u32>() | 1,
            frame: self.frame,
            pass: 0,
            freeze_random: self.settings.freeze_random as u32,
        };

        self.passes.initial_candidates.run(
            &mut self.metrics,
            frame,
            &settings,
            params,
            self.buffers.initial.as_mut_slice(),
        );

        let mut target = DiTarget::Initial;
        let temporal = settings.temporal_pass.enabled && self.history_valid;

        if temporal {
            let DiBuffers {
                initial,
                scratch,
                history,
            } = &mut self.buffers;

            self.passes.temporal_resampling.run(
                &mut self.metrics,
                frame,
                &settings,
                params,
                initial.as_slice(),
                history.get(!alternate).as_slice(),
                scratch.get_mut(false).as_mut_slice(),
            );

            target = DiTarget::Scratch(false);
        }

        let spatial_passes = if settings.spatial_pass.enabled {
            settings.spatial_pass.number_of_passes
        } else {
            0
        };

        for nth in 0..spatial_passes {
            let (output_target, input, output) = self.buffers.resample(target);

            self.passes.spatial_resampling.run(
                &mut self.metrics,
                frame,
                &settings,
                params,
                nth,
                input,
                output,
            );

            target = output_target;
        }

        self.buffers.commit(target, alternate, frame.active);

        trace!(
            "Frame {} rendered (seed={}, temporal={}, spatial passes={})",
            self.frame,
            params.seed,
            temporal,
            spatial_passes,
        );

        self.metrics.flush(self.frame);
        self.frame = self.frame.wrapping_add(1);
        self.history_valid = true;

        self.buffers.history.get(alternate).as_slice()
    }

    /// Returns reservoirs of the most recently rendered frame.
    pub fn output(&self) -> &[DiReservoir] {
        self.buffers.history.get(!self.is_alternate()).as_slice()
    }

    /// Returns [`Self::output()`] in its raw, GPU-compatible form.
    pub fn output_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.output())
    }

    fn validate<S>(&self, frame: &FrameInput<S>) {
        let pixels = (self.size.x as usize) * (self.size.y as usize);

        assert_eq!(
            self.size,
            frame.camera.screen_size(),
            "camera's viewport doesn't match the controller's one",
        );

        assert_eq!(
            pixels,
            frame.gbuffer.len(),
            "G-buffer has {} entries, but viewport has {} pixels",
            frame.gbuffer.len(),
            pixels,
        );

        assert_eq!(
            pixels,
            frame.prev_gbuffer.len(),
            "previous G-buffer has {} entries, but viewport has {} pixels",
            frame.prev_gbuffer.len(),
            pixels,
        );

        if let Some(active) = frame.active {
            assert_eq!(
                pixels,
                active.len(),
                "active mask has {} entries, but viewport has {} pixels",
                active.len(),
                pixels,
            );
        }
    }
}

impl Drop for DiController {
    fn drop(&mut self) {
        info!("Deleting DI controller: {}x{}", self.size.x, self.size.y);
    }
}

fn assert_viewport(size: UVec2) {
    assert!(
        size.x > 0 && size.y > 0,
        "viewport must not be empty (got {}x{})",
        size.x,
        size.y,
    );
}

fn build_rng(settings: &RendererSettings) -> StdRng {
    match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
