use glam::UVec2;
use log::debug;

use crate::gpu::DiReservoir;
use crate::{DoubleBuffered, ReservoirBuffer};

/// Which buffer holds the latest reservoirs while a frame is being rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiTarget {
    Initial,
    Scratch(bool),
}

#[derive(Debug)]
pub struct DiBuffers {
    /// Output of the initial-candidates pass
    pub initial: ReservoirBuffer,

    /// Ping-pong pair written by the temporal and spatial passes
    pub scratch: DoubleBuffered<ReservoirBuffer>,

    /// Final reservoirs of the current and the previous frame
    pub history: DoubleBuffered<ReservoirBuffer>,
}

impl DiBuffers {
    pub fn new(size: UVec2) -> Self {
        debug!("Allocating DI buffers: {}x{}", size.x, size.y);

        let len = (size.x as usize) * (size.y as usize);

        Self {
            initial: ReservoirBuffer::new("di_initial_reservoirs", len),
            scratch: DoubleBuffered::new(
                ReservoirBuffer::new("di_scratch_reservoirs_a", len),
                ReservoirBuffer::new("di_scratch_reservoirs_b", len),
            ),
            history: DoubleBuffered::new(
                ReservoirBuffer::new("di_history_reservoirs_a", len),
                ReservoirBuffer::new("di_history_reservoirs_b", len),
            ),
        }
    }

    pub fn get(&self, target: DiTarget) -> &[DiReservoir] {
        match target {
            DiTarget::Initial => self.initial.as_slice(),
            DiTarget::Scratch(alternate) => {
                self.scratch.get(alternate).as_slice()
            }
        }
    }

    /// Returns the buffer a pass reading from `input` should write into,
    /// together with the input itself.
    pub fn resample(
        &mut self,
        input: DiTarget,
    ) -> (DiTarget, &[DiReservoir], &mut [DiReservoir]) {
        match input {
            DiTarget::Initial => (
                DiTarget::Scratch(false),
                self.initial.as_slice(),
                self.scratch.get_mut(false).as_mut_slice(),
            ),

            DiTarget::Scratch(alternate) => {
                let (output, input) = self.scratch.split_mut(!alternate);

                (
                    DiTarget::Scratch(!alternate),
                    input.as_slice(),
                    output.as_mut_slice(),
                )
            }
        }
    }

    /// Stores reservoirs held by `target` as the frame's final ones.
    pub fn commit(
        &mut self,
        target: DiTarget,
        alternate: bool,
        active: Option<&[bool]>,
    ) {
        let Self {
            initial,
            scratch,
            history,
        } = self;

        let src = match target {
            DiTarget::Initial => initial.as_slice(),
            DiTarget::Scratch(alternate) => scratch.get(alternate).as_slice(),
        };

        history.get_mut(alternate).copy_from(src, active);
    }
}
