use restir_shaders::di_initial_candidates;

use crate::gpu::{DiPassParams, DiReservoir, DiSettings, GBufferView, Scene};
use crate::{ComputePass, FrameInput, Metrics};

#[derive(Debug)]
pub struct InitialCandidatesPass {
    pass: ComputePass,
}

impl InitialCandidatesPass {
    pub fn new() -> Self {
        Self {
            pass: ComputePass::new("di_initial_candidates"),
        }
    }

    pub fn run<S>(
        &self,
        metrics: &mut Metrics,
        frame: &FrameInput<S>,
        settings: &DiSettings,
        params: DiPassParams,
        output: &mut [DiReservoir],
    ) where
        S: Scene,
    {
        let params = params.with_pass(DiPassParams::PASS_INITIAL_CANDIDATES);
        let gbuffer = GBufferView::new(frame.gbuffer);

        self.pass.run(
            metrics,
            &frame.camera,
            frame.active,
            output,
            |global_id| {
                di_initial_candidates::main(
                    global_id,
                    &params,
                    frame.scene,
                    settings,
                    &frame.camera,
                    gbuffer,
                )
            },
        );
    }
}
