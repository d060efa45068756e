use restir_shaders::di_temporal_resampling;

use crate::gpu::{DiPassParams, DiReservoir, DiSettings, GBufferView, Scene};
use crate::{ComputePass, FrameInput, Metrics};

#[derive(Debug)]
pub struct TemporalResamplingPass {
    pass: ComputePass,
}

impl TemporalResamplingPass {
    pub fn new() -> Self {
        Self {
            pass: ComputePass::new("di_temporal_resampling"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn run<S>(
        &self,
        metrics: &mut Metrics,
        frame: &FrameInput<S>,
        settings: &DiSettings,
        params: DiPassParams,
        initial_reservoirs: &[DiReservoir],
        prev_reservoirs: &[DiReservoir],
        output: &mut [DiReservoir],
    ) where
        S: Scene,
    {
        let params = params.with_pass(DiPassParams::PASS_TEMPORAL);
        let gbuffer = GBufferView::new(frame.gbuffer);
        let prev_gbuffer = GBufferView::new(frame.prev_gbuffer);

        self.pass.run(
            metrics,
            &frame.camera,
            frame.active,
            output,
            |global_id| {
                di_temporal_resampling::main(
                    global_id,
                    &params,
                    frame.scene,
                    settings,
                    &frame.camera,
                    &frame.prev_camera,
                    gbuffer,
                    prev_gbuffer,
                    initial_reservoirs,
                    prev_reservoirs,
                )
            },
        );
    }
}
