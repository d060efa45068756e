use restir_shaders::di_spatial_resampling;

use crate::gpu::{
    BiasCorrection, BiasCorrectionWeights, DiPassParams, DiReservoir,
    DiSettings, GBufferView, GbhConfidenceWeights, GbhWeights,
    MisLikeConfidenceWeights, MisLikeWeights, OneOverMWeights,
    OneOverZWeights, Scene,
};
use crate::{ComputePass, FrameInput, Metrics};

#[derive(Debug)]
pub struct SpatialResamplingPass {
    pass: ComputePass,
}

impl SpatialResamplingPass {
    pub fn new() -> Self {
        Self {
            pass: ComputePass::new("di_spatial_resampling"),
        }
    }

    /// Runs the `nth` spatial pass of the frame.
    ///
    /// Bias correction is picked once here, so that the kernel gets
    /// monomorphized for it.
    #[allow(clippy::too_many_arguments)]
    pub fn run<S>(
        &self,
        metrics: &mut Metrics,
        frame: &FrameInput<S>,
        settings: &DiSettings,
        params: DiPassParams,
        nth: u32,
        input: &[DiReservoir],
        output: &mut [DiReservoir],
    ) where
        S: Scene,
    {
        let params = params.spatial(nth);

        match settings.bias_correction {
            BiasCorrection::OneOverM => self.run_ex::<OneOverMWeights, S>(
                metrics, frame, settings, params, input, output,
            ),

            BiasCorrection::OneOverZ => self.run_ex::<OneOverZWeights, S>(
                metrics, frame, settings, params, input, output,
            ),

            BiasCorrection::MisLike => self.run_ex::<MisLikeWeights, S>(
                metrics, frame, settings, params, input, output,
            ),

            BiasCorrection::MisLikeConfidence => self
                .run_ex::<MisLikeConfidenceWeights, S>(
                    metrics, frame, settings, params, input, output,
                ),

            BiasCorrection::Gbh => self.run_ex::<GbhWeights, S>(
                metrics, frame, settings, params, input, output,
            ),

            BiasCorrection::GbhConfidence => self
                .run_ex::<GbhConfidenceWeights, S>(
                    metrics, frame, settings, params, input, output,
                ),
        }
    }

    fn run_ex<B, S>(
        &self,
        metrics: &mut Metrics,
        frame: &FrameInput<S>,
        settings: &DiSettings,
        params: DiPassParams,
        input: &[DiReservoir],
        output: &mut [DiReservoir],
    ) where
        B: BiasCorrectionWeights,
        S: Scene,
    {
        let gbuffer = GBufferView::new(frame.gbuffer);

        self.pass.run(
            metrics,
            &frame.camera,
            frame.active,
            output,
            |global_id| {
                di_spatial_resampling::main::<B, S>(
                    global_id,
                    &params,
                    frame.scene,
                    settings,
                    &frame.camera,
                    gbuffer,
                    input,
                )
            },
        );
    }
}
