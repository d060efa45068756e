use restir_gpu::prelude::*;

/// Merges the pixel's initial reservoir with a reservoir found in the
/// previous frame.
///
/// If no previous-frame pixel is similar enough, the initial reservoir is
/// returned as-is.
#[allow(clippy::too_many_arguments)]
pub fn main<S>(
    global_id: UVec2,
    params: &DiPassParams,
    scene: &S,
    settings: &DiSettings,
    camera: &Camera,
    prev_camera: &Camera,
    gbuffer: GBufferView,
    prev_gbuffer: GBufferView,
    initial_reservoirs: &[DiReservoir],
    prev_reservoirs: &[DiReservoir],
) -> DiReservoir
where
    S: Scene,
{
    let lhs_idx = camera.screen_to_idx(global_id);
    let mut wnoise = params.wnoise(lhs_idx);

    let lhs = initial_reservoirs
        .get(lhs_idx)
        .copied()
        .unwrap_or_default();

    let Some(lhs_surface) = gbuffer.surface(lhs_idx) else {
        return lhs;
    };

    // -------------------------------------------------------------------------

    let Some(rhs_neighbor) = find_temporal_neighbor(
        prev_camera,
        prev_gbuffer,
        &lhs_surface,
        &settings.similarity,
        &settings.temporal_pass,
        &mut wnoise,
    ) else {
        return lhs;
    };

    let rhs_surface = rhs_neighbor.surface;

    let mut rhs = prev_reservoirs
        .get(rhs_neighbor.idx)
        .copied()
        .unwrap_or_default();

    rhs.clamp_m(settings.m_cap);

    // ---

    let tf_settings = &settings.target_function;
    let threshold = settings.jacobian_rejection_threshold;

    let (rhs_lhs_pdf, rhs_jacobian) = if rhs.ucw > 0.0 {
        let pdf = evaluate_target_function(
            scene,
            &rhs.sample,
            &lhs_surface,
            tf_settings,
            tf_settings.visibility_in_resampling,
        );

        let jacobian = if pdf > 0.0 {
            rhs.sample
                .jacobian(scene, rhs_surface.point, lhs_surface.point, threshold)
                .unwrap_or(0.0)
        } else {
            0.0
        };

        (pdf, jacobian)
    } else {
        (0.0, 0.0)
    };

    let mis = if settings.bias_correction.is_gbh() {
        let confidence = settings.bias_correction == BiasCorrection::GbhConfidence;

        let bias_correction_pdf = |sample: &DiSample, surface: &Surface| {
            evaluate_target_function(
                scene,
                sample,
                surface,
                tf_settings,
                tf_settings.visibility_in_bias_correction,
            )
        };

        let lhs_rhs_pdf = if lhs.ucw > 0.0 {
            let jacobian = lhs
                .sample
                .jacobian(scene, lhs_surface.point, rhs_surface.point, threshold)
                .unwrap_or(0.0);

            bias_correction_pdf(&lhs.sample, &rhs_surface) * jacobian
        } else {
            0.0
        };

        let rhs_lhs_pdf = if rhs_jacobian > 0.0 {
            bias_correction_pdf(&rhs.sample, &lhs_surface)
        } else {
            0.0
        };

        let (lhs_m, rhs_m) = if confidence {
            (lhs.m as f32, rhs.m as f32)
        } else {
            (1.0, 1.0)
        };

        Mis {
            lhs_m,
            rhs_m,
            rhs_jacobian,
            lhs_lhs_pdf: lhs.sample.target_function,
            lhs_rhs_pdf,
            rhs_lhs_pdf,
            rhs_rhs_pdf: rhs.sample.target_function,
        }
        .eval()
    } else {
        Mis {
            lhs_m: lhs.m as f32,
            rhs_m: rhs.m as f32,
            ..Default::default()
        }
        .eval_confidence()
    };

    // ---

    let mut main = DiReservoir::default();

    main.combine_with(
        lhs,
        mis.lhs_mis,
        lhs.sample.target_function,
        1.0,
        &mut wnoise,
    );

    main.sanity_check(global_id);

    // Rejected neighbors end up with a zero weight, contributing just their
    // confidence
    main.combine_with(rhs, mis.rhs_mis, rhs_lhs_pdf, rhs_jacobian, &mut wnoise);
    main.end();
    main.sanity_check(global_id);
    main
}
