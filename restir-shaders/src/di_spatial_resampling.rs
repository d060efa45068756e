use restir_gpu::prelude::*;

/// Resamples reservoirs of pixels around the current one (and the current
/// one itself), weighting them according to `B`.
#[allow(clippy::too_many_arguments)]
pub fn main<B, S>(
    global_id: UVec2,
    params: &DiPassParams,
    scene: &S,
    settings: &DiSettings,
    camera: &Camera,
    gbuffer: GBufferView,
    in_reservoirs: &[DiReservoir],
) -> DiReservoir
where
    B: BiasCorrectionWeights,
    S: Scene,
{
    let center_idx = camera.screen_to_idx(global_id);
    let mut wnoise = params.wnoise(center_idx);

    let Some(center) = gbuffer.surface(center_idx) else {
        return in_reservoirs
            .get(center_idx)
            .copied()
            .unwrap_or_default();
    };

    let neighbors = SpatialNeighbors::new(
        *camera,
        global_id,
        &settings.spatial_pass,
        &mut wnoise,
    );

    let hood = SpatialNeighborhood {
        scene,
        settings,
        gbuffer,
        reservoirs: in_reservoirs,
        neighbors,
        center,
    };

    // -------------------------------------------------------------------------

    let mut main = DiReservoir::default();
    let mut selected = None;

    for nth in 0..neighbors.len() {
        let Some(rhs_idx) = hood.position(nth) else {
            continue;
        };

        let rhs = hood.reservoir(rhs_idx);

        if rhs.ucw == 0.0 {
            main.m = main.m.saturating_add(rhs.m);
            continue;
        }

        let Some((_, rhs_surface)) = hood.eligible(nth) else {
            continue;
        };

        let is_center = neighbors.is_center(nth);

        let target_function = if is_center {
            rhs.sample.target_function
        } else {
            hood.resampling_target_function(&rhs.sample, &center)
        };

        let mut jacobian = 1.0;

        if target_function > 0.0 && !is_center {
            match rhs.sample.jacobian(
                scene,
                rhs_surface.point,
                center.point,
                settings.jacobian_rejection_threshold,
            ) {
                Some(rhs_jacobian) => {
                    jacobian = rhs_jacobian;
                }

                None => {
                    main.m = main.m.saturating_add(rhs.m);
                    continue;
                }
            }
        }

        let mis_weight = if target_function > 0.0 {
            B::resampling_mis_weight(&hood, nth, &rhs)
        } else {
            1.0
        };

        if main.combine_with(
            rhs,
            mis_weight,
            target_function,
            jacobian,
            &mut wnoise,
        ) {
            selected = Some(nth);
        }

        main.sanity_check(global_id);
    }

    // ---

    let (numerator, denominator) = B::normalization(&hood, &main, selected);

    main.end_with_normalization(numerator, denominator);
    main.sanity_check(global_id);
    main.clamp_m(settings.m_cap);

    if settings.spatial_visibility_reuse() {
        main.visibility_reuse(scene, &center);
    }

    main
}
