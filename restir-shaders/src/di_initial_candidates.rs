use restir_gpu::prelude::*;

/// Generates the initial reservoir of a pixel by resampling light- and
/// BSDF-sampled candidates, combined with the balance heuristic.
pub fn main<S>(
    global_id: UVec2,
    params: &DiPassParams,
    scene: &S,
    settings: &DiSettings,
    camera: &Camera,
    gbuffer: GBufferView,
) -> DiReservoir
where
    S: Scene,
{
    let screen_idx = camera.screen_to_idx(global_id);
    let mut wnoise = params.wnoise(screen_idx);

    let Some(surface) = gbuffer.surface(screen_idx) else {
        return Default::default();
    };

    // -------------------------------------------------------------------------

    let candidates = &settings.initial_candidates;

    let mut sampler = CandidateSampler {
        scene,
        surface: &surface,
        settings: &settings.target_function,
        light_candidates: candidates.light_candidates as f32,
        bsdf_candidates: candidates.bsdf_candidates as f32,
        res: DiReservoir::default(),
    };

    for _ in 0..candidates.light_candidates {
        sampler.add_light_candidate(&mut wnoise);
    }

    for _ in 0..candidates.bsdf_candidates {
        sampler.add_bsdf_candidate(&mut wnoise);
    }

    let mut res = sampler.res;

    res.end();
    res.sanity_check(global_id);

    // ---

    if candidates.visibility_reuse {
        res.visibility_reuse(scene, &surface);
    }

    res
}

struct CandidateSampler<'a, S> {
    scene: &'a S,
    surface: &'a Surface,
    settings: &'a TargetFunctionSettings,
    light_candidates: f32,
    bsdf_candidates: f32,
    res: DiReservoir,
}

impl<S> CandidateSampler<'_, S>
where
    S: Scene,
{
    fn add_light_candidate(&mut self, wnoise: &mut WhiteNoise) {
        let Some(light) = self.scene.sample_light(wnoise) else {
            self.add_failed_candidate(wnoise);
            return;
        };

        let light_pdf = light.solid_angle_pdf(self.surface.point);

        if light_pdf <= 0.0 {
            self.add_failed_candidate(wnoise);
            return;
        }

        let sample = DiSample {
            light_id: light.light_id,
            flags: 0,
            light_point: light.point,
            target_function: 0.0,
        };

        let (dir, _) = sample.dir_and_distance(self.surface.point);
        let bsdf_pdf = self.scene.eval_bsdf(self.surface, dir).pdf;

        self.add_candidate(sample, light_pdf, bsdf_pdf, wnoise);
    }

    fn add_bsdf_candidate(&mut self, wnoise: &mut WhiteNoise) {
        let Some(bsdf) = self.scene.sample_bsdf(self.surface, wnoise) else {
            self.add_failed_candidate(wnoise);
            return;
        };

        let flags = if bsdf.is_refraction {
            DiSample::FLAG_BSDF_REFRACTION
        } else {
            0
        };

        let ray = Ray::new(self.surface.point, bsdf.dir);

        let (sample, light_pdf) = match self.scene.trace_light(ray) {
            Some(LightHit::Emitter(light)) => {
                let sample = DiSample {
                    light_id: light.light_id,
                    flags,
                    light_point: light.point,
                    target_function: 0.0,
                };

                (sample, light.solid_angle_pdf(self.surface.point))
            }

            // Environment is never picked by the light sampler, so there's no
            // light pdf to account for
            Some(LightHit::Envmap(_)) => {
                let sample = DiSample {
                    light_id: LightId::default(),
                    flags: flags | DiSample::FLAG_ENVMAP,
                    light_point: bsdf.dir,
                    target_function: 0.0,
                };

                (sample, 0.0)
            }

            None => {
                self.add_failed_candidate(wnoise);
                return;
            }
        };

        self.add_candidate(sample, light_pdf, bsdf.pdf, wnoise);
    }

    fn add_candidate(
        &mut self,
        mut sample: DiSample,
        light_pdf: f32,
        bsdf_pdf: f32,
        wnoise: &mut WhiteNoise,
    ) {
        sample.target_function = evaluate_target_function(
            self.scene,
            &sample,
            self.surface,
            self.settings,
            false,
        );

        // Balance heuristic over both strategies, folded into the source pdf
        let pdf =
            self.light_candidates * light_pdf + self.bsdf_candidates * bsdf_pdf;

        let weight = if pdf > 0.0 {
            sample.target_function / pdf
        } else {
            0.0
        };

        self.res.add_one_candidate(sample, weight, wnoise);
    }

    fn add_failed_candidate(&mut self, wnoise: &mut WhiteNoise) {
        self.res.add_one_candidate(DiSample::default(), 0.0, wnoise);
    }
}
