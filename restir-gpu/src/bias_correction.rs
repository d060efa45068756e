use crate::{
    evaluate_target_function, BiasCorrection, DiReservoir, DiSample,
    DiSettings, GBufferView, Scene, SpatialNeighbors, Surface,
};

/// Everything a bias-correction strategy can look at while the spatial pass
/// resamples pixels around `center`.
pub struct SpatialNeighborhood<'a, S> {
    pub scene: &'a S,
    pub settings: &'a DiSettings,
    pub gbuffer: GBufferView<'a>,
    pub reservoirs: &'a [DiReservoir],
    pub neighbors: SpatialNeighbors,
    pub center: Surface,
}

impl<'a, S> SpatialNeighborhood<'a, S>
where
    S: Scene,
{
    /// Returns the buffer index of `nth` neighbor, provided it lies inside
    /// of the viewport.
    pub fn position(&self, nth: u32) -> Option<usize> {
        self.neighbors.get(nth)
    }

    /// Returns the buffer index and surface of `nth` neighbor, provided it
    /// lies inside of the viewport and is similar to the center pixel.
    pub fn eligible(&self, nth: u32) -> Option<(usize, Surface)> {
        let idx = self.position(nth)?;

        if self.neighbors.is_center(nth) {
            return Some((idx, self.center));
        }

        let surface = self.gbuffer.surface(idx)?;

        if self
            .center
            .is_similar_to(&surface, &self.settings.similarity)
        {
            Some((idx, surface))
        } else {
            None
        }
    }

    pub fn reservoir(&self, idx: usize) -> DiReservoir {
        self.reservoirs.get(idx).copied().unwrap_or_default()
    }

    /// Evaluates target function the way bias-correction terms need it,
    /// i.e. including visibility when configured so.
    pub fn bias_correction_target_function(
        &self,
        sample: &DiSample,
        surface: &Surface,
    ) -> f32 {
        let settings = &self.settings.target_function;

        evaluate_target_function(
            self.scene,
            sample,
            surface,
            settings,
            settings.visibility_in_bias_correction,
        )
    }

    /// Evaluates target function the way resampling needs it.
    pub fn resampling_target_function(
        &self,
        sample: &DiSample,
        surface: &Surface,
    ) -> f32 {
        let settings = &self.settings.target_function;

        evaluate_target_function(
            self.scene,
            sample,
            surface,
            settings,
            settings.visibility_in_resampling,
        )
    }

    /// Calls `f` for each eligible neighbor (including the center) and sums
    /// up what it returns.
    fn sum(&self, mut f: impl FnMut(u32, &Surface, &DiReservoir) -> f32) -> f32 {
        let mut sum = 0.0;

        for nth in 0..self.neighbors.len() {
            if let Some((idx, surface)) = self.eligible(nth) {
                sum += f(nth, &surface, &self.reservoir(idx));
            }
        }

        sum
    }

    /// Generalized balance heuristic weight of `nth` neighbor's sample.
    fn gbh(&self, nth: u32, neighbor: &DiReservoir, confidence: bool) -> f32 {
        let mut numerator = 0.0;

        let denominator = self.sum(|other, surface, reservoir| {
            let mut term =
                self.bias_correction_target_function(&neighbor.sample, surface);

            if confidence {
                term *= reservoir.m as f32;
            }

            if other == nth {
                numerator = term;
            }

            term
        });

        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }

    /// Sum of targets of `sample` over all eligible neighbors together with
    /// the target at the `selected` one.
    fn mis_like(
        &self,
        sample: &DiSample,
        selected: Option<u32>,
        confidence: bool,
    ) -> (f32, f32) {
        let mut numerator = 0.0;

        let denominator = self.sum(|nth, surface, reservoir| {
            let target = self.bias_correction_target_function(sample, surface);

            if Some(nth) == selected {
                numerator = target;
            }

            if confidence {
                target * reservoir.m as f32
            } else {
                target
            }
        });

        (numerator, denominator)
    }
}

/// Strategy of weighting reservoirs reused by the spatial pass.
///
/// Implemented by zero-sized types so that the pass gets monomorphized per
/// strategy; see [`BiasCorrection`] for the runtime counterpart.
pub trait BiasCorrectionWeights {
    const MODE: BiasCorrection;

    /// Returns the MIS weight `nth` neighbor gets resampled with.
    fn resampling_mis_weight<S>(
        hood: &SpatialNeighborhood<'_, S>,
        nth: u32,
        neighbor: &DiReservoir,
    ) -> f32
    where
        S: Scene;

    /// Returns `(numerator, denominator)` of the factor the finished
    /// reservoir gets normalized with.
    fn normalization<S>(
        hood: &SpatialNeighborhood<'_, S>,
        reservoir: &DiReservoir,
        selected: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OneOverMWeights;

impl BiasCorrectionWeights for OneOverMWeights {
    const MODE: BiasCorrection = BiasCorrection::OneOverM;

    fn resampling_mis_weight<S>(
        _: &SpatialNeighborhood<'_, S>,
        _: u32,
        neighbor: &DiReservoir,
    ) -> f32
    where
        S: Scene,
    {
        neighbor.m as f32
    }

    fn normalization<S>(
        hood: &SpatialNeighborhood<'_, S>,
        reservoir: &DiReservoir,
        _: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene,
    {
        if reservoir.weight_sum <= 0.0 {
            return (1.0, 1.0);
        }

        (1.0, hood.sum(|_, _, neighbor| neighbor.m as f32))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OneOverZWeights;

impl BiasCorrectionWeights for OneOverZWeights {
    const MODE: BiasCorrection = BiasCorrection::OneOverZ;

    fn resampling_mis_weight<S>(
        _: &SpatialNeighborhood<'_, S>,
        _: u32,
        neighbor: &DiReservoir,
    ) -> f32
    where
        S: Scene,
    {
        neighbor.m as f32
    }

    fn normalization<S>(
        hood: &SpatialNeighborhood<'_, S>,
        reservoir: &DiReservoir,
        _: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene,
    {
        if reservoir.weight_sum <= 0.0 {
            return (1.0, 1.0);
        }

        let denominator = hood.sum(|_, surface, neighbor| {
            let target = hood
                .bias_correction_target_function(&reservoir.sample, surface);

            if target > 0.0 {
                neighbor.m as f32
            } else {
                0.0
            }
        });

        (1.0, denominator)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MisLikeWeights;

impl BiasCorrectionWeights for MisLikeWeights {
    const MODE: BiasCorrection = BiasCorrection::MisLike;

    fn resampling_mis_weight<S>(
        _: &SpatialNeighborhood<'_, S>,
        _: u32,
        _: &DiReservoir,
    ) -> f32
    where
        S: Scene,
    {
        1.0
    }

    fn normalization<S>(
        hood: &SpatialNeighborhood<'_, S>,
        reservoir: &DiReservoir,
        selected: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene,
    {
        if reservoir.weight_sum <= 0.0 {
            return (1.0, 1.0);
        }

        hood.mis_like(&reservoir.sample, selected, false)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MisLikeConfidenceWeights;

impl BiasCorrectionWeights for MisLikeConfidenceWeights {
    const MODE: BiasCorrection = BiasCorrection::MisLikeConfidence;

    fn resampling_mis_weight<S>(
        _: &SpatialNeighborhood<'_, S>,
        _: u32,
        neighbor: &DiReservoir,
    ) -> f32
    where
        S: Scene,
    {
        neighbor.m as f32
    }

    fn normalization<S>(
        hood: &SpatialNeighborhood<'_, S>,
        reservoir: &DiReservoir,
        selected: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene,
    {
        if reservoir.weight_sum <= 0.0 {
            return (1.0, 1.0);
        }

        hood.mis_like(&reservoir.sample, selected, true)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GbhWeights;

impl BiasCorrectionWeights for GbhWeights {
    const MODE: BiasCorrection = BiasCorrection::Gbh;

    fn resampling_mis_weight<S>(
        hood: &SpatialNeighborhood<'_, S>,
        nth: u32,
        neighbor: &DiReservoir,
    ) -> f32
    where
        S: Scene,
    {
        hood.gbh(nth, neighbor, false)
    }

    fn normalization<S>(
        _: &SpatialNeighborhood<'_, S>,
        _: &DiReservoir,
        _: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene,
    {
        (1.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GbhConfidenceWeights;

impl BiasCorrectionWeights for GbhConfidenceWeights {
    const MODE: BiasCorrection = BiasCorrection::GbhConfidence;

    fn resampling_mis_weight<S>(
        hood: &SpatialNeighborhood<'_, S>,
        nth: u32,
        neighbor: &DiReservoir,
    ) -> f32
    where
        S: Scene,
    {
        hood.gbh(nth, neighbor, true)
    }

    fn normalization<S>(
        _: &SpatialNeighborhood<'_, S>,
        _: &DiReservoir,
        _: Option<u32>,
    ) -> (f32, f32)
    where
        S: Scene,
    {
        (1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, UVec2, Vec3};

    use super::*;
    use crate::{testing, testing::TestScene, GBufferEntry, LightId, WhiteNoise};

    const SIZE: UVec2 = UVec2::new(64, 64);
    const CENTER: UVec2 = UVec2::new(32, 32);

    struct Fixture {
        scene: TestScene,
        settings: DiSettings,
        entries: Vec<GBufferEntry>,
        reservoirs: Vec<DiReservoir>,
        neighbors: SpatialNeighbors,
    }

    impl Fixture {
        /// Three neighbors plus the center, with confidences 7, 11 and 13 and
        /// 5 respectively; neighbors 1 and 2 face away from the light.
        fn new() -> Self {
            let scene = TestScene::default().with_light(
                vec3(32.5, 4.0, 32.5),
                1.0,
                Vec3::splat(5.0),
            );

            let mut settings = DiSettings::default();

            settings.spatial_pass.neighbor_count = 3;
            settings.spatial_pass.reuse_radius = 8.0;
            settings.spatial_pass.neighbor_rotation = false;
            settings.similarity.use_normal = false;
            settings.similarity.use_plane_distance = false;
            settings.similarity.use_roughness = false;

            let camera = testing::top_down_camera(SIZE, 1.0);

            let neighbors = SpatialNeighbors::new(
                camera,
                CENTER,
                &settings.spatial_pass,
                &mut WhiteNoise::new(1),
            );

            let mut entries = testing::flat_gbuffer(SIZE, 1.0);
            let mut reservoirs = vec![DiReservoir::default(); entries.len()];

            for (nth, m) in [(0, 7), (1, 11), (2, 13), (3, 5)] {
                let idx = neighbors.get(nth).unwrap();

                reservoirs[idx].m = m;

                if nth == 1 || nth == 2 {
                    entries[idx].normal = -Vec3::Y;
                }
            }

            Self {
                scene,
                settings,
                entries,
                reservoirs,
                neighbors,
            }
        }

        fn hood(&self) -> SpatialNeighborhood<'_, TestScene> {
            let gbuffer = GBufferView::new(&self.entries);

            SpatialNeighborhood {
                scene: &self.scene,
                settings: &self.settings,
                gbuffer,
                reservoirs: &self.reservoirs,
                neighbors: self.neighbors,
                center: gbuffer
                    .surface(self.neighbors.get(3).unwrap())
                    .unwrap(),
            }
        }

        fn reservoir(&self) -> DiReservoir {
            DiReservoir {
                sample: DiSample {
                    light_id: LightId::new(0),
                    flags: 0,
                    light_point: vec3(32.5, 4.0, 32.5),
                    target_function: 1.0,
                },
                m: 36,
                weight_sum: 2.0,
                ucw: 0.0,
            }
        }
    }

    #[test]
    fn neighbors_are_distinct() {
        let fixture = Fixture::new();

        let mut indices: Vec<_> =
            (0..4).map(|nth| fixture.neighbors.get(nth).unwrap()).collect();

        indices.sort();
        indices.dedup();

        assert_eq!(4, indices.len());
    }

    #[test]
    fn one_over_m() {
        let fixture = Fixture::new();
        let hood = fixture.hood();

        assert_eq!(
            (1.0, 36.0),
            OneOverMWeights::normalization(&hood, &fixture.reservoir(), Some(3))
        );

        assert_eq!(
            7.0,
            OneOverMWeights::resampling_mis_weight(
                &hood,
                0,
                &fixture.reservoirs[fixture.neighbors.get(0).unwrap()]
            )
        );
    }

    #[test]
    fn one_over_z() {
        let fixture = Fixture::new();
        let hood = fixture.hood();

        // Only the center and the first neighbor could have produced the
        // sample
        assert_eq!(
            (1.0, 12.0),
            OneOverZWeights::normalization(&hood, &fixture.reservoir(), Some(3))
        );
    }

    #[test]
    fn empty_reservoir_is_not_normalized() {
        let fixture = Fixture::new();
        let hood = fixture.hood();
        let reservoir = DiReservoir::default();

        assert_eq!(
            (1.0, 1.0),
            OneOverZWeights::normalization(&hood, &reservoir, None)
        );

        assert_eq!(
            (1.0, 1.0),
            MisLikeWeights::normalization(&hood, &reservoir, None)
        );
    }

    #[test]
    fn mis_like() {
        let fixture = Fixture::new();
        let hood = fixture.hood();
        let reservoir = fixture.reservoir();

        let (num, denom) =
            MisLikeWeights::normalization(&hood, &reservoir, Some(3));

        // Light lies right above the center, so it's the brightest one
        assert!(num > 0.0);
        assert!(num / denom > 0.5);
        assert!(num / denom < 1.0);

        let (num, _) = MisLikeWeights::normalization(&hood, &reservoir, Some(1));

        assert_eq!(0.0, num);
    }

    #[test]
    fn mis_like_confidence() {
        let fixture = Fixture::new();
        let hood = fixture.hood();
        let reservoir = fixture.reservoir();

        let (num, denom) =
            MisLikeWeights::normalization(&hood, &reservoir, Some(0));

        let (num_c, denom_c) =
            MisLikeConfidenceWeights::normalization(&hood, &reservoir, Some(0));

        assert_relative_eq!(num, num_c);

        let center_target = hood.bias_correction_target_function(
            &reservoir.sample,
            &hood.center,
        );

        // denom = t0 + tc, denom_c = 7 * t0 + 5 * tc
        assert_relative_eq!(
            denom_c,
            7.0 * num + 5.0 * center_target,
            epsilon = 0.0001
        );

        assert_relative_eq!(denom, num + center_target, epsilon = 0.0001);
    }

    #[test]
    fn gbh_weights_sum_up_to_one() {
        let fixture = Fixture::new();
        let hood = fixture.hood();
        let reservoir = fixture.reservoir();

        for confidence in [false, true] {
            let total: f32 = (0..4)
                .map(|nth| {
                    if confidence {
                        GbhConfidenceWeights::resampling_mis_weight(
                            &hood, nth, &reservoir,
                        )
                    } else {
                        GbhWeights::resampling_mis_weight(&hood, nth, &reservoir)
                    }
                })
                .sum();

            assert_relative_eq!(1.0, total, epsilon = 0.0001);
        }

        assert_eq!(
            0.0,
            GbhWeights::resampling_mis_weight(&hood, 1, &reservoir)
        );

        assert_eq!(
            (1.0, 1.0),
            GbhWeights::normalization(&hood, &reservoir, Some(0))
        );
    }

    #[test]
    fn modes() {
        assert_eq!(BiasCorrection::OneOverM, OneOverMWeights::MODE);
        assert_eq!(BiasCorrection::GbhConfidence, GbhConfidenceWeights::MODE);
        assert!(GbhWeights::MODE.is_gbh());
        assert!(!MisLikeWeights::MODE.is_gbh());
    }
}
