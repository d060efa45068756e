use derivative::Derivative;

/// Settings of the whole ReSTIR DI pipeline; set before a frame is
/// dispatched and read-only while its passes run.
#[derive(Clone, Copy, Debug, Derivative, PartialEq)]
#[derivative(Default)]
pub struct DiSettings {
    pub initial_candidates: InitialCandidatesSettings,
    pub temporal_pass: TemporalPassSettings,
    pub spatial_pass: SpatialPassSettings,
    pub target_function: TargetFunctionSettings,
    pub bias_correction: BiasCorrection,
    pub similarity: NeighborSimilarity,

    /// Upper bound for the confidence (`M`) of reused reservoirs; zero
    /// disables capping
    #[derivative(Default(value = "10"))]
    pub m_cap: u32,

    /// Reconnection shifts whose jacobian is above this value (or below its
    /// reciprocal) are rejected
    #[derivative(Default(value = "10.0"))]
    pub jacobian_rejection_threshold: f32,
}

impl DiSettings {
    /// Fixes values that would make the passes misbehave; returns a
    /// description of each adjustment made, so that the caller can report
    /// them.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if self.initial_candidates.light_candidates == 0
            && self.initial_candidates.bsdf_candidates == 0
        {
            self.initial_candidates.light_candidates = 1;

            warnings.push(
                "initial candidates: no candidates requested, using one light \
                 candidate",
            );
        }

        if self.spatial_pass.enabled && self.spatial_pass.number_of_passes == 0
        {
            self.spatial_pass.number_of_passes = 1;

            warnings.push("spatial pass: zero passes requested, using one");
        }

        if !(self.spatial_pass.reuse_radius >= 0.0) {
            self.spatial_pass.reuse_radius =
                SpatialPassSettings::default().reuse_radius;

            warnings.push("spatial pass: invalid reuse radius, using default");
        }

        if !(self.jacobian_rejection_threshold >= 1.0) {
            self.jacobian_rejection_threshold =
                Self::default().jacobian_rejection_threshold;

            warnings.push(
                "jacobian rejection threshold must be at least 1.0, using \
                 default",
            );
        }

        warnings
    }

    /// Returns whether the finally selected sample of the last spatial pass
    /// should be shadow-tested.
    ///
    /// Note that, as a single pass doesn't qualify, enabling visibility in
    /// bias correction alone doesn't trigger it.
    pub fn spatial_visibility_reuse(&self) -> bool {
        self.spatial_pass.visibility_reuse
            && self.target_function.visibility_in_bias_correction
            && self.spatial_pass.number_of_passes > 1
    }
}

#[derive(Clone, Copy, Debug, Derivative, PartialEq)]
#[derivative(Default)]
pub struct InitialCandidatesSettings {
    #[derivative(Default(value = "4"))]
    pub light_candidates: u32,

    #[derivative(Default(value = "1"))]
    pub bsdf_candidates: u32,

    /// Whether to shadow-test the retained sample at the end of the pass
    #[derivative(Default(value = "true"))]
    pub visibility_reuse: bool,
}

#[derive(Clone, Copy, Debug, Derivative, PartialEq)]
#[derivative(Default)]
pub struct TemporalPassSettings {
    #[derivative(Default(value = "true"))]
    pub enabled: bool,

    /// How many previous-frame pixels are tried in total: the reprojected one
    /// first, then random ones around it (the reprojected pixel is always
    /// tried, even when this is zero)
    #[derivative(Default(value = "8"))]
    pub max_neighbor_search_count: u32,

    /// In pixels
    #[derivative(Default(value = "8"))]
    pub neighbor_search_radius: u32,
}

#[derive(Clone, Copy, Debug, Derivative, PartialEq)]
#[derivative(Default)]
pub struct SpatialPassSettings {
    pub enabled: bool,

    #[derivative(Default(value = "1"))]
    pub number_of_passes: u32,

    /// In pixels
    #[derivative(Default(value = "20.0"))]
    pub reuse_radius: f32,

    #[derivative(Default(value = "3"))]
    pub neighbor_count: u32,

    /// Whether the neighbor pattern gets randomly rotated per pixel
    #[derivative(Default(value = "true"))]
    pub neighbor_rotation: bool,

    #[derivative(Default(value = "true"))]
    pub visibility_reuse: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TargetFunctionSettings {
    /// Whether the target function includes the `|cos_light| / d^2` term
    pub geometry_term: bool,

    /// Whether target functions evaluated when resampling neighbors include
    /// a shadow ray
    pub visibility_in_resampling: bool,

    /// Whether target functions evaluated for MIS weights and normalization
    /// include a shadow ray
    pub visibility_in_bias_correction: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BiasCorrection {
    /// Normalizes by the number of samples (`M`) of all reused reservoirs;
    /// biased when neighbors can't produce the selected sample
    OneOverM,

    /// Normalizes by `M` of only those reservoirs which could have produced
    /// the selected sample
    OneOverZ,

    /// Normalizes by the selected neighbor's target function over the sum of
    /// target functions of all neighbors
    #[default]
    MisLike,

    /// [`Self::MisLike`], with each neighbor weighted by its `M`
    MisLikeConfidence,

    /// Generalized balance heuristic
    Gbh,

    /// [`Self::Gbh`], with each neighbor weighted by its `M`
    GbhConfidence,
}

impl BiasCorrection {
    pub const ALL: [Self; 6] = [
        Self::OneOverM,
        Self::OneOverZ,
        Self::MisLike,
        Self::MisLikeConfidence,
        Self::Gbh,
        Self::GbhConfidence,
    ];

    /// Returns whether this mode weights reservoirs using the generalized
    /// balance heuristic.
    pub fn is_gbh(self) -> bool {
        matches!(self, Self::Gbh | Self::GbhConfidence)
    }
}

#[derive(Clone, Copy, Debug, Derivative, PartialEq)]
#[derivative(Default)]
pub struct NeighborSimilarity {
    #[derivative(Default(value = "true"))]
    pub use_plane_distance: bool,

    #[derivative(Default(value = "true"))]
    pub use_normal: bool,

    #[derivative(Default(value = "true"))]
    pub use_roughness: bool,

    /// Maximum distance between the neighbor's shading point and the
    /// center's tangent plane
    #[derivative(Default(value = "0.1"))]
    pub plane_distance_threshold: f32,

    /// Kept in sync with [`Self::normal_angle_cos`] by
    /// [`Self::set_normal_angle()`]
    #[derivative(Default(value = "25.0"))]
    pub normal_angle_degrees: f32,

    #[derivative(Default(value = "0.906_307_8"))]
    pub normal_angle_cos: f32,

    #[derivative(Default(value = "0.25"))]
    pub roughness_threshold: f32,
}

impl NeighborSimilarity {
    pub fn set_normal_angle(&mut self, degrees: f32) {
        self.normal_angle_degrees = degrees;
        self.normal_angle_cos = degrees.to_radians().cos();
    }
}
