use glam::Vec3;

use crate::{LightHit, LightId, LightPoint, Ray, Surface, WhiteNoise};

/// Result of evaluating a BSDF for a pair of directions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BsdfEval {
    /// BSDF value, already multiplied by the base color
    pub color: Vec3,

    /// Probability density (in solid angle) of the BSDF sampler generating
    /// the evaluated direction
    pub pdf: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BsdfSample {
    pub dir: Vec3,
    pub color: Vec3,
    pub pdf: f32,

    /// Whether the sampled direction goes through the surface
    pub is_refraction: bool,
}

/// Everything the resampling passes need from the rest of the renderer: the
/// light sampler, the BSDF library, the ray tracer and the environment map.
///
/// Implementations must be callable from many pixels at once.
pub trait Scene: Sync {
    /// Picks a random point on a random emissive primitive; returns `None`
    /// when the scene has no lights.
    fn sample_light(&self, wnoise: &mut WhiteNoise) -> Option<LightPoint>;

    /// Returns the light point for a previously sampled `point` of given
    /// light, including its area-measure pdf.
    fn light_at(&self, light_id: LightId, point: Vec3) -> LightPoint;

    /// Follows `ray` to the closest surface; returns it if that surface is an
    /// emitter, or the environment radiance if the ray escapes the scene.
    fn trace_light(&self, ray: Ray) -> Option<LightHit>;

    /// Returns radiance coming from the environment along given direction.
    fn envmap_radiance(&self, dir: Vec3) -> Vec3 {
        let _ = dir;

        Vec3::ZERO
    }

    fn eval_bsdf(&self, surface: &Surface, dir: Vec3) -> BsdfEval;

    fn sample_bsdf(
        &self,
        surface: &Surface,
        wnoise: &mut WhiteNoise,
    ) -> Option<BsdfSample>;

    /// Returns whether anything blocks `ray` before it reaches its length.
    fn is_occluded(&self, ray: Ray) -> bool;
}
