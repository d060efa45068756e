use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct LightId(u32);

impl LightId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A point on an emissive primitive, as returned by the scene's light
/// sampler.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LightPoint {
    pub light_id: LightId,
    pub point: Vec3,
    pub normal: Vec3,
    pub emission: Vec3,

    /// Probability density (in area measure) of the light sampler picking
    /// this point
    pub pdf: f32,
}

impl LightPoint {
    /// Converts this point's area-measure density into solid-angle measure,
    /// as seen from `origin`.
    ///
    /// Returns zero when the light faces away, or when `origin` lies on the
    /// light itself.
    pub fn solid_angle_pdf(&self, origin: Vec3) -> f32 {
        let to_light = self.point - origin;
        let distance_squared = to_light.length_squared();

        if distance_squared == 0.0 {
            return 0.0;
        }

        let cos_at_light = self.normal.dot(-to_light).abs()
            / distance_squared.sqrt();

        if cos_at_light <= 0.0 {
            0.0
        } else {
            self.pdf * distance_squared / cos_at_light
        }
    }
}

/// What a BSDF-sampled ray, extended from a shading point, has found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightHit {
    /// The ray hit an emissive primitive
    Emitter(LightPoint),

    /// The ray escaped the scene; contains the environment's radiance
    /// along the ray
    Envmap(Vec3),
}
