use glam::Vec3;

use crate::NeighborSimilarity;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub base_color: Vec3,
    pub emission: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub specular_transmission: f32,
    pub ior: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec3::ONE,
            emission: Vec3::ZERO,
            metallic: 0.0,
            roughness: 0.5,
            specular_transmission: 0.0,
            ior: 1.0,
        }
    }
}

/// Stack of nested dielectrics the primary ray is currently inside of.
///
/// The core never interprets it, it's carried along with the surface so that
/// the BSDF (evaluated by [`crate::Scene`]) can pick the correct relative
/// index of refraction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RayVolumeState {
    /// Material ids of the volumes, outermost first
    pub stack: [u32; RayVolumeState::MAX_DEPTH],

    /// Number of valid entries in `stack`
    pub depth: u32,
}

impl RayVolumeState {
    pub const MAX_DEPTH: usize = 8;
}

/// Everything the resampling passes need to know about the primary hit of a
/// pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Surface {
    pub material: Material,
    pub volume: RayVolumeState,

    /// Direction from the surface towards the camera
    pub view_dir: Vec3,

    /// Shading normal
    pub normal: Vec3,

    /// Hit point, already offset along the normal
    pub point: Vec3,
}

impl Surface {
    /// Returns whether `neighbor` is similar enough to this surface for its
    /// reservoir to be reused here.
    pub fn is_similar_to(
        &self,
        neighbor: &Surface,
        similarity: &NeighborSimilarity,
    ) -> bool {
        if similarity.use_plane_distance {
            let plane_distance =
                (neighbor.point - self.point).dot(self.normal).abs();

            if plane_distance >= similarity.plane_distance_threshold {
                return false;
            }
        }

        if similarity.use_normal
            && self.normal.dot(neighbor.normal) < similarity.normal_angle_cos
        {
            return false;
        }

        if similarity.use_roughness {
            let roughness_diff =
                (neighbor.material.roughness - self.material.roughness).abs();

            if roughness_diff >= similarity.roughness_threshold {
                return false;
            }
        }

        true
    }
}
