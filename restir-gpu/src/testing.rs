//! Deterministic, analytic scene used by tests: horizontal quad lights
//! facing down, sphere occluders, a constant environment map and a white
//! Lambertian BSDF.

use core::f32::consts::PI;

use glam::{uvec2, vec3, vec4, Mat4, UVec2, Vec3};

use crate::{
    BsdfEval, BsdfSample, Camera, GBufferEntry, LightHit, LightId, LightPoint,
    Material, Ray, Scene, Surface, WhiteNoise,
};

/// Square light lying in the XZ plane, emitting downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadLight {
    pub center: Vec3,
    pub half_size: f32,
    pub emission: Vec3,
}

impl QuadLight {
    pub const NORMAL: Vec3 = Vec3::NEG_Y;

    pub fn area(&self) -> f32 {
        4.0 * self.half_size * self.half_size
    }

    /// Returns distance along `ray` at which it hits this light, if it does.
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let dir = ray.direction();

        if dir.y == 0.0 {
            return None;
        }

        let t = (self.center.y - ray.origin().y) / dir.y;

        if t <= 0.0 || !t.is_finite() {
            return None;
        }

        let hit = ray.at(t);

        if (hit.x - self.center.x).abs() <= self.half_size
            && (hit.z - self.center.z).abs() <= self.half_size
        {
            Some(t)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt = discriminant.sqrt();

        [-b - sqrt, -b + sqrt].into_iter().find(|t| *t > 0.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TestScene {
    lights: Vec<QuadLight>,
    occluders: Vec<Sphere>,
    envmap: Vec3,
}

impl TestScene {
    /// Scene with a single 1x1 light hanging two units above the origin.
    pub fn single_light() -> Self {
        Self::default().with_light(vec3(0.0, 2.0, 0.0), 0.5, Vec3::splat(10.0))
    }

    pub fn with_light(
        mut self,
        center: Vec3,
        half_size: f32,
        emission: Vec3,
    ) -> Self {
        self.lights.push(QuadLight {
            center,
            half_size,
            emission,
        });

        self
    }

    pub fn with_occluder(mut self, center: Vec3, radius: f32) -> Self {
        self.occluders.push(Sphere { center, radius });
        self
    }

    pub fn with_envmap(mut self, radiance: Vec3) -> Self {
        self.envmap = radiance;
        self
    }

    pub fn lights(&self) -> &[QuadLight] {
        &self.lights
    }

    fn total_area(&self) -> f32 {
        self.lights.iter().map(|light| light.area()).sum()
    }

    fn light_point(&self, light_id: LightId, point: Vec3) -> LightPoint {
        let emission = self
            .lights
            .get(light_id.get() as usize)
            .map(|light| light.emission)
            .unwrap_or_default();

        LightPoint {
            light_id,
            point,
            normal: QuadLight::NORMAL,
            emission,
            pdf: 1.0 / self.total_area(),
        }
    }
}

impl Scene for TestScene {
    fn sample_light(&self, wnoise: &mut WhiteNoise) -> Option<LightPoint> {
        let mut target = wnoise.sample() * self.total_area();

        for (light_idx, light) in self.lights.iter().enumerate() {
            let is_last = light_idx + 1 == self.lights.len();

            if target < light.area() || is_last {
                let point = light.center
                    + vec3(
                        (wnoise.sample() * 2.0 - 1.0) * light.half_size,
                        0.0,
                        (wnoise.sample() * 2.0 - 1.0) * light.half_size,
                    );

                return Some(
                    self.light_point(LightId::new(light_idx as u32), point),
                );
            }

            target -= light.area();
        }

        None
    }

    fn light_at(&self, light_id: LightId, point: Vec3) -> LightPoint {
        self.light_point(light_id, point)
    }

    fn trace_light(&self, ray: Ray) -> Option<LightHit> {
        let closest_light = self
            .lights
            .iter()
            .enumerate()
            .filter_map(|(idx, light)| Some((idx, light.intersect(&ray)?)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b));

        let closest_occluder = self
            .occluders
            .iter()
            .filter_map(|occluder| occluder.intersect(&ray))
            .min_by(|a, b| a.total_cmp(b));

        match (closest_light, closest_occluder) {
            (Some((_, light_t)), Some(occluder_t)) if occluder_t < light_t => {
                None
            }

            (Some((light_idx, light_t)), _) => {
                // Lights only emit downwards
                if ray.direction().dot(QuadLight::NORMAL) >= 0.0 {
                    return None;
                }

                Some(LightHit::Emitter(self.light_point(
                    LightId::new(light_idx as u32),
                    ray.at(light_t),
                )))
            }

            (None, Some(_)) => None,

            (None, None) => {
                if self.envmap == Vec3::ZERO {
                    None
                } else {
                    Some(LightHit::Envmap(self.envmap))
                }
            }
        }
    }

    fn envmap_radiance(&self, _: Vec3) -> Vec3 {
        self.envmap
    }

    fn eval_bsdf(&self, surface: &Surface, dir: Vec3) -> BsdfEval {
        BsdfEval {
            color: surface.material.base_color / PI,
            pdf: surface.normal.dot(dir).max(0.0) / PI,
        }
    }

    fn sample_bsdf(
        &self,
        surface: &Surface,
        wnoise: &mut WhiteNoise,
    ) -> Option<BsdfSample> {
        let dir = wnoise.sample_hemisphere_cosine(surface.normal);
        let pdf = surface.normal.dot(dir) / PI;

        if pdf > 0.0 {
            Some(BsdfSample {
                dir,
                color: surface.material.base_color / PI,
                pdf,
                is_refraction: false,
            })
        } else {
            None
        }
    }

    fn is_occluded(&self, ray: Ray) -> bool {
        let blocks = |t: Option<f32>| t.map_or(false, |t| t < ray.len());

        self.occluders
            .iter()
            .any(|occluder| blocks(occluder.intersect(&ray)))
            || self.lights.iter().any(|light| blocks(light.intersect(&ray)))
    }
}

/// Builds a G-buffer of a floor lying at `y = 0`, with pixel `(x, y)` seeing
/// point `((x + 0.5) * spacing, 0, (y + 0.5) * spacing)`.
pub fn flat_gbuffer(size: UVec2, spacing: f32) -> Vec<GBufferEntry> {
    (0..size.y)
        .flat_map(|y| (0..size.x).map(move |x| uvec2(x, y)))
        .map(|pos| GBufferEntry {
            material: Material::default(),
            volume: Default::default(),
            view_dir: Vec3::Y,
            normal: Vec3::Y,
            first_hit: vec3(
                (pos.x as f32 + 0.5) * spacing,
                0.0,
                (pos.y as f32 + 0.5) * spacing,
            ),
        })
        .collect()
}

/// Builds an orthographic camera looking straight down at the floor built
/// by [`flat_gbuffer()`].
pub fn top_down_camera(size: UVec2, spacing: f32) -> Camera {
    let width = size.x as f32 * spacing;
    let height = size.y as f32 * spacing;

    let projection_view = Mat4::from_cols(
        vec4(2.0 / width, 0.0, 0.0, 0.0),
        vec4(0.0, 0.0, 0.0, 0.0),
        vec4(0.0, -2.0 / height, 0.0, 0.0),
        vec4(-1.0, 1.0, 0.0, 1.0),
    );

    Camera::new(projection_view, size)
}
