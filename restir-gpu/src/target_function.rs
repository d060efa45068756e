use glam::Vec3;

use crate::{DiSample, F32Ext, Scene, Surface, TargetFunctionSettings, Vec3Ext};

/// Evaluates the (unnormalized) target function of `sample` as seen from
/// `surface`, i.e. the luminance of light it would contribute there.
///
/// When `visibility` is set, a shadow ray is traced and occluded samples
/// evaluate to zero.
pub fn evaluate_target_function(
    scene: &impl Scene,
    sample: &DiSample,
    surface: &Surface,
    settings: &TargetFunctionSettings,
    visibility: bool,
) -> f32 {
    let (dir, distance) = sample.dir_and_distance(surface.point);

    if dir == Vec3::ZERO {
        return 0.0;
    }

    let mut cos_theta = surface.normal.dot(dir);

    if sample.is_refraction() {
        cos_theta = cos_theta.abs();
    }

    if cos_theta <= 0.0 {
        return 0.0;
    }

    let (emission, geometry) = if sample.is_envmap() {
        (scene.envmap_radiance(dir), 1.0)
    } else {
        let light = scene.light_at(sample.light_id, sample.light_point);

        let geometry = if settings.geometry_term {
            light.normal.dot(-dir).abs() / distance.sqr()
        } else {
            1.0
        };

        (light.emission, geometry)
    };

    let bsdf = scene.eval_bsdf(surface, dir);
    let target_function = (bsdf.color * emission * cos_theta).luma() * geometry;

    if !(target_function.is_finite() && target_function > 0.0) {
        return 0.0;
    }

    if visibility && sample.is_occluded(scene, surface.point) {
        return 0.0;
    }

    target_function
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;
    use crate::{testing::TestScene, LightId, Material};

    fn surface() -> Surface {
        Surface {
            material: Material {
                base_color: Vec3::ONE,
                ..Default::default()
            },
            view_dir: Vec3::Y,
            normal: Vec3::Y,
            point: Vec3::ZERO,
            ..Default::default()
        }
    }

    fn sample(scene: &TestScene) -> DiSample {
        DiSample {
            light_id: LightId::new(0),
            flags: 0,
            light_point: scene.lights()[0].center,
            target_function: 0.0,
        }
    }

    #[test]
    fn lambertian() {
        let scene = TestScene::single_light();
        let sample = sample(&scene);
        let settings = TargetFunctionSettings::default();

        // Light straight above; white Lambertian BSDF is 1/pi, emission is
        // white with given strength
        let expected = scene.lights()[0].emission.luma() / PI;

        assert_relative_eq!(
            expected,
            evaluate_target_function(&scene, &sample, &surface(), &settings, false),
            epsilon = 0.0001
        );
    }

    #[test]
    fn geometry_term() {
        let scene = TestScene::single_light();
        let sample = sample(&scene);

        let settings = TargetFunctionSettings {
            geometry_term: true,
            ..Default::default()
        };

        let without = evaluate_target_function(
            &scene,
            &sample,
            &surface(),
            &TargetFunctionSettings::default(),
            false,
        );

        let with =
            evaluate_target_function(&scene, &sample, &surface(), &settings, false);

        let distance = scene.lights()[0].center.length();

        assert_relative_eq!(without / (distance * distance), with, epsilon = 0.0001);
    }

    #[test]
    fn backfacing() {
        let scene = TestScene::single_light();
        let mut sample = sample(&scene);
        let settings = TargetFunctionSettings::default();

        let surface = Surface {
            normal: -Vec3::Y,
            ..surface()
        };

        assert_eq!(
            0.0,
            evaluate_target_function(&scene, &sample, &surface, &settings, false)
        );

        // Refracted samples light the surface from behind
        sample.flags |= DiSample::FLAG_BSDF_REFRACTION;

        assert!(
            evaluate_target_function(&scene, &sample, &surface, &settings, false)
                > 0.0
        );
    }

    #[test]
    fn visibility() {
        let scene =
            TestScene::single_light().with_occluder(vec3(0.0, 1.0, 0.0), 0.25);

        let sample = sample(&scene);
        let settings = TargetFunctionSettings::default();

        assert!(
            evaluate_target_function(&scene, &sample, &surface(), &settings, false)
                > 0.0
        );

        assert_eq!(
            0.0,
            evaluate_target_function(&scene, &sample, &surface(), &settings, true)
        );
    }

    #[test]
    fn envmap() {
        let scene = TestScene::default().with_envmap(Vec3::splat(2.0));
        let settings = TargetFunctionSettings::default();

        let sample = DiSample {
            light_id: LightId::default(),
            flags: DiSample::FLAG_ENVMAP,
            light_point: Vec3::Y,
            target_function: 0.0,
        };

        assert_relative_eq!(
            2.0 / PI,
            evaluate_target_function(&scene, &sample, &surface(), &settings, false),
            epsilon = 0.0001
        );
    }
}
