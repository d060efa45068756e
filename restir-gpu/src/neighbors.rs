use core::f32::consts::PI;

use glam::{ivec2, vec2, IVec2, UVec2, Vec2};

use crate::{
    hammersley, rotate, square_to_disk, Camera, GBufferView,
    NeighborSimilarity, SpatialPassSettings, Surface, TemporalPassSettings,
    WhiteNoise,
};

/// Neighborhood of a pixel visited by the spatial pass.
///
/// Neighbors are laid out on a Hammersley disk (optionally rotated by a
/// per-pixel random angle); the center pixel itself is always the last one.
#[derive(Clone, Copy, Debug)]
pub struct SpatialNeighbors {
    camera: Camera,
    center: UVec2,
    count: u32,
    radius: f32,

    /// `(cos, sin)` of the rotation angle
    rotation: Vec2,
}

impl SpatialNeighbors {
    pub fn new(
        camera: Camera,
        center: UVec2,
        settings: &SpatialPassSettings,
        wnoise: &mut WhiteNoise,
    ) -> Self {
        let rotation = if settings.neighbor_rotation {
            let angle = 2.0 * PI * wnoise.sample();

            vec2(angle.cos(), angle.sin())
        } else {
            vec2(1.0, 0.0)
        };

        Self {
            camera,
            center,
            count: settings.neighbor_count,
            radius: settings.reuse_radius,
            rotation,
        }
    }

    /// Returns the number of visited pixels, including the center.
    pub fn len(&self) -> u32 {
        self.count + 1
    }

    pub fn is_center(&self, nth: u32) -> bool {
        nth == self.count
    }

    /// Returns the screen-position of `nth` neighbor; might lie outside of
    /// the viewport.
    pub fn position(&self, nth: u32) -> IVec2 {
        if self.is_center(nth) {
            return self.center.as_ivec2();
        }

        let offset = rotate(
            square_to_disk(hammersley(nth, self.count), self.radius),
            self.rotation,
        );

        let pos = (self.center.as_vec2() + offset).round();

        ivec2(pos.x as i32, pos.y as i32)
    }

    /// Returns the buffer index of `nth` neighbor, or `None` if it lies
    /// outside of the viewport.
    pub fn get(&self, nth: u32) -> Option<usize> {
        let pos = self.position(nth);

        if self.camera.contains(pos) {
            Some(self.camera.screen_to_idx(pos.as_uvec2()))
        } else {
            None
        }
    }
}

/// Previous-frame pixel whose reservoir can be reused by the temporal pass.
#[derive(Clone, Copy, Debug)]
pub struct TemporalNeighbor {
    pub idx: usize,
    pub surface: Surface,
}

/// Looks for a previous-frame pixel similar to `surface`: tries the pixel
/// `surface` reprojects onto first, and then random pixels around it, up to
/// `max_neighbor_search_count` attempts in total.
///
/// Returns `None` if the surface wasn't visible in the previous frame or if
/// no candidate is similar enough.
pub fn find_temporal_neighbor(
    prev_camera: &Camera,
    prev_gbuffer: GBufferView,
    surface: &Surface,
    similarity: &NeighborSimilarity,
    settings: &TemporalPassSettings,
    wnoise: &mut WhiteNoise,
) -> Option<TemporalNeighbor> {
    let reprojected = prev_camera.project(surface.point)?;
    let radius = settings.neighbor_search_radius as f32;

    let try_pixel = |pos: IVec2| -> Option<TemporalNeighbor> {
        if !prev_camera.contains(pos) {
            return None;
        }

        let idx = prev_camera.screen_to_idx(pos.as_uvec2());
        let prev_surface = prev_gbuffer.surface(idx)?;

        if surface.is_similar_to(&prev_surface, similarity) {
            Some(TemporalNeighbor {
                idx,
                surface: prev_surface,
            })
        } else {
            None
        }
    };

    if let Some(neighbor) = try_pixel(reprojected) {
        return Some(neighbor);
    }

    for _ in 1..settings.max_neighbor_search_count {
        let offset = vec2(
            (wnoise.sample() * 2.0 - 1.0) * radius,
            (wnoise.sample() * 2.0 - 1.0) * radius,
        );

        // Float-to-int casts saturate, so huge radii land outside of the
        // viewport instead of overflowing
        let pos = (reprojected.as_vec2() + offset).round();
        let pos = ivec2(pos.x as i32, pos.y as i32);

        if let Some(neighbor) = try_pixel(pos) {
            return Some(neighbor);
        }
    }

    None
}
