use glam::Vec3;

use crate::{Material, RayVolumeState, Surface, SHADING_POINT_OFFSET};

/// Primary hit of a single pixel, as written by the G-buffer pass.
///
/// An entry with zero normal means the primary ray has missed the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GBufferEntry {
    pub material: Material,
    pub volume: RayVolumeState,
    pub view_dir: Vec3,
    pub normal: Vec3,
    pub first_hit: Vec3,
}

impl GBufferEntry {
    pub fn is_some(&self) -> bool {
        self.normal != Vec3::ZERO
    }

    pub fn surface(&self) -> Option<Surface> {
        if !self.is_some() {
            return None;
        }

        Some(Surface {
            material: self.material,
            volume: self.volume,
            view_dir: self.view_dir,
            normal: self.normal,
            point: self.first_hit + self.normal * SHADING_POINT_OFFSET,
        })
    }
}

/// Read-only view of a whole-frame G-buffer, indexed the same way as the
/// reservoir buffers (`x + y * width`).
#[derive(Clone, Copy, Debug)]
pub struct GBufferView<'a> {
    entries: &'a [GBufferEntry],
}

impl<'a> GBufferView<'a> {
    pub fn new(entries: &'a [GBufferEntry]) -> Self {
        Self { entries }
    }

    /// Returns surface visible through given pixel, or `None` if the pixel
    /// lies outside the buffer or its primary ray has missed.
    pub fn surface(&self, idx: usize) -> Option<Surface> {
        self.entries.get(idx)?.surface()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;

    use super::*;

    #[test]
    fn surface() {
        let entries = [
            GBufferEntry {
                normal: Vec3::Y,
                first_hit: vec3(1.0, 2.0, 3.0),
                view_dir: Vec3::Y,
                ..Default::default()
            },
            GBufferEntry::default(),
        ];

        let gbuffer = GBufferView::new(&entries);
        let surface = gbuffer.surface(0).unwrap();

        assert_relative_eq!(2.0 + SHADING_POINT_OFFSET, surface.point.y);
        assert_eq!(Vec3::Y, surface.normal);

        assert!(gbuffer.surface(1).is_none());
        assert!(gbuffer.surface(2).is_none());
    }
}
