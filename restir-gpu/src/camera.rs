use bytemuck::{Pod, Zeroable};
use glam::{vec2, vec4, IVec2, Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Camera {
    pub projection_view: Mat4,

    /// x - viewport's width
    /// y - viewport's height
    /// z, w - unused
    pub screen: Vec4,
}

impl Camera {
    pub fn new(projection_view: Mat4, screen_size: UVec2) -> Self {
        let screen_size = screen_size.as_vec2();

        Self {
            projection_view,
            screen: vec4(screen_size.x, screen_size.y, 0.0, 0.0),
        }
    }

    /// Given a point in world-coordinates, returns it in clip-coordinates.
    pub fn world_to_clip(&self, pos: Vec3) -> Vec4 {
        self.projection_view * pos.extend(1.0)
    }

    /// Given a point in clip-coordinates, returns it in screen-coordinates.
    pub fn clip_to_screen(&self, pos: Vec4) -> Vec2 {
        let ndc = pos.xy() / pos.w;
        let ndc = vec2(ndc.x, -ndc.y);

        (0.5 * ndc + 0.5) * self.screen.xy()
    }

    /// Projects a point in world-coordinates onto a pixel of this camera;
    /// returns `None` if the point lies behind the camera or falls outside
    /// of the viewport.
    pub fn project(&self, pos: Vec3) -> Option<IVec2> {
        let clip = self.world_to_clip(pos);

        if clip.w <= 0.0 {
            return None;
        }

        let screen = self.clip_to_screen(clip);

        if !screen.is_finite() {
            return None;
        }

        let screen = screen.floor().as_ivec2();

        if self.contains(screen) {
            Some(screen)
        } else {
            None
        }
    }

    /// Given a point in screen-coordinates, returns a unique index for it; used
    /// to index screen-space structures.
    pub fn screen_to_idx(&self, pos: UVec2) -> usize {
        (pos.y * (self.screen.x as u32) + pos.x) as usize
    }

    /// Inverse of [`Self::screen_to_idx()`].
    pub fn idx_to_screen(&self, idx: usize) -> UVec2 {
        let width = self.screen.x as usize;

        UVec2::new((idx % width) as u32, (idx / width) as u32)
    }

    pub fn screen_size(&self) -> UVec2 {
        self.screen.xy().as_uvec2()
    }

    /// Returns the number of pixels in the viewport.
    pub fn pixel_count(&self) -> usize {
        let size = self.screen_size();

        (size.x as usize) * (size.y as usize)
    }

    /// Returns whether given point lays inside the screen.
    pub fn contains(&self, pos: IVec2) -> bool {
        let screen_size = self.screen.xy().as_ivec2();

        pos.x >= 0
            && pos.y >= 0
            && pos.x < screen_size.x
            && pos.y < screen_size.y
    }

    pub fn is_eq(&self, rhs: &Self) -> bool {
        self.screen == rhs.screen
            && self
                .projection_view
                .abs_diff_eq(rhs.projection_view, 0.0025)
    }
}
