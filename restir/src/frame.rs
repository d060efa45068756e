use crate::gpu::{Camera, GBufferEntry};

/// Everything a single frame is rendered from.
///
/// G-buffers are flat, per-pixel slices indexed by `x + y * width`; they
/// must match the controller's viewport size.
#[derive(Debug)]
pub struct FrameInput<'a, S> {
    pub scene: &'a S,
    pub camera: Camera,

    /// Camera of the previous frame, used to reproject surfaces for the
    /// temporal pass
    pub prev_camera: Camera,

    pub gbuffer: &'a [GBufferEntry],
    pub prev_gbuffer: &'a [GBufferEntry],

    /// Optional adaptive-sampling mask; pixels marked as `false` are not
    /// processed and their reservoirs are left untouched
    pub active: Option<&'a [bool]>,
}
