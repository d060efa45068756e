//! Common structs, algorithms etc. used by the ReSTIR DI kernels and the
//! renderer driving them.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod bias_correction;
mod camera;
mod gbuffer;
mod light;
mod neighbors;
mod noise;
mod passes;
mod ray;
mod reservoir;
mod scene;
mod settings;
mod surface;
mod target_function;
mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use self::bias_correction::*;
pub use self::camera::*;
pub use self::gbuffer::*;
pub use self::light::*;
pub use self::neighbors::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::ray::*;
pub use self::reservoir::*;
pub use self::scene::*;
pub use self::settings::*;
pub use self::surface::*;
pub use self::target_function::*;
pub use self::utils::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use glam::*;

    pub use crate::*;
}

/// How far a shading point is pushed along its normal, away from the
/// surface, to avoid self-intersections of shadow rays.
pub const SHADING_POINT_OFFSET: f32 = 1.0e-4;

/// Distance used for shadow rays towards the environment.
pub const ENVMAP_DISTANCE: f32 = 1.0e35;
