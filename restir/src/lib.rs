//! Host side of the ReSTIR DI pipeline: owns the reservoir buffers, seeds
//! the passes and dispatches their kernels over all pixels of the viewport.
//!
//! ```no_run
//! # use restir::{gpu, DiController, FrameInput, RendererSettings};
//! # fn scene() -> impl gpu::Scene { restir::gpu::testing::TestScene::default() }
//! # let camera = gpu::Camera::default();
//! # let gbuffer = Vec::<gpu::GBufferEntry>::new();
//! let mut controller = DiController::new(
//!     RendererSettings::default(),
//!     camera.screen_size(),
//! );
//!
//! let scene = scene();
//!
//! let reservoirs = controller.render(&FrameInput {
//!     scene: &scene,
//!     camera,
//!     prev_camera: camera,
//!     gbuffer: &gbuffer,
//!     prev_gbuffer: &gbuffer,
//!     active: None,
//! });
//! ```

mod buffers;
mod controller;
mod frame;
mod settings;
mod utils;

pub use restir_gpu as gpu;

pub use self::buffers::*;
pub use self::controller::*;
pub use self::frame::*;
pub use self::settings::*;
pub use self::utils::*;
