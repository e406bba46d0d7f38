//! restir-di
//!
//! Core reservoir pipeline for an interactive CPU renderer computing direct
//! illumination from many point lights via Reservoir-based Spatio-Temporal
//! Importance Resampling (ReSTIR DI). See `renderer` for the per-frame
//! pipeline and `core`/`accelerators` for the data model it operates on.

pub mod accelerators;
pub mod config;
pub mod core;
pub mod renderer;

pub use crate::core::buffers::{DoubleFrameBuffer, TripleReservoirBuffer};
pub use crate::core::camera::Camera;
pub use crate::core::color::Rgb;
pub use crate::core::error::{RenderError, RenderResult};
pub use crate::core::light::PointLight;
pub use crate::core::reservoir::Reservoir;
pub use crate::core::scene::Scene;
pub use crate::core::settings::{RenderMode, Settings};
pub use renderer::{FrameStats, Renderer, RendererHandle};
