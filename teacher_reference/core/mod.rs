//! Core

// Re-export.
pub mod bssrdf;
pub mod camera;
pub mod efloat;
pub mod film;
pub mod filter;
pub mod geometry;
pub mod image_io;
pub mod light;
pub mod low_discrepency;
pub mod material;
pub mod medium;
pub mod pbrt;
pub mod primitive;
pub mod primitives;
pub mod reflection;
pub mod rng;
pub mod sampler;
pub mod sampling;
pub mod scene;
pub mod sobol_matrices;
pub mod spectrum;
pub mod texture;
