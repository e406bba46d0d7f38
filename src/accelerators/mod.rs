//! Acceleration structures
//!
//! A two-level scheme: `Blas` holds one triangle mesh in object space,
//! `Tlas` places instances of those meshes in the world with a `Transform`
//! each and fans queries out across them.

pub mod bvh;
pub mod tlas;

pub use bvh::{quad, Blas, Triangle};
pub use tlas::Tlas;
