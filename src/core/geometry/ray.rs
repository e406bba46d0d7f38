//! Ray and HitInfo

#![allow(dead_code)]

use super::{Normal3f, Point3f, Vector3f};
use crate::core::pbrt::INFINITY;

/// Record of a closest-hit (or any-hit) query against the scene.
///
/// `prev_position`/`prev_normal` are the world-space location and
/// orientation the same surface point occupied in the previous frame,
/// filled in by `Tlas::traverse` via the hit instance's to-previous
/// transform. They are meaningless unless `hit` is `true`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitInfo {
    pub hit: bool,
    pub distance: f32,
    pub position: Point3f,
    pub prev_position: Point3f,
    pub normal: Normal3f,
    pub prev_normal: Normal3f,

    /// Triangles tested within the BLAS that was ultimately hit (diagnostic,
    /// used by the `TraversalSteps` render mode only).
    pub traversal_steps_hit_blas: u32,
    /// Total triangles tested across every BLAS visited (diagnostic).
    pub traversal_steps_total: u32,
}

impl Default for HitInfo {
    fn default() -> Self {
        Self {
            hit: false,
            distance: INFINITY,
            position: Point3f::zero(),
            prev_position: Point3f::zero(),
            normal: Normal3f::zero(),
            prev_normal: Normal3f::zero(),
            traversal_steps_hit_blas: 0,
            traversal_steps_total: 0,
        }
    }
}

/// A ray being traced through the scene.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: Point3f,
    pub direction: Vector3f,
    pub hit_info: HitInfo,
}

impl Ray {
    /// Creates a ray with the maximum-finite sentinel distance, narrowed by
    /// traversal.
    pub fn new(origin: Point3f, direction: Vector3f) -> Self {
        Self {
            origin,
            direction,
            hit_info: HitInfo::default(),
        }
    }

    /// Creates a ray whose hit distance is capped at `t_max`, used for
    /// shadow rays so occluders beyond the light are ignored.
    pub fn with_max_distance(origin: Point3f, direction: Vector3f, t_max: f32) -> Self {
        let mut ray = Self::new(origin, direction);
        ray.hit_info.distance = t_max;
        ray
    }

    /// Point reached by travelling `t` along the ray.
    pub fn at(&self, t: f32) -> Point3f {
        self.origin + self.direction * t
    }
}
