//! TLAS
//!
//! Top-level acceleration structure: a list of BLAS instances, each placed
//! by a `Transform`. Rays are transformed into each instance's object-local
//! frame via its inverse transform before querying the BLAS, then the hit
//! is transformed back to world space.

#![allow(dead_code)]

use crate::accelerators::bvh::Blas;
use crate::core::geometry::{transform_ray, Mat4, Ray, Transform};
use std::sync::Arc;

struct Instance {
    blas: Arc<Blas>,
    name: String,
    transform: Transform,
    matrix: Mat4,
    inverse_matrix: Mat4,
    to_previous: Mat4,
}

/// The top-level acceleration structure consumed by the renderer.
#[derive(Clone)]
pub struct Tlas {
    instances: Vec<InstanceHandle>,
}

#[derive(Clone)]
struct InstanceHandle(Arc<std::sync::RwLock<Instance>>);

impl Default for Tlas {
    fn default() -> Self {
        Self {
            instances: Vec::new(),
        }
    }
}

impl Tlas {
    /// Adds a BLAS instance and returns its index, used for later
    /// `set_name`/`transform_ref` calls.
    pub fn add_blas(&mut self, blas: Arc<Blas>, transform: Transform) -> u32 {
        let matrix = transform.matrix();
        let inverse_matrix = transform.inverse_matrix();
        let instance = Instance {
            blas,
            name: String::new(),
            transform,
            matrix,
            inverse_matrix,
            to_previous: Mat4::identity(),
        };
        self.instances
            .push(InstanceHandle(Arc::new(std::sync::RwLock::new(instance))));
        (self.instances.len() - 1) as u32
    }

    pub fn set_name(&mut self, index: u32, name: &str) {
        self.instances[index as usize].0.write().unwrap().name = name.to_string();
    }

    pub fn name(&self, index: u32) -> String {
        self.instances[index as usize].0.read().unwrap().name.clone()
    }

    /// Returns a snapshot of the instance's current transform, usable as the
    /// `previous` input to `update_transform` on the next frame.
    pub fn transform_snapshot(&self, index: u32) -> Transform {
        self.instances[index as usize].0.read().unwrap().transform
    }

    /// Full snapshot, indexed the same way as `add_blas` calls, for handing
    /// to `update_transform` as the "previous frame" reference.
    pub fn transforms_snapshot(&self) -> Vec<Transform> {
        self.instances
            .iter()
            .map(|i| i.0.read().unwrap().transform)
            .collect()
    }

    /// Replaces instance `index`'s transform. Does not recompute derived
    /// matrices; call `update_transform` afterwards.
    pub fn set_transform(&mut self, index: u32, transform: Transform) {
        self.instances[index as usize].0.write().unwrap().transform = transform;
    }

    pub fn object_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Recomputes per-instance `transform`/`inverse_transform` matrices and
    /// `to_previous_position`, using `previous[i]` (if present) as the pose
    /// the instance occupied last frame. An index with no entry in
    /// `previous` (a freshly added object) gets the identity delta.
    pub fn update_transform(&mut self, previous: Option<&[Transform]>) {
        for (i, handle) in self.instances.iter().enumerate() {
            let mut instance = handle.0.write().unwrap();
            let prev = previous
                .and_then(|p| p.get(i))
                .copied()
                .unwrap_or(instance.transform);
            instance.matrix = instance.transform.matrix();
            instance.inverse_matrix = instance.transform.inverse_matrix();
            instance.to_previous = crate::core::geometry::to_previous_position(&instance.transform, &prev);
        }
    }

    /// No-op placeholder matching the external contract's `build()`: the
    /// per-instance BLAS BVHs are rebuilt by `Blas::refit`, and the TLAS
    /// here needs no separate top-level tree since instance counts in this
    /// core are small (linear instance scan is cheap).
    pub fn build(&mut self) {}

    /// Closest-hit query across all instances; transforms the ray into each
    /// instance's local frame, queries its BLAS, and transforms the result
    /// back to world space.
    pub fn traverse(&self, ray: &mut Ray) -> bool {
        let mut any_hit = false;
        for handle in &self.instances {
            let instance = handle.0.read().unwrap();
            let mut local = transform_ray(&instance.inverse_matrix, ray);
            local.hit_info.distance = ray.hit_info.distance;

            let steps_total_before = local.hit_info.traversal_steps_total;
            let steps_hit_before = local.hit_info.traversal_steps_hit_blas;

            if instance.blas.intersect(&mut local) {
                any_hit = true;
                ray.hit_info.hit = true;
                ray.hit_info.distance = local.hit_info.distance;
                ray.hit_info.position = instance.matrix.transform_point(local.hit_info.position);
                ray.hit_info.normal = instance.matrix.transform_normal(local.hit_info.normal).normalize();
                ray.hit_info.prev_position = instance.to_previous.transform_point(ray.hit_info.position);
                ray.hit_info.prev_normal =
                    instance.to_previous.transform_normal(ray.hit_info.normal).normalize();
            }
            ray.hit_info.traversal_steps_total +=
                local.hit_info.traversal_steps_total - steps_total_before;
            ray.hit_info.traversal_steps_hit_blas +=
                local.hit_info.traversal_steps_hit_blas - steps_hit_before;
        }
        any_hit
    }

    /// Any-hit query within `ray.hit_info.distance` across all instances.
    pub fn is_occluded(&self, ray: &Ray) -> bool {
        for handle in &self.instances {
            let instance = handle.0.read().unwrap();
            let mut local = transform_ray(&instance.inverse_matrix, ray);
            local.hit_info.distance = ray.hit_info.distance;
            if instance.blas.intersect_p(&local) {
                return true;
            }
        }
        false
    }

    /// Total triangle count across every instance (diagnostic only, per the
    /// source's own note that this is not behaviourally observable).
    pub fn triangle_count(&self) -> u64 {
        self.instances
            .iter()
            .map(|h| h.0.read().unwrap().blas.triangle_count())
            .sum()
    }
}
