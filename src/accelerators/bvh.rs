//! BLAS
//!
//! A bottom-level acceleration structure over a single triangle mesh. Split
//! method is fixed to an equal-counts median split along the bounding box's
//! longest axis: plenty for the handful of procedural test meshes this
//! renderer's core needs to exercise; a production build would swap this
//! for a full SAH/HLBVH implementation behind the same `Blas` interface.

#![allow(dead_code)]

use crate::core::error::{RenderError, RenderResult};
use crate::core::geometry::{Axis, Bounds3f, Normal3f, Point3f, Ray, Vector3f};
use crate::core::pbrt::Float;
use std::sync::Arc;

/// A single triangle, stored as three object-space vertices.
#[derive(Copy, Clone, Debug)]
pub struct Triangle {
    pub p0: Point3f,
    pub p1: Point3f,
    pub p2: Point3f,
}

impl Triangle {
    fn bounds(&self) -> Bounds3f {
        Bounds3f::from_point(self.p0)
            .union_point(&self.p1)
            .union_point(&self.p2)
    }

    fn centroid(&self) -> Point3f {
        Point3f::new(
            (self.p0.x + self.p1.x + self.p2.x) / 3.0,
            (self.p0.y + self.p1.y + self.p2.y) / 3.0,
            (self.p0.z + self.p1.z + self.p2.z) / 3.0,
        )
    }

    fn normal(&self) -> Normal3f {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        Normal3f::from(e1.cross(&e2).normalize())
    }

    /// Möller-Trumbore ray/triangle intersection. Returns the hit distance
    /// when it lies in `(1e-6, t_max)`.
    fn intersect(&self, ray: &Ray, t_max: Float) -> Option<Float> {
        let e1 = self.p1 - self.p0;
        let e2 = self.p2 - self.p0;
        let h = ray.direction.cross(&e2);
        let a = e1.dot(&h);
        if a.abs() < 1e-10 {
            return None;
        }
        let f = 1.0 / a;
        let s = ray.origin - self.p0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * e2.dot(&q);
        if t > 1e-6 && t < t_max {
            Some(t)
        } else {
            None
        }
    }
}

enum BvhNode {
    Leaf {
        bounds: Bounds3f,
        triangles: Vec<u32>,
    },
    Interior {
        bounds: Bounds3f,
        axis: Axis,
        left: Arc<BvhNode>,
        right: Arc<BvhNode>,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Bounds3f {
        match self {
            BvhNode::Leaf { bounds, .. } => bounds,
            BvhNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// Bottom-level acceleration structure over one triangle mesh, in
/// object-local space.
pub struct Blas {
    triangles: Vec<Triangle>,
    root: Option<Arc<BvhNode>>,
}

impl Default for Blas {
    fn default() -> Self {
        Self {
            triangles: Vec::new(),
            root: None,
        }
    }
}

impl Blas {
    /// Sets the mesh from a flat vertex list where each consecutive triple
    /// defines one triangle, and rebuilds the BVH over it. Rejects a vertex
    /// count that is not a multiple of 3: a malformed mesh at the ingest
    /// boundary, not a condition the BVH build should silently truncate
    /// past (`chunks_exact` would otherwise drop the remainder).
    pub fn set_object(&mut self, vertices: &[Point3f]) -> RenderResult<()> {
        if vertices.len() % 3 != 0 {
            return Err(RenderError::MalformedMesh(vertices.len()));
        }
        self.triangles = vertices
            .chunks_exact(3)
            .map(|t| Triangle {
                p0: t[0],
                p1: t[1],
                p2: t[2],
            })
            .collect();
        self.refit();
        Ok(())
    }

    /// Rebuilds the BVH over the current triangle list. Called `refit` to
    /// match the external contract (section 6); this implementation always
    /// does a full rebuild rather than an incremental refit since the
    /// renderer only calls it after geometry actually changes.
    pub fn refit(&mut self) {
        let indices: Vec<u32> = (0..self.triangles.len() as u32).collect();
        self.root = self.build(indices);
    }

    fn build(&self, indices: Vec<u32>) -> Option<Arc<BvhNode>> {
        if indices.is_empty() {
            return None;
        }
        let bounds = indices
            .iter()
            .fold(Bounds3f::empty(), |b, &i| b.union(&self.triangles[i as usize].bounds()));

        if indices.len() <= 2 {
            return Some(Arc::new(BvhNode::Leaf {
                bounds,
                triangles: indices,
            }));
        }

        let axis = bounds.maximum_extent();
        let axis_enum = match axis {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        };

        let mut sorted = indices;
        sorted.sort_by(|&a, &b| {
            let ca = self.triangles[a as usize].centroid()[axis];
            let cb = self.triangles[b as usize].centroid()[axis];
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = sorted.len() / 2;
        let right_half = sorted.split_off(mid);
        let left = self.build(sorted);
        let right = self.build(right_half);

        match (left, right) {
            (Some(l), Some(r)) => Some(Arc::new(BvhNode::Interior {
                bounds,
                axis: axis_enum,
                left: l,
                right: r,
            })),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }

    /// Closest-hit traversal. `ray` is in object-local space; on a hit,
    /// `hit_info.{distance,position,normal}` are written (world-space
    /// fields are the caller's, `Tlas`'s, responsibility).
    pub fn intersect(&self, ray: &mut Ray) -> bool {
        let root = match &self.root {
            Some(r) => r,
            None => return false,
        };
        let mut found = false;
        let mut stack = vec![root.clone()];
        while let Some(node) = stack.pop() {
            if node
                .bounds()
                .intersect_p(ray, ray.hit_info.distance)
                .is_none()
            {
                continue;
            }
            match &*node {
                BvhNode::Leaf { triangles, .. } => {
                    for &i in triangles {
                        let tri = &self.triangles[i as usize];
                        if let Some(t) = tri.intersect(ray, ray.hit_info.distance) {
                            ray.hit_info.hit = true;
                            ray.hit_info.distance = t;
                            ray.hit_info.position = ray.at(t);
                            ray.hit_info.normal = tri.normal();
                            ray.hit_info.traversal_steps_hit_blas += 1;
                            found = true;
                        }
                        ray.hit_info.traversal_steps_total += 1;
                    }
                }
                BvhNode::Interior { left, right, .. } => {
                    stack.push(left.clone());
                    stack.push(right.clone());
                }
            }
        }
        found
    }

    /// Any-hit traversal within `ray.hit_info.distance`. Stops at the first
    /// intersection found; does not update `ray`.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        let root = match &self.root {
            Some(r) => r,
            None => return false,
        };
        let mut stack = vec![root.clone()];
        while let Some(node) = stack.pop() {
            if node
                .bounds()
                .intersect_p(ray, ray.hit_info.distance)
                .is_none()
            {
                continue;
            }
            match &*node {
                BvhNode::Leaf { triangles, .. } => {
                    for &i in triangles {
                        if self.triangles[i as usize]
                            .intersect(ray, ray.hit_info.distance)
                            .is_some()
                        {
                            return true;
                        }
                    }
                }
                BvhNode::Interior { left, right, .. } => {
                    stack.push(left.clone());
                    stack.push(right.clone());
                }
            }
        }
        false
    }

    /// Number of triangles in the mesh (diagnostic).
    pub fn triangle_count(&self) -> u64 {
        self.triangles.len() as u64
    }

    /// Bounding box of the whole mesh, in object-local space.
    pub fn bounds(&self) -> Bounds3f {
        self.root
            .as_ref()
            .map(|r| *r.bounds())
            .unwrap_or_else(Bounds3f::empty)
    }
}

/// Builds the two triangles of an axis-aligned rectangle given four corners
/// in winding order, as a convenience for assembling procedural test/demo
/// geometry (ground planes, walls).
pub fn quad(p0: Point3f, p1: Point3f, p2: Point3f, p3: Point3f) -> Vec<Point3f> {
    vec![p0, p1, p2, p0, p2, p3]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vector3f;

    fn unit_plane() -> Blas {
        let mut blas = Blas::default();
        blas.set_object(&quad(
            Point3f::new(-10.0, 0.0, -10.0),
            Point3f::new(10.0, 0.0, -10.0),
            Point3f::new(10.0, 0.0, 10.0),
            Point3f::new(-10.0, 0.0, 10.0),
        ))
        .unwrap();
        blas
    }

    #[test]
    fn straight_down_ray_hits_plane() {
        let blas = unit_plane();
        let mut ray = Ray::new(Point3f::new(0.0, 5.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        assert!(blas.intersect(&mut ray));
        assert!(ray.hit_info.hit);
        assert!((ray.hit_info.distance - 5.0).abs() < 1e-3);
        assert!((ray.hit_info.normal.y - 1.0).abs() < 1e-3 || (ray.hit_info.normal.y + 1.0).abs() < 1e-3);
    }

    #[test]
    fn parallel_ray_misses_plane() {
        let blas = unit_plane();
        let mut ray = Ray::new(Point3f::new(0.0, 5.0, 0.0), Vector3f::new(1.0, 0.0, 0.0));
        assert!(!blas.intersect(&mut ray));
        assert!(!ray.hit_info.hit);
    }

    #[test]
    fn any_hit_stops_at_closer_occluder_distance() {
        let blas = unit_plane();
        let far_ray = Ray::with_max_distance(
            Point3f::new(0.0, 5.0, 0.0),
            Vector3f::new(0.0, -1.0, 0.0),
            4.0,
        );
        assert!(!blas.intersect_p(&far_ray));

        let near_ray = Ray::with_max_distance(
            Point3f::new(0.0, 5.0, 0.0),
            Vector3f::new(0.0, -1.0, 0.0),
            10.0,
        );
        assert!(blas.intersect_p(&near_ray));
    }

    #[test]
    fn set_object_rejects_a_vertex_count_not_a_multiple_of_three() {
        let mut blas = Blas::default();
        let err = blas
            .set_object(&[Point3f::zero(), Point3f::new(1.0, 0.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, crate::core::error::RenderError::MalformedMesh(2)));
    }
}
