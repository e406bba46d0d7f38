//! Bounds3

#![allow(dead_code)]

use super::{Point3f, Ray, Vector3f};
use crate::core::pbrt::{Float, INFINITY};

/// An axis-aligned bounding box, used by the BVH to cull triangles and
/// internal nodes during traversal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    pub p_min: Point3f,
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds3f {
    /// Creates a bounding box spanning the two given corners (order does not
    /// matter).
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// An empty bounding box (degenerate: `p_min > p_max`), the identity for
    /// `union`.
    pub fn empty() -> Self {
        Self {
            p_min: Point3f::splat(INFINITY),
            p_max: Point3f::splat(-INFINITY),
        }
    }

    /// Bounding box containing a single point.
    pub fn from_point(p: Point3f) -> Self {
        Self { p_min: p, p_max: p }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Smallest box containing `self` and `p`.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Vector from `p_min` to `p_max`.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Index of the axis along which the box has the largest extent.
    pub fn maximum_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Surface area of the box (zero for a degenerate/empty box).
    pub fn surface_area(&self) -> Float {
        let d = self.diagonal();
        if d.x < 0.0 || d.y < 0.0 || d.z < 0.0 {
            0.0
        } else {
            2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
        }
    }

    /// Returns `p` expressed as a fraction of the box's diagonal, with
    /// `(0,0,0)` at `p_min` and `(1,1,1)` at `p_max`.
    pub fn offset(&self, p: &Point3f) -> Vector3f {
        let mut o = *p - self.p_min;
        let d = self.diagonal();
        if d.x > 0.0 {
            o.x /= d.x;
        }
        if d.y > 0.0 {
            o.y /= d.y;
        }
        if d.z > 0.0 {
            o.z /= d.z;
        }
        o
    }

    /// Ray-box slab test, used to prune BVH subtrees during traversal.
    /// Returns `Some((t_min, t_max))` when the ray overlaps the box within
    /// `[0, ray_t_max]`.
    pub fn intersect_p(&self, ray: &Ray, ray_t_max: Float) -> Option<(Float, Float)> {
        let mut t0 = 0.0;
        let mut t1 = ray_t_max;
        for axis in 0..3 {
            let inv_dir = 1.0 / ray.direction[axis];
            let mut t_near = (self.p_min[axis] - ray.origin[axis]) * inv_dir;
            let mut t_far = (self.p_max[axis] - ray.origin[axis]) * inv_dir;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

impl std::ops::Index<usize> for Bounds3f {
    type Output = Point3f;
    fn index(&self, i: usize) -> &Point3f {
        match i {
            0 => &self.p_min,
            1 => &self.p_max,
            _ => panic!("index out of bounds for Bounds3f: {}", i),
        }
    }
}
