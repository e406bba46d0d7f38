//! Point3

#![allow(dead_code)]

use super::Vector3f;
use crate::core::pbrt::Float;
use std::ops::{Add, AddAssign, Index, Mul, Sub};

/// A position in 3D space, distinct from `Vector3f` so that affine
/// operations (point - point = vector, point + vector = point) type-check.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Point3f {
    /// Creates a new `Point3f`.
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Returns a point with all components set to `v`.
    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    /// Returns `true` if any component is NaN.
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> Float {
        (*self - *other).length()
    }

    /// Squared euclidean distance to another point.
    pub fn distance_squared(&self, other: &Self) -> Float {
        (*self - *other).length_squared()
    }

    /// Component-wise minimum of two points.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum of two points.
    pub fn max(&self, other: &Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl Index<usize> for Point3f {
    type Output = Float;

    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index out of bounds for Point3f: {}", i),
        }
    }
}

impl Add<Vector3f> for Point3f {
    type Output = Self;
    fn add(self, v: Vector3f) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl AddAssign<Vector3f> for Point3f {
    fn add_assign(&mut self, v: Vector3f) {
        *self = *self + v;
    }
}

impl Sub<Vector3f> for Point3f {
    type Output = Self;
    fn sub(self, v: Vector3f) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Sub for Point3f {
    type Output = Vector3f;
    fn sub(self, rhs: Self) -> Vector3f {
        Vector3f::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<Float> for Point3f {
    type Output = Self;
    fn mul(self, s: Float) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Add for Point3f {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}
