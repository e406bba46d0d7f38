//! Transform

#![allow(dead_code)]

use super::{Normal3f, Point3f, Ray, Vector3f};
use crate::core::pbrt::{Float, MIN_SCALE};

/// A row-major 4x4 matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mat4 {
    pub m: [[Float; 4]; 4],
}

impl Mat4 {
    /// The identity matrix.
    pub fn identity() -> Self {
        let mut m = [[0.0; 4]; 4];
        for i in 0..4 {
            m[i][i] = 1.0;
        }
        Self { m }
    }

    /// Translation matrix.
    pub fn translation(t: Vector3f) -> Self {
        let mut r = Self::identity();
        r.m[0][3] = t.x;
        r.m[1][3] = t.y;
        r.m[2][3] = t.z;
        r
    }

    /// Non-uniform scale matrix.
    pub fn scaling(s: Vector3f) -> Self {
        let mut r = Self::identity();
        r.m[0][0] = s.x;
        r.m[1][1] = s.y;
        r.m[2][2] = s.z;
        r
    }

    /// Rotation about X by `degrees`.
    pub fn rotation_x(degrees: Float) -> Self {
        let r = degrees.to_radians();
        let (s, c) = r.sin_cos();
        let mut m = Self::identity();
        m.m[1][1] = c;
        m.m[1][2] = -s;
        m.m[2][1] = s;
        m.m[2][2] = c;
        m
    }

    /// Rotation about Y by `degrees`.
    pub fn rotation_y(degrees: Float) -> Self {
        let r = degrees.to_radians();
        let (s, c) = r.sin_cos();
        let mut m = Self::identity();
        m.m[0][0] = c;
        m.m[0][2] = s;
        m.m[2][0] = -s;
        m.m[2][2] = c;
        m
    }

    /// Rotation about Z by `degrees`.
    pub fn rotation_z(degrees: Float) -> Self {
        let r = degrees.to_radians();
        let (s, c) = r.sin_cos();
        let mut m = Self::identity();
        m.m[0][0] = c;
        m.m[0][1] = -s;
        m.m[1][0] = s;
        m.m[1][1] = c;
        m
    }

    /// Matrix product `self * rhs`.
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut r = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.m[i][k] * rhs.m[k][j];
                }
                r[i][j] = sum;
            }
        }
        Self { m: r }
    }

    /// Transforms a point (implicit `w = 1`).
    pub fn transform_point(&self, p: Point3f) -> Point3f {
        let x = self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3];
        let y = self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3];
        let z = self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3];
        let w = self.m[3][0] * p.x + self.m[3][1] * p.y + self.m[3][2] * p.z + self.m[3][3];
        if w == 1.0 {
            Point3f::new(x, y, z)
        } else {
            Point3f::new(x, y, z) * (1.0 / w)
        }
    }

    /// Transforms a vector/direction (implicit `w = 0`, translation ignored).
    pub fn transform_vector(&self, v: Vector3f) -> Vector3f {
        Vector3f::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }

    /// Transforms a normal using the same matrix as a direction.
    ///
    /// This is only correct when the matrix is rigid (rotation + translation,
    /// no non-uniform scale): the reprojection use in this crate never
    /// carries scale into `to_previous_position`, so the inverse-transpose
    /// normally required for normals is unnecessary here.
    pub fn transform_normal(&self, n: Normal3f) -> Normal3f {
        Normal3f::from(self.transform_vector(Vector3f::from(n)))
    }

    /// General 4x4 inverse via cofactor expansion. Panics if the matrix is
    /// singular, which should not happen for a well-formed (non-degenerate
    /// scale) object transform.
    pub fn inverse(&self) -> Self {
        let m = &self.m;
        let mut inv = [[0.0; 4]; 4];

        let sub = |r0: usize, r1: usize, c0: usize, c1: usize| -> Float {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };

        let s0 = sub(0, 1, 0, 1);
        let s1 = sub(0, 1, 0, 2);
        let s2 = sub(0, 1, 0, 3);
        let s3 = sub(0, 1, 1, 2);
        let s4 = sub(0, 1, 1, 3);
        let s5 = sub(0, 1, 2, 3);

        let c5 = sub(2, 3, 2, 3);
        let c4 = sub(2, 3, 1, 3);
        let c3 = sub(2, 3, 1, 2);
        let c2 = sub(2, 3, 0, 3);
        let c1 = sub(2, 3, 0, 2);
        let c0 = sub(2, 3, 0, 1);

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        assert!(det.abs() > 1e-12, "attempted to invert a singular Mat4");
        let inv_det = 1.0 / det;

        inv[0][0] = (m[1][1] * c5 - m[1][2] * c4 + m[1][3] * c3) * inv_det;
        inv[0][1] = (-m[0][1] * c5 + m[0][2] * c4 - m[0][3] * c3) * inv_det;
        inv[0][2] = (m[3][1] * s5 - m[3][2] * s4 + m[3][3] * s3) * inv_det;
        inv[0][3] = (-m[2][1] * s5 + m[2][2] * s4 - m[2][3] * s3) * inv_det;

        inv[1][0] = (-m[1][0] * c5 + m[1][2] * c2 - m[1][3] * c1) * inv_det;
        inv[1][1] = (m[0][0] * c5 - m[0][2] * c2 + m[0][3] * c1) * inv_det;
        inv[1][2] = (-m[3][0] * s5 + m[3][2] * s2 - m[3][3] * s1) * inv_det;
        inv[1][3] = (m[2][0] * s5 - m[2][2] * s2 + m[2][3] * s1) * inv_det;

        inv[2][0] = (m[1][0] * c4 - m[1][1] * c2 + m[1][3] * c0) * inv_det;
        inv[2][1] = (-m[0][0] * c4 + m[0][1] * c2 - m[0][3] * c0) * inv_det;
        inv[2][2] = (m[3][0] * s4 - m[3][1] * s2 + m[3][3] * s0) * inv_det;
        inv[2][3] = (-m[2][0] * s4 + m[2][1] * s2 - m[2][3] * s0) * inv_det;

        inv[3][0] = (-m[1][0] * c3 + m[1][1] * c1 - m[1][2] * c0) * inv_det;
        inv[3][1] = (m[0][0] * c3 - m[0][1] * c1 + m[0][2] * c0) * inv_det;
        inv[3][2] = (-m[3][0] * s3 + m[3][1] * s1 - m[3][2] * s0) * inv_det;
        inv[3][3] = (m[2][0] * s3 - m[2][1] * s1 + m[2][2] * s0) * inv_det;

        Self { m: inv }
    }
}

/// An object's placement in the world: translation, Euler rotation (degrees,
/// applied X then Y then Z, matching the original tool's authoring
/// convention), and per-axis scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vector3f,
    pub rotation: Vector3f,
    pub scale: Vector3f,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3f::zero(),
            rotation: Vector3f::zero(),
            scale: Vector3f::splat(1.0),
        }
    }
}

impl Transform {
    /// Creates a new `Transform`, clamping each scale component to
    /// `MIN_SCALE` so degenerate (zero or negative) scale entered at the UI
    /// boundary can never produce NaN rays downstream.
    pub fn new(translation: Vector3f, rotation: Vector3f, scale: Vector3f) -> Self {
        Self {
            translation,
            rotation,
            scale: Vector3f::new(
                scale.x.max(MIN_SCALE),
                scale.y.max(MIN_SCALE),
                scale.z.max(MIN_SCALE),
            ),
        }
    }

    /// The object-to-world matrix: translate * rotate_x * rotate_y * rotate_z * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::translation(self.translation)
            .mul(&Mat4::rotation_x(self.rotation.x))
            .mul(&Mat4::rotation_y(self.rotation.y))
            .mul(&Mat4::rotation_z(self.rotation.z))
            .mul(&Mat4::scaling(self.scale))
    }

    /// The world-to-object matrix.
    pub fn inverse_matrix(&self) -> Mat4 {
        self.matrix().inverse()
    }
}

/// Computes `to_previous_position = T * delta * T^-1`: the world-space map
/// from a point on the object's current surface to the position that same
/// surface point occupied in the previous frame. `delta` is the current-
/// to-previous pose change expressed in the object's own local frame
/// (`T_curr^-1 * T_prev`), conjugated by `T_curr` into a world-space
/// operator: this reduces to the familiar `T_prev * T_curr^-1`
/// motion-vector map while keeping the `T * delta * T^-1` shape.
///
/// When the object has not moved (`current == previous`), this is the
/// identity, since `delta` itself is the identity.
pub fn to_previous_position(current: &Transform, previous: &Transform) -> Mat4 {
    let t = current.matrix();
    let t_inv = current.inverse_matrix();
    let delta = t_inv.mul(&previous.matrix());
    t.mul(&delta).mul(&t_inv)
}

/// Transforms a ray into object-local space using `inverse`.
pub fn transform_ray(inverse: &Mat4, ray: &Ray) -> Ray {
    let mut local = Ray::new(
        inverse.transform_point(ray.origin),
        inverse.transform_vector(ray.direction),
    );
    local.hit_info.distance = ray.hit_info.distance;
    local
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stationary_object_has_identity_to_previous_position() {
        let t = Transform::new(Vector3f::new(1.0, 2.0, 3.0), Vector3f::new(10.0, 20.0, 30.0), Vector3f::splat(1.0));
        let to_prev = to_previous_position(&t, &t);
        let p = Point3f::new(4.0, 5.0, 6.0);
        let mapped = to_prev.transform_point(p);
        assert_relative_eq!(mapped.x, p.x, epsilon = 1e-4);
        assert_relative_eq!(mapped.y, p.y, epsilon = 1e-4);
        assert_relative_eq!(mapped.z, p.z, epsilon = 1e-4);
    }

    /// Rotations about different axes don't commute, so this case would
    /// fail under a naive `T_prev * T_curr^-1` world-frame delta conjugated
    /// in the wrong order: it only passes when `delta` is computed in the
    /// object's local frame (`T_curr^-1 * T_prev`) before conjugation.
    #[test]
    fn to_previous_position_matches_direct_motion_vector_under_non_commuting_rotation() {
        let current = Transform::new(Vector3f::zero(), Vector3f::new(90.0, 0.0, 0.0), Vector3f::splat(1.0));
        let previous = Transform::new(Vector3f::zero(), Vector3f::new(0.0, 90.0, 0.0), Vector3f::splat(1.0));

        let to_prev = to_previous_position(&current, &previous);

        // Direct motion-vector definition: map world point -> object-local
        // via the current pose, then back out through the previous pose.
        let direct = |p: Point3f| previous.matrix().transform_point(current.inverse_matrix().transform_point(p));

        for p in [
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.3, -0.7, 2.0),
        ] {
            let expected = direct(p);
            let actual = to_prev.transform_point(p);
            assert_relative_eq!(actual.x, expected.x, epsilon = 1e-4);
            assert_relative_eq!(actual.y, expected.y, epsilon = 1e-4);
            assert_relative_eq!(actual.z, expected.z, epsilon = 1e-4);
        }
    }
}
