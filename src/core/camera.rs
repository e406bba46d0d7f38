//! Camera
//!
//! Generates primary rays and performs the approximate world-to-screen
//! reprojection used by temporal reuse to find a pixel's previous-frame
//! correspondence.

#![allow(dead_code)]

use crate::core::geometry::{Mat4, Point3f, Ray, Vector3f};
use crate::core::pbrt::Float;
use crate::core::rng::Rng;

/// The four inward-pointing frustum side-plane normals, rooted at the
/// camera origin. Used only by `world_to_screen` reprojection.
#[derive(Copy, Clone, Debug, Default)]
struct FrustumNormals {
    top: Vector3f,
    bottom: Vector3f,
    left: Vector3f,
    right: Vector3f,
}

/// A pinhole camera. `position`/`rotation`/`vertical_fov` are authored
/// state; everything else is derived by `update_state` and must be
/// refreshed whenever the authored state changes.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    pub position: Point3f,
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotation: Vector3f,
    pub vertical_fov: Float,

    width: u32,
    height: u32,
    half_width: Float,
    half_height: Float,
    plane_z: Float,

    forward: Vector3f,
    back: Vector3f,
    right: Vector3f,
    up: Vector3f,
    /// Rotation-only basis matrix (no translation): transforms a
    /// camera-local direction into world space.
    basis: Mat4,

    frustum: FrustumNormals,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Point3f::new(0.0, 0.0, 10.0),
            rotation: Vector3f::zero(),
            vertical_fov: 60.0,
            width: 1280,
            height: 720,
            half_width: 640.0,
            half_height: 360.0,
            plane_z: 0.0,
            forward: Vector3f::new(0.0, 0.0, -1.0),
            back: Vector3f::new(0.0, 0.0, 1.0),
            right: Vector3f::new(1.0, 0.0, 0.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
            basis: Mat4::identity(),
            frustum: FrustumNormals::default(),
        };
        camera.update_state();
        camera
    }
}

impl Camera {
    /// Creates a camera at the origin looking down -Z with the given
    /// resolution and vertical field of view (degrees).
    pub fn new(width: u32, height: u32, vertical_fov: Float) -> Self {
        let mut camera = Self {
            width,
            height,
            ..Self::default()
        };
        camera.vertical_fov = vertical_fov;
        camera.update_state();
        camera
    }

    /// Resizes the viewport. Callers must call `update_state` afterwards.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Recomputes the orthonormal basis, view-plane distance and frustum
    /// normals from `position`/`rotation`/`vertical_fov`/resolution. Must be
    /// called after any of those change before `get_ray`/`world_to_screen`
    /// are used.
    pub fn update_state(&mut self) {
        self.half_width = self.width as Float * 0.5;
        self.half_height = self.height as Float * 0.5;

        let rotation = Mat4::rotation_x(self.rotation.x)
            .mul(&Mat4::rotation_y(self.rotation.y))
            .mul(&Mat4::rotation_z(self.rotation.z));
        self.right = rotation.transform_vector(Vector3f::new(1.0, 0.0, 0.0));
        self.up = rotation.transform_vector(Vector3f::new(0.0, 1.0, 0.0));
        self.back = rotation.transform_vector(Vector3f::new(0.0, 0.0, 1.0));
        self.forward = -self.back;
        self.basis = rotation;

        self.plane_z = -self.half_height / (self.vertical_fov.to_radians() * 0.5).tan();

        let top_left = self.local_direction(-self.half_width, self.half_height);
        let top_right = self.local_direction(self.half_width, self.half_height);
        let bottom_left = self.local_direction(-self.half_width, -self.half_height);
        let bottom_right = self.local_direction(self.half_width, -self.half_height);

        self.frustum = FrustumNormals {
            left: top_left.cross(&bottom_left).normalize(),
            right: bottom_right.cross(&top_right).normalize(),
            top: top_right.cross(&top_left).normalize(),
            bottom: bottom_left.cross(&bottom_right).normalize(),
        };
    }

    fn local_direction(&self, x: Float, y: Float) -> Vector3f {
        self.basis
            .transform_vector(Vector3f::new(x, y, self.plane_z))
    }

    /// Generates the primary ray for pixel `(x, y)`.
    pub fn get_ray(&self, x: u32, y: u32) -> Ray {
        let lx = (x as Float + 0.5) - self.half_width;
        let ly = self.half_height - (y as Float + 0.5);
        let direction = self.local_direction(lx, ly).normalize();
        Ray::new(self.position, direction)
    }

    /// Approximate projection of a world point onto the image plane, used by
    /// temporal reuse to find a previous-frame correspondence. Agrees with
    /// `get_ray` up to sub-pixel precision for a stationary camera. The
    /// returned pixel may be out of `[0, width) x [0, height)`; callers must
    /// clamp or reject it.
    pub fn world_to_screen(&self, p: Point3f, rng: &mut Rng) -> (i32, i32) {
        let d = p - self.position;

        let left = d.dot(&self.frustum.left);
        let right = d.dot(&self.frustum.right);
        let top = d.dot(&self.frustum.top);
        let bottom = d.dot(&self.frustum.bottom);

        let u = if left + right != 0.0 {
            left / (left + right)
        } else {
            0.5
        };
        let v = if top + bottom != 0.0 {
            top / (top + bottom)
        } else {
            0.5
        };

        let jitter_x = rng.random_float() - 0.5;
        let jitter_y = rng.random_float() - 0.5;

        let x = (u * self.width as Float + jitter_x).floor() as i32;
        let y = (v * self.height as Float + jitter_y).floor() as i32;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn center_pixel_points_down_forward() {
        let mut camera = Camera::new(64, 64, 60.0);
        camera.update_state();
        let ray = camera.get_ray(32, 32);
        assert_relative_eq!(ray.direction.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(ray.direction.y, 0.0, epsilon = 1e-3);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn world_to_screen_is_inverse_of_get_ray_for_stationary_camera() {
        let mut camera = Camera::new(128, 128, 60.0);
        camera.position = Point3f::new(1.0, 2.0, 3.0);
        camera.update_state();

        let mut rng = Rng::new(1);
        for &(x, y) in &[(0u32, 0u32), (64, 64), (127, 0), (0, 127), (50, 90)] {
            let ray = camera.get_ray(x, y);
            let world_point = ray.at(5.0);
            let (px, py) = camera.world_to_screen(world_point, &mut rng);
            assert!((px - x as i32).abs() <= 1, "x: {} vs {}", px, x);
            assert!((py - y as i32).abs() <= 1, "y: {} vs {}", py, y);
        }
    }
}
