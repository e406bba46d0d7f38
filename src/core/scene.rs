//! Scene
//!
//! Camera, TLAS of rigid-transformed meshes, and point lights, snapshotted
//! by value every frame so worker threads can read a stable copy while the
//! next scene is assembled.

#![allow(dead_code)]

use crate::accelerators::Tlas;
use crate::core::camera::Camera;
use crate::core::color::Rgb;
use crate::core::geometry::Point3f;
use crate::core::light::PointLight;
use crate::core::rng::Rng;

#[derive(Clone)]
pub struct Scene {
    pub camera: Camera,
    pub tlas: Tlas,
    pub lights: Vec<PointLight>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            tlas: Tlas::default(),
            lights: Vec::new(),
        }
    }
}

impl Scene {
    /// Replaces the light list with `count` point lights placed uniformly
    /// at random inside `[box_min, box_max]`, with random emission colours
    /// scaled by `intensity`. Callers must invalidate reservoir history
    /// after calling this: stored samples reference lights by value, and
    /// regenerated lights invalidate whatever RIS statistics referred to
    /// the old list.
    pub fn regenerate_lights(&mut self, count: usize, box_min: Point3f, box_max: Point3f, intensity: f32, seed: u32) {
        let mut rng = Rng::new(seed);
        self.lights = (0..count)
            .map(|_| {
                let position = Point3f::new(
                    lerp_range(rng.random_float(), box_min.x, box_max.x),
                    lerp_range(rng.random_float(), box_min.y, box_max.y),
                    lerp_range(rng.random_float(), box_min.z, box_max.z),
                );
                let color = Rgb::new(
                    0.2 + 0.8 * rng.random_float(),
                    0.2 + 0.8 * rng.random_float(),
                    0.2 + 0.8 * rng.random_float(),
                );
                PointLight::new(position, color * intensity)
            })
            .collect();
    }
}

fn lerp_range(t: f32, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regenerate_lights_produces_requested_count() {
        let mut scene = Scene::default();
        scene.regenerate_lights(5, Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0), 10.0, 42);
        assert_eq!(scene.lights.len(), 5);
    }

    #[test]
    fn regenerated_lights_stay_within_box() {
        let mut scene = Scene::default();
        let lo = Point3f::new(-2.0, 0.0, -3.0);
        let hi = Point3f::new(2.0, 4.0, 3.0);
        scene.regenerate_lights(50, lo, hi, 5.0, 7);
        for light in &scene.lights {
            assert!(light.position.x >= lo.x && light.position.x <= hi.x);
            assert!(light.position.y >= lo.y && light.position.y <= hi.y);
            assert!(light.position.z >= lo.z && light.position.z <= hi.z);
        }
    }

    #[test]
    fn same_seed_reproduces_light_list() {
        let mut a = Scene::default();
        let mut b = Scene::default();
        a.regenerate_lights(8, Point3f::splat(-1.0), Point3f::splat(1.0), 3.0, 99);
        b.regenerate_lights(8, Point3f::splat(-1.0), Point3f::splat(1.0), 3.0, 99);
        for (la, lb) in a.lights.iter().zip(b.lights.iter()) {
            assert_eq!(la.position, lb.position);
            assert_eq!(la.emission, lb.emission);
        }
    }
}
