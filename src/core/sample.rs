//! Sample
//!
//! A candidate shading path: camera -> surface hit -> one point light. This
//! is the payload a `Reservoir` resamples over.

#![allow(dead_code)]

use crate::core::color::Rgb;
use crate::core::geometry::{HitInfo, Normal3f, Point3f, Vector3f};
use crate::core::light::PointLight;
use crate::core::pbrt::Float;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    pub hit: bool,
    pub hit_distance: Float,
    pub hit_position: Point3f,
    pub hit_normal: Normal3f,
    pub hit_prev_position: Point3f,
    pub hit_prev_normal: Normal3f,

    pub light: PointLight,
    pub light_direction: Vector3f,
    pub light_distance: Float,

    /// `max(0, dot(hit_normal, light_direction))`: Lambertian, no albedo.
    pub brdf: Float,
    /// `max_channel(brdf * emission / distance^2)`, the RIS target function
    /// p-hat(x) evaluated at this sample.
    pub contribution: Float,

    /// `1 / source_pdf` for the candidate that produced this sample.
    pub weight: Float,
    pub pdf: Float,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            hit: false,
            hit_distance: Float::INFINITY,
            hit_position: Point3f::zero(),
            hit_normal: Normal3f::zero(),
            hit_prev_position: Point3f::zero(),
            hit_prev_normal: Normal3f::zero(),
            light: PointLight::default(),
            light_direction: Vector3f::zero(),
            light_distance: 0.0,
            brdf: 0.0,
            contribution: 0.0,
            weight: 0.0,
            pdf: 0.0,
        }
    }
}

impl Sample {
    /// Builds a candidate from a traced `HitInfo`, the camera position (kept
    /// for parity with the external contract; not otherwise used here since
    /// `hit_info` already carries world-space hit data), the chosen light,
    /// and the RIS source weight/pdf.
    pub fn new(
        hit_info: &HitInfo,
        _camera_position: Point3f,
        light: PointLight,
        weight: Float,
        pdf: Float,
    ) -> Self {
        let mut sample = Self {
            hit: hit_info.hit,
            hit_distance: hit_info.distance,
            hit_position: hit_info.position,
            hit_normal: hit_info.normal,
            hit_prev_position: hit_info.prev_position,
            hit_prev_normal: hit_info.prev_normal,
            light,
            weight,
            pdf,
            ..Default::default()
        };
        sample.recompute_light_terms();
        sample
    }

    /// Rebinds this sample's chosen light to `new_light`, recomputing
    /// direction/distance/BRDF/contribution against the existing hit. Used
    /// when a reused reservoir's stored light is applied to another pixel's
    /// surface.
    pub fn replace_light(&mut self, new_light: PointLight) {
        self.light = new_light;
        self.recompute_light_terms();
    }

    fn recompute_light_terms(&mut self) {
        if !self.hit {
            self.light_direction = Vector3f::zero();
            self.light_distance = 0.0;
            self.brdf = 0.0;
            self.contribution = 0.0;
            return;
        }
        let to_light = self.light.position - self.hit_position;
        self.light_distance = to_light.length();
        self.light_direction = to_light.normalize();
        self.brdf = self.hit_normal.dot(&self.light_direction).max(0.0);

        if self.light_distance > 0.0 {
            let attenuation = self.light.emission * (self.brdf / (self.light_distance * self.light_distance));
            self.contribution = attenuation.max_channel();
        } else {
            self.contribution = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Normal3f;

    fn hit_facing_up(position: Point3f) -> HitInfo {
        HitInfo {
            hit: true,
            distance: 5.0,
            position,
            prev_position: position,
            normal: Normal3f::new(0.0, 1.0, 0.0),
            prev_normal: Normal3f::new(0.0, 1.0, 0.0),
            traversal_steps_hit_blas: 0,
            traversal_steps_total: 0,
        }
    }

    #[test]
    fn straight_above_light_gives_full_brdf() {
        let hit = hit_facing_up(Point3f::zero());
        let light = PointLight::new(Point3f::new(0.0, 2.0, 0.0), Rgb::splat(1.0));
        let sample = Sample::new(&hit, Point3f::zero(), light, 1.0, 1.0);
        assert!((sample.brdf - 1.0).abs() < 1e-5);
        assert!((sample.light_distance - 2.0).abs() < 1e-5);
        assert!((sample.contribution - 0.25).abs() < 1e-5);
    }

    #[test]
    fn light_behind_surface_gives_zero_brdf() {
        let hit = hit_facing_up(Point3f::zero());
        let light = PointLight::new(Point3f::new(0.0, -2.0, 0.0), Rgb::splat(1.0));
        let sample = Sample::new(&hit, Point3f::zero(), light, 1.0, 1.0);
        assert_eq!(sample.brdf, 0.0);
        assert_eq!(sample.contribution, 0.0);
    }

    #[test]
    fn missed_ray_has_no_contribution() {
        let hit = HitInfo::default();
        let light = PointLight::new(Point3f::new(0.0, 2.0, 0.0), Rgb::splat(1.0));
        let sample = Sample::new(&hit, Point3f::zero(), light, 1.0, 1.0);
        assert!(!sample.hit);
        assert_eq!(sample.contribution, 0.0);
    }

    #[test]
    fn replace_light_updates_direction_and_contribution() {
        let hit = hit_facing_up(Point3f::zero());
        let first = PointLight::new(Point3f::new(0.0, 2.0, 0.0), Rgb::splat(1.0));
        let mut sample = Sample::new(&hit, Point3f::zero(), first, 1.0, 1.0);
        let original_contribution = sample.contribution;

        let second = PointLight::new(Point3f::new(0.0, 4.0, 0.0), Rgb::splat(1.0));
        sample.replace_light(second);

        assert!((sample.light_distance - 4.0).abs() < 1e-5);
        assert!(sample.contribution < original_contribution);
    }
}
