//! PointLight

#![allow(dead_code)]

use crate::core::color::Rgb;
use crate::core::geometry::Point3f;
use crate::core::pbrt::INFINITY;

/// An isotropic point light: position plus linear RGB emission.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointLight {
    pub position: Point3f,
    pub emission: Rgb,
}

impl Default for PointLight {
    /// The "no light" sentinel. Never produced by light generation; used as
    /// a placeholder before the first light list exists so a `Sample` always
    /// has *some* light to hold.
    fn default() -> Self {
        Self {
            position: Point3f::splat(INFINITY),
            emission: Rgb::new(1.0, 0.0, 1.0),
        }
    }
}

impl PointLight {
    pub fn new(position: Point3f, emission: Rgb) -> Self {
        Self { position, emission }
    }
}
