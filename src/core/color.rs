//! Rgb
//!
//! A plain RGB triple. This renderer works entirely in linear RGB: no
//! spectral upsampling, no colour space conversion, so there is none of the
//! `CoefficientSpectrum` machinery a full spectral path tracer needs.

#![allow(dead_code)]

use crate::core::pbrt::{max_channel, Float};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign};

/// A linear RGB colour or weight.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: Float,
    pub g: Float,
    pub b: Float,
}

impl Rgb {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { r, g, b }
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// The channel-max "scalar importance" used as the RIS target function.
    pub fn max_channel(&self) -> Float {
        max_channel(self.r, self.g, self.b)
    }

    /// Packs to a saturated 8-bit triple, no gamma curve applied.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            Self::to_u8(self.r),
            Self::to_u8(self.g),
            Self::to_u8(self.b),
        ]
    }

    fn to_u8(c: Float) -> u8 {
        (crate::core::pbrt::clamp(c, 0.0, 1.0) * 255.0).round() as u8
    }
}

impl Add for Rgb {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Rgb {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<Float> for Rgb {
    type Output = Self;
    fn mul(self, s: Float) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Rgb> for Rgb {
    type Output = Self;
    fn mul(self, rhs: Rgb) -> Self {
        Self::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl MulAssign<Float> for Rgb {
    fn mul_assign(&mut self, s: Float) {
        *self = *self * s;
    }
}

impl Div<Float> for Rgb {
    type Output = Self;
    fn div(self, s: Float) -> Self {
        self * (1.0 / s)
    }
}
