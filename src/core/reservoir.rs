//! Reservoir
//!
//! A fixed-size-one weighted reservoir (WRS-1) over `Sample` candidates,
//! combined across passes with the biased MIS combiner from the original
//! ReSTIR paper: cheap and stable, at the cost of over-weighting long-lived
//! reservoirs relative to an unbiased combine.

#![allow(dead_code)]

use crate::core::pbrt::Float;
use crate::core::rng::Rng;
use crate::core::sample::Sample;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Reservoir {
    pub sample: Sample,
    /// Number of candidates streamed through this reservoir so far.
    pub sample_count: u32,
    /// Running sum of resampling weights across all candidates seen.
    pub weight_total: Float,
    /// Unbiased contribution weight carried into shading.
    pub weight_sample_out: Float,
}

impl Reservoir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the empty reservoir, used when history is invalidated.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Streams one candidate `(sample, weight)` through the reservoir.
    /// Replaces the stored sample with probability `weight / weight_total`;
    /// ties (`rand() <= ratio`, which occurs on the first candidate since
    /// `weight_total` then equals `weight`) favour the new candidate so an
    /// empty reservoir always accepts its first sample.
    pub fn update(&mut self, sample: Sample, weight: Float, rng: &mut Rng) {
        self.sample_count += 1;
        self.weight_total += weight;
        if self.weight_total <= 0.0 {
            return;
        }
        if rng.random_float() <= weight / self.weight_total {
            self.sample = sample;
        }
    }

    /// Finalizes `weight_sample_out` from the stored sample's target
    /// function value and the accumulated `(weight_total, sample_count)`.
    /// Call once after streaming every RIS candidate.
    pub fn finalize(&mut self) {
        self.weight_sample_out = if self.sample.contribution > 0.0 && self.sample_count > 0 {
            (1.0 / self.sample.contribution) * (self.weight_total / self.sample_count as Float)
        } else {
            0.0
        };
    }

    /// Biased MIS combine of `self` and `other` into a fresh reservoir.
    /// Each input contributes its stored sample with resampling weight
    /// `p_hat(sample) * W * M`; the combined `M` is the sum of inputs'
    /// `M`, and the combined `W` is recomputed from whichever sample wins.
    pub fn combine_biased(&self, other: &Reservoir, rng: &mut Rng) -> Reservoir {
        let mut combined = Reservoir::new();

        let weight_self = self.sample.contribution * self.weight_sample_out * self.sample_count as Float;
        let weight_other = other.sample.contribution * other.weight_sample_out * other.sample_count as Float;

        combined.update(self.sample, weight_self, rng);
        combined.update(other.sample, weight_other, rng);
        combined.sample_count = self.sample_count + other.sample_count;
        combined.finalize();
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{HitInfo, Normal3f, Point3f};
    use crate::core::light::PointLight;

    fn candidate(contribution: Float) -> Sample {
        let hit = HitInfo {
            hit: true,
            distance: 1.0,
            position: Point3f::zero(),
            prev_position: Point3f::zero(),
            normal: Normal3f::new(0.0, 1.0, 0.0),
            prev_normal: Normal3f::new(0.0, 1.0, 0.0),
            traversal_steps_hit_blas: 0,
            traversal_steps_total: 0,
        };
        let mut sample = Sample::new(&hit, Point3f::zero(), PointLight::default(), 1.0, 1.0);
        sample.contribution = contribution;
        sample
    }

    #[test]
    fn first_candidate_is_always_accepted() {
        let mut r = Reservoir::new();
        let mut rng = Rng::new(1);
        r.update(candidate(0.5), 0.5, &mut rng);
        assert_eq!(r.sample_count, 1);
        assert_eq!(r.weight_total, 0.5);
        assert_eq!(r.sample.contribution, 0.5);
    }

    #[test]
    fn sample_count_accumulates_across_updates() {
        let mut r = Reservoir::new();
        let mut rng = Rng::new(7);
        for i in 0..10 {
            r.update(candidate(i as Float + 1.0), 1.0, &mut rng);
        }
        assert_eq!(r.sample_count, 10);
    }

    #[test]
    fn finalize_yields_zero_weight_for_zero_contribution() {
        let mut r = Reservoir::new();
        let mut rng = Rng::new(3);
        r.update(candidate(0.0), 1.0, &mut rng);
        r.finalize();
        assert_eq!(r.weight_sample_out, 0.0);
    }

    #[test]
    fn finalize_matches_closed_form_for_single_candidate() {
        let mut r = Reservoir::new();
        let mut rng = Rng::new(9);
        r.update(candidate(2.0), 4.0, &mut rng);
        r.finalize();
        // W = (1/p_hat) * (w_sum / M) = (1/2) * (4/1) = 2
        assert!((r.weight_sample_out - 2.0).abs() < 1e-5);
    }

    #[test]
    fn combine_biased_sums_sample_counts() {
        let mut a = Reservoir::new();
        let mut b = Reservoir::new();
        let mut rng = Rng::new(11);
        a.update(candidate(1.0), 1.0, &mut rng);
        a.finalize();
        b.update(candidate(2.0), 2.0, &mut rng);
        b.update(candidate(3.0), 3.0, &mut rng);
        b.finalize();

        let combined = a.combine_biased(&b, &mut rng);
        assert_eq!(combined.sample_count, a.sample_count + b.sample_count);
    }

    #[test]
    fn combine_biased_with_empty_other_keeps_self_sample() {
        let mut a = Reservoir::new();
        let mut rng = Rng::new(21);
        a.update(candidate(5.0), 5.0, &mut rng);
        a.finalize();
        let empty = Reservoir::new();

        let combined = a.combine_biased(&empty, &mut rng);
        assert_eq!(combined.sample.contribution, a.sample.contribution);
    }
}
