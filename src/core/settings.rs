//! Settings
//!
//! Everything the UI/presentation thread can change about how the render
//! thread runs. Compared field-wise each frame; any difference invalidates
//! reservoir history for one frame since RIS/temporal/spatial statistics
//! from the old configuration no longer mean anything.

use serde::{Deserialize, Serialize};

/// Which pipeline the render thread runs this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    Normals,
    TraversalSteps,
    Di,
    Restir,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub mode: RenderMode,
    pub thread_count: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    pub tile_size: u32,
    pub random_seed: bool,
    pub eta: f32,
    pub render_prev_normals: bool,

    pub occlusion_check_di: bool,
    pub sample_all_lights_di: bool,
    pub candidate_count_di: u32,

    pub candidate_count_restir: u32,
    pub enable_visibility_pass: bool,

    pub enable_temporal_reuse: bool,
    pub temporal_sample_count_ratio: u32,
    pub temporal_max_distance: f32,
    pub temporal_max_distance_depth_scaling: f32,
    pub temporal_min_normal_similarity: f32,

    pub enable_spatial_reuse: bool,
    pub spatial_reuse_neighbours: u32,
    pub spatial_pixel_radius: u32,
    pub spatial_max_distance: f32,
    pub spatial_max_distance_depth_scaling: f32,
    pub spatial_min_normal_similarity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Restir,
            thread_count: num_cpus::get(),
            frame_width: 1920,
            frame_height: 1080,
            tile_size: 32,
            random_seed: true,
            eta: 0.001,
            render_prev_normals: false,

            occlusion_check_di: true,
            sample_all_lights_di: false,
            candidate_count_di: 1,

            candidate_count_restir: 3,
            enable_visibility_pass: true,

            enable_temporal_reuse: true,
            temporal_sample_count_ratio: 15,
            temporal_max_distance: 0.100,
            temporal_max_distance_depth_scaling: 0.015,
            temporal_min_normal_similarity: 0.75,

            enable_spatial_reuse: true,
            spatial_reuse_neighbours: 3,
            spatial_pixel_radius: 10,
            spatial_max_distance: 0.160,
            spatial_max_distance_depth_scaling: 0.020,
            spatial_min_normal_similarity: 0.96,
        }
    }
}

impl Settings {
    /// Clamps fields with documented hard bounds: `thread_count` to
    /// available cores, `tile_size` to `[4, 256]`, `spatial_pixel_radius`
    /// to `>= 3`, and `spatial_reuse_neighbours` to `<= spatial_pixel_radius - 5`.
    pub fn sanitize(&mut self) {
        let cores = num_cpus::get();
        if self.thread_count == 0 || self.thread_count > cores {
            self.thread_count = cores;
        }
        self.tile_size = self.tile_size.clamp(4, 256);
        if self.spatial_pixel_radius < 3 {
            self.spatial_pixel_radius = 3;
        }
        let max_neighbours = self.spatial_pixel_radius.saturating_sub(5);
        if self.spatial_reuse_neighbours > max_neighbours {
            self.spatial_reuse_neighbours = max_neighbours;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_internally_consistent() {
        let mut s = Settings::default();
        let before = s.clone();
        s.sanitize();
        assert_eq!(s, before);
    }

    #[test]
    fn sanitize_clamps_tile_size_into_bounds() {
        let mut s = Settings::default();
        s.tile_size = 1000;
        s.sanitize();
        assert_eq!(s.tile_size, 256);
        s.tile_size = 1;
        s.sanitize();
        assert_eq!(s.tile_size, 4);
    }

    #[test]
    fn sanitize_caps_spatial_neighbours_relative_to_radius() {
        let mut s = Settings::default();
        s.spatial_pixel_radius = 6;
        s.spatial_reuse_neighbours = 10;
        s.sanitize();
        assert_eq!(s.spatial_reuse_neighbours, 1);
    }

    #[test]
    fn equality_is_field_wise() {
        let a = Settings::default();
        let mut b = Settings::default();
        assert_eq!(a, b);
        b.eta = 0.5;
        assert_ne!(a, b);
    }
}
