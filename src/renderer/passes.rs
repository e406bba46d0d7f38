//! Render passes
//!
//! Per-pixel kernels for every mode the renderer can run, plus the tiling
//! and fork/join machinery (`TileBounds`, `dispatch_tiled`, `merge_tiles`)
//! that turns a `Fn(x, y) -> T` pixel kernel into parallel work across a
//! `TaskBatch`. `Renderer::run_frame` composes these; nothing here holds
//! state across pixels or passes.

#![allow(dead_code)]

use crate::core::camera::Camera;
use crate::core::color::Rgb;
use crate::core::geometry::{Ray, Vector3f};
use crate::core::pbrt::Float;
use crate::core::reservoir::Reservoir;
use crate::core::rng::Rng;
use crate::core::sample::Sample;
use crate::core::scene::Scene;
use crate::core::settings::Settings;
use crate::core::task_batch::TaskBatch;
use itertools::iproduct;

/// A half-open pixel rectangle `[x0, x1) x [y0, y1)` dispatched as one
/// `TaskBatch` task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl TileBounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn len(&self) -> usize {
        (self.width() * self.height()) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions `width x height` into `tile_size x tile_size` tiles (the last
/// tile in each row/column may be smaller). Every pixel belongs to exactly
/// one tile.
pub fn tile_bounds(width: u32, height: u32, tile_size: u32) -> Vec<TileBounds> {
    let tile_size = tile_size.max(1);
    let tiles_x = (width + tile_size - 1) / tile_size;
    let tiles_y = (height + tile_size - 1) / tile_size;
    iproduct!(0..tiles_y, 0..tiles_x)
        .map(|(ty, tx)| {
            let y0 = ty * tile_size;
            let x0 = tx * tile_size;
            TileBounds {
                x0,
                y0,
                x1: (x0 + tile_size).min(width),
                y1: (y0 + tile_size).min(height),
            }
        })
        .collect()
}

/// Runs `f(x, y)` over every pixel of every tile, one `TaskBatch` task per
/// tile, and returns each tile's results in the same raster order its pixels
/// were visited in (`y0..y1`, then `x0..x1`). Pair with `merge_tiles` to
/// scatter the results back into a full-frame buffer.
///
/// This is the pipeline's only parallel entry point: each pass is one call
/// here, and `TaskBatch::execute`'s join is the hard barrier between passes.
pub fn dispatch_tiled<T, F>(tiles: &[TileBounds], thread_count: usize, f: F) -> Vec<Vec<T>>
where
    T: Send,
    F: Fn(u32, u32) -> T + Sync,
{
    let mut results: Vec<Vec<T>> = (0..tiles.len()).map(|_| Vec::new()).collect();
    let batch = TaskBatch::new(thread_count);
    let f_ref = &f;
    for (tile, slot) in tiles.iter().zip(results.iter_mut()) {
        batch.enqueue(move || {
            let mut local = Vec::with_capacity(tile.len());
            for y in tile.y0..tile.y1 {
                for x in tile.x0..tile.x1 {
                    local.push(f_ref(x, y));
                }
            }
            *slot = local;
        });
    }
    batch.execute();
    results
}

/// Scatters `results` (as produced by `dispatch_tiled`) into `target`,
/// indexed `y * width + x`.
pub fn merge_tiles<T: Copy>(width: u32, tiles: &[TileBounds], results: &[Vec<T>], target: &mut [T]) {
    for (tile, values) in tiles.iter().zip(results.iter()) {
        let mut idx = 0;
        for y in tile.y0..tile.y1 {
            for x in tile.x0..tile.x1 {
                target[(y * width + x) as usize] = values[idx];
                idx += 1;
            }
        }
    }
}

/// Packs a full-frame `Rgb` buffer to row-major RGBA8, saturating each
/// channel and leaving alpha opaque. No gamma curve.
pub fn pack_rgba8(pixels: &[Rgb]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        let [r, g, b] = p.to_rgb8();
        bytes.push(r);
        bytes.push(g);
        bytes.push(b);
        bytes.push(255);
    }
    bytes
}

/// Whether the previous frame's reservoir contents are eligible for
/// temporal reuse this frame: both the renderer's history-valid flag and
/// the user's temporal-reuse toggle must agree. Settings changes or a
/// scene/light reset clear `valid_history` for exactly one frame.
pub fn reservoir_history_matters(valid_history: bool, enable_temporal_reuse: bool) -> bool {
    valid_history && enable_temporal_reuse
}

fn pixel_seed(x: u32, y: u32, frame_index: u64, random_seed: bool) -> u32 {
    let base = x
        .wrapping_mul(73856093)
        ^ y.wrapping_mul(19349663)
        ^ (frame_index as u32).wrapping_mul(83492791);
    if random_seed {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u32)
            .unwrap_or(0);
        base ^ millis
    } else {
        base
    }
}

fn shadow_ray(origin: crate::core::geometry::Point3f, direction: Vector3f, distance: Float, eta: Float) -> Ray {
    let offset_origin = origin + direction * eta;
    let max_distance = (distance - 2.0 * eta).max(0.0);
    Ray::with_max_distance(offset_origin, direction, max_distance)
}

// ---------------------------------------------------------------------
// ReSTIR passes
// ---------------------------------------------------------------------

/// RIS candidate generation for one pixel. Traverses the primary ray once
/// (the hit is deterministic for a fixed `(x, y)`; only the chosen light
/// varies per candidate) and streams `candidate_count_restir` candidates
/// through a fresh reservoir.
pub fn ris_pixel(scene: &Scene, x: u32, y: u32, settings: &Settings, seed: u32) -> Reservoir {
    let mut rng = Rng::new(seed);
    let mut reservoir = Reservoir::new();

    if scene.lights.is_empty() {
        reservoir.finalize();
        return reservoir;
    }

    let mut ray = scene.camera.get_ray(x, y);
    scene.tlas.traverse(&mut ray);
    let hit = ray.hit_info;

    if !hit.hit {
        reservoir.finalize();
        return reservoir;
    }

    let light_count = scene.lights.len();
    let pdf = 1.0 / light_count as Float;
    for _ in 0..settings.candidate_count_restir.max(1) {
        let light = scene.lights[rng.random_index(light_count)];
        let sample = Sample::new(&hit, scene.camera.position, light, light_count as Float, pdf);
        let weight = if sample.pdf > 0.0 { sample.contribution / sample.pdf } else { 0.0 };
        reservoir.update(sample, weight, &mut rng);
    }
    reservoir.finalize();
    reservoir
}

/// Pre-shading visibility test: zeroes `weight_sample_out` on reservoirs
/// whose stored sample missed, faces away from its chosen light, or is
/// shadowed. Operates in place over the whole buffer (no RNG needed).
pub fn apply_visibility_in_place(reservoirs: &mut [Reservoir], scene: &Scene, eta: Float) {
    for reservoir in reservoirs.iter_mut() {
        if reservoir.weight_sample_out == 0.0 {
            continue;
        }
        let sample = &reservoir.sample;
        if !sample.hit || sample.light_direction.dot_normal(&sample.hit_normal) < 1e-3 {
            reservoir.weight_sample_out = 0.0;
            continue;
        }
        let shadow = shadow_ray(sample.hit_position, sample.light_direction, sample.light_distance, eta);
        if scene.tlas.is_occluded(&shadow) {
            reservoir.weight_sample_out = 0.0;
        }
    }
}

/// Rebinds `sample`'s light onto `hit`'s surface: copies `hit`'s geometric
/// fields in, keeps `sample.light`, and recomputes direction/BRDF/
/// contribution against the new surface. Used by temporal and spatial
/// reuse when a neighbour's winning candidate is adopted by this pixel.
fn rebind_to_hit(mut sample: Sample, hit: &Sample) -> Sample {
    sample.hit = hit.hit;
    sample.hit_distance = hit.hit_distance;
    sample.hit_position = hit.hit_position;
    sample.hit_normal = hit.hit_normal;
    sample.hit_prev_position = hit.hit_prev_position;
    sample.hit_prev_normal = hit.hit_prev_normal;
    let light = sample.light;
    sample.replace_light(light);
    sample
}

/// Temporal reuse for one pixel: reprojects this pixel's hit into the
/// previous frame, and if the previous frame's reservoir at that location
/// passes the distance/normal/visibility gates, combines it in (with its
/// `M` capped) and rebinds the combined light onto this frame's surface.
/// Returns `current` unchanged on any rejection.
pub fn temporal_reuse_pixel(
    scene: &Scene,
    prev_camera: &Camera,
    current: &Reservoir,
    previous: &[Reservoir],
    width: u32,
    height: u32,
    settings: &Settings,
    seed: u32,
) -> Reservoir {
    let mut rng = Rng::new(seed);

    if !current.sample.hit {
        return *current;
    }

    let (px, py) = prev_camera.world_to_screen(current.sample.hit_prev_position, &mut rng);
    if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
        return *current;
    }
    let prev_index = (py as u32 * width + px as u32) as usize;
    let prev_reservoir = previous[prev_index];
    if !prev_reservoir.sample.hit {
        return *current;
    }

    let max_distance =
        settings.temporal_max_distance + current.sample.hit_distance * settings.temporal_max_distance_depth_scaling;
    if current
        .sample
        .hit_prev_position
        .distance(&prev_reservoir.sample.hit_position)
        > max_distance
    {
        return *current;
    }

    let similarity = current
        .sample
        .hit_normal
        .dot(&Vector3f::from(prev_reservoir.sample.hit_normal));
    if similarity < settings.temporal_min_normal_similarity {
        return *current;
    }

    let to_light = prev_reservoir.sample.light.position - current.sample.hit_position;
    let light_distance = to_light.length();
    let light_direction = to_light.normalize();
    let shadow = shadow_ray(current.sample.hit_position, light_direction, light_distance, settings.eta);
    if scene.tlas.is_occluded(&shadow) {
        return *current;
    }

    let mut capped_previous = prev_reservoir;
    let cap = settings.temporal_sample_count_ratio.saturating_mul(current.sample_count.max(1));
    if capped_previous.sample_count > cap {
        capped_previous.sample_count = cap;
    }

    let mut combined = current.combine_biased(&capped_previous, &mut rng);
    combined.sample = rebind_to_hit(combined.sample, &current.sample);
    combined
}

/// One neighbour pick for spatial reuse: a pixel inside a disk of
/// `radius` pixels around `(x, y)`, chosen by rejection sampling on
/// Euclidean distance (not Chebyshev/Manhattan) and excluding `(x, y)`
/// itself. Gives up after a bounded number of attempts rather than looping
/// forever near the frame edge.
fn pick_neighbour_pixel(x: u32, y: u32, width: u32, height: u32, radius: u32, rng: &mut Rng) -> Option<(u32, u32)> {
    let radius = radius.max(1) as i32;
    for _ in 0..8 {
        let dx = rng.random_int(-radius, radius + 1);
        let dy = rng.random_int(-radius, radius + 1);
        if dx == 0 && dy == 0 {
            continue;
        }
        if ((dx * dx + dy * dy) as Float).sqrt() > radius as Float {
            continue;
        }
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 || nx as u32 >= width || ny as u32 >= height {
            continue;
        }
        return Some((nx as u32, ny as u32));
    }
    None
}

/// Spatial reuse for one pixel: starting from `current[x, y]`, combines in
/// up to `spatial_reuse_neighbours` reservoirs from nearby pixels that pass
/// the same distance/normal/visibility gates temporal reuse uses (no
/// previous-frame reprojection; everything here is same-frame). Callers
/// write the result into the scratch buffer, then rotate scratch into
/// current once every pixel has been processed.
pub fn spatial_reuse_pixel(
    scene: &Scene,
    current: &[Reservoir],
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    settings: &Settings,
    seed: u32,
) -> Reservoir {
    let mut rng = Rng::new(seed);
    let mut combined = current[(y * width + x) as usize];
    if !combined.sample.hit {
        return combined;
    }

    for _ in 0..settings.spatial_reuse_neighbours {
        let (nx, ny) = match pick_neighbour_pixel(x, y, width, height, settings.spatial_pixel_radius, &mut rng) {
            Some(p) => p,
            None => continue,
        };
        let neighbour = current[(ny * width + nx) as usize];
        if !neighbour.sample.hit {
            continue;
        }

        let max_distance =
            settings.spatial_max_distance + combined.sample.hit_distance * settings.spatial_max_distance_depth_scaling;
        if combined.sample.hit_position.distance(&neighbour.sample.hit_position) > max_distance {
            continue;
        }

        let similarity = combined
            .sample
            .hit_normal
            .dot(&Vector3f::from(neighbour.sample.hit_normal));
        if similarity < settings.spatial_min_normal_similarity {
            continue;
        }

        let to_light = neighbour.sample.light.position - combined.sample.hit_position;
        let light_distance = to_light.length();
        let light_direction = to_light.normalize();
        let shadow = shadow_ray(combined.sample.hit_position, light_direction, light_distance, settings.eta);
        if scene.tlas.is_occluded(&shadow) {
            continue;
        }

        let hit_surface = combined.sample;
        let mut merged = combined.combine_biased(&neighbour, &mut rng);
        merged.sample = rebind_to_hit(merged.sample, &hit_surface);
        combined = merged;
    }
    combined
}

/// Final shading for one pixel's reservoir: black if the stored sample
/// missed, faces away from its light, or carries zero weight; otherwise an
/// (optional) occlusion test followed by `BRDF * emission / d^2 * W`.
pub fn shade_pixel(scene: &Scene, reservoir: &Reservoir, settings: &Settings) -> Rgb {
    let sample = &reservoir.sample;
    if !sample.hit || sample.brdf <= 1e-3 || reservoir.weight_sample_out <= 0.0 {
        return Rgb::black();
    }
    let shadow = shadow_ray(sample.hit_position, sample.light_direction, sample.light_distance, settings.eta);
    if scene.tlas.is_occluded(&shadow) {
        return Rgb::black();
    }
    let attenuation = sample.light.emission * (sample.brdf / (sample.light_distance * sample.light_distance));
    attenuation * reservoir.weight_sample_out
}

// ---------------------------------------------------------------------
// Non-ReSTIR modes
// ---------------------------------------------------------------------

/// Visualizes the closest-hit surface normal (or, with
/// `render_prev_normals`, its previous-frame reprojection), remapped from
/// `[-1, 1]` to `[0, 1]`. Background (no hit) is black.
///
/// `width` must be the same output width the caller built `tiles` from
/// (`Settings::frame_width`), not `scene.camera`'s, since the two can
/// disagree for one frame while a resolution change is being ingested.
pub fn run_normals_pass(scene: &Scene, settings: &Settings, tiles: &[TileBounds], width: u32, _frame_index: u64, target: &mut [Rgb]) {
    let results = dispatch_tiled(tiles, settings.thread_count, |x, y| normals_pixel(scene, settings, x, y));
    merge_tiles(width, tiles, &results, target);
}

fn normals_pixel(scene: &Scene, settings: &Settings, x: u32, y: u32) -> Rgb {
    let mut ray = scene.camera.get_ray(x, y);
    scene.tlas.traverse(&mut ray);
    if !ray.hit_info.hit {
        return Rgb::black();
    }
    let n = if settings.render_prev_normals {
        ray.hit_info.prev_normal
    } else {
        ray.hit_info.normal
    };
    Rgb::new(0.5 * n.x + 0.5, 0.5 * n.y + 0.5, 0.5 * n.z + 0.5)
}

/// False-colours the BVH traversal-step counter of the closest-hit query, a
/// diagnostic mode with no bearing on lighting. `width` is the output
/// width `tiles` was built from (see `run_normals_pass`).
pub fn run_traversal_steps_pass(scene: &Scene, tiles: &[TileBounds], width: u32, _frame_index: u64, target: &mut [Rgb]) {
    let thread_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let results = dispatch_tiled(tiles, thread_count, |x, y| traversal_steps_pixel(scene, x, y));
    merge_tiles(width, tiles, &results, target);
}

fn traversal_steps_pixel(scene: &Scene, x: u32, y: u32) -> Rgb {
    let mut ray = scene.camera.get_ray(x, y);
    scene.tlas.traverse(&mut ray);
    let t = (ray.hit_info.traversal_steps_total as Float / 64.0).min(1.0);
    Rgb::new(t, 1.0 - t, 0.0)
}

/// Next-event-estimation direct illumination: either every light, or
/// `candidate_count_di` random ones rescaled by `light_count / N`, each
/// contributing `BRDF * emission / d^2` with optional occlusion. `width` is
/// the output width `tiles` was built from (see `run_normals_pass`).
pub fn run_di_pass(scene: &Scene, settings: &Settings, tiles: &[TileBounds], width: u32, frame_index: u64, target: &mut [Rgb]) {
    let results = dispatch_tiled(tiles, settings.thread_count, |x, y| {
        di_pixel(scene, settings, x, y, pixel_seed(x, y, frame_index, settings.random_seed))
    });
    merge_tiles(width, tiles, &results, target);
}

fn di_pixel(scene: &Scene, settings: &Settings, x: u32, y: u32, seed: u32) -> Rgb {
    let mut ray = scene.camera.get_ray(x, y);
    scene.tlas.traverse(&mut ray);
    if !ray.hit_info.hit || scene.lights.is_empty() {
        return Rgb::black();
    }
    let hit = ray.hit_info;
    let light_count = scene.lights.len();

    let mut rng = Rng::new(seed);
    let (indices, scale): (Vec<usize>, Float) = if settings.sample_all_lights_di {
        ((0..light_count).collect(), 1.0)
    } else {
        let n = (settings.candidate_count_di.max(1) as usize).min(light_count);
        let picks = (0..n).map(|_| rng.random_index(light_count)).collect();
        (picks, light_count as Float / n as Float)
    };

    let mut total = Rgb::black();
    for index in indices {
        let light = scene.lights[index];
        let sample = Sample::new(&hit, scene.camera.position, light, 1.0, 1.0);
        if sample.brdf <= 0.0 {
            continue;
        }
        if settings.occlusion_check_di {
            let shadow = shadow_ray(sample.hit_position, sample.light_direction, sample.light_distance, settings.eta);
            if scene.tlas.is_occluded(&shadow) {
                continue;
            }
        }
        total += light.emission * (sample.brdf / (sample.light_distance * sample.light_distance));
    }
    total * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accelerators::{quad, Blas, Tlas};
    use crate::core::geometry::{Point3f, Transform};
    use crate::core::light::PointLight;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn tile_bounds_partitions_every_pixel_exactly_once() {
        let tiles = tile_bounds(37, 19, 8);
        let mut covered = vec![0u32; 37 * 19];
        for tile in &tiles {
            for y in tile.y0..tile.y1 {
                for x in tile.x0..tile.x1 {
                    covered[(y * 37 + x) as usize] += 1;
                }
            }
        }
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn dispatch_and_merge_round_trip_preserves_values() {
        let tiles = tile_bounds(10, 10, 3);
        let results = dispatch_tiled(&tiles, 4, |x, y| x * 100 + y);
        let mut target = vec![0u32; 100];
        merge_tiles(10, &tiles, &results, &mut target);
        for y in 0..10u32 {
            for x in 0..10u32 {
                assert_eq!(target[(y * 10 + x) as usize], x * 100 + y);
            }
        }
    }

    #[test]
    fn pack_rgba8_has_opaque_alpha_and_correct_length() {
        let pixels = vec![Rgb::new(0.0, 0.5, 1.0); 6];
        let bytes = pack_rgba8(&pixels);
        assert_eq!(bytes.len(), 6 * 4);
        for chunk in bytes.chunks_exact(4) {
            assert_eq!(chunk[3], 255);
        }
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[2], 255);
    }

    #[test]
    fn reservoir_history_matters_requires_both_flags() {
        assert!(reservoir_history_matters(true, true));
        assert!(!reservoir_history_matters(false, true));
        assert!(!reservoir_history_matters(true, false));
    }

    #[test]
    fn ris_pixel_with_no_lights_is_zero_weight() {
        let scene = Scene::default();
        let settings = Settings::default();
        let r = ris_pixel(&scene, 0, 0, &settings, 1);
        assert_eq!(r.weight_sample_out, 0.0);
    }

    #[test]
    fn shade_pixel_is_black_for_a_miss() {
        let scene = Scene::default();
        let settings = Settings::default();
        let reservoir = Reservoir::new();
        assert_eq!(shade_pixel(&scene, &reservoir, &settings), Rgb::black());
    }

    /// A ground plane facing up at y=0, one white point light directly
    /// above it, and a camera looking straight down from (0, 0.5, 0): the
    /// scenario used for the Normals/DI worked examples.
    fn overhead_scene() -> Scene {
        let mut blas = Blas::default();
        // Consecutive corners in winding order, split along the a-c
        // diagonal with both triangles facing up.
        let a = Point3f::new(-10.0, 0.0, -10.0);
        let b = Point3f::new(10.0, 0.0, -10.0);
        let c = Point3f::new(10.0, 0.0, 10.0);
        let d = Point3f::new(-10.0, 0.0, 10.0);
        blas.set_object(&quad(a, d, c, b)).unwrap();

        let mut tlas = Tlas::default();
        tlas.add_blas(Arc::new(blas), Transform::default());
        tlas.update_transform(None);
        tlas.build();

        // Off-center so the primary ray doesn't land exactly on the
        // triangle-pair's shared diagonal.
        let mut camera = Camera::new(64, 64, 60.0);
        camera.position = Point3f::new(0.3, 0.5, 0.2);
        camera.rotation = Vector3f::new(-90.0, 0.0, 0.0);
        camera.update_state();

        Scene {
            camera,
            tlas,
            lights: vec![PointLight::new(Point3f::new(0.3, 1.0, 0.2), Rgb::splat(1.0))],
        }
    }

    #[test]
    fn normals_mode_shows_up_facing_plane_under_overhead_camera() {
        let scene = overhead_scene();
        let settings = Settings::default();
        let color = normals_pixel(&scene, &settings, 32, 32);
        assert_relative_eq!(color.r, 0.5, epsilon = 0.05);
        assert_relative_eq!(color.g, 1.0, epsilon = 0.05);
        assert_relative_eq!(color.b, 0.5, epsilon = 0.05);
    }

    #[test]
    fn di_all_lights_matches_lambertian_inverse_square_law() {
        let scene = overhead_scene();
        let mut settings = Settings::default();
        settings.sample_all_lights_di = true;
        settings.occlusion_check_di = true;
        let color = di_pixel(&scene, &settings, 32, 32, 1);
        // d = 0.5, BRDF = 1 -> emission / d^2 = 4.
        assert_relative_eq!(color.r, 4.0, epsilon = 0.1);
        assert_relative_eq!(color.g, 4.0, epsilon = 0.1);
        assert_relative_eq!(color.b, 4.0, epsilon = 0.1);
    }

    #[test]
    fn ris_single_light_no_reuse_matches_di_up_to_noise() {
        let scene = overhead_scene();
        let mut settings = Settings::default();
        settings.candidate_count_restir = 1;
        settings.enable_visibility_pass = false;
        settings.enable_temporal_reuse = false;
        settings.enable_spatial_reuse = false;

        let reservoir = ris_pixel(&scene, 32, 32, &settings, 7);
        let shaded = shade_pixel(&scene, &reservoir, &settings);

        let di_settings = Settings {
            sample_all_lights_di: true,
            ..settings
        };
        let di = di_pixel(&scene, &di_settings, 32, 32, 1);

        assert_relative_eq!(shaded.r, di.r, epsilon = 0.1);
    }

    #[test]
    fn visibility_pass_zeroes_occluded_reservoirs() {
        let scene = overhead_scene();
        let settings = Settings::default();
        let mut reservoirs = vec![ris_pixel(&scene, 32, 32, &settings, 3)];
        // Force occlusion by moving the stored light underneath the plane.
        reservoirs[0].sample.light.position = Point3f::new(0.0, -5.0, 0.0);
        reservoirs[0].sample.replace_light(reservoirs[0].sample.light);
        apply_visibility_in_place(&mut reservoirs, &scene, settings.eta);
        assert_eq!(reservoirs[0].weight_sample_out, 0.0);
    }
}
