//! End-to-end tests driving the full `Renderer` pipeline, covering the
//! frame-level invariants and concrete scenarios that no single module's
//! unit tests can exercise on their own.

use approx::assert_relative_eq;
use restir_di::accelerators::{quad, Blas, Tlas};
use restir_di::core::geometry::{Point3f, Transform, Vector3f};
use restir_di::{Camera, PointLight, Renderer, Rgb, Scene, Settings};

/// A ground plane at y=0, one white point light directly above, and a
/// camera looking straight down: the scene the worked examples use.
fn overhead_scene(settings: &Settings) -> Scene {
    let mut blas = Blas::default();
    let a = Point3f::new(-10.0, 0.0, -10.0);
    let b = Point3f::new(10.0, 0.0, -10.0);
    let c = Point3f::new(10.0, 0.0, 10.0);
    let d = Point3f::new(-10.0, 0.0, 10.0);
    blas.set_object(&quad(a, d, c, b)).unwrap();

    let mut tlas = Tlas::default();
    tlas.add_blas(std::sync::Arc::new(blas), Transform::default());
    tlas.update_transform(None);
    tlas.build();

    // Offset off the quad's shared a-c diagonal (the line x == z) so the
    // center pixel's ray doesn't land exactly on the triangle seam.
    let mut camera = Camera::new(settings.frame_width, settings.frame_height, 60.0);
    camera.position = Point3f::new(0.3, 0.5, 0.2);
    camera.rotation = Vector3f::new(-90.0, 0.0, 0.0);
    camera.update_state();

    Scene {
        camera,
        tlas,
        lights: vec![PointLight::new(Point3f::new(0.3, 1.0, 0.2), Rgb::splat(1.0))],
    }
}

fn small_settings() -> Settings {
    let mut settings = Settings::default();
    settings.frame_width = 16;
    settings.frame_height = 16;
    settings.thread_count = 2;
    settings.random_seed = false;
    settings
}

/// Invariant 6: the front framebuffer is always exactly `4 * W * H` bytes,
/// for every mode.
#[test]
fn frame_buffer_is_always_the_expected_length() {
    for mode in [
        restir_di::RenderMode::Normals,
        restir_di::RenderMode::TraversalSteps,
        restir_di::RenderMode::Di,
        restir_di::RenderMode::Restir,
    ] {
        let mut settings = small_settings();
        settings.mode = mode;
        let scene = overhead_scene(&settings);
        let (mut renderer, handle) = Renderer::new(settings.clone(), scene);
        renderer.run_frame();
        let front = handle.read_front();
        assert_eq!(front.len(), 4 * settings.frame_width as usize * settings.frame_height as usize);
    }
}

/// Concrete scenario 1: center pixel in Normals mode shows the up-facing
/// plane's normal remapped to `[0, 1]`, i.e. approximately `(0.5, 1.0, 0.5)`.
#[test]
fn normals_mode_center_pixel_matches_worked_example() {
    let mut settings = small_settings();
    settings.mode = restir_di::RenderMode::Normals;
    let scene = overhead_scene(&settings);
    let (mut renderer, handle) = Renderer::new(settings.clone(), scene);
    renderer.run_frame();
    let front = handle.read_front();

    let (cx, cy) = (settings.frame_width / 2, settings.frame_height / 2);
    let offset = 4 * (cy * settings.frame_width + cx) as usize;
    let r = front[offset] as f64 / 255.0;
    let g = front[offset + 1] as f64 / 255.0;
    let b = front[offset + 2] as f64 / 255.0;
    assert_relative_eq!(r, 0.5, epsilon = 0.05);
    assert_relative_eq!(g, 1.0, epsilon = 0.05);
    assert_relative_eq!(b, 0.5, epsilon = 0.05);
}

/// Concrete scenario 5: changing tile size alone (with `random_seed = false`)
/// must not change a single output pixel.
#[test]
fn tile_size_change_does_not_affect_output_pixels() {
    let mut settings_32 = small_settings();
    settings_32.mode = restir_di::RenderMode::Di;
    settings_32.sample_all_lights_di = true;
    settings_32.tile_size = 32;

    let mut settings_8 = settings_32.clone();
    settings_8.tile_size = 8;

    let scene_a = overhead_scene(&settings_32);
    let scene_b = overhead_scene(&settings_8);

    let (mut renderer_a, handle_a) = Renderer::new(settings_32, scene_a);
    let (mut renderer_b, handle_b) = Renderer::new(settings_8, scene_b);
    renderer_a.run_frame();
    renderer_b.run_frame();

    assert_eq!(handle_a.read_front(), handle_b.read_front());
}

/// Submitting new settings invalidates reservoir history for exactly the
/// next frame's temporal pass: verified here indirectly by checking the
/// renderer always completes a settings-changed
/// frame without panicking and that `FrameStats` still advances the frame
/// index normally (the temporal-skip itself is exercised at the unit level
/// by `reservoir_history_matters`).
#[test]
fn submitting_settings_does_not_disrupt_subsequent_frames() {
    let mut settings = small_settings();
    settings.mode = restir_di::RenderMode::Restir;
    let scene = overhead_scene(&settings);
    let (mut renderer, handle) = Renderer::new(settings.clone(), scene);

    renderer.run_frame();
    renderer.run_frame();

    let mut changed = settings.clone();
    changed.candidate_count_restir = 8;
    handle.submit_settings(changed);

    let stats = renderer.run_frame();
    assert_eq!(stats.frame_index, 2);
    let stats = renderer.run_frame();
    assert_eq!(stats.frame_index, 3);
}

/// Running several ReSTIR frames in sequence (RIS -> visibility -> temporal
/// -> spatial -> shading) must keep producing a fully-covered, finite-valued
/// frame: a basic sanity check that the pipeline doesn't leave any pixel
/// uninitialized or NaN once temporal/spatial reuse are both active.
#[test]
fn restir_pipeline_produces_finite_output_after_several_frames() {
    let mut settings = small_settings();
    settings.mode = restir_di::RenderMode::Restir;
    settings.candidate_count_restir = 4;
    let scene = overhead_scene(&settings);
    let (mut renderer, handle) = Renderer::new(settings, scene);

    for _ in 0..5 {
        renderer.run_frame();
    }

    let front = handle.read_front();
    assert!(!front.is_empty());
    // RGBA8 bytes are always finite by construction (u8), but the center
    // pixel under the light should be lit (non-black) by frame 5.
    let (cx, cy) = (8u32, 8u32);
    let offset = 4 * (cy * 16 + cx) as usize;
    let lit = front[offset] > 0 || front[offset + 1] > 0 || front[offset + 2] > 0;
    assert!(lit, "expected the pixel under the overhead light to be lit");
}

/// Resizing frame geometry mid-run (as settings submission would trigger)
/// must resize reservoir buffers and keep producing correctly-sized frames.
#[test]
fn resizing_output_resolution_resizes_reservoirs_and_framebuffer() {
    let mut settings = small_settings();
    let scene = overhead_scene(&settings);
    let (mut renderer, handle) = Renderer::new(settings.clone(), scene);
    renderer.run_frame();

    settings.frame_width = 24;
    settings.frame_height = 20;
    handle.submit_settings(settings.clone());
    renderer.run_frame();

    let front = handle.read_front();
    assert_eq!(front.len(), 4 * 24 * 20);
}
