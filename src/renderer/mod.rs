//! Renderer
//!
//! Drives the endless render loop described in the core's pipeline: per
//! frame, ingest any submitted settings/scene, dispatch tiled passes through
//! `TaskBatch`, and hand the finished frame to the presenter. Two
//! long-lived threads are expected around this type: a UI/presentation
//! thread holding a `RendererHandle` (submits settings/scenes, reads the
//! front framebuffer) and a render thread that owns a `Renderer` and calls
//! `run_frame` in a loop.

#![allow(dead_code)]

mod passes;

use crate::core::buffers::{DoubleFrameBuffer, TripleReservoirBuffer};
use crate::core::camera::Camera;
use crate::core::color::Rgb;
use crate::core::scene::Scene;
use crate::core::settings::{RenderMode, Settings};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use passes::reservoir_history_matters;

/// State shared between the render thread and the UI/presentation thread.
/// Every field here is guarded by its own short-held lock; the render
/// thread never holds one of these while doing pixel work.
struct SharedState {
    framebuffer: Mutex<DoubleFrameBuffer>,
    settings_slot: Mutex<Option<Settings>>,
    scene_slot: Mutex<Option<Scene>>,
    terminate: AtomicBool,
}

/// A cloneable, `Send + Sync` reference to a running `Renderer`'s shared
/// state. This is what the UI/presentation thread holds.
#[derive(Clone)]
pub struct RendererHandle(Arc<SharedState>);

impl RendererHandle {
    /// Submits new settings to be picked up at the render thread's next
    /// frame boundary. Overwrites any settings submitted but not yet
    /// consumed.
    pub fn submit_settings(&self, settings: Settings) {
        *self.0.settings_slot.lock() = Some(settings);
    }

    /// Submits a new scene to be picked up at the render thread's next
    /// frame boundary.
    pub fn submit_scene(&self, scene: Scene) {
        *self.0.scene_slot.lock() = Some(scene);
    }

    /// Copies the currently presented frame out. Callers upload this to a
    /// texture or write it to disk; the lock is held only for the copy.
    pub fn read_front(&self) -> Vec<u8> {
        self.0.framebuffer.lock().front().to_vec()
    }

    /// Signals the render loop to stop at its next iteration boundary.
    pub fn request_terminate(&self) {
        self.0.terminate.store(true, Ordering::Relaxed);
    }

    pub fn should_terminate(&self) -> bool {
        self.0.terminate.load(Ordering::Relaxed)
    }
}

/// Owns the render thread's private state: live settings/scene, the
/// previous frame's camera (for temporal reprojection), and the reservoir
/// history. Created once per render thread.
pub struct Renderer {
    shared: Arc<SharedState>,
    settings: Settings,
    scene: Scene,
    prev_camera: Camera,
    reservoirs: TripleReservoirBuffer,
    valid_history: bool,
    frame_index: u64,
}

/// Diagnostics returned after each frame, useful for the demo binary's
/// logging and for tests.
#[derive(Copy, Clone, Debug)]
pub struct FrameStats {
    pub frame_index: u64,
    pub frame_time: Duration,
    pub triangle_count: u64,
}

impl Renderer {
    /// Creates a renderer with its initial settings/scene and the
    /// `RendererHandle` a UI/presentation thread should hold.
    pub fn new(mut settings: Settings, scene: Scene) -> (Self, RendererHandle) {
        settings.sanitize();
        let shared = Arc::new(SharedState {
            framebuffer: Mutex::new(DoubleFrameBuffer::new(settings.frame_width, settings.frame_height)),
            settings_slot: Mutex::new(None),
            scene_slot: Mutex::new(None),
            terminate: AtomicBool::new(false),
        });
        let reservoirs = TripleReservoirBuffer::new(settings.frame_width, settings.frame_height);
        let prev_camera = scene.camera;
        let renderer = Self {
            shared: Arc::clone(&shared),
            settings,
            scene,
            prev_camera,
            reservoirs,
            valid_history: false,
            frame_index: 0,
        };
        (renderer, RendererHandle(shared))
    }

    pub fn handle(&self) -> RendererHandle {
        RendererHandle(Arc::clone(&self.shared))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs frames until `RendererHandle::request_terminate` is observed.
    pub fn run(&mut self) {
        while !self.shared.terminate.load(Ordering::Relaxed) {
            self.run_frame();
        }
    }

    /// Runs exactly `count` frames regardless of the terminate flag, for
    /// the headless demo binary and for tests.
    pub fn run_frames(&mut self, count: u32) -> Vec<FrameStats> {
        (0..count).map(|_| self.run_frame()).collect()
    }

    /// Runs one iteration of the pipeline described in the module docs.
    pub fn run_frame(&mut self) -> FrameStats {
        let start = Instant::now();

        // Step 2: ingest submitted settings.
        if let Some(new_settings) = self.shared.settings_slot.lock().take() {
            let mut new_settings = new_settings;
            new_settings.sanitize();
            if new_settings != self.settings {
                self.valid_history = false;
                log::info!("settings changed, invalidating reservoir history for this frame");
            }
            self.settings = new_settings;
        }

        // Step 3: ingest a submitted scene.
        if let Some(mut new_scene) = self.shared.scene_slot.lock().take() {
            self.prev_camera = self.scene.camera;
            let previous_transforms = self.scene.tlas.transforms_snapshot();
            new_scene.camera.update_state();
            new_scene.tlas.update_transform(Some(&previous_transforms));
            new_scene.tlas.build();
            self.scene = new_scene;
        }

        // Step 4: resize output buffers if geometry changed.
        let (width, height) = (self.settings.frame_width, self.settings.frame_height);
        if self.reservoirs.resolution() != (width, height) {
            self.reservoirs.resize(width, height);
            self.valid_history = false;
        }
        if self.scene.camera.resolution() != (width, height) {
            self.scene.camera.set_resolution(width, height);
            self.scene.camera.update_state();
        }

        let tiles = passes::tile_bounds(width, height, self.settings.tile_size);
        let triangle_count = self.scene.tlas.triangle_count();

        log::info!(
            "frame {}: dispatching {} tiles of size {} in mode {:?}",
            self.frame_index,
            tiles.len(),
            self.settings.tile_size,
            self.settings.mode
        );

        let pixels = match self.settings.mode {
            RenderMode::Normals => {
                let mut target = self.blank_pixel_buffer();
                passes::run_normals_pass(&self.scene, &self.settings, &tiles, width, self.frame_index, &mut target);
                target
            }
            RenderMode::TraversalSteps => {
                let mut target = self.blank_pixel_buffer();
                passes::run_traversal_steps_pass(&self.scene, &tiles, width, self.frame_index, &mut target);
                target
            }
            RenderMode::Di => {
                let mut target = self.blank_pixel_buffer();
                passes::run_di_pass(&self.scene, &self.settings, &tiles, width, self.frame_index, &mut target);
                target
            }
            RenderMode::Restir => self.run_restir_pipeline(&tiles),
        };

        let back_bytes = passes::pack_rgba8(&pixels);
        let old_front = self.shared.framebuffer.lock().swap(back_bytes);
        drop(old_front);

        self.reservoirs.swap_temporal();
        self.valid_history = true;
        self.frame_index += 1;

        FrameStats {
            frame_index: self.frame_index - 1,
            frame_time: start.elapsed(),
            triangle_count,
        }
    }

    fn run_restir_pipeline(&mut self, tiles: &[passes::TileBounds]) -> Vec<Rgb> {
        let thread_count = self.settings.thread_count;
        let (width, height) = (self.settings.frame_width, self.settings.frame_height);

        let ris_results = passes::dispatch_tiled(tiles, thread_count, |x, y| {
            passes::ris_pixel(&self.scene, x, y, &self.settings, self.tile_seed(x, y))
        });
        passes::merge_tiles(width, tiles, &ris_results, self.reservoirs.current_mut());

        if self.settings.enable_visibility_pass {
            passes::apply_visibility_in_place(self.reservoirs.current_mut(), &self.scene, self.settings.eta);
        }

        if passes::reservoir_history_matters(self.valid_history, self.settings.enable_temporal_reuse) {
            let previous = self.reservoirs.previous().to_vec();
            let temporal_results = passes::dispatch_tiled(tiles, thread_count, |x, y| {
                let index = (y * width + x) as usize;
                passes::temporal_reuse_pixel(
                    &self.scene,
                    &self.prev_camera,
                    &self.reservoirs.current()[index],
                    &previous,
                    width,
                    height,
                    &self.settings,
                    self.tile_seed(x, y),
                )
            });
            passes::merge_tiles(width, tiles, &temporal_results, self.reservoirs.current_mut());
        }

        if self.settings.enable_spatial_reuse {
            let current_snapshot = self.reservoirs.current().to_vec();
            let spatial_results = passes::dispatch_tiled(tiles, thread_count, |x, y| {
                passes::spatial_reuse_pixel(&self.scene, &current_snapshot, x, y, width, height, &self.settings, self.tile_seed(x, y))
            });
            passes::merge_tiles(width, tiles, &spatial_results, self.reservoirs.scratch_mut());
            self.reservoirs.swap_spatial();
        }

        let shading_results = passes::dispatch_tiled(tiles, thread_count, |x, y| {
            let index = (y * width + x) as usize;
            passes::shade_pixel(&self.scene, &self.reservoirs.current()[index], &self.settings)
        });
        let mut pixels = self.blank_pixel_buffer();
        passes::merge_tiles(width, tiles, &shading_results, &mut pixels);
        pixels
    }

    fn tile_seed(&self, x: u32, y: u32) -> u32 {
        let base = x.wrapping_mul(73856093) ^ y.wrapping_mul(19349663) ^ (self.frame_index as u32).wrapping_mul(83492791);
        if self.settings.random_seed {
            let millis = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u32)
                .unwrap_or(0);
            base ^ millis
        } else {
            base
        }
    }

    /// A fresh, black pixel buffer sized to the current output resolution.
    fn blank_pixel_buffer(&self) -> Vec<Rgb> {
        let (width, height) = (self.settings.frame_width, self.settings.frame_height);
        vec![Rgb::black(); (width * height) as usize]
    }
}
