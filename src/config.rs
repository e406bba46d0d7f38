//! Scene configuration
//!
//! TOML-deserializable description of a demo scene: the initial camera, a
//! handful of procedural primitives (the one piece of "mesh loading" this
//! core needs, since OBJ import is out of scope), the point-light box used
//! to generate the initial light list, and the frame's `Settings`. This is
//! new surface introduced to exercise the library headlessly: persistent
//! scene *editing*/undo is out of scope, not one-shot scene loading.

use crate::accelerators::{quad, Blas, Tlas};
use crate::core::camera::Camera;
use crate::core::error::{RenderError, RenderResult};
use crate::core::geometry::{Point3f, Transform, Vector3f};
use crate::core::scene::Scene;
use crate::core::settings::Settings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub vertical_fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 5.0],
            rotation: [0.0, 0.0, 0.0],
            vertical_fov: 60.0,
        }
    }
}

/// A procedural primitive, standing in for OBJ import.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PrimitiveConfig {
    /// A flat quad of the given half-extent in its local XZ plane, normal
    /// facing +Y before `transform` is applied.
    Quad { half_extent: f32 },
    /// A unit cube (side 2, centered at the origin), 12 triangles.
    Cube,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

impl TransformConfig {
    fn to_transform(&self) -> Transform {
        Transform::new(
            Vector3f::new(self.translation[0], self.translation[1], self.translation[2]),
            Vector3f::new(self.rotation[0], self.rotation[1], self.rotation[2]),
            Vector3f::new(self.scale[0], self.scale[1], self.scale[2]),
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub name: String,
    pub primitive: PrimitiveConfig,
    #[serde(default)]
    pub transform: TransformConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightBoxConfig {
    pub count: usize,
    pub box_min: [f32; 3],
    pub box_max: [f32; 3],
    pub intensity: f32,
    pub seed: u32,
}

/// The demo binary's scene file: camera, procedural objects, the light
/// generation box, and the frame's `Settings`, all loaded from one TOML
/// document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
    pub lights: LightBoxConfig,
    #[serde(default)]
    pub settings: Settings,
}

impl SceneConfig {
    pub fn from_toml_str(text: &str) -> RenderResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &str) -> RenderResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::SceneFileRead {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builds a runnable `Scene`: each object's primitive is triangulated
    /// into a fresh `Blas` and instanced into the `Tlas` with its
    /// transform, and the light box is realized into a concrete light
    /// list. The camera is sized to `settings.frame_{width,height}`.
    pub fn build(&self) -> RenderResult<Scene> {
        let mut camera = Camera::new(
            self.settings.frame_width.max(1),
            self.settings.frame_height.max(1),
            self.camera.vertical_fov,
        );
        camera.position = Point3f::new(self.camera.position[0], self.camera.position[1], self.camera.position[2]);
        camera.rotation = Vector3f::new(self.camera.rotation[0], self.camera.rotation[1], self.camera.rotation[2]);
        camera.update_state();

        let mut tlas = Tlas::default();
        for object in &self.objects {
            let vertices = triangulate(&object.primitive);
            let mut blas = Blas::default();
            if let Err(err) = blas.set_object(&vertices) {
                // Mesh load failure: report and skip the object, per the
                // ingest-boundary error policy. The rest of the scene still
                // loads.
                log::warn!("dropping object \"{}\": {}", object.name, err);
                continue;
            }
            let index = tlas.add_blas(Arc::new(blas), object.transform.to_transform());
            tlas.set_name(index, &object.name);
        }
        tlas.update_transform(None);
        tlas.build();

        let mut scene = Scene {
            camera,
            tlas,
            lights: Vec::new(),
        };
        scene.regenerate_lights(
            self.lights.count,
            Point3f::new(self.lights.box_min[0], self.lights.box_min[1], self.lights.box_min[2]),
            Point3f::new(self.lights.box_max[0], self.lights.box_max[1], self.lights.box_max[2]),
            self.lights.intensity,
            self.lights.seed,
        );
        Ok(scene)
    }
}

fn triangulate(primitive: &PrimitiveConfig) -> Vec<Point3f> {
    match primitive {
        PrimitiveConfig::Quad { half_extent } => {
            let e = *half_extent;
            quad(
                Point3f::new(-e, 0.0, -e),
                Point3f::new(-e, 0.0, e),
                Point3f::new(e, 0.0, e),
                Point3f::new(e, 0.0, -e),
            )
        }
        PrimitiveConfig::Cube => cube_vertices(),
    }
}

/// Twelve triangles over the six faces of a 2x2x2 cube centered at the
/// origin, each face wound so its normal faces outward.
fn cube_vertices() -> Vec<Point3f> {
    let p = |x: f32, y: f32, z: f32| Point3f::new(x, y, z);
    let (n, f) = (-1.0f32, 1.0f32);
    let mut vertices = Vec::with_capacity(36);
    vertices.extend(quad(p(n, f, n), p(n, f, f), p(f, f, f), p(f, f, n))); // +Y
    vertices.extend(quad(p(n, n, f), p(n, n, n), p(f, n, n), p(f, n, f))); // -Y
    vertices.extend(quad(p(f, n, n), p(f, f, n), p(f, f, f), p(f, n, f))); // +X
    vertices.extend(quad(p(n, n, f), p(n, f, f), p(n, f, n), p(n, n, n))); // -X
    vertices.extend(quad(p(f, n, f), p(f, f, f), p(n, f, f), p(n, n, f))); // +Z
    vertices.extend(quad(p(n, n, n), p(n, f, n), p(f, f, n), p(f, n, n))); // -Z
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [camera]
        position = [0.0, 1.0, 5.0]
        rotation = [0.0, 0.0, 0.0]
        vertical_fov = 60.0

        [[objects]]
        name = "ground"

        [objects.transform]
        translation = [0.0, 0.0, 0.0]

        [objects.primitive]
        kind = "Quad"
        half_extent = 10.0

        [lights]
        count = 4
        box_min = [-2.0, 2.0, -2.0]
        box_max = [2.0, 4.0, 2.0]
        intensity = 5.0
        seed = 1
    "#;

    #[test]
    fn parses_a_minimal_scene_file() {
        let config = SceneConfig::from_toml_str(EXAMPLE).unwrap();
        assert_eq!(config.objects.len(), 1);
        assert_eq!(config.lights.count, 4);
    }

    #[test]
    fn builds_a_scene_with_the_requested_light_count_and_one_instance() {
        let config = SceneConfig::from_toml_str(EXAMPLE).unwrap();
        let scene = config.build().unwrap();
        assert_eq!(scene.lights.len(), 4);
        assert_eq!(scene.tlas.object_count(), 1);
    }

    #[test]
    fn malformed_toml_is_a_scene_config_error() {
        let err = SceneConfig::from_toml_str("not valid toml [[[").unwrap_err();
        assert!(matches!(err, RenderError::SceneConfig(_)));
    }

    #[test]
    fn missing_scene_file_is_a_read_error() {
        let err = SceneConfig::load("/nonexistent/path/to/scene.toml").unwrap_err();
        assert!(matches!(err, RenderError::SceneFileRead { .. }));
    }
}
