//! RenderError
//!
//! Errors are only raised at ingest boundaries: loading a mesh, parsing a
//! scene description file. Nothing inside the per-frame render loop returns
//! a `Result`: a malformed in-memory scene is a programmer error, not a
//! recoverable one, and degenerate numeric inputs (NaN contributions, zero
//! lights) are logged and worked around rather than propagated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("mesh has {0} vertices, which is not a multiple of 3")]
    MalformedMesh(usize),

    #[error("scene config parse failure: {0}")]
    SceneConfig(#[from] toml::de::Error),

    #[error("failed to read scene file {path}: {source}")]
    SceneFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output image {path}: {source}")]
    ImageWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
