//! Renderer-side collaborators: geometry upload (wgpu buffers), uniform
//! blocks and per-frame draw planning.

pub mod frame;
pub mod geometry;
pub mod uniform;

use corelib::{Entity, MeshId};
use thiserror::Error;

pub use frame::{DrawCall, FramePlan};
pub use geometry::{GeometryUpload, GpuGeometry};
pub use uniform::{ProgramInputError, UniformBlock, UniformLayout, basic_layout};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Entity {entity} references unknown mesh {mesh}")]
    UnknownMesh { entity: Entity, mesh: MeshId },
    #[error("{label} holds {len} elements, more than a u32 draw range")]
    BufferTooLarge { label: String, len: usize },
    #[error(transparent)]
    ProgramInput(#[from] ProgramInputError),
}

pub type RenderResult<T> = Result<T, RenderError>;
