//! Per-frame draw planning: camera matrices once, one draw call per
//! renderable scene object.

use corelib::{Color, DrawMode, Entity, Mat4, MeshId, camera::Camera, scene::Scene};
use wgpu::PrimitiveTopology;

use crate::{
    RenderError, RenderResult,
    geometry::topology,
    uniform::{COLOR, MODEL_MATRIX, PROJECTION_MATRIX, UniformBlock, VIEW_MATRIX},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub entity: Entity,
    pub mesh: MeshId,
    pub draw_mode: DrawMode,
    pub topology: PrimitiveTopology,
    pub model: Mat4,
    pub color: Color,
    pub index_count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub view: Mat4,
    pub projection: Mat4,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    /// `index_count` resolves a mesh + draw mode to its index count, or
    /// `None` if the mesh is not loaded.
    pub fn build<F>(scene: &Scene, camera: &Camera, mut index_count: F) -> RenderResult<Self>
    where
        F: FnMut(MeshId, DrawMode) -> Option<u32>,
    {
        let mut draws = Vec::with_capacity(scene.len());
        for (entity, transform, renderable) in scene.iter_renderables() {
            let count = index_count(renderable.mesh, renderable.draw_mode).ok_or(
                RenderError::UnknownMesh {
                    entity,
                    mesh: renderable.mesh,
                },
            )?;
            draws.push(DrawCall {
                entity,
                mesh: renderable.mesh,
                draw_mode: renderable.draw_mode,
                topology: topology(renderable.draw_mode),
                model: transform.matrix(),
                color: renderable.color,
                index_count: count,
            });
        }

        Ok(Self {
            view: camera.view(),
            projection: camera.proj(),
            draws,
        })
    }

    /// Fill the per-draw uniforms of the flat-color program.
    pub fn write_uniforms(
        &self,
        draw: &DrawCall,
        block: &mut UniformBlock,
    ) -> RenderResult<()> {
        block.set(VIEW_MATRIX, self.view)?;
        block.set(PROJECTION_MATRIX, self.projection)?;
        block.set(MODEL_MATRIX, draw.model)?;
        block.set(COLOR, draw.color)?;
        Ok(())
    }

    pub fn total_indices(&self) -> u64 {
        self.draws.iter().map(|d| u64::from(d.index_count)).sum()
    }
}
