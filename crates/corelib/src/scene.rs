//! Scene: objects (Transform + Renderable) in dense arrays, plus lights.

use crate::{color::Color, light::Light, transform::Transform};

/// Entity id (dense, index into component arrays).
pub type Entity = u32;

/// Index of a loaded mesh in the host's mesh list.
pub type MeshId = u32;

/// Primitive assembly used when drawing a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    #[default]
    Triangles,
    /// Wireframe through the mesh's line index buffer.
    Lines,
}

impl DrawMode {
    #[inline]
    pub fn from_wireframe(wireframe: bool) -> Self {
        if wireframe { Self::Lines } else { Self::Triangles }
    }
}

/// Component: draw `mesh` with a flat color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable {
    pub mesh: MeshId,
    pub color: Color,
    pub draw_mode: DrawMode,
}

/// Dense parallel arrays; spawn may allocate to grow capacity.
#[derive(Default)]
pub struct Scene {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
    alive: Vec<bool>,
    len: u32,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn entity with Transform and optional Renderable.
    pub fn spawn(&mut self, t: Transform, r: Option<Renderable>) -> Entity {
        let id = self.len;
        let idx = id as usize;
        self.len += 1;

        if idx >= self.transforms.len() {
            // grow all arrays equally
            let new_len = (idx + 1).next_power_of_two().max(8);
            self.transforms.resize(new_len, Transform::identity());
            self.renderables.resize(new_len, None);
            self.alive.resize(new_len, false);
        }

        self.transforms[idx] = t;
        self.renderables[idx] = r;
        self.alive[idx] = true;
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_alive(&self, e: Entity) -> bool {
        let i = e as usize;
        i < self.alive.len() && self.alive[i]
    }

    #[inline]
    pub fn transform(&self, e: Entity) -> Option<&Transform> {
        self.is_alive(e).then(|| &self.transforms[e as usize])
    }

    #[inline]
    pub fn transform_mut(&mut self, e: Entity) -> Option<&mut Transform> {
        let i = e as usize;
        if self.is_alive(e) {
            Some(&mut self.transforms[i])
        } else {
            None
        }
    }

    #[inline]
    pub fn renderable(&self, e: Entity) -> Option<&Renderable> {
        if self.is_alive(e) {
            self.renderables[e as usize].as_ref()
        } else {
            None
        }
    }

    /// Iterate over (Entity, Transform, Renderable) in spawn order.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (Entity, &Transform, &Renderable)> {
        (0..self.len as usize).filter_map(move |i| {
            if self.alive.get(i).copied().unwrap_or(false) {
                if let Some(r) = self.renderables[i].as_ref() {
                    return Some((i as Entity, &self.transforms[i], r));
                }
            }
            None
        })
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    #[inline]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }
}
