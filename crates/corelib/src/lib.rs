//! Core types: math re-exports, Transform, Camera, lights, materials, Scene.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod camera;
pub mod color;
pub mod light;
pub mod material;
pub mod scene;
pub mod transform;

pub use color::Color;
pub use material::{UniformKind, UniformValue};
pub use scene::{DrawMode, Entity, MeshId};
