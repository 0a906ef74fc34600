//! Asset loading/parsers (meshes, shaders).
//! OBJ meshes are flattened into GPU-ready position/normal/index buffers.

pub mod geometry;
pub mod obj;
pub mod shader;

pub use geometry::GeometryData;
pub use obj::{ObjError, load_obj_from_path, load_obj_from_reader, parse_obj};
pub use shader::ShaderSources;
