//! CPU-side uniform blocks with std140 packing and name/type checks.

use corelib::{UniformKind, UniformValue};
use thiserror::Error;

pub const VIEW_MATRIX: &str = "viewMatrix";
pub const PROJECTION_MATRIX: &str = "projectionMatrix";
pub const MODEL_MATRIX: &str = "modelMatrix";
pub const COLOR: &str = "color";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProgramInputError {
    #[error("No uniform found with the name '{0}'")]
    UnknownUniform(String),
    #[error("Uniform '{name}' expects {expected:?}, got {found:?}")]
    TypeMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
    #[error("Uniform '{0}' declared twice")]
    DuplicateUniform(String),
}

#[derive(Clone, Debug)]
struct Slot {
    name: String,
    kind: UniformKind,
    /// Offset in f32 words.
    offset: usize,
}

/// (alignment, size) in f32 words, std140 rules.
const fn std140(kind: UniformKind) -> (usize, usize) {
    match kind {
        UniformKind::Float => (1, 1),
        UniformKind::Vec3 => (4, 3),
        UniformKind::Mat4 => (4, 16),
    }
}

/// Ordered set of named uniform slots.
#[derive(Clone, Debug)]
pub struct UniformLayout {
    slots: Vec<Slot>,
    words: usize,
}

impl UniformLayout {
    pub fn new<'a>(
        decls: impl IntoIterator<Item = (&'a str, UniformKind)>,
    ) -> Result<Self, ProgramInputError> {
        let mut slots: Vec<Slot> = Vec::new();
        let mut cursor = 0usize;
        for (name, kind) in decls {
            if slots.iter().any(|s| s.name == name) {
                return Err(ProgramInputError::DuplicateUniform(name.to_owned()));
            }
            let (align, size) = std140(kind);
            let offset = cursor.next_multiple_of(align);
            slots.push(Slot {
                name: name.to_owned(),
                kind,
                offset,
            });
            cursor = offset + size;
        }
        // Block size rounds up to a vec4.
        Ok(Self {
            slots,
            words: cursor.next_multiple_of(4),
        })
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Byte offset of `name` inside the block.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.slot(name).map(|s| s.offset * 4)
    }

    pub fn kind_of(&self, name: &str) -> Option<UniformKind> {
        self.slot(name).map(|s| s.kind)
    }

    /// Block size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.words * 4
    }
}

/// Layout matching the flat-color shader: camera matrices, model matrix
/// and an RGB color.
pub fn basic_layout() -> UniformLayout {
    UniformLayout {
        slots: vec![
            Slot {
                name: VIEW_MATRIX.to_owned(),
                kind: UniformKind::Mat4,
                offset: 0,
            },
            Slot {
                name: PROJECTION_MATRIX.to_owned(),
                kind: UniformKind::Mat4,
                offset: 16,
            },
            Slot {
                name: MODEL_MATRIX.to_owned(),
                kind: UniformKind::Mat4,
                offset: 32,
            },
            Slot {
                name: COLOR.to_owned(),
                kind: UniformKind::Vec3,
                offset: 48,
            },
        ],
        words: 52,
    }
}

/// Uniform values packed per a [`UniformLayout`], ready for `write_buffer`.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<f32>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0.0; layout.words];
        Self { layout, data }
    }

    #[inline]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<(), ProgramInputError> {
        let value = value.into();
        let slot = self
            .layout
            .slot(name)
            .ok_or_else(|| ProgramInputError::UnknownUniform(name.to_owned()))?;
        if slot.kind != value.kind() {
            return Err(ProgramInputError::TypeMismatch {
                name: name.to_owned(),
                expected: slot.kind,
                found: value.kind(),
            });
        }

        let at = slot.offset;
        match value {
            UniformValue::Float(v) => self.data[at] = v,
            UniformValue::Vec3(v) => self.data[at..at + 3].copy_from_slice(&v.to_array()),
            // Column-major, no transpose.
            UniformValue::Mat4(m) => self.data[at..at + 16].copy_from_slice(&m.to_cols_array()),
        }
        Ok(())
    }

    /// Read a slot back.
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let slot = self.layout.slot(name)?;
        let at = slot.offset;
        Some(match slot.kind {
            UniformKind::Float => UniformValue::Float(self.data[at]),
            UniformKind::Vec3 => UniformValue::Vec3(glam::Vec3::from_slice(&self.data[at..at + 3])),
            UniformKind::Mat4 => UniformValue::Mat4(glam::Mat4::from_cols_slice(&self.data[at..at + 16])),
        })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
