//! Materials: a program name plus named uniform values.

use std::collections::BTreeMap;

use crate::{Mat4, Vec3, color::Color};

/// Shape of a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Vec3,
    Mat4,
}

/// Value that can be written into a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl UniformValue {
    #[inline]
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Float(_) => UniformKind::Float,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<Color> for UniformValue {
    fn from(c: Color) -> Self {
        Self::Vec3(c.into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    program: String,
    properties: BTreeMap<String, UniformValue>,
}

impl Material {
    pub fn new<K, V>(program: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<UniformValue>,
    {
        Self {
            program: program.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[inline]
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn property(&self, name: &str) -> Option<UniformValue> {
        self.properties.get(name).copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
