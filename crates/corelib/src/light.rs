//! Scene lights.

use crate::{Vec3, color::Color};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Point(PointLight),
}

impl Light {
    pub fn ambient(color: Color) -> Self {
        Self::Ambient(AmbientLight { color })
    }

    pub fn point(color: Color, position: Vec3) -> Self {
        Self::Point(PointLight { color, position })
    }

    #[inline]
    pub fn color(&self) -> Color {
        match self {
            Self::Ambient(l) => l.color,
            Self::Point(l) => l.color,
        }
    }

    /// World-space position; ambient lights have none.
    #[inline]
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Self::Ambient(_) => None,
            Self::Point(l) => Some(l.position),
        }
    }
}
