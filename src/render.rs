use bevy::{
    math::Affine3A, prelude::*, render::render_resource::PrimitiveTopology,
};

use crate::geometry::TileVertex;

/// The part of the world currently shown by a render target, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct View {
    pub center: Vec2,
    pub size: Vec2,
}

impl View {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            center: rect.center(),
            size: rect.size(),
        }
    }
}

/// State accompanying a draw call.
#[derive(Debug, Clone, Default)]
pub struct RenderStates {
    /// Local (layer) to world transform.
    pub transform: Affine3A,

    /// Texture the vertices' texture coordinates refer to.
    pub texture: Option<Handle<Image>>,
}

/// Something tile layers can be drawn onto.
pub trait RenderTarget {
    /// Currently active view.
    fn view(&self) -> View;

    fn draw(&mut self, vertices: &[TileVertex], topology: PrimitiveTopology, states: &RenderStates);
}
