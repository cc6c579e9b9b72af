//! Tile layers for bevy that only mesh what the camera can see.
//!
//! A [`TileLayer`] holds a dense grid of tile ids with TMX-style flip flags and
//! turns the part of it covered by the current view into a triangle mesh, two
//! triangles per non-empty cell.
//!
//! ## Features
//!
//! - Orthogonal and staggered (isometric-like) layouts.
//! - Horizontal, vertical and diagonal tile flips with the semantics of the
//!   TMX map format.
//! - The mesh is only rebuilt when the visible tiles or the cells change.
//! - Full-layer meshes for static use via [`TileLayer::commit_geometry`].
//!
//! ## How it works
//!
//! On every draw the view is widened to a square that covers it under any
//! rotation, mapped into layer space and rounded to a rectangle of tile
//! indices. If that rectangle differs from the one the current vertices were
//! built for, the vertices are regenerated for the new rectangle.
//!
//! Layers can be drawn onto anything implementing [`RenderTarget`] with any
//! [`Tileset`]; [`TileLayerPlugin`] does that for bevy 2d cameras.

pub mod bundle;
pub mod cache;
pub mod flip;
pub mod geometry;
pub mod grid;
pub mod layer;
pub mod layer_builder;
pub mod plugin;
pub mod region;
pub mod render;
pub mod tileset;

pub mod prelude {
    pub use crate::bundle::TileLayerBundle;
    pub use crate::flip::{Flip, FlipFlags};
    pub use crate::geometry::{TileMesh, TileVertex};
    pub use crate::grid::{TileCell, TileGrid, NO_TILE};
    pub use crate::layer::{StaggerIndex, TileLayer, TileOrientation};
    pub use crate::plugin::{MeshManagedByLayer, TileLayerPlugin};
    pub use crate::render::{RenderStates, RenderTarget, View};
    pub use crate::tileset::{AtlasTileset, Tileset};
}

pub use crate::bundle::TileLayerBundle;
pub use crate::flip::{Flip, FlipFlags};
pub use crate::geometry::{TileMesh, TileVertex};
pub use crate::grid::{TileCell, TileGrid, NO_TILE};
pub use crate::layer::{StaggerIndex, TileLayer, TileOrientation};
pub use crate::plugin::{MeshManagedByLayer, TileLayerPlugin};
pub use crate::region::TileRect;
pub use crate::render::{RenderStates, RenderTarget, View};
pub use crate::tileset::{AtlasTileset, Tileset};
