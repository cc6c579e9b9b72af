use bevy::{
    math::{vec2, Affine3A},
    prelude::*,
    render::render_resource::PrimitiveTopology,
    sprite::Anchor,
};

use crate::{
    cache::GeometryCache,
    flip::FlipFlags,
    geometry::{fill_vertices, LayerGeometry, TileMesh},
    grid::TileGrid,
    layer_builder::TileLayerBuilder,
    region::{visible_tile_rect, TileRect},
    render::{RenderStates, RenderTarget},
    tileset::Tileset,
};

/// How the cells of a layer are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum TileOrientation {
    /// Nothing is drawn.
    #[default]
    Unknown,
    /// Regular grid.
    Orthogonal,
    /// Rows are half a tile apart and every other row is shifted by half a
    /// tile, as for isometric maps with diamond tiles.
    Staggered,
}

/// Which rows of a staggered layer are shifted by half a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum StaggerIndex {
    #[default]
    Odd,
    Even,
}

impl StaggerIndex {
    pub fn is_shifted(self, row: i32) -> bool {
        match self {
            StaggerIndex::Odd => row % 2 != 0,
            StaggerIndex::Even => row % 2 == 0,
        }
    }
}

/// A single layer of tiles, drawn as a triangle mesh of the visible part only.
///
/// Layer-local coordinates have their origin at the top-left corner of cell
/// `(0, 0)`, x grows with the column and y with the row index.
/// [`TileLayer::transform`] maps them into the world.
#[derive(Debug, Component, Clone, Default)]
pub struct TileLayer {
    orientation: TileOrientation,
    stagger_index: StaggerIndex,

    /// Size of a cell, in world units.
    tile_size: UVec2,

    grid: TileGrid,

    /// Placement of the layer in the world.
    placement: Transform,

    /// Local point that `placement` positions, see [`TileLayer::set_anchor`].
    origin: Vec2,

    cache: GeometryCache,
}

impl TileLayer {
    pub fn new(layer_size: UVec2, orientation: TileOrientation) -> Self {
        Self {
            orientation,
            grid: TileGrid::new(layer_size),
            ..default()
        }
    }

    pub fn builder(layer_size: UVec2, orientation: TileOrientation) -> TileLayerBuilder {
        TileLayerBuilder::new(layer_size, orientation)
    }

    pub fn orientation(&self) -> TileOrientation {
        self.orientation
    }

    pub fn stagger_index(&self) -> StaggerIndex {
        self.stagger_index
    }

    pub fn set_stagger_index(&mut self, stagger_index: StaggerIndex) {
        self.stagger_index = stagger_index;
        self.cache.mark_dirty();
    }

    /// Size of this layer in tiles.
    pub fn layer_size(&self) -> UVec2 {
        self.grid.size()
    }

    pub fn tile_size(&self) -> UVec2 {
        self.tile_size
    }

    /// Set the size of a cell. No geometry is generated while either
    /// component is zero.
    pub fn set_tile_size(&mut self, tile_size: UVec2) {
        self.tile_size = tile_size;
        self.cache.mark_dirty();
    }

    pub fn set_tile(&mut self, position: IVec2, tile: Option<u32>, flip: FlipFlags) {
        self.grid.set(position, tile, flip);
        self.cache.mark_dirty();
    }

    pub fn tile(&self, position: IVec2) -> Option<u32> {
        self.grid.tile(position)
    }

    pub fn flip(&self, position: IVec2) -> FlipFlags {
        self.grid.flip(position)
    }

    pub fn is_valid(&self, position: IVec2) -> bool {
        self.grid.is_valid(position)
    }

    /// Reset all cells to the empty tile.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.cache.mark_dirty();
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable access to all cells at once.
    /// The geometry is rebuilt on the next draw.
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        self.cache.mark_dirty();
        &mut self.grid
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Rebuild the geometry on the next draw, e.g. after the texture
    /// coordinates of the tileset changed.
    pub fn invalidate_geometry(&mut self) {
        self.cache.mark_dirty();
    }

    /// Bounds of the layer in local coordinates.
    pub fn local_bounds(&self) -> Rect {
        Rect::from_corners(Vec2::ZERO, (self.grid.size() * self.tile_size).as_vec2())
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Place the origin at `anchor` of the local bounds.
    pub fn set_anchor(&mut self, anchor: Anchor) {
        let bounds = self.local_bounds();
        // `Anchor` is y-up, local coordinates are y-down
        let relative = anchor.as_vec() * vec2(1.0, -1.0) + 0.5;
        self.origin = bounds.min + bounds.size() * relative;
    }

    pub fn placement(&self) -> &Transform {
        &self.placement
    }

    pub fn set_placement(&mut self, placement: Transform) {
        self.placement = placement;
    }

    /// Local to world transform.
    pub fn transform(&self) -> Affine3A {
        self.placement.compute_affine() * Affine3A::from_translation(-self.origin.extend(0.0))
    }

    /// World to local transform.
    pub fn inverse_transform(&self) -> Affine3A {
        self.transform().inverse()
    }

    /// Distance between two cells. Staggered rows are packed at half the
    /// tile height.
    fn step(&self) -> UVec2 {
        let mut step = self.tile_size;
        if self.orientation == TileOrientation::Staggered {
            step.y /= 2;
        }
        step
    }

    fn geometry(&self) -> LayerGeometry {
        LayerGeometry {
            orientation: self.orientation,
            stagger_index: self.stagger_index,
            tile_size: self.tile_size,
        }
    }

    /// Tiles that are needed to cover the current view of `target`.
    pub fn visible_rect<R: RenderTarget + ?Sized>(&self, target: &R) -> Option<TileRect> {
        visible_tile_rect(
            &target.view(),
            &self.inverse_transform(),
            self.grid.size(),
            self.step(),
        )
    }

    /// Draw the visible part of the layer onto `target`.
    ///
    /// The geometry is only rebuilt when the visible tiles or the cells changed
    /// since the last draw. Nothing happens without a texture or with an
    /// unknown orientation.
    pub fn draw<R, T>(&mut self, target: &mut R, tileset: &T, states: &RenderStates)
    where
        R: RenderTarget + ?Sized,
        T: Tileset + ?Sized,
    {
        if !tileset.has_texture() || self.orientation == TileOrientation::Unknown {
            trace!("tile layer not drawable");
            return;
        }

        let rect = self.visible_rect(target);
        let geometry = self.geometry();
        self.cache.update(rect, &self.grid, geometry, tileset);

        let local_states = RenderStates {
            transform: states.transform * self.transform(),
            texture: tileset.texture().cloned(),
        };
        target.draw(
            self.cache.vertices(),
            PrimitiveTopology::TriangleList,
            &local_states,
        );
    }

    /// Build the geometry of the whole layer, regardless of any view.
    pub fn commit_geometry<T: Tileset + ?Sized>(&self, tileset: &T) -> TileMesh {
        let mut vertices = Vec::new();

        let drawable = tileset.has_texture()
            && self.orientation != TileOrientation::Unknown
            && self.tile_size.x != 0
            && self.tile_size.y != 0;
        if let (true, Some(rect)) = (drawable, TileRect::covering(self.grid.size())) {
            fill_vertices(&mut vertices, &self.grid, self.geometry(), tileset, rect);
        }

        TileMesh::new(vertices)
    }
}
