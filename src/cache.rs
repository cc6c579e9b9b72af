use bevy::prelude::*;

use crate::{
    geometry::{fill_vertices, LayerGeometry, TileVertex},
    grid::TileGrid,
    region::TileRect,
    tileset::Tileset,
};

/// Tileset properties the vertices depend on.
///
/// Texture coordinates are not part of it, tilesets that change them in place
/// have to mark the cache dirty.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TilesetKey {
    texture: Option<AssetId<Image>>,
    offset: Vec2,
    tile_size: Vec2,
}

impl TilesetKey {
    fn of<T: Tileset + ?Sized>(tileset: &T) -> Self {
        Self {
            texture: tileset.texture().map(|handle| handle.id()),
            offset: tileset.offset(),
            tile_size: tileset.tile_size(),
        }
    }
}

/// Vertices of a layer together with the tile rectangle and tileset they were
/// built for.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    rect: Option<TileRect>,
    tileset: Option<TilesetKey>,
    vertices: Vec<TileVertex>,
    /// Set when the grid or the tileset changed since the last build.
    dirty: bool,
    rebuilds: u64,
}

impl GeometryCache {
    /// Rectangle the current vertices cover, `None` if nothing was visible.
    pub fn rect(&self) -> Option<TileRect> {
        self.rect
    }

    pub fn vertices(&self) -> &[TileVertex] {
        &self.vertices
    }

    /// How often the vertices have been rebuilt so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Make sure the vertices cover `rect`, rebuilding them only if `rect` or
    /// the tileset differ from the ones they were built for or the cache was
    /// marked dirty. Return true iff a rebuild happened.
    pub(crate) fn update<T: Tileset + ?Sized>(
        &mut self,
        rect: Option<TileRect>,
        grid: &TileGrid,
        geometry: LayerGeometry,
        tileset: &T,
    ) -> bool {
        let key = TilesetKey::of(tileset);
        if rect == self.rect && Some(key) == self.tileset && !self.dirty {
            return false;
        }

        debug!("rebuilding tile layer geometry for {:?}", rect);
        self.rect = rect;
        self.tileset = Some(key);
        self.dirty = false;
        self.rebuilds += 1;
        self.vertices.clear();

        let tile_size = geometry.tile_size;
        if !tileset.has_texture() || tile_size.x == 0 || tile_size.y == 0 {
            return true;
        }

        if let Some(rect) = rect {
            fill_vertices(&mut self.vertices, grid, geometry, tileset, rect);
        }
        true
    }

    /// The next update rebuilds the vertices even if the rectangle is unchanged.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
