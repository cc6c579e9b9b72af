use bevy::{math::vec2, prelude::*};

/// Source of tile images for a [`crate::layer::TileLayer`].
///
/// Tilesets are borrowed for the duration of a draw or build call only.
pub trait Tileset {
    /// The atlas texture, if one is available yet.
    fn texture(&self) -> Option<&Handle<Image>>;

    fn has_texture(&self) -> bool {
        self.texture().is_some()
    }

    /// Offset added to every tile quad, in world units.
    fn offset(&self) -> Vec2;

    /// Rendered size of a single tile, in world units.
    /// For staggered layers this may differ from the grid step.
    fn tile_size(&self) -> Vec2;

    /// Texture coordinates of `tile` in the atlas, normalized to `[0, 1]^2`,
    /// `min` being the top-left corner.
    fn texture_coords(&self, tile: u32) -> Rect;
}

/// A tileset backed by a regular grid atlas image.
#[derive(Debug, Component, Clone, Default)]
pub struct AtlasTileset {
    texture: Option<Handle<Image>>,

    /// Size of the atlas image, in pixels.
    /// Zero until the image has been loaded.
    atlas_size: Vec2,

    /// Size of each tile in the atlas, in pixels.
    tile_size: Vec2,

    /// Padding between tiles in the atlas.
    spacing: Vec2,

    /// Padding around the tiles at the border of the atlas.
    margin: Vec2,

    offset: Vec2,

    /// [derived] number of tile columns and rows in the atlas.
    n_tiles: UVec2,
}

impl AtlasTileset {
    pub fn new(texture: Handle<Image>, tile_size: Vec2) -> Self {
        Self {
            texture: Some(texture),
            tile_size,
            ..default()
        }
    }

    pub fn with_spacing(mut self, spacing: Vec2) -> Self {
        self.spacing = spacing;
        self.update_n_tiles();
        self
    }

    pub fn with_margin(mut self, margin: Vec2) -> Self {
        self.margin = margin;
        self.update_n_tiles();
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set the atlas size directly, e.g. when the image is not managed by the
    /// asset server.
    pub fn with_atlas_size(mut self, atlas_size: Vec2) -> Self {
        self.update_atlas_size(atlas_size);
        self
    }

    pub fn atlas_texture(&self) -> Option<&Handle<Image>> {
        self.texture.as_ref()
    }

    pub fn atlas_size(&self) -> Vec2 {
        self.atlas_size
    }

    /// Number of tile columns and rows in the atlas.
    pub fn n_tiles(&self) -> UVec2 {
        self.n_tiles
    }

    /// Return true iff the atlas size actually changed.
    pub(crate) fn update_atlas_size(&mut self, atlas_size: Vec2) -> bool {
        if self.atlas_size == atlas_size {
            return false;
        }

        self.atlas_size = atlas_size;
        self.update_n_tiles();
        true
    }

    fn update_n_tiles(&mut self) {
        if self.atlas_size == Vec2::ZERO {
            return;
        }

        let inner = self.atlas_size - 2.0 * self.margin;
        let n_tiles = (inner + self.spacing) / (self.spacing + self.tile_size);

        let eps = 0.01;
        if (n_tiles.x - n_tiles.x.round()).abs() > eps
            || (n_tiles.y - n_tiles.y.round()).abs() > eps
        {
            warn!(
                "Expected an integral number of tiles in the atlas, but computes to be {:?}",
                n_tiles
            );
        }
        self.n_tiles = (n_tiles + eps).floor().max(Vec2::ZERO).as_uvec2();
    }
}

impl Tileset for AtlasTileset {
    fn texture(&self) -> Option<&Handle<Image>> {
        // Without a known atlas size there is nothing to compute coordinates from.
        if self.atlas_size == Vec2::ZERO {
            return None;
        }
        self.texture.as_ref()
    }

    fn offset(&self) -> Vec2 {
        self.offset
    }

    fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    fn texture_coords(&self, tile: u32) -> Rect {
        debug_assert!(
            tile < self.n_tiles.x * self.n_tiles.y,
            "tile {} outside of atlas with {} tiles",
            tile,
            self.n_tiles
        );
        let columns = self.n_tiles.x.max(1);
        let cell = vec2((tile % columns) as f32, (tile / columns) as f32);
        let position = self.margin + cell * (self.tile_size + self.spacing);

        Rect::from_corners(
            position / self.atlas_size,
            (position + self.tile_size) / self.atlas_size,
        )
    }
}
