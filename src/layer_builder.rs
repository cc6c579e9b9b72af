use bevy::{prelude::*, sprite::Anchor};

use crate::grid::TileGrid;
use crate::layer::{StaggerIndex, TileLayer, TileOrientation};

pub struct TileLayerBuilder {
    layer: TileLayer,
    anchor: Option<Anchor>,
}

impl TileLayerBuilder {
    pub fn new(layer_size: UVec2, orientation: TileOrientation) -> Self {
        Self {
            layer: TileLayer::new(layer_size, orientation),
            anchor: None,
        }
    } // fn new

    pub fn with_tile_size(mut self, tile_size: UVec2) -> Self {
        self.layer.set_tile_size(tile_size);
        self
    }

    pub fn with_stagger_index(mut self, stagger_index: StaggerIndex) -> Self {
        self.layer.set_stagger_index(stagger_index);
        self
    }

    pub fn with_placement(mut self, placement: Transform) -> Self {
        self.layer.set_placement(placement);
        self
    }

    /// Anchor is applied on build, after the tile size is known.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn build(self) -> TileLayer {
        self.build_and_initialize(|_| {})
    }

    pub fn build_and_initialize<F>(mut self, initializer: F) -> TileLayer
    where
        F: FnOnce(&mut TileGrid),
    {
        initializer(self.layer.grid_mut());

        if let Some(anchor) = self.anchor {
            self.layer.set_anchor(anchor);
        }

        self.layer
    } // fn build_and_initialize
}
