use bevy::{
    math::{ivec2, vec2, Affine3A, Vec3Swizzles},
    prelude::*,
};
use std::f32::consts::SQRT_2;

use crate::render::View;

/// Rectangle of tile indices, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl TileRect {
    /// Rectangle covering every cell of a layer of `size` cells.
    /// `None` for a layer without cells.
    pub fn covering(size: UVec2) -> Option<TileRect> {
        if size.x == 0 || size.y == 0 {
            return None;
        }
        Some(TileRect {
            min: IVec2::ZERO,
            max: size.as_ivec2() - 1,
        })
    }

    pub fn width(&self) -> u32 {
        (self.max.x - self.min.x + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max.y - self.min.y + 1).max(0) as u32
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.cmpge(self.min).all() && cell.cmple(self.max).all()
    }

    /// Cells of this rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = IVec2> {
        let TileRect { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| ivec2(x, y)))
    }
}

/// Axis-aligned bounds of `rect` after applying `transform`.
pub(crate) fn transform_rect(transform: &Affine3A, rect: Rect) -> Rect {
    let mut low = transform.transform_point3(rect.min.extend(0.0)).xy();
    let mut high = low;
    for corner in [
        vec2(rect.max.x, rect.min.y),
        vec2(rect.min.x, rect.max.y),
        rect.max,
    ] {
        let pos = transform.transform_point3(corner.extend(0.0)).xy();
        low = low.min(pos);
        high = high.max(pos);
    }
    Rect::from_corners(low, high)
}

/// Compute the tiles of a layer that need to be meshed to cover `view`.
///
/// `inverse_transform` maps world coordinates into layer-local coordinates and
/// `step` is the distance between two cells of the layer (for staggered layers
/// the rows are `tile_size.y / 2` apart).
///
/// The result over-covers the view on purpose: the view is widened to a square
/// that contains it under any rotation, grown by one tile and rounded to the
/// nearest tile index. `None` if the view does not touch the layer at all.
pub fn visible_tile_rect(
    view: &View,
    inverse_transform: &Affine3A,
    layer_size: UVec2,
    step: UVec2,
) -> Option<TileRect> {
    let step_f = step.as_vec2();

    let extent = SQRT_2 * view.size.x.max(view.size.y);
    let world = Rect::from_center_size(view.center, Vec2::splat(extent));
    let local = transform_rect(inverse_transform, world);
    let grow = step_f.x.max(step_f.y);
    let local = Rect::from_corners(local.min - grow, local.max + grow);

    let layer = Rect::from_corners(Vec2::ZERO, (layer_size * step).as_vec2());
    let intersection = local.intersect(layer);
    if intersection.is_empty() {
        return None;
    }

    let position = (intersection.min / step_f + 0.5).as_ivec2();
    let size = (intersection.size() / step_f + 0.5).as_ivec2();

    let last = layer_size.as_ivec2() - 1;
    let rect = TileRect {
        min: position.max(IVec2::ZERO),
        max: (position + size).min(last),
    };

    if rect.min.cmpgt(rect.max).any() {
        return None;
    }
    Some(rect)
}
