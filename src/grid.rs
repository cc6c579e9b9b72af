use bevy::{
    math::ivec2,
    prelude::*,
};
use std::ops::{Index, IndexMut};

use crate::flip::FlipFlags;

/// The empty tile. Cells holding it produce no geometry.
pub const NO_TILE: Option<u32> = None;

/// Content of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileCell {
    /// Tile id into the tileset, `None` for [`NO_TILE`].
    pub tile: Option<u32>,
    pub flip: FlipFlags,
}

impl TileCell {
    pub const EMPTY: TileCell = TileCell {
        tile: NO_TILE,
        flip: FlipFlags::NONE,
    };
}

/// Dense, row-major grid of [`TileCell`]s.
///
/// Positions passed to any accessor must satisfy [`TileGrid::is_valid`].
/// Violating that is a bug in the caller: it trips a debug assertion and
/// panics on the slice access otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileGrid {
    size: UVec2,
    cells: Vec<TileCell>,
}

impl TileGrid {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            cells: vec![TileCell::EMPTY; size.x as usize * size.y as usize],
        }
    }

    /// Size of the grid, in cells.
    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn is_valid(&self, position: IVec2) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as u32) < self.size.x
            && (position.y as u32) < self.size.y
    }

    fn index_of(&self, position: IVec2) -> usize {
        debug_assert!(
            self.is_valid(position),
            "cell {} outside of grid of size {}",
            position,
            self.size
        );
        position.y as usize * self.size.x as usize + position.x as usize
    }

    pub fn set(&mut self, position: IVec2, tile: Option<u32>, flip: FlipFlags) {
        self[position] = TileCell { tile, flip };
    }

    /// Set a cell from a TMX global tile id, see [`FlipFlags::from_gid`].
    pub fn set_gid(&mut self, position: IVec2, gid: u32, first_gid: u32) {
        let (tile, flip) = FlipFlags::from_gid(gid, first_gid);
        self.set(position, tile, flip);
    }

    pub fn tile(&self, position: IVec2) -> Option<u32> {
        self[position].tile
    }

    pub fn flip(&self, position: IVec2) -> FlipFlags {
        self[position].flip
    }

    /// Reset every cell to [`NO_TILE`] without flips.
    pub fn clear(&mut self) {
        self.cells.fill(TileCell::EMPTY);
    }

    /// All valid positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let size = self.size.as_ivec2();
        (0..size.y).flat_map(move |y| (0..size.x).map(move |x| ivec2(x, y)))
    }
}

impl Index<IVec2> for TileGrid {
    type Output = TileCell;
    fn index(&self, i: IVec2) -> &Self::Output {
        &self.cells[self.index_of(i)]
    }
}

impl IndexMut<IVec2> for TileGrid {
    fn index_mut(&mut self, i: IVec2) -> &mut TileCell {
        let idx = self.index_of(i);
        &mut self.cells[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::Flip;
    use bevy::math::uvec2;
    use rand::Rng;

    #[test]
    fn new_grid_is_empty() {
        let grid = TileGrid::new(uvec2(3, 2));
        assert_eq!(grid.positions().count(), 6);
        for p in grid.positions() {
            assert_eq!(grid.tile(p), NO_TILE);
            assert!(grid.flip(p).is_empty());
        }
    }

    #[test]
    fn set_then_get_every_cell() {
        let mut rng = rand::thread_rng();
        let mut grid = TileGrid::new(uvec2(7, 5));
        let positions: Vec<_> = grid.positions().collect();

        let mut expected = Vec::new();
        for &p in &positions {
            let tile = if rng.gen_bool(0.2) { NO_TILE } else { Some(rng.gen_range(0..64)) };
            let flip = FlipFlags::new(
                &Flip::ALL
                    .into_iter()
                    .filter(|_| rng.gen_bool(0.5))
                    .collect::<Vec<_>>(),
            );
            grid.set(p, tile, flip);
            expected.push((tile, flip));
        }

        for (&p, &(tile, flip)) in positions.iter().zip(expected.iter()) {
            assert_eq!(grid.tile(p), tile);
            assert_eq!(grid.flip(p), flip);
        }
    }

    #[test]
    fn clear_resets_all_cells() {
        let mut grid = TileGrid::new(uvec2(4, 4));
        for p in grid.positions().collect::<Vec<_>>() {
            grid.set(p, Some(3), Flip::Vertically.into());
        }
        grid.clear();
        for p in grid.positions() {
            assert_eq!(grid.tile(p), NO_TILE);
            assert_eq!(grid.flip(p), FlipFlags::NONE);
        }
    }

    #[test]
    fn validity() {
        let grid = TileGrid::new(uvec2(4, 3));
        assert!(grid.is_valid(ivec2(0, 0)));
        assert!(grid.is_valid(ivec2(3, 2)));
        assert!(!grid.is_valid(ivec2(4, 0)));
        assert!(!grid.is_valid(ivec2(0, 3)));
        assert!(!grid.is_valid(ivec2(-1, 1)));
        assert!(!TileGrid::default().is_valid(IVec2::ZERO));
    }

    #[test]
    fn gid_sets_tile_and_flip() {
        let mut grid = TileGrid::new(uvec2(2, 2));
        grid.set_gid(ivec2(1, 0), 0x4000_0003, 1);
        assert_eq!(grid.tile(ivec2(1, 0)), Some(2));
        assert_eq!(grid.flip(ivec2(1, 0)), Flip::Vertically.into());
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_access_panics() {
        let grid = TileGrid::new(uvec2(2, 2));
        grid.tile(ivec2(2, 2));
    }
}
