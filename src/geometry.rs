use bevy::{
    math::{vec2, Affine3A},
    prelude::*,
    render::{mesh::Indices, render_resource::PrimitiveTopology},
};

use crate::{
    flip::Flip,
    grid::TileGrid,
    layer::{StaggerIndex, TileOrientation},
    region::TileRect,
    tileset::Tileset,
};

/// A vertex of a tile quad, in layer-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileVertex {
    pub position: Vec2,
    pub tex_coords: Vec2,
}

/// Geometry parameters of a layer the vertices are built for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayerGeometry {
    pub orientation: TileOrientation,
    pub stagger_index: StaggerIndex,
    pub tile_size: UVec2,
}

/// Append two triangles for every non-empty cell of `rect` to `vertices`.
///
/// Cells are visited in row-major order; the output only depends on the
/// arguments.
pub(crate) fn fill_vertices<T: Tileset + ?Sized>(
    vertices: &mut Vec<TileVertex>,
    grid: &TileGrid,
    geometry: LayerGeometry,
    tileset: &T,
    rect: TileRect,
) {
    vertices.reserve(rect.width() as usize * rect.height() as usize * 6);

    let tile_size = geometry.tile_size;

    for cell in rect.cells() {
        let cell_data = grid[cell];
        let Some(tile) = cell_data.tile else {
            continue;
        };

        let (position, size) = match geometry.orientation {
            TileOrientation::Orthogonal => (
                (cell * tile_size.as_ivec2()).as_vec2() + tileset.offset(),
                tile_size.as_vec2(),
            ),
            TileOrientation::Staggered => {
                // rows are packed at half the tile height
                let mut position = (cell * tile_size.as_ivec2()).as_vec2();
                position.y /= 2.0;
                if geometry.stagger_index.is_shifted(cell.y) {
                    position.x += (tile_size.x / 2) as f32;
                }
                (position + tileset.offset(), tileset.tile_size())
            }
            TileOrientation::Unknown => {
                debug_assert!(false, "cannot build geometry for unknown orientation");
                continue;
            }
        };

        let bounds = Rect::from_corners(position, position + size);
        let tex = tileset.texture_coords(tile);

        // top-left, top-right, bottom-left, bottom-right
        let positions = corners(bounds);
        let mut tex_coords = corners(tex);

        // order of flip matters:
        // http://docs.mapeditor.org/en/latest/reference/tmx-map-format/#tile-flipping
        let flip = cell_data.flip;
        if flip.contains(Flip::Diagonally) {
            tex_coords.swap(1, 2);
        }
        if flip.contains(Flip::Horizontally) {
            tex_coords.swap(0, 1);
            tex_coords.swap(2, 3);
        }
        if flip.contains(Flip::Vertically) {
            tex_coords.swap(0, 2);
            tex_coords.swap(1, 3);
        }

        let vertex = |i: usize| TileVertex {
            position: positions[i],
            tex_coords: tex_coords[i],
        };

        // first triangle
        vertices.extend([vertex(0), vertex(1), vertex(2)]);
        // second triangle
        vertices.extend([vertex(2), vertex(1), vertex(3)]);
    }
}

fn corners(rect: Rect) -> [Vec2; 4] {
    [
        rect.min,
        vec2(rect.max.x, rect.min.y),
        vec2(rect.min.x, rect.max.y),
        rect.max,
    ]
}

/// Immutable snapshot of a layer's geometry.
///
/// Vertices form a triangle list, six per tile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileMesh {
    vertices: Box<[TileVertex]>,
}

impl TileMesh {
    pub(crate) fn new(vertices: Vec<TileVertex>) -> Self {
        Self {
            vertices: vertices.into_boxed_slice(),
        }
    }

    pub fn vertices(&self) -> &[TileVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn topology(&self) -> PrimitiveTopology {
        PrimitiveTopology::TriangleList
    }

    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(self.topology());
        write_mesh(&mut mesh, &self.vertices, &Affine3A::IDENTITY);
        mesh
    }
}

/// Replace the attributes of `mesh` with `vertices`, positions mapped through
/// `transform`.
pub(crate) fn write_mesh(
    mesh: &mut Mesh,
    vertices: &[TileVertex],
    transform: &Affine3A,
) {
    let positions: Vec<[f32; 3]> = vertices
        .iter()
        .map(|v| transform.transform_point3(v.position.extend(0.0)).to_array())
        .collect();
    let normals = vec![[0.0, 0.0, 1.0]; vertices.len()];
    let uvs: Vec<[f32; 2]> = vertices.iter().map(|v| v.tex_coords.to_array()).collect();

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.set_indices(None::<Indices>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip::FlipFlags;
    use bevy::math::{ivec2, uvec2};
    use rand::Rng;

    /// Every tile maps to the full texture, offset by its id in x.
    struct FixedTileset {
        tile_size: Vec2,
        offset: Vec2,
    }

    impl Tileset for FixedTileset {
        fn texture(&self) -> Option<&Handle<Image>> {
            None
        }

        fn offset(&self) -> Vec2 {
            self.offset
        }

        fn tile_size(&self) -> Vec2 {
            self.tile_size
        }

        fn texture_coords(&self, tile: u32) -> Rect {
            Rect::new(tile as f32, 0.0, tile as f32 + 1.0, 1.0)
        }
    }

    fn tileset() -> FixedTileset {
        FixedTileset {
            tile_size: vec2(16., 16.),
            offset: Vec2::ZERO,
        }
    }

    fn orthogonal() -> LayerGeometry {
        LayerGeometry {
            orientation: TileOrientation::Orthogonal,
            stagger_index: StaggerIndex::Odd,
            tile_size: uvec2(16, 16),
        }
    }

    fn single(flip: FlipFlags) -> Vec<TileVertex> {
        let mut grid = TileGrid::new(uvec2(1, 1));
        grid.set(IVec2::ZERO, Some(0), flip);
        let mut vertices = Vec::new();
        fill_vertices(
            &mut vertices,
            &grid,
            orthogonal(),
            &tileset(),
            TileRect::covering(grid.size()).unwrap(),
        );
        vertices
    }

    /// Texture coordinates of the TL, TR, BL, BR corners of a single quad.
    fn quad_tex(vertices: &[TileVertex]) -> [Vec2; 4] {
        assert_eq!(vertices.len(), 6);
        [
            vertices[0].tex_coords,
            vertices[1].tex_coords,
            vertices[2].tex_coords,
            vertices[5].tex_coords,
        ]
    }

    const TL: Vec2 = Vec2::new(0., 0.);
    const TR: Vec2 = Vec2::new(1., 0.);
    const BL: Vec2 = Vec2::new(0., 1.);
    const BR: Vec2 = Vec2::new(1., 1.);

    #[test]
    fn single_orthogonal_tile() {
        let mut grid = TileGrid::new(uvec2(4, 4));
        grid.set(IVec2::ZERO, Some(0), FlipFlags::NONE);

        let mut vertices = Vec::new();
        fill_vertices(
            &mut vertices,
            &grid,
            orthogonal(),
            &tileset(),
            TileRect::covering(grid.size()).unwrap(),
        );

        let positions: Vec<Vec2> = vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                vec2(0., 0.),
                vec2(16., 0.),
                vec2(0., 16.),
                vec2(0., 16.),
                vec2(16., 0.),
                vec2(16., 16.),
            ]
        );
        let tex: Vec<Vec2> = vertices.iter().map(|v| v.tex_coords).collect();
        assert_eq!(tex, vec![TL, TR, BL, BL, TR, BR]);
    }

    #[test]
    fn orthogonal_position_includes_offset() {
        let mut grid = TileGrid::new(uvec2(3, 3));
        grid.set(ivec2(2, 1), Some(0), FlipFlags::NONE);

        let mut vertices = Vec::new();
        let tileset = FixedTileset {
            tile_size: vec2(16., 16.),
            offset: vec2(3., -2.),
        };
        fill_vertices(
            &mut vertices,
            &grid,
            orthogonal(),
            &tileset,
            TileRect::covering(grid.size()).unwrap(),
        );
        assert_eq!(vertices[0].position, vec2(35., 14.));
        assert_eq!(vertices[5].position, vec2(51., 30.));
    }

    #[test]
    fn unflipped_tex_coords() {
        assert_eq!(quad_tex(&single(FlipFlags::NONE)), [TL, TR, BL, BR]);
    }

    #[test]
    fn horizontal_flip() {
        assert_eq!(
            quad_tex(&single(Flip::Horizontally.into())),
            [TR, TL, BR, BL]
        );
    }

    #[test]
    fn vertical_flip() {
        assert_eq!(
            quad_tex(&single(Flip::Vertically.into())),
            [BL, BR, TL, TR]
        );
    }

    #[test]
    fn diagonal_flip() {
        assert_eq!(
            quad_tex(&single(Flip::Diagonally.into())),
            [TL, BL, TR, BR]
        );
    }

    #[test]
    fn combined_flips_apply_diagonal_then_horizontal_then_vertical() {
        // D: [TL, BL, TR, BR], H: [BL, TL, BR, TR], V: [BR, TR, BL, TL]
        let all = FlipFlags::new(&[Flip::Vertically, Flip::Horizontally, Flip::Diagonally]);
        assert_eq!(quad_tex(&single(all)), [BR, TR, BL, TL]);

        // D then H is a clockwise rotation
        assert_eq!(
            quad_tex(&single(Flip::Diagonally | Flip::Horizontally)),
            [BL, TL, BR, TR]
        );
        // D then V is a counter-clockwise rotation
        assert_eq!(
            quad_tex(&single(Flip::Diagonally | Flip::Vertically)),
            [TR, BR, TL, BL]
        );
    }

    #[test]
    fn flip_does_not_move_positions() {
        let plain = single(FlipFlags::NONE);
        let flipped = single(FlipFlags::new(&Flip::ALL));
        for (a, b) in plain.iter().zip(flipped.iter()) {
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn empty_cells_produce_nothing() {
        let grid = TileGrid::new(uvec2(5, 5));
        let mut vertices = Vec::new();
        fill_vertices(
            &mut vertices,
            &grid,
            orthogonal(),
            &tileset(),
            TileRect::covering(grid.size()).unwrap(),
        );
        assert!(vertices.is_empty());
    }

    #[test]
    fn only_cells_inside_rect() {
        let mut grid = TileGrid::new(uvec2(4, 4));
        for p in grid.positions().collect::<Vec<_>>() {
            grid.set(p, Some(1), FlipFlags::NONE);
        }
        let mut vertices = Vec::new();
        let rect = TileRect {
            min: ivec2(1, 2),
            max: ivec2(2, 3),
        };
        fill_vertices(&mut vertices, &grid, orthogonal(), &tileset(), rect);
        assert_eq!(vertices.len(), 4 * 6);
        // first emitted quad is the top-left cell of the rect
        assert_eq!(vertices[0].position, vec2(16., 32.));
        // last one the bottom-right
        assert_eq!(vertices[23].position, vec2(48., 64.));
    }

    #[test]
    fn builds_are_deterministic() {
        let mut rng = rand::thread_rng();
        let mut grid = TileGrid::new(uvec2(12, 9));
        for p in grid.positions().collect::<Vec<_>>() {
            if rng.gen_bool(0.7) {
                let flip = FlipFlags::new(
                    &Flip::ALL
                        .into_iter()
                        .filter(|_| rng.gen_bool(0.5))
                        .collect::<Vec<_>>(),
                );
                grid.set(p, Some(rng.gen_range(0..16)), flip);
            }
        }

        let rect = TileRect {
            min: ivec2(2, 1),
            max: ivec2(10, 7),
        };
        let mut first = Vec::new();
        let mut second = Vec::new();
        fill_vertices(&mut first, &grid, orthogonal(), &tileset(), rect);
        fill_vertices(&mut second, &grid, orthogonal(), &tileset(), rect);
        assert_eq!(first, second);
    }

    #[test]
    fn staggered_rows() {
        let mut grid = TileGrid::new(uvec2(2, 3));
        grid.set(ivec2(1, 0), Some(0), FlipFlags::NONE);
        grid.set(ivec2(1, 1), Some(0), FlipFlags::NONE);
        grid.set(ivec2(1, 2), Some(0), FlipFlags::NONE);

        // rendered tiles are taller than the grid step
        let tileset = FixedTileset {
            tile_size: vec2(64., 48.),
            offset: Vec2::ZERO,
        };
        let geometry = LayerGeometry {
            orientation: TileOrientation::Staggered,
            stagger_index: StaggerIndex::Odd,
            tile_size: uvec2(64, 32),
        };

        let mut vertices = Vec::new();
        fill_vertices(
            &mut vertices,
            &grid,
            geometry,
            &tileset,
            TileRect::covering(grid.size()).unwrap(),
        );
        assert_eq!(vertices.len(), 18);

        // even row: no shift, y = 0 * 32 / 2
        assert_eq!(vertices[0].position, vec2(64., 0.));
        // odd row: shifted by half a tile, y = 1 * 32 / 2
        assert_eq!(vertices[6].position, vec2(96., 16.));
        // next even row
        assert_eq!(vertices[12].position, vec2(64., 32.));

        // quad size comes from the tileset
        assert_eq!(vertices[11].position - vertices[6].position, vec2(64., 48.));
    }

    #[test]
    fn staggered_even_index_shifts_even_rows() {
        let mut grid = TileGrid::new(uvec2(1, 2));
        grid.set(ivec2(0, 0), Some(0), FlipFlags::NONE);
        grid.set(ivec2(0, 1), Some(0), FlipFlags::NONE);

        let geometry = LayerGeometry {
            orientation: TileOrientation::Staggered,
            stagger_index: StaggerIndex::Even,
            tile_size: uvec2(32, 16),
        };
        let mut vertices = Vec::new();
        fill_vertices(
            &mut vertices,
            &grid,
            geometry,
            &tileset(),
            TileRect::covering(grid.size()).unwrap(),
        );
        assert_eq!(vertices[0].position, vec2(16., 0.));
        assert_eq!(vertices[6].position, vec2(0., 8.));
    }

    #[test]
    fn tile_mesh_converts_to_bevy_mesh() {
        let mesh = TileMesh::new(single(FlipFlags::NONE)).to_mesh();
        assert_eq!(mesh.count_vertices(), 6);
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::TriangleList);
    }
}
