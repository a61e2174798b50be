//! Tile partitioning
//!
//! Splits an `N x N` height grid (`N = tiles_per_side * base + 1`) into
//! square tiles of `(base + 1)^2` vertices. Neighboring tiles share their
//! border row or column; each tile holds its own copy of those vertices so
//! a renderer can own tile buffers independently of the source grid.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::mesh::{compute_normals, triangulate, Bounds, Vertex};
use crate::params::MAX_SEED_SIDE;
use crate::terrain::HeightGrid;

/// Identifies one tile's window into the source grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Cells per tile side (vertices per side is one more)
    pub tile_side_length: usize,
    pub row_index: usize,
    pub col_index: usize,
    /// Grid row of the tile's first vertex
    pub origin_row: usize,
    /// Grid column of the tile's first vertex
    pub origin_col: usize,
}

/// Self-contained mesh fragment ready for binding.
#[derive(Clone, Debug)]
pub struct Tile {
    pub descriptor: TileDescriptor,
    pub vertices: Vec<Vertex>,
    /// Local indices, shared by every tile of the same base size
    pub triangles: Arc<[u32]>,
    pub normals: Vec<[f32; 3]>,
    pub bounds: Bounds,
}

impl Tile {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn vertices_per_side(&self) -> usize {
        self.descriptor.tile_side_length + 1
    }

    /// Local vertex at `(row, col)` within the tile.
    pub fn vertex(&self, row: usize, col: usize) -> &Vertex {
        &self.vertices[row * self.vertices_per_side() + col]
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Re-copy vertices from the grid and recompute bounds and normals.
    fn reload(&mut self, grid: &HeightGrid) {
        let d = self.descriptor;
        let per_side = d.tile_side_length + 1;
        let source = grid.vertices();

        self.vertices.clear();
        for r in 0..per_side {
            for c in 0..per_side {
                self.vertices.push(*source.get(d.origin_row + r, d.origin_col + c));
            }
        }
        self.bounds = Bounds::from_vertices(&self.vertices);
        self.normals = compute_normals(&self.vertices, &self.triangles);
    }
}

/// Fixed tiling of one grid shape.
#[derive(Clone, Debug)]
pub struct TilePartitioner {
    grid_side: usize,
    tile_base_size: usize,
    tiles_per_side: usize,
    triangles: Arc<[u32]>,
}

impl TilePartitioner {
    /// `tile_base_size` must be a power of two no larger than 128 and
    /// evenly divide `grid_side - 1`.
    pub fn new(grid_side: usize, tile_base_size: usize) -> Result<Self> {
        if tile_base_size == 0
            || tile_base_size > MAX_SEED_SIDE
            || !tile_base_size.is_power_of_two()
        {
            return Err(TerrainError::InvalidParameter {
                name: "tile_base_size",
                value: tile_base_size as f64,
                expected: "a power of two within 1..=128",
            });
        }
        if grid_side < 2 || (grid_side - 1) % tile_base_size != 0 {
            return Err(TerrainError::InvalidParameter {
                name: "grid_side",
                value: grid_side as f64,
                expected: "tiles_per_side * tile_base_size + 1",
            });
        }
        let per_side = tile_base_size + 1;
        Ok(Self {
            grid_side,
            tile_base_size,
            tiles_per_side: (grid_side - 1) / tile_base_size,
            triangles: triangulate(per_side, per_side).into(),
        })
    }

    pub fn tile_base_size(&self) -> usize {
        self.tile_base_size
    }

    pub fn tiles_per_side(&self) -> usize {
        self.tiles_per_side
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_per_side * self.tiles_per_side
    }

    pub fn triangles(&self) -> &Arc<[u32]> {
        &self.triangles
    }

    pub fn descriptors(&self) -> impl Iterator<Item = TileDescriptor> + '_ {
        let per_side = self.tiles_per_side;
        let base = self.tile_base_size;
        (0..per_side * per_side).map(move |i| {
            let row_index = i / per_side;
            let col_index = i % per_side;
            TileDescriptor {
                tile_side_length: base,
                row_index,
                col_index,
                origin_row: row_index * base,
                origin_col: col_index * base,
            }
        })
    }

    /// Cut the grid into tiles, row-major by tile index.
    pub fn partition(&self, grid: &HeightGrid) -> Result<Vec<Tile>> {
        self.check_grid(grid)?;
        let descriptors: Vec<TileDescriptor> = self.descriptors().collect();
        let tiles: Vec<Tile> = descriptors
            .into_par_iter()
            .map(|descriptor| {
                let mut tile = Tile {
                    descriptor,
                    vertices: Vec::with_capacity((self.tile_base_size + 1).pow(2)),
                    triangles: Arc::clone(&self.triangles),
                    normals: Vec::new(),
                    bounds: Bounds { min: [0.0; 3], max: [0.0; 3] },
                };
                tile.reload(grid);
                tile
            })
            .collect();
        debug!(tiles = tiles.len(), base = self.tile_base_size, "grid partitioned");
        Ok(tiles)
    }

    /// Re-copy every tile from the grid after its heights or UVs changed.
    pub fn refresh(&self, tiles: &mut [Tile], grid: &HeightGrid) -> Result<()> {
        self.check_grid(grid)?;
        tiles.par_iter_mut().for_each(|tile| tile.reload(grid));
        debug!(tiles = tiles.len(), "tiles refreshed");
        Ok(())
    }

    fn check_grid(&self, grid: &HeightGrid) -> Result<()> {
        let vertices = grid.vertices();
        for (name, extent) in [("grid_rows", vertices.rows()), ("grid_cols", vertices.cols())] {
            if extent != self.grid_side {
                return Err(TerrainError::InvalidParameter {
                    name,
                    value: extent as f64,
                    expected: "the side the partitioner was built for",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use std::collections::HashMap;

    fn sample_grid(side: usize) -> HeightGrid {
        let mut heights = Grid::new_with(side, side, 0.0f32);
        for (row, col, h) in heights.iter_mut() {
            *h = ((row * 31 + col * 17) % 23) as f32 - 11.0;
        }
        HeightGrid::from_heights(&heights, 3).unwrap()
    }

    #[test]
    fn test_tile_shape_and_count() {
        let grid = sample_grid(17);
        let partitioner = TilePartitioner::new(17, 4).unwrap();
        let tiles = partitioner.partition(&grid).unwrap();
        assert_eq!(tiles.len(), 16);
        for tile in &tiles {
            assert_eq!(tile.vertices.len(), 25);
            assert_eq!(tile.triangle_count(), 2 * 4 * 4);
            assert_eq!(tile.normals.len(), 25);
            assert!(tile.triangles.iter().all(|&i| (i as usize) < 25));
        }
        let total: usize = tiles.iter().map(Tile::triangle_count).sum();
        assert_eq!(total, 2 * 16 * 16);
    }

    #[test]
    fn test_union_reconstructs_grid() {
        let grid = sample_grid(17);
        let partitioner = TilePartitioner::new(17, 8).unwrap();
        let tiles = partitioner.partition(&grid).unwrap();

        let mut seen: HashMap<(usize, usize), Vertex> = HashMap::new();
        for tile in &tiles {
            let d = tile.descriptor;
            for r in 0..tile.vertices_per_side() {
                for c in 0..tile.vertices_per_side() {
                    let key = (d.origin_row + r, d.origin_col + c);
                    let v = *tile.vertex(r, c);
                    if let Some(prev) = seen.insert(key, v) {
                        // Shared border vertices are value-equal
                        assert_eq!(prev, v);
                    }
                }
            }
        }
        assert_eq!(seen.len(), 17 * 17);
        for ((row, col), v) in seen {
            assert_eq!(v, *grid.vertices().get(row, col));
        }
    }

    #[test]
    fn test_triangles_shared_across_tiles() {
        let grid = sample_grid(9);
        let partitioner = TilePartitioner::new(9, 4).unwrap();
        let tiles = partitioner.partition(&grid).unwrap();
        assert!(Arc::ptr_eq(&tiles[0].triangles, &tiles[3].triangles));
    }

    #[test]
    fn test_refresh_tracks_height_changes() {
        let mut grid = sample_grid(9);
        let partitioner = TilePartitioner::new(9, 4).unwrap();
        let mut tiles = partitioner.partition(&grid).unwrap();

        // (4, 4) is the corner shared by all four tiles
        grid.set_height(4, 4, 100.0);
        partitioner.refresh(&mut tiles, &grid).unwrap();

        assert_eq!(tiles[0].vertex(4, 4).height(), 100.0);
        assert_eq!(tiles[1].vertex(4, 0).height(), 100.0);
        assert_eq!(tiles[2].vertex(0, 4).height(), 100.0);
        assert_eq!(tiles[3].vertex(0, 0).height(), 100.0);
        for tile in &tiles {
            assert_eq!(tile.bounds.max[1], 100.0);
        }
    }

    #[test]
    fn test_descriptor_origins() {
        let partitioner = TilePartitioner::new(9, 4).unwrap();
        let descriptors: Vec<_> = partitioner.descriptors().collect();
        assert_eq!(descriptors[1].origin_col, 4);
        assert_eq!(descriptors[2].origin_row, 4);
        assert_eq!(descriptors[3].row_index, 1);
        assert_eq!(descriptors[3].col_index, 1);
    }

    #[test]
    fn test_rejects_mismatched_shapes() {
        assert!(TilePartitioner::new(10, 4).is_err());
        assert!(TilePartitioner::new(13, 3).is_err());
        assert!(TilePartitioner::new(257, 256).is_err());

        let partitioner = TilePartitioner::new(9, 4).unwrap();
        assert!(partitioner.partition(&sample_grid(17)).is_err());
    }

    #[test]
    fn test_rejects_non_square_grid() {
        let partitioner = TilePartitioner::new(5, 4).unwrap();
        let mut grid = sample_grid(5);
        *grid.vertices_mut() = Grid::new(5, 3);
        assert!(matches!(
            partitioner.partition(&grid),
            Err(TerrainError::InvalidParameter { name: "grid_cols", .. })
        ));
        let mut tiles = partitioner.partition(&sample_grid(5)).unwrap();
        assert!(partitioner.refresh(&mut tiles, &grid).is_err());
    }

    #[test]
    fn test_vertex_bytes_length() {
        let grid = sample_grid(5);
        let tiles = TilePartitioner::new(5, 4).unwrap().partition(&grid).unwrap();
        assert_eq!(tiles[0].vertex_bytes().len(), 25 * std::mem::size_of::<Vertex>());
    }
}
