//! Terrain build pipeline
//!
//! seed field -> diamond-square expansion -> UV assignment -> tile partition.
//!
//! All validation happens up front; once it passes, every stage is total.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diamond_square::{check_seed_heights, expand, final_side};
use crate::error::{Result, TerrainError};
use crate::grid::Grid;
use crate::island::generate_island;
use crate::mesh::Vertex;
use crate::normalize::{apply_height_uvs, apply_planar_uvs, HeightRange};
use crate::params::{validate_seed_side, IslandParams, TerrainParams, WaveParams};
use crate::partition::{Tile, TilePartitioner};
use crate::seeds::TerrainSeeds;

// =============================================================================
// HEIGHT GRID
// =============================================================================

/// Square grid of terrain vertices: `x = row * spacing`, `y = height`,
/// `z = col * spacing`, plus a UV per vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    spacing: u32,
    vertices: Grid<Vertex>,
}

impl HeightGrid {
    /// Lay out a square height field with planar UVs.
    pub fn from_heights(heights: &Grid<f32>, spacing: u32) -> Result<Self> {
        if !heights.is_square() {
            return Err(TerrainError::InvalidParameter {
                name: "height_grid_cols",
                value: heights.cols() as f64,
                expected: "the same count as rows",
            });
        }
        let step = spacing as f32;
        let mut vertices = Grid::new(heights.rows(), heights.cols());
        for (row, col, &h) in heights.iter() {
            vertices.set(row, col, Vertex {
                position: [row as f32 * step, h, col as f32 * step],
                uv: [0.0, 0.0],
            });
        }
        let mut grid = Self { spacing, vertices };
        apply_planar_uvs(&mut grid);
        Ok(grid)
    }

    pub fn side(&self) -> usize {
        self.vertices.rows()
    }

    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    pub fn height(&self, row: usize, col: usize) -> f32 {
        self.vertices.get(row, col).height()
    }

    pub fn set_height(&mut self, row: usize, col: usize, height: f32) {
        self.vertices.get_mut(row, col).position[1] = height;
    }

    pub fn vertices(&self) -> &Grid<Vertex> {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut Grid<Vertex> {
        &mut self.vertices
    }

    /// Heights only, same shape.
    pub fn heights(&self) -> Grid<f32> {
        let mut heights = Grid::new(self.vertices.rows(), self.vertices.cols());
        for (row, col, vertex) in self.vertices.iter() {
            heights.set(row, col, vertex.height());
        }
        heights
    }
}

// =============================================================================
// BUILD RESULT
// =============================================================================

/// Placement data for the ocean wave sheets surrounding the island.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OceanLayout {
    /// Vertices per side of each wave sheet (`tile_base_size + 1`)
    pub wave_side: usize,
    /// Spacing between wave vertices (`2^(expansions + 1)`)
    pub vertex_spacing: u32,
}

impl OceanLayout {
    /// Wave parameters sized for this island, keeping the given rates.
    pub fn wave_params(&self, rates: &WaveParams) -> WaveParams {
        WaveParams {
            side: self.wave_side,
            vertex_spacing: self.vertex_spacing,
            ..rates.clone()
        }
    }
}

/// A finished island: the full grid plus its tile partition.
#[derive(Clone, Debug)]
pub struct TerrainBuild {
    pub grid: HeightGrid,
    pub tiles: Vec<Tile>,
    pub partitioner: TilePartitioner,
    pub expansions: u32,
    /// Present when height-based UVs were applied
    pub height_range: Option<HeightRange>,
    pub ocean: Option<OceanLayout>,
}

impl TerrainBuild {
    pub fn side(&self) -> usize {
        self.grid.side()
    }

    pub fn tile_base_size(&self) -> usize {
        self.partitioner.tile_base_size()
    }

    pub fn tiles_per_side(&self) -> usize {
        self.partitioner.tiles_per_side()
    }

    /// Translation along x and z that centers the island on the origin.
    pub fn centering_offset(&self) -> f32 {
        -((self.side() / 2) as f32) * self.grid.spacing() as f32
    }

    /// Switch to height-based UVs and refresh every tile.
    pub fn apply_height_uvs(&mut self) -> Result<HeightRange> {
        let range = apply_height_uvs(&mut self.grid);
        self.height_range = Some(range);
        self.partitioner.refresh(&mut self.tiles, &self.grid)?;
        Ok(range)
    }

    /// Switch to planar UVs and refresh every tile.
    pub fn apply_planar_uvs(&mut self) -> Result<()> {
        apply_planar_uvs(&mut self.grid);
        self.height_range = None;
        self.partitioner.refresh(&mut self.tiles, &self.grid)
    }

    pub fn triangle_count(&self) -> usize {
        self.tiles.iter().map(Tile::triangle_count).sum()
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Interpret a flat list of heights as a square seed field.
pub fn seed_from_heights(heights: &[f32]) -> Result<Grid<f32>> {
    let side = (heights.len() as f64).sqrt() as usize;
    if side * side != heights.len() {
        return Err(TerrainError::InvalidSeedShape {
            side,
            reason: "seed height count is not a perfect square",
        });
    }
    validate_seed_side(side)?;
    if let Some(&h) = heights.iter().find(|h| !h.is_finite()) {
        return Err(TerrainError::InvalidParameter {
            name: "seed_height",
            value: h as f64,
            expected: "a finite height",
        });
    }
    Grid::from_vec(side, side, heights.to_vec()).ok_or(TerrainError::InvalidSeedShape {
        side,
        reason: "seed height count is not a perfect square",
    })
}

/// Build a terrain from a supplied seed field.
pub fn build_terrain<R: Rng + ?Sized>(
    seed: &Grid<f32>,
    params: &TerrainParams,
    rng: &mut R,
) -> Result<TerrainBuild> {
    params.validate()?;
    if !seed.is_square() {
        return Err(TerrainError::InvalidSeedShape {
            side: seed.rows(),
            reason: "seed field must be square",
        });
    }
    validate_seed_side(seed.rows())?;
    let side = final_side(seed.rows(), params.expansions)?;
    check_seed_heights(seed, params.expansions)?;
    let tile_base_size = seed.rows();
    let partitioner = TilePartitioner::new(side, tile_base_size)?;

    let heights = expand(seed, params.expansions, params.randomization, rng)?;
    let mut grid = HeightGrid::from_heights(&heights, params.vertex_spacing)?;

    let height_range = if params.height_based_uvs {
        Some(apply_height_uvs(&mut grid))
    } else {
        None
    };

    let tiles = partitioner.partition(&grid)?;

    let ocean = params.create_ocean.then(|| OceanLayout {
        wave_side: tile_base_size + 1,
        vertex_spacing: 1u32 << (params.expansions + 1),
    });

    info!(
        side,
        tiles = tiles.len(),
        tile_base_size,
        "terrain build complete"
    );

    Ok(TerrainBuild {
        grid,
        tiles,
        partitioner,
        expansions: params.expansions,
        height_range,
        ocean,
    })
}

/// Generate the radial seed island and build terrain from it.
pub fn build_island(
    island: &IslandParams,
    params: &TerrainParams,
    seeds: &TerrainSeeds,
) -> Result<TerrainBuild> {
    params.validate()?;
    let mut island_rng = seeds.island_rng();
    let seed = generate_island(island, &mut island_rng)?;
    let mut expansion_rng = seeds.expansion_rng();
    build_terrain(&seed, params, &mut expansion_rng)
}
