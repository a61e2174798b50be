//! Image and data exports for inspecting a build.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, Luma, Rgb, RgbImage};
use serde::Serialize;

use crate::error::Result;
use crate::mesh::{Bounds, Vertex};
use crate::normalize::HeightRange;
use crate::partition::{Tile, TileDescriptor};
use crate::terrain::{HeightGrid, OceanLayout, TerrainBuild};

/// Export raw heights with a spectral colormap stretched over the height range.
pub fn export_heightmap(grid: &HeightGrid, path: impl AsRef<Path>) -> Result<()> {
    render_heightmap(grid).save(path)?;
    Ok(())
}

/// Export the height-based shading coordinate as grayscale.
pub fn export_shading(grid: &HeightGrid, path: impl AsRef<Path>) -> Result<()> {
    let range = HeightRange::scan(grid.vertices().as_slice().iter().map(|v| &v.position[1]));
    let side = grid.side() as u32;
    let img = ImageBuffer::from_fn(side, side, |x, y| {
        let shade = range.shade(grid.height(y as usize, x as usize));
        Luma([(shade * 255.0).round() as u8])
    });
    img.save(path)?;
    Ok(())
}

pub fn render_heightmap(grid: &HeightGrid) -> RgbImage {
    let heights = grid.heights();
    let (min_h, max_h) = heights.min_max();
    let span = (max_h - min_h).max(f32::EPSILON);
    let side = grid.side() as u32;

    let mut img: RgbImage = ImageBuffer::new(side, side);
    for (row, col, &h) in heights.iter() {
        let t = (h - min_h) / span;
        img.put_pixel(col as u32, row as u32, Rgb(spectral_colormap(t)));
    }
    img
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t = t.clamp(0.0, 1.0) * (colors.len() - 1) as f32;
    let idx = (t.floor() as usize).min(colors.len() - 2);
    let frac = t - idx as f32;
    let a = colors[idx];
    let b = colors[idx + 1];
    [
        ((a[0] + (b[0] - a[0]) * frac) * 255.0) as u8,
        ((a[1] + (b[1] - a[1]) * frac) * 255.0) as u8,
        ((a[2] + (b[2] - a[2]) * frac) * 255.0) as u8,
    ]
}

#[derive(Serialize)]
struct TileRecord<'a> {
    descriptor: TileDescriptor,
    bounds: Bounds,
    vertices: &'a [Vertex],
    triangles: &'a [u32],
}

#[derive(Serialize)]
struct BuildRecord<'a> {
    side: usize,
    tile_base_size: usize,
    tiles_per_side: usize,
    vertex_spacing: u32,
    centering_offset: f32,
    height_range: Option<HeightRange>,
    ocean: Option<OceanLayout>,
    tiles: Vec<TileRecord<'a>>,
}

/// Write every tile with its buffers as JSON.
pub fn export_tiles_json(build: &TerrainBuild, path: impl AsRef<Path>) -> Result<()> {
    let record = BuildRecord {
        side: build.side(),
        tile_base_size: build.tile_base_size(),
        tiles_per_side: build.tiles_per_side(),
        vertex_spacing: build.grid.spacing(),
        centering_offset: build.centering_offset(),
        height_range: build.height_range,
        ocean: build.ocean,
        tiles: build.tiles.iter().map(tile_record).collect(),
    };
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, &record)?;
    Ok(())
}

fn tile_record(tile: &Tile) -> TileRecord<'_> {
    TileRecord {
        descriptor: tile.descriptor,
        bounds: tile.bounds,
        vertices: &tile.vertices,
        triangles: &tile.triangles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(spectral_colormap(0.0), [94, 79, 163]);
        assert_eq!(spectral_colormap(1.0), [158, 0, 66]);
        // Out-of-range values clamp
        assert_eq!(spectral_colormap(2.0), spectral_colormap(1.0));
    }

    #[test]
    fn test_render_heightmap_dimensions() {
        let mut heights = Grid::new_with(9, 9, 0.0f32);
        heights.set(4, 4, 10.0);
        let grid = HeightGrid::from_heights(&heights, 1).unwrap();
        let img = render_heightmap(&grid);
        assert_eq!(img.dimensions(), (9, 9));
        assert_eq!(img.get_pixel(4, 4).0, spectral_colormap(1.0));
        assert_eq!(img.get_pixel(0, 0).0, spectral_colormap(0.0));
    }

    #[test]
    fn test_flat_heightmap_renders() {
        let grid = HeightGrid::from_heights(&Grid::new_with(3, 3, 2.0f32), 1).unwrap();
        let img = render_heightmap(&grid);
        assert_eq!(img.get_pixel(1, 1).0, spectral_colormap(0.0));
    }
}
