//! Oscillating wave sheet
//!
//! A square rubber-sheet model: the center vertex is driven by a sine
//! oscillator and every other vertex is pulled toward a weighted average
//! of its eight neighbors. Each tick reads only the heights committed by
//! the previous tick; new heights are staged and swapped in at the end.
//!
//! The neighbor average always divides by 8. Neighbors outside the sheet
//! contribute zero, so edges are damped toward sea level.

use std::f32::consts::FRAC_1_SQRT_2;

use tracing::{debug, warn};

use crate::error::{Result, TerrainError};
use crate::grid::Grid;
use crate::mesh::{compute_normals, triangulate, Vertex};
use crate::params::{WaveParams, MAX_WAVE_SIDE, MIN_WAVE_SIDE};

/// (row offset, col offset, weight)
const STENCIL: [(isize, isize, f32); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, FRAC_1_SQRT_2),
    (1, -1, FRAC_1_SQRT_2),
    (-1, 1, FRAC_1_SQRT_2),
    (-1, -1, FRAC_1_SQRT_2),
];
const STENCIL_DIVISOR: f32 = 8.0;

/// Resolve a requested side to a usable odd side.
///
/// Even sides are decremented once; the result must be odd and within
/// `3..=253`.
pub fn corrected_side(side: usize) -> Result<usize> {
    let corrected = if side % 2 == 0 { side.saturating_sub(1) } else { side };
    if corrected < MIN_WAVE_SIDE || corrected > MAX_WAVE_SIDE {
        return Err(TerrainError::InvalidWaveGridSize(side));
    }
    Ok(corrected)
}

/// Weighted 8-neighbor average with a fixed divisor.
pub fn neighbor_average(heights: &Grid<f32>, row: usize, col: usize) -> f32 {
    let mut sum = 0.0f32;
    for (dr, dc, weight) in STENCIL {
        if let Some(&h) = heights.get_checked(row as isize + dr, col as isize + dc) {
            sum += h * weight;
        }
    }
    sum / STENCIL_DIVISOR
}

pub struct WaveSimulator {
    params: WaveParams,
    middle: usize,
    heights: Grid<f32>,
    staged: Grid<f32>,
    velocities: Grid<f32>,
    vertices: Vec<Vertex>,
    triangles: Vec<u32>,
    time: f32,
    ticks: u64,
}

impl WaveSimulator {
    /// A flat, motionless sheet.
    pub fn new(params: WaveParams) -> Result<Self> {
        params.validate()?;
        let side = corrected_side(params.side)?;
        if side != params.side {
            warn!(requested = params.side, side, "even wave side decremented");
        }
        Self::with_initial_heights(params, Grid::new_with(side, side, 0.0))
    }

    /// Start from explicit heights (velocities start at zero).
    pub fn with_initial_heights(mut params: WaveParams, heights: Grid<f32>) -> Result<Self> {
        params.validate()?;
        let side = corrected_side(params.side)?;
        if heights.rows() != side || heights.cols() != side {
            return Err(TerrainError::InvalidParameter {
                name: "heights",
                value: heights.len() as f64,
                expected: "a side x side grid matching the corrected wave side",
            });
        }
        params.side = side;

        let spacing = params.vertex_spacing as f32;
        let uv_factor = 1.0 / side as f32;
        let vertices = heights
            .iter()
            .map(|(row, col, &h)| Vertex {
                position: [row as f32 * spacing, h, col as f32 * spacing],
                uv: [col as f32 * uv_factor, row as f32 * uv_factor],
            })
            .collect();

        debug!(side, "wave simulator created");
        Ok(Self {
            middle: (side - 1) / 2,
            staged: heights.clone(),
            velocities: Grid::new_with(side, side, 0.0),
            heights,
            vertices,
            triangles: triangulate(side, side),
            time: 0.0,
            params,
            ticks: 0,
        })
    }

    /// Advance one tick of length `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let side = self.params.side;
        let amplitude = self.params.amplitude;
        let rate = self.params.propagation * dt;
        let middle = self.middle;

        let heights = &self.heights;
        let staged = &mut self.staged;
        let velocities = &mut self.velocities;

        for row in 0..side {
            for col in 0..side {
                if row == middle && col == middle {
                    continue;
                }
                let h = *heights.get(row, col);
                let v = velocities.get_mut(row, col);
                staged.set(row, col, (h + *v).clamp(-amplitude, amplitude));
                *v += (neighbor_average(heights, row, col) - h) * rate;
            }
        }

        std::mem::swap(&mut self.heights, &mut self.staged);

        self.time += dt;
        self.ticks += 1;
        let drive = amplitude * (self.time * self.params.driver).sin();
        self.heights.set(middle, middle, drive);
        self.staged.set(middle, middle, drive);

        for (vertex, &h) in self.vertices.iter_mut().zip(self.heights.as_slice()) {
            vertex.position[1] = h;
        }
    }

    pub fn side(&self) -> usize {
        self.params.side
    }

    pub fn middle(&self) -> usize {
        self.middle
    }

    pub fn params(&self) -> &WaveParams {
        &self.params
    }

    /// Simulated seconds since start.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    pub fn velocities(&self) -> &Grid<f32> {
        &self.velocities
    }

    /// Current vertex array for mesh refresh.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn normals(&self) -> Vec<[f32; 3]> {
        compute_normals(&self.vertices, &self.triangles)
    }

    /// World-space length of one sheet side.
    pub fn extent(&self) -> f32 {
        (self.params.side - 1) as f32 * self.params.vertex_spacing as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(side: usize, amplitude: f32) -> WaveParams {
        WaveParams {
            side,
            propagation: 2.0,
            driver: 3.0,
            amplitude,
            vertex_spacing: 1,
        }
    }

    #[test]
    fn test_corrected_side() {
        assert_eq!(corrected_side(9).unwrap(), 9);
        assert_eq!(corrected_side(254).unwrap(), 253);
        assert_eq!(corrected_side(4).unwrap(), 3);
        for bad in [0, 1, 2, 255, 300] {
            assert!(matches!(
                corrected_side(bad),
                Err(TerrainError::InvalidWaveGridSize(_))
            ));
        }
    }

    #[test]
    fn test_even_side_is_decremented() {
        let sim = WaveSimulator::new(params(10, 1.0)).unwrap();
        assert_eq!(sim.side(), 9);
        assert_eq!(sim.middle(), 4);
        assert_eq!(sim.vertices().len(), 81);
        assert_eq!(sim.triangles().len() / 3, 2 * 8 * 8);
    }

    #[test]
    fn test_neighbor_average_fixed_divisor() {
        let ones = Grid::new_with(5, 5, 1.0f32);
        let interior = (4.0 + 4.0 * FRAC_1_SQRT_2) / 8.0;
        let corner = (2.0 + FRAC_1_SQRT_2) / 8.0;
        let edge = (3.0 + 2.0 * FRAC_1_SQRT_2) / 8.0;
        assert!((neighbor_average(&ones, 2, 2) - interior).abs() < 1e-6);
        assert!((neighbor_average(&ones, 0, 0) - corner).abs() < 1e-6);
        assert!((neighbor_average(&ones, 4, 4) - corner).abs() < 1e-6);
        assert!((neighbor_average(&ones, 0, 2) - edge).abs() < 1e-6);
    }

    #[test]
    fn test_center_follows_driver() {
        let mut sim = WaveSimulator::new(params(7, 0.5)).unwrap();
        sim.step(0.1);
        sim.step(0.1);
        let expected = 0.5 * (0.2f32 * 3.0).sin();
        assert!((*sim.heights().get(3, 3) - expected).abs() < 1e-6);
        assert_eq!(sim.vertices()[3 * 7 + 3].position[1], *sim.heights().get(3, 3));
    }

    #[test]
    fn test_zero_amplitude_stays_flat() {
        let mut sim = WaveSimulator::new(WaveParams {
            side: 11,
            propagation: 50.0,
            driver: 7.0,
            amplitude: 0.0,
            vertex_spacing: 2,
        })
        .unwrap();
        for _ in 0..100 {
            sim.step(0.05);
        }
        assert!(sim.heights().as_slice().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_update_is_synchronous() {
        let mut heights = Grid::new_with(3, 3, 0.0f32);
        heights.set(0, 0, 1.0);
        let mut sim = WaveSimulator::with_initial_heights(
            WaveParams { side: 3, propagation: 1.0, driver: 0.0, amplitude: 1.0, vertex_spacing: 1 },
            heights,
        )
        .unwrap();

        sim.step(1.0);
        // Velocities were zero, so heights hold while velocities respond
        assert_eq!(*sim.heights().get(0, 0), 1.0);
        assert_eq!(*sim.heights().get(0, 1), 0.0);
        assert!((*sim.velocities().get(0, 1) - 0.125).abs() < 1e-6);
        assert!((*sim.velocities().get(1, 0) - 0.125).abs() < 1e-6);
        assert!((*sim.velocities().get(0, 0) + 1.0).abs() < 1e-6);
        // Cells with no displaced neighbor stay at rest
        assert_eq!(*sim.velocities().get(2, 2), 0.0);

        sim.step(1.0);
        assert!((*sim.heights().get(0, 0) - 0.0).abs() < 1e-6);
        assert!((*sim.heights().get(0, 1) - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_heights_clamped_to_amplitude() {
        let mut sim = WaveSimulator::new(WaveParams {
            side: 9,
            propagation: 500.0,
            driver: 10.0,
            amplitude: 0.3,
            vertex_spacing: 1,
        })
        .unwrap();
        for _ in 0..200 {
            sim.step(0.02);
            for &h in sim.heights().as_slice() {
                assert!(h.abs() <= 0.3 + 1e-6);
            }
        }
    }

    #[test]
    fn test_deterministic_stepping() {
        let mut a = WaveSimulator::new(params(15, 1.0)).unwrap();
        let mut b = WaveSimulator::new(params(15, 1.0)).unwrap();
        for _ in 0..60 {
            a.step(1.0 / 60.0);
            b.step(1.0 / 60.0);
        }
        let bits_a: Vec<u32> = a.heights().as_slice().iter().map(|h| h.to_bits()).collect();
        let bits_b: Vec<u32> = b.heights().as_slice().iter().map(|h| h.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
        assert_eq!(a.ticks(), 60);
    }

    #[test]
    fn test_mismatched_initial_heights_rejected() {
        let heights = Grid::new_with(5, 5, 0.0f32);
        assert!(matches!(
            WaveSimulator::with_initial_heights(params(7, 1.0), heights),
            Err(TerrainError::InvalidParameter { name: "heights", .. })
        ));
        let heights = Grid::new_with(7, 5, 0.0f32);
        assert!(matches!(
            WaveSimulator::with_initial_heights(params(7, 1.0), heights),
            Err(TerrainError::InvalidParameter { name: "heights", .. })
        ));
    }

    #[test]
    fn test_extent() {
        let sim = WaveSimulator::new(WaveParams { side: 9, vertex_spacing: 16, ..Default::default() })
            .unwrap();
        assert_eq!(sim.extent(), 128.0);
    }
}
