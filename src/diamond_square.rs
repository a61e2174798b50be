//! Diamond-square fractal expansion
//!
//! Each round doubles the grid resolution. Existing heights move to the
//! even coordinates of the larger grid, then:
//!
//! 1. **Diagonal pass**: every (odd, odd) vertex becomes the mean of its four
//!    diagonal neighbors.
//! 2. **Cardinal pass**: every remaining vertex becomes the mean of its
//!    in-bounds axis neighbors (two to four of them).
//!
//! Both passes add a uniform offset bounded by the largest deviation of any
//! contributing neighbor from the mean, scaled by the randomization factor.

use rand::Rng;
use tracing::{debug, info};

use crate::error::{Result, TerrainError};
use crate::grid::Grid;
use crate::params::{validate_seed_side, MAX_EXPANSIONS};

const DIAGONALS: [(isize, isize); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];
const CARDINALS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Side length after `expansions` rounds: `2^expansions * seed_side + 1`.
///
/// Fails with `InvalidTerrainShape` when the combination is outside the
/// supported range or the vertex count would overflow.
pub fn final_side(seed_side: usize, expansions: u32) -> Result<usize> {
    let shape_error = TerrainError::InvalidTerrainShape { seed_side, expansions };
    if expansions > MAX_EXPANSIONS || validate_seed_side(seed_side).is_err() {
        return Err(shape_error);
    }
    let side = 1usize
        .checked_shl(expansions)
        .and_then(|scale| scale.checked_mul(seed_side))
        .and_then(|n| n.checked_add(1))
        .ok_or(TerrainError::InvalidTerrainShape { seed_side, expansions })?;
    if side.checked_mul(side).is_none() {
        return Err(shape_error);
    }
    Ok(side)
}

/// Check that every seed height stays finite once scaled by
/// `2^expansions`.
pub fn check_seed_heights(seed: &Grid<f32>, expansions: u32) -> Result<()> {
    let height_scale = (1u64 << expansions.min(MAX_EXPANSIONS)) as f32;
    match seed.as_slice().iter().find(|h| !(*h * height_scale).is_finite()) {
        Some(&h) => Err(TerrainError::InvalidParameter {
            name: "seed_height",
            value: h as f64,
            expected: "a height that stays finite when scaled by 2^expansions",
        }),
        None => Ok(()),
    }
}

/// Expand a square seed field `expansions` times.
///
/// Seed heights are scaled by `2^expansions` and placed in rows/cols
/// `0..S` of an `(S+1) x (S+1)` starting grid; the trailing row and column
/// start at zero. Returns a grid of side `2^expansions * S + 1`.
pub fn expand<R: Rng + ?Sized>(
    seed: &Grid<f32>,
    expansions: u32,
    randomization: f32,
    rng: &mut R,
) -> Result<Grid<f32>> {
    if !seed.is_square() {
        return Err(TerrainError::InvalidSeedShape {
            side: seed.rows(),
            reason: "seed field must be square",
        });
    }
    validate_seed_side(seed.rows())?;
    if expansions > MAX_EXPANSIONS {
        return Err(TerrainError::InvalidExpansionCount(expansions));
    }
    if !(0.0..=1.0).contains(&randomization) {
        return Err(TerrainError::InvalidParameter {
            name: "randomization",
            value: randomization as f64,
            expected: "0.0..=1.0",
        });
    }
    let target = final_side(seed.rows(), expansions)?;
    check_seed_heights(seed, expansions)?;

    let seed_side = seed.rows();
    let height_scale = (1u64 << expansions) as f32;
    let mut grid = Grid::new_with(seed_side + 1, seed_side + 1, 0.0f32);
    for (row, col, &h) in seed.iter() {
        grid.set(row, col, h * height_scale);
    }

    for round in 1..=expansions {
        grid = expand_once(&grid, randomization, rng);
        debug!(round, side = grid.rows(), "expansion round complete");
    }

    debug_assert_eq!(grid.rows(), target);
    info!(seed_side, expansions, side = grid.rows(), "fractal expansion complete");
    Ok(grid)
}

/// One doubling round: `cur` side `n` becomes `2n - 1`.
fn expand_once<R: Rng + ?Sized>(current: &Grid<f32>, randomization: f32, rng: &mut R) -> Grid<f32> {
    let next_side = current.rows() * 2 - 1;
    let mut next = Grid::new_with(next_side, next_side, 0.0f32);

    for (row, col, &h) in current.iter() {
        next.set(row * 2, col * 2, h);
    }

    for row in (1..next_side).step_by(2) {
        for col in (1..next_side).step_by(2) {
            let h = diagonal_value(&next, row, col, randomization, rng);
            next.set(row, col, h);
        }
    }

    for row in 0..next_side {
        let first_col = if row % 2 == 0 { 1 } else { 0 };
        for col in (first_col..next_side).step_by(2) {
            let h = cardinal_value(&next, row, col, randomization, rng);
            next.set(row, col, h);
        }
    }

    next
}

/// Mean of the four diagonal neighbors plus bounded offset.
///
/// Requires a one-cell margin; odd coordinates of an odd-sided grid always
/// have one.
fn diagonal_value<R: Rng + ?Sized>(
    grid: &Grid<f32>,
    row: usize,
    col: usize,
    randomization: f32,
    rng: &mut R,
) -> f32 {
    let mut neighbors = [0.0f32; 4];
    for (slot, (dr, dc)) in neighbors.iter_mut().zip(DIAGONALS) {
        let r = (row as isize + dr) as usize;
        let c = (col as isize + dc) as usize;
        *slot = *grid.get(r, c);
    }
    perturbed_mean(&neighbors, randomization, rng)
}

/// Mean of the in-bounds axis neighbors plus bounded offset.
///
/// Out-of-bounds neighbors are dropped from both the sum and the divisor.
fn cardinal_value<R: Rng + ?Sized>(
    grid: &Grid<f32>,
    row: usize,
    col: usize,
    randomization: f32,
    rng: &mut R,
) -> f32 {
    let mut neighbors = [0.0f32; 4];
    let mut count = 0;
    for (dr, dc) in CARDINALS {
        if let Some(&h) = grid.get_checked(row as isize + dr, col as isize + dc) {
            neighbors[count] = h;
            count += 1;
        }
    }
    perturbed_mean(&neighbors[..count], randomization, rng)
}

fn perturbed_mean<R: Rng + ?Sized>(neighbors: &[f32], randomization: f32, rng: &mut R) -> f32 {
    if neighbors.is_empty() {
        return 0.0;
    }
    let mean = neighbors.iter().sum::<f32>() / neighbors.len() as f32;
    let max_deviation = neighbors
        .iter()
        .map(|h| (mean - h).abs())
        .fold(0.0f32, f32::max);

    let deviation = max_deviation * randomization;
    if deviation > 0.0 && deviation.is_finite() {
        mean + deviation * rng.gen_range(-1.0f32..=1.0)
    } else {
        mean
    }
}
