//! Radial seed island
//!
//! Produces the small height field the fractal expansion starts from: a
//! cone that rises toward the center, with a shallow depression ringing
//! the outer edge and a flattened peak.

use rand::Rng;
use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::grid::Grid;
use crate::params::{validate_seed_side, IslandParams};

/// Falloff value at the grid edge; slightly negative so corners dip below zero.
const EDGE_FALLOFF: f32 = -0.1;
/// Falloff above which the peak is flattened.
const PEAK_THRESHOLD: f32 = 0.8;
const PEAK_SCALE: f32 = 0.75;
/// Falloff below which the cell is pushed under sea level.
const CRATER_THRESHOLD: f32 = 0.01;
const CRATER_SCALE: f32 = 1.5;

/// Generate a `size x size` seed island.
///
/// Every cell gets uniform jitter in `[-jitter, jitter]`; this jitter is not
/// scaled by the expansion's randomization factor.
pub fn generate_island<R: Rng + ?Sized>(params: &IslandParams, rng: &mut R) -> Result<Grid<f32>> {
    validate_seed_side(params.size)?;
    if !(params.jitter >= 0.0 && params.jitter.is_finite()) {
        return Err(TerrainError::InvalidParameter {
            name: "jitter",
            value: params.jitter as f64,
            expected: "a finite non-negative value",
        });
    }
    let extreme = (params.height_factor.abs() + params.jitter) * CRATER_SCALE;
    if !params.height_factor.is_finite() || !extreme.is_finite() {
        return Err(TerrainError::InvalidParameter {
            name: "height_factor",
            value: params.height_factor as f64,
            expected: "a finite value whose crater depth stays finite",
        });
    }

    let size = params.size;
    let half = (size / 2) as f32;
    let mut island = Grid::new_with(size, size, 0.0f32);

    for row in 0..size {
        let falloff_row = lerp_clamped(1.0, EDGE_FALLOFF, (row as f32 - half).abs() / half);
        for col in 0..size {
            let falloff_col = lerp_clamped(1.0, EDGE_FALLOFF, (col as f32 - half).abs() / half);
            let falloff = (falloff_row * falloff_col).powi(3);

            let noise = if params.jitter > 0.0 {
                rng.gen_range(-params.jitter..=params.jitter)
            } else {
                0.0
            };
            island.set(row, col, profile_height(falloff, params.height_factor, noise));
        }
    }

    debug!(size, height_factor = params.height_factor, "seed island generated");
    Ok(island)
}

/// Map a radial falloff value to a height.
fn profile_height(falloff: f32, height_factor: f32, noise: f32) -> f32 {
    let base = falloff * height_factor + noise;
    if falloff > PEAK_THRESHOLD {
        base * PEAK_SCALE
    } else if falloff < CRATER_THRESHOLD {
        -base.abs() * CRATER_SCALE
    } else {
        base
    }
}

#[inline]
fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params(size: usize, jitter: f32) -> IslandParams {
        IslandParams { size, height_factor: 10.0, jitter }
    }

    #[test]
    fn test_profile_regimes() {
        // Peak is flattened
        assert!((profile_height(1.0, 10.0, 0.0) - 7.5).abs() < 1e-6);
        // Mid slope is linear
        assert!((profile_height(0.5, 10.0, 0.0) - 5.0).abs() < 1e-6);
        // Rim is forced below sea level
        assert!((profile_height(0.005, 10.0, 0.05) + 0.15).abs() < 1e-6);
        assert!(profile_height(0.0, 10.0, 0.08) < 0.0);
    }

    #[test]
    fn test_center_is_highest_without_jitter() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let island = generate_island(&params(16, 0.0), &mut rng).unwrap();
        let center = *island.get(8, 8);
        let (_, max) = island.min_max();
        assert_eq!(center, max);
        assert!((center - 7.5).abs() < 1e-5);
        assert!(*island.get(0, 0) <= 0.0);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let flat = generate_island(&params(32, 0.0), &mut rng).unwrap();
        let noisy = generate_island(&params(32, 0.1), &mut rng).unwrap();
        for ((_, _, &a), (_, _, &b)) in flat.iter().zip(noisy.iter()) {
            // Crater cells scale jitter by 1.5, peak cells by 0.75
            assert!((a - b).abs() <= 0.1 * CRATER_SCALE + 1e-4);
        }
    }

    #[test]
    fn test_invalid_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for size in [0, 1, 6, 256] {
            assert!(matches!(
                generate_island(&params(size, 0.1), &mut rng),
                Err(TerrainError::InvalidSeedShape { .. })
            ));
        }
    }

    #[test]
    fn test_negative_jitter_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            generate_island(&params(8, -1.0), &mut rng),
            Err(TerrainError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_height_factor_must_keep_craters_finite() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let huge = IslandParams { size: 8, height_factor: f32::MAX, jitter: 0.0 };
        assert!(matches!(
            generate_island(&huge, &mut rng),
            Err(TerrainError::InvalidParameter { name: "height_factor", .. })
        ));
        let large = IslandParams { size: 8, height_factor: 1e38, jitter: 0.1 };
        let island = generate_island(&large, &mut rng).unwrap();
        assert!(island.as_slice().iter().all(|h| h.is_finite()));
    }
}
