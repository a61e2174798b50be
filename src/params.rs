//! Build parameters and configuration
//!
//! Parameter structs mirror the knobs of the island build: the seed island
//! profile, the fractal expansion, and the ocean wave sheet. All of them can
//! be loaded from a single JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

// =============================================================================
// LIMITS
// =============================================================================

pub const MAX_EXPANSIONS: u32 = 10;
pub const MIN_SEED_SIDE: usize = 2;
pub const MAX_SEED_SIDE: usize = 128;
pub const MIN_VERTEX_SPACING: u32 = 1;
pub const MAX_VERTEX_SPACING: u32 = 100;
pub const MIN_WAVE_SIDE: usize = 3;
pub const MAX_WAVE_SIDE: usize = 253;

// =============================================================================
// PARAMETER STRUCTS
// =============================================================================

/// Parameters for the fractal terrain build
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Number of diamond-square rounds; each quadruples the vertex count (0-10)
    pub expansions: u32,

    /// Distance between neighboring vertices in world units (1-100)
    pub vertex_spacing: u32,

    /// Fraction of the local maximum deviation used as random offset (0.0-1.0)
    pub randomization: f32,

    /// Derive UVs from normalized height instead of planar position
    pub height_based_uvs: bool,

    /// Emit an ocean layout for the wave simulator
    pub create_ocean: bool,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            expansions: 4,
            vertex_spacing: 1,
            randomization: 0.5,
            height_based_uvs: true,
            create_ocean: true,
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<()> {
        if self.expansions > MAX_EXPANSIONS {
            return Err(TerrainError::InvalidExpansionCount(self.expansions));
        }
        if !(MIN_VERTEX_SPACING..=MAX_VERTEX_SPACING).contains(&self.vertex_spacing) {
            return Err(TerrainError::InvalidParameter {
                name: "vertex_spacing",
                value: self.vertex_spacing as f64,
                expected: "1..=100",
            });
        }
        if !(0.0..=1.0).contains(&self.randomization) {
            return Err(TerrainError::InvalidParameter {
                name: "randomization",
                value: self.randomization as f64,
                expected: "0.0..=1.0",
            });
        }
        Ok(())
    }
}

/// Parameters for the radial seed island
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandParams {
    /// Side length of the seed field (power of two, 2-128)
    pub size: usize,

    /// Peak height multiplier; about a quarter of `size` gives a steep cone
    pub height_factor: f32,

    /// Half-width of the uniform jitter added to every cell
    pub jitter: f32,
}

impl Default for IslandParams {
    fn default() -> Self {
        Self {
            size: 128,
            height_factor: 32.0,
            jitter: 0.1,
        }
    }
}

/// Parameters for the oscillating wave sheet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Vertices per side (odd, 3-253); even values are decremented
    pub side: usize,

    /// Wave travel speed
    pub propagation: f32,

    /// Angular rate of the center oscillator
    pub driver: f32,

    /// Height the oscillator reaches; all heights are clamped to +/- this
    pub amplitude: f32,

    /// Distance between vertices in world units
    pub vertex_spacing: u32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            side: MAX_WAVE_SIDE,
            propagation: 1.0,
            driver: 1.0,
            amplitude: 1.0,
            vertex_spacing: 1,
        }
    }
}

impl WaveParams {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("propagation", self.propagation),
            ("driver", self.driver),
            ("amplitude", self.amplitude),
        ];
        for (name, value) in checks {
            if !value.is_finite() {
                return Err(TerrainError::InvalidParameter {
                    name,
                    value: value as f64,
                    expected: "a finite value",
                });
            }
        }
        if self.amplitude < 0.0 {
            return Err(TerrainError::InvalidParameter {
                name: "amplitude",
                value: self.amplitude as f64,
                expected: "a non-negative value",
            });
        }
        Ok(())
    }
}

/// Check that a seed side is a power of two within `2..=128`.
pub fn validate_seed_side(side: usize) -> Result<()> {
    if side < MIN_SEED_SIDE {
        return Err(TerrainError::InvalidSeedShape { side, reason: "seed side must be at least 2" });
    }
    if side > MAX_SEED_SIDE {
        return Err(TerrainError::InvalidSeedShape { side, reason: "seed side must be at most 128" });
    }
    if !side.is_power_of_two() {
        return Err(TerrainError::InvalidSeedShape { side, reason: "seed side must be a power of two" });
    }
    Ok(())
}

// =============================================================================
// CONFIG FILE
// =============================================================================

/// Complete generator configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Master seed (random if absent)
    pub seed: Option<u64>,
    pub island: IslandParams,
    pub terrain: TerrainParams,
    pub wave: WaveParams,
}

impl GeneratorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_terrain_params_valid() {
        assert!(TerrainParams::default().validate().is_ok());
    }

    #[test]
    fn test_expansion_count_out_of_range() {
        let params = TerrainParams { expansions: 11, ..Default::default() };
        assert!(matches!(
            params.validate(),
            Err(TerrainError::InvalidExpansionCount(11))
        ));
    }

    #[test]
    fn test_spacing_and_randomization_bounds() {
        let params = TerrainParams { vertex_spacing: 0, ..Default::default() };
        assert!(matches!(params.validate(), Err(TerrainError::InvalidParameter { .. })));

        let params = TerrainParams { randomization: 1.5, ..Default::default() };
        assert!(matches!(params.validate(), Err(TerrainError::InvalidParameter { .. })));
    }

    #[test]
    fn test_seed_side_bounds() {
        assert!(validate_seed_side(2).is_ok());
        assert!(validate_seed_side(128).is_ok());
        for bad in [0, 1, 3, 96, 256] {
            assert!(matches!(
                validate_seed_side(bad),
                Err(TerrainError::InvalidSeedShape { .. })
            ));
        }
    }

    #[test]
    fn test_wave_params_reject_nan() {
        let params = WaveParams { driver: f32::NAN, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GeneratorConfig::from_json(
            r#"{ "seed": 7, "terrain": { "expansions": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.terrain.expansions, 2);
        assert_eq!(config.terrain.vertex_spacing, 1);
        assert_eq!(config.island, IslandParams::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            GeneratorConfig::from_json("{ nope"),
            Err(TerrainError::Config(_))
        ));
    }
}
