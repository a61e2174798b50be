//! Error types for terrain and wave construction.
//!
//! Every validation failure is raised before any grid buffer is allocated,
//! so an `Err` never leaves partially built state behind.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("invalid seed shape: {reason} (side {side})")]
    InvalidSeedShape { side: usize, reason: &'static str },

    #[error("invalid expansion count {0}: must be within 0..=10")]
    InvalidExpansionCount(u32),

    #[error("invalid terrain shape: seed side {seed_side} with {expansions} expansions")]
    InvalidTerrainShape { seed_side: usize, expansions: u32 },

    #[error("invalid wave grid size {0}: must be odd and within 3..=253")]
    InvalidWaveGridSize(usize),

    #[error("invalid parameter {name} = {value}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
