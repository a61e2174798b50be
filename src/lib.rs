//! Fractal island generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod diamond_square;
pub mod error;
pub mod export;
pub mod grid;
pub mod island;
pub mod mesh;
pub mod normalize;
pub mod params;
pub mod partition;
pub mod seeds;
pub mod terrain;
pub mod wave;

pub use error::{Result, TerrainError};
pub use params::{GeneratorConfig, IslandParams, TerrainParams, WaveParams};
pub use terrain::{build_island, build_terrain, HeightGrid, TerrainBuild};
pub use wave::WaveSimulator;
