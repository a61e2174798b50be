//! Seed management for island generation
//!
//! The seed height field and the fractal expansion draw from separate RNG
//! streams so either can be varied while the other stays fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeds for the randomized build stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Jitter applied to the radial island profile
    pub island: u64,
    /// Midpoint perturbation during diamond-square expansion
    pub expansion: u64,
}

impl TerrainSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            island: derive_seed(master, "island"),
            expansion: derive_seed(master, "expansion"),
        }
    }

    pub fn builder(master: u64) -> TerrainSeedsBuilder {
        TerrainSeedsBuilder {
            seeds: Self::from_master(master),
        }
    }

    pub fn island_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.island)
    }

    pub fn expansion_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.expansion)
    }
}

impl Default for TerrainSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for overriding individual seeds while deriving others from master
pub struct TerrainSeedsBuilder {
    seeds: TerrainSeeds,
}

impl TerrainSeedsBuilder {
    pub fn island(mut self, seed: u64) -> Self {
        self.seeds.island = seed;
        self
    }

    pub fn expansion(mut self, seed: u64) -> Self {
        self.seeds.expansion = seed;
        self
    }

    pub fn build(self) -> TerrainSeeds {
        self.seeds
    }
}

fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for TerrainSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TerrainSeeds {{ master: {}, island: {}, expansion: {} }}",
            self.master, self.island, self.expansion,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let a = TerrainSeeds::from_master(12345);
        let b = TerrainSeeds::from_master(12345);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stages_get_different_seeds() {
        let seeds = TerrainSeeds::from_master(12345);
        assert_ne!(seeds.island, seeds.expansion);
    }

    #[test]
    fn test_builder_override() {
        let seeds = TerrainSeeds::builder(12345).expansion(99).build();
        assert_eq!(seeds.expansion, 99);
        assert_eq!(seeds.island, TerrainSeeds::from_master(12345).island);
    }
}
