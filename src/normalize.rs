//! Height-based shading coordinates
//!
//! Heights map into `[0, 1]` with sea level pinned at 0.5: land spans
//! `[0.5, 1.0]` over `[0, max_positive]`, water spans `[0.5, 0.0]` over
//! `[0, max_negative]`. The result is written into both UV components so a
//! 1D gradient texture can color the terrain by altitude.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::terrain::HeightGrid;

const SEA_LEVEL: f32 = 0.5;

/// Extremes found on either side of sea level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    /// Largest height >= 0 (0 if there is none)
    pub max_positive: f32,
    /// Most negative height (0 if there is none)
    pub max_negative: f32,
}

impl HeightRange {
    pub fn scan<'a>(heights: impl IntoIterator<Item = &'a f32>) -> Self {
        let mut range = Self::default();
        for &h in heights {
            if h < 0.0 {
                if h < range.max_negative { range.max_negative = h; }
            } else if h > range.max_positive {
                range.max_positive = h;
            }
        }
        range
    }

    /// Shading coordinate for one height, always within `[0, 1]`.
    ///
    /// A branch whose extreme is exactly zero yields 0.5.
    pub fn shade(&self, height: f32) -> f32 {
        if height >= 0.0 {
            if self.max_positive == 0.0 {
                return SEA_LEVEL;
            }
            lerp_clamped(SEA_LEVEL, 1.0, height / self.max_positive)
        } else {
            if self.max_negative == 0.0 {
                return SEA_LEVEL;
            }
            lerp_clamped(SEA_LEVEL, 0.0, height / self.max_negative)
        }
    }
}

/// Replace every UV with the height-based shading coordinate.
pub fn apply_height_uvs(grid: &mut HeightGrid) -> HeightRange {
    let range = HeightRange::scan(grid.vertices().as_slice().iter().map(|v| &v.position[1]));
    for (_, _, vertex) in grid.vertices_mut().iter_mut() {
        let shade = range.shade(vertex.position[1]);
        vertex.uv = [shade, shade];
    }
    info!(
        max_positive = range.max_positive,
        max_negative = range.max_negative,
        "height-based UVs applied"
    );
    range
}

/// Planar UVs: `u = col / N`, `v = row / N`.
pub fn apply_planar_uvs(grid: &mut HeightGrid) {
    let factor = 1.0 / grid.side() as f32;
    for (row, col, vertex) in grid.vertices_mut().iter_mut() {
        vertex.uv = [col as f32 * factor, row as f32 * factor];
    }
}

#[inline]
fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + (b - a) * t
}
