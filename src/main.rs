use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fractal_island::export;
use fractal_island::seeds::TerrainSeeds;
use fractal_island::{build_island, GeneratorConfig, WaveSimulator};

#[derive(Parser, Debug)]
#[command(name = "fractal_island")]
#[command(about = "Generate a fractal island terrain with an oscillating ocean")]
struct Args {
    /// JSON config file (flags below override its values)
    #[arg(short, long)]
    config: Option<String>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of diamond-square expansions (0-10)
    #[arg(short, long)]
    expansions: Option<u32>,

    /// Distance between vertices (1-100)
    #[arg(long)]
    spacing: Option<u32>,

    /// Random deviation factor for midpoints (0.0-1.0)
    #[arg(short, long)]
    randomization: Option<f32>,

    /// Side length of the seed island (power of two, 2-128)
    #[arg(long)]
    island_size: Option<usize>,

    /// Peak height multiplier of the seed island
    #[arg(long)]
    height_factor: Option<f32>,

    /// Use planar UVs instead of height-based UVs
    #[arg(long)]
    planar_uvs: bool,

    /// Skip the ocean layout
    #[arg(long)]
    no_ocean: bool,

    /// Export a colored heightmap PNG
    #[arg(long)]
    export_heightmap: Option<String>,

    /// Export the height shading coordinate as a grayscale PNG
    #[arg(long)]
    export_shading: Option<String>,

    /// Export all tiles as JSON
    #[arg(long)]
    export_tiles: Option<String>,

    /// Step the ocean wave simulator this many ticks
    #[arg(long, default_value = "0")]
    wave_ticks: u32,

    /// Wave tick length in seconds
    #[arg(long, default_value = "0.016666668")]
    wave_dt: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => GeneratorConfig::load(path)
            .with_context(|| format!("loading config {path}"))?,
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = args.seed { config.seed = Some(seed); }
    if let Some(e) = args.expansions { config.terrain.expansions = e; }
    if let Some(s) = args.spacing { config.terrain.vertex_spacing = s; }
    if let Some(r) = args.randomization { config.terrain.randomization = r; }
    if let Some(size) = args.island_size { config.island.size = size; }
    if let Some(hf) = args.height_factor { config.island.height_factor = hf; }
    if args.planar_uvs { config.terrain.height_based_uvs = false; }
    if args.no_ocean { config.terrain.create_ocean = false; }

    let seed = config.seed.unwrap_or_else(|| rand::random());
    let seeds = TerrainSeeds::from_master(seed);
    info!("Generating island with seed: {}", seed);
    info!(
        "Seed island {}x{}, {} expansions, randomization {:.2}",
        config.island.size, config.island.size, config.terrain.expansions, config.terrain.randomization
    );

    let build = build_island(&config.island, &config.terrain, &seeds)?;

    let (min_h, max_h) = build.grid.heights().min_max();
    let above_sea = build
        .grid
        .vertices()
        .as_slice()
        .iter()
        .filter(|v| v.height() > 0.0)
        .count();
    let total = build.side() * build.side();
    info!("Grid: {}x{} vertices", build.side(), build.side());
    info!(
        "Height range: {:.2} to {:.2} ({:.1}% above sea level)",
        min_h,
        max_h,
        100.0 * above_sea as f64 / total as f64
    );
    info!(
        "Tiles: {} ({}x{} cells each), {} triangles",
        build.tiles.len(),
        build.tile_base_size(),
        build.tile_base_size(),
        build.triangle_count()
    );

    if let Some(ref path) = args.export_heightmap {
        export::export_heightmap(&build.grid, path)?;
        info!("Exported heightmap to: {}", path);
    }
    if let Some(ref path) = args.export_shading {
        export::export_shading(&build.grid, path)?;
        info!("Exported shading to: {}", path);
    }
    if let Some(ref path) = args.export_tiles {
        export::export_tiles_json(&build, path)?;
        info!("Exported tiles to: {}", path);
    }

    if args.wave_ticks > 0 {
        let Some(ocean) = build.ocean else {
            warn!("Wave ticks requested but ocean is disabled");
            return Ok(());
        };
        let mut sim = WaveSimulator::new(ocean.wave_params(&config.wave))?;
        info!(
            "Ocean sheet: {}x{} vertices, extent {:.0}",
            sim.side(),
            sim.side(),
            sim.extent()
        );
        for _ in 0..args.wave_ticks {
            sim.step(args.wave_dt);
        }
        let (lo, hi) = sim.heights().min_max();
        info!(
            "After {} ticks ({:.2}s): wave heights {:.3} to {:.3}",
            sim.ticks(),
            sim.time(),
            lo,
            hi
        );
    }

    Ok(())
}
