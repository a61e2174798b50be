//! Profiling tool to identify performance bottlenecks

use std::time::Instant;

use tracing_subscriber::EnvFilter;

use fractal_island::partition::TilePartitioner;
use fractal_island::seeds::TerrainSeeds;
use fractal_island::{diamond_square, island, normalize, HeightGrid, IslandParams, WaveParams, WaveSimulator};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let seeds = TerrainSeeds::from_master(1337);
    let island_params = IslandParams::default();
    let expansions = 3;
    let randomization = 0.5;

    println!("=== Performance Profiling ===");
    println!("Seed island: {0}x{0}, {1} expansions", island_params.size, expansions);
    println!();

    let start = Instant::now();
    let seed = island::generate_island(&island_params, &mut seeds.island_rng())?;
    let island_time = start.elapsed();
    println!("Seed island:   {:?}", island_time);

    let start = Instant::now();
    let heights = diamond_square::expand(&seed, expansions, randomization, &mut seeds.expansion_rng())?;
    let expand_time = start.elapsed();
    println!("Expansion:     {:?} ({}x{})", expand_time, heights.rows(), heights.cols());

    let start = Instant::now();
    let mut grid = HeightGrid::from_heights(&heights, 1)?;
    normalize::apply_height_uvs(&mut grid);
    let normalize_time = start.elapsed();
    println!("Normalization: {:?}", normalize_time);

    let start = Instant::now();
    let partitioner = TilePartitioner::new(grid.side(), island_params.size)?;
    let mut tiles = partitioner.partition(&grid)?;
    let partition_time = start.elapsed();
    println!("Partition:     {:?} ({} tiles)", partition_time, tiles.len());

    let start = Instant::now();
    partitioner.refresh(&mut tiles, &grid)?;
    let refresh_time = start.elapsed();
    println!("Refresh:       {:?}", refresh_time);

    let wave_ticks = 600;
    let mut sim = WaveSimulator::new(WaveParams::default())?;
    let start = Instant::now();
    for _ in 0..wave_ticks {
        sim.step(1.0 / 60.0);
    }
    let wave_time = start.elapsed();
    println!(
        "Wave:          {:?} ({} ticks, {:?}/tick)",
        wave_time,
        wave_ticks,
        wave_time / wave_ticks
    );

    let total = island_time + expand_time + normalize_time + partition_time + refresh_time;
    let pct = |d: std::time::Duration| 100.0 * d.as_secs_f64() / total.as_secs_f64();
    println!("\n=== Terrain Summary ===");
    println!("Seed island:   {:>8.2}%", pct(island_time));
    println!("Expansion:     {:>8.2}%", pct(expand_time));
    println!("Normalization: {:>8.2}%", pct(normalize_time));
    println!("Partition:     {:>8.2}%", pct(partition_time));
    println!("Refresh:       {:>8.2}%", pct(refresh_time));
    println!("─────────────────────────────────");
    println!("Total:         {:?}", total);

    Ok(())
}
