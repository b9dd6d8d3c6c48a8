//! # Delve Map Preview
//!
//! Generates a level and renders it as ASCII for eyeballing layouts,
//! tuning parameters, and reproducing seeds from bug reports.

use clap::Parser;
use delve::{DelveResult, GenerationConfig, LevelManager, Position};

/// Command line arguments for the preview tool.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Generate and preview procedural levels")]
#[command(version)]
struct Args {
    /// Session seed for deterministic generation
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Depth of the level to generate
    #[arg(short, long, default_value_t = 1)]
    depth: u32,

    /// Override the configured level width
    #[arg(long)]
    width: Option<u32>,

    /// Override the configured level height
    #[arg(long)]
    height: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.clone()),
    )
    .init();

    log::info!("Delve map preview v{}", delve::VERSION);

    let mut config = GenerationConfig::default();
    if let Some(width) = args.width {
        config.default_width = width;
    }
    if let Some(height) = args.height {
        config.default_height = height;
    }

    let mut manager = LevelManager::new(config, args.seed)?;
    let level = manager.get_or_generate(args.depth)?;

    let grid = level.grid();
    let spawn = level.spawn();
    for y in 0..grid.height() as i32 {
        let mut line = String::with_capacity(grid.width() as usize);
        for x in 0..grid.width() as i32 {
            if Position::new(x, y) == spawn {
                line.push('@');
            } else {
                line.push(grid.get(Position::new(x, y)).glyph());
            }
        }
        println!("{line}");
    }

    println!(
        "seed {} depth {} ({:?}): {} rooms, {} buildings, {} deposits, wall ratio {:.2}",
        args.seed,
        args.depth,
        level.theme(),
        level.rooms().len(),
        level.buildings().len(),
        level.resources().len(),
        grid.wall_ratio()
    );
    if let Some(up) = level.stairs_up() {
        println!("stairs up at ({}, {})", up.x, up.y);
    }
    if let Some(down) = level.stairs_down() {
        println!("stairs down at ({}, {})", down.x, down.y);
    }

    Ok(())
}
