//! Synthetic chess-piece detection dataset generator.
//!
//! Usage:
//!   synthgen [OPTIONS]
//!
//! Options:
//!   --config FILE    JSON configuration; flags below override it
//!   --images N       Total number of images (default: 6000)
//!   --train F        Train fraction (default: 0.75)
//!   --valid F        Validation fraction (default: 0.2)
//!   --out DIR        Output folder (default: SyntheticChessData)
//!   --width PX       Render width (default: 512)
//!   --height PX      Render height (default: 512)
//!   --seed N         Master seed (default: from the OS)
//!   --max-moves N    Upper bound on random plies per position (default: 20)
//!   --no-clean       Keep an existing output folder
//!
//! Set `RUST_LOG=debug` for one line per image.

use std::{env, path::PathBuf, str::FromStr, time::Instant};

use anyhow::{Context, anyhow, bail};
use env_logger::Env;
use log::info;

use crate::{config::GenConfig, generator::DatasetOrchestrator, render::PreviewRenderer};

mod camera;
mod config;
mod generator;
mod geom;
mod io;
mod pool;
mod project;
mod proxy;
mod record;
mod render;
mod scene;
mod split;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    images: Option<u32>,
    train: Option<f32>,
    valid: Option<f32>,
    out: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    seed: Option<u64>,
    max_moves: Option<u32>,
    no_clean: bool,
    help: bool,
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(i)
        .ok_or_else(|| anyhow!("missing value for {flag}"))?;
    raw.parse()
        .with_context(|| format!("invalid {flag} value: {raw}"))
}

impl CliArgs {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut cli = CliArgs::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    i += 1;
                    cli.config = Some(value(args, i, "--config")?);
                }
                "--images" => {
                    i += 1;
                    cli.images = Some(value(args, i, "--images")?);
                }
                "--train" => {
                    i += 1;
                    cli.train = Some(value(args, i, "--train")?);
                }
                "--valid" => {
                    i += 1;
                    cli.valid = Some(value(args, i, "--valid")?);
                }
                "--out" => {
                    i += 1;
                    cli.out = Some(value(args, i, "--out")?);
                }
                "--width" => {
                    i += 1;
                    cli.width = Some(value(args, i, "--width")?);
                }
                "--height" => {
                    i += 1;
                    cli.height = Some(value(args, i, "--height")?);
                }
                "--seed" => {
                    i += 1;
                    cli.seed = Some(value(args, i, "--seed")?);
                }
                "--max-moves" => {
                    i += 1;
                    cli.max_moves = Some(value(args, i, "--max-moves")?);
                }
                "--no-clean" => cli.no_clean = true,
                "--help" | "-h" => cli.help = true,
                other => bail!("unknown argument: {other}"),
            }
            i += 1;
        }
        Ok(cli)
    }

    fn into_config(self) -> anyhow::Result<GenConfig> {
        let mut cfg = match &self.config {
            Some(path) => GenConfig::from_json_file(path)?,
            None => GenConfig::default(),
        };
        if let Some(n) = self.images {
            cfg.total_images = n;
        }
        if let Some(f) = self.train {
            cfg.train_split = f;
        }
        if let Some(f) = self.valid {
            cfg.valid_split = f;
        }
        if let Some(dir) = self.out {
            cfg.out_dir = dir;
        }
        if let Some(w) = self.width {
            cfg.render_width = w;
        }
        if let Some(h) = self.height {
            cfg.render_height = h;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if let Some(n) = self.max_moves {
            cfg.max_moves = n;
        }
        if self.no_clean {
            cfg.clean_output = false;
        }
        Ok(cfg)
    }
}

fn print_usage() {
    eprintln!(
        "Usage: synthgen [--config FILE] [--images N] [--train F] [--valid F] [--out DIR] \
         [--width PX] [--height PX] [--seed N] [--max-moves N] [--no-clean]"
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            print_usage();
            return Err(e);
        }
    };
    if cli.help {
        print_usage();
        return Ok(());
    }

    let cfg = cli.into_config()?;
    let renderer = PreviewRenderer::new(cfg.camera.clone());
    let mut orchestrator = DatasetOrchestrator::new(cfg, renderer)?;

    let start = Instant::now();
    let summary = orchestrator.run()?;
    let elapsed = start.elapsed();
    info!(
        "wrote {} images in {:.1}s ({:.1} images/s), {} boxes",
        summary.images,
        elapsed.as_secs_f64(),
        summary.images as f64 / elapsed.as_secs_f64().max(1e-9),
        summary.boxes
    );
    Ok(())
}
