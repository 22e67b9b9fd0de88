//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Pelt demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "pelt", about = "Shell fur demo")]
pub struct CliArgs {
    /// Shell count for the fur surface.
    #[arg(long)]
    pub shell_count: Option<u32>,

    /// Fur length in [0, 1].
    #[arg(long)]
    pub fur_length: Option<f32>,

    /// Disable the LOD controller.
    #[arg(long)]
    pub no_lod: bool,

    /// Use one shared material with per-renderer overrides.
    #[arg(long)]
    pub shared_material: bool,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(count) = args.shell_count {
            self.fur.shell_count = count;
        }
        if let Some(length) = args.fur_length {
            self.fur.fur_length = length;
        }
        if args.no_lod {
            self.lod.enabled = false;
        }
        if args.shared_material {
            self.fur.allocation = crate::ShellAllocation::SharedWithOverrides;
            self.batching.convert_to_shared_material = true;
        }
        if let Some(frames) = args.frames {
            self.debug.demo_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
