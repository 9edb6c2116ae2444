mod error;
mod frame_ticker;
mod game_input_handler;
mod settings;
mod terminal_app;
mod terminal_surface;

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use clap::Parser;
use env_logger::{Env, Target};

use crate::{error::AppError, settings::Settings};

/// Falling-block puzzle game for the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The framerate at which to run the main game.
    #[arg(short, long)]
    fps: Option<u32>,
    /// Milliseconds between two forced drops of the active piece.
    #[arg(short, long)]
    drop_interval_ms: Option<u64>,
    /// Seed for the piece sequence, for reproducible games.
    #[arg(short, long)]
    seed: Option<u64>,
    /// JSON settings file (frame rate, drop interval, keybinds).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write logs to this file. Verbosity follows RUST_LOG, default `info`.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<(), AppError> {
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    // The terminal belongs to the game, so logs only ever go to the file.
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply_overrides(args.fps, args.drop_interval_ms);
    let config = settings.game_config(args.seed);
    log::debug!("{args:?} resolved to {settings:?}");

    let stdout = io::BufWriter::new(io::stdout());
    let mut app = terminal_app::App::new(stdout, settings, config)?;
    let msg = app.run()?;
    drop(app);
    println!("{msg}");
    Ok(())
}
