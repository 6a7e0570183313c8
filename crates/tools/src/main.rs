use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flight::{AnimationConfig, load_route};
use tools::{FileRouteSource, ReplayOptions, inspect, parts_at, replay_into};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and replay flight map routes")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a JSON summary of a route file
    Inspect {
        /// GeoJSON route (FeatureCollection or Feature)
        route: PathBuf,
    },

    /// Run the animation headlessly and print scene commands as JSON lines
    Replay {
        /// GeoJSON route (FeatureCollection or Feature)
        route: PathBuf,

        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Simulated wall-clock duration
        #[arg(long, default_value_t = 60.0)]
        seconds: f64,

        /// JSON file with animation config overrides
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only print camera commands
        #[arg(long)]
        camera_only: bool,
    },

    /// Print what each model part receives at a point in the replay
    Parts {
        /// GeoJSON route (FeatureCollection or Feature)
        route: PathBuf,

        /// Replay time to stop at
        #[arg(long, default_value_t = 1.0)]
        at: f64,

        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// JSON file with animation config overrides
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Inspect { route } => cmd_inspect(route),
        Command::Replay {
            route,
            fps,
            seconds,
            config,
            camera_only,
        } => cmd_replay(
            route,
            config,
            ReplayOptions {
                fps,
                seconds,
                camera_only,
            },
        ),
        Command::Parts {
            route,
            at,
            fps,
            config,
        } => cmd_parts(route, config, fps, at),
    }
}

fn cmd_inspect(path: PathBuf) -> Result<(), String> {
    let source = FileRouteSource::new(path);
    let route = pollster::block_on(load_route(&source))
        .ok_or_else(|| format!("could not load {}", source.path().display()))?;
    let stats = inspect(&route);
    let json = serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<AnimationConfig, String> {
    let Some(p) = config_path else {
        return Ok(AnimationConfig::default());
    };
    let text = fs::read_to_string(&p).map_err(|e| format!("{}: {e}", p.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", p.display()))
}

fn cmd_replay(
    path: PathBuf,
    config_path: Option<PathBuf>,
    options: ReplayOptions,
) -> Result<(), String> {
    let config = load_config(config_path)?;

    // A failed load still replays: the aircraft just stays put.
    let route = pollster::block_on(load_route(&FileRouteSource::new(path)));

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = replay_into(route, config, options, |line| {
        let json = serde_json::to_string(&line).map_err(|e| e.to_string())?;
        writeln!(out, "{json}").map_err(|e| e.to_string())
    })?;
    info!(frames, "replay finished");
    out.flush().map_err(|e| e.to_string())
}

fn cmd_parts(
    path: PathBuf,
    config_path: Option<PathBuf>,
    fps: f64,
    at_seconds: f64,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let route = pollster::block_on(load_route(&FileRouteSource::new(path)));
    for row in parts_at(route, config, fps, at_seconds)? {
        let json = serde_json::to_string(&row).map_err(|e| e.to_string())?;
        println!("{json}");
    }
    Ok(())
}
