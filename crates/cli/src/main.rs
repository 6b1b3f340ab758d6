#![deny(unsafe_code)]
//! CLI binary for the flow-field simulator.
//!
//! Subcommands:
//! - `run` drives one simulation headless, optionally writing a PNG
//! - `sample` prints the generated field points
//! - `patterns` lists the available flow patterns

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flowfield_core::{
    Extent, Field, FlowError, Pattern, QueuedFrameHost, RenderSink, Scheduler, SimulationConfig,
};
use flowfield_render::RasterSink;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "flowfield", about = "Animated 2D flow field with a tracer particle")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one simulation to completion.
    Run(RunArgs),
    /// Print the sample points of a generated field.
    Sample {
        /// Pattern name (e.g. "clockwise").
        #[arg(long, default_value = "sinusoidal")]
        pattern: String,

        /// Field-space side length.
        #[arg(long, default_value_t = 16)]
        field_size: usize,

        /// Samples per axis (power of two).
        #[arg(long, default_value_t = 16)]
        steps: usize,
    },
    /// List available patterns.
    Patterns,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Pattern name; overrides the config.
    #[arg(long)]
    pattern: Option<String>,

    /// Surface width in pixels.
    #[arg(short = 'W', long, default_value_t = 512)]
    width: u32,

    /// Surface height in pixels.
    #[arg(short = 'H', long, default_value_t = 512)]
    height: u32,

    #[arg(long)]
    field_size: Option<usize>,

    /// Samples per axis (power of two).
    #[arg(long)]
    steps: Option<usize>,

    #[arg(long)]
    fps: Option<f64>,

    /// Run length in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Advection blend factor in [0, 1].
    #[arg(long)]
    interpolation: Option<f64>,

    /// Per-frame resistance constant.
    #[arg(long)]
    resistance: Option<f64>,

    /// Lookup distance metric (euclidean, manhattan).
    #[arg(long)]
    metric: Option<String>,

    /// Lookup strategy (grid, scan).
    #[arg(long)]
    strategy: Option<String>,

    /// Disable the lookup cache.
    #[arg(long)]
    no_cache: bool,

    /// PRNG seed for deterministic output.
    #[arg(long)]
    seed: Option<u64>,

    /// Start on a different pattern chosen at random.
    #[arg(long)]
    shuffle: bool,

    /// Resize the surface mid-run, as WIDTHxHEIGHT.
    #[arg(long)]
    resize: Option<String>,

    /// Frame at which the resize request arrives.
    #[arg(long, default_value_t = 10)]
    resize_at: u64,

    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config overrides as a JSON string.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Write the final frame as a PNG.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Parses `WIDTHxHEIGHT` into pixel dimensions.
fn parse_size(s: &str) -> Result<(u32, u32), CliError> {
    let invalid = || CliError::Input(format!("invalid size '{s}', expected WIDTHxHEIGHT"));
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
    let w: u32 = w.trim().parse().map_err(|_| invalid())?;
    let h: u32 = h.trim().parse().map_err(|_| invalid())?;
    if w == 0 || h == 0 {
        return Err(invalid());
    }
    Ok((w, h))
}

fn parse_json(text: &str, what: &str) -> Result<Value, CliError> {
    serde_json::from_str(text).map_err(|e| CliError::Input(format!("invalid {what} JSON: {e}")))
}

/// Config file, then `--params`, then individual flags.
fn build_config(args: &RunArgs) -> Result<SimulationConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
            SimulationConfig::from_json(&parse_json(&text, "config")?)?
        }
        None => SimulationConfig::default(),
    };
    config = config.merged(&parse_json(&args.params, "--params")?)?;

    let mut flags = Map::new();
    if let Some(p) = &args.pattern {
        flags.insert("pattern".into(), json!(p));
    }
    if let Some(n) = args.field_size {
        flags.insert("field_size".into(), json!(n));
    }
    if let Some(n) = args.steps {
        flags.insert("steps".into(), json!(n));
    }
    if let Some(v) = args.fps {
        flags.insert("fps".into(), json!(v));
    }
    if let Some(v) = args.duration {
        flags.insert("duration_secs".into(), json!(v));
    }
    if let Some(v) = args.interpolation {
        flags.insert("interpolation".into(), json!(v));
    }
    if let Some(v) = args.resistance {
        flags.insert("fps_resistance".into(), json!(v));
    }
    if let Some(m) = &args.metric {
        flags.insert("metric".into(), json!(m));
    }
    if let Some(s) = &args.strategy {
        flags.insert("strategy".into(), json!(s));
    }
    if args.no_cache {
        flags.insert("cache_enabled".into(), json!(false));
    }
    if let Some(seed) = args.seed {
        flags.insert("seed".into(), json!(seed));
    }
    Ok(config.merged(&Value::Object(flags))?)
}

fn extent_of(width: u32, height: u32) -> Extent {
    Extent::new(f64::from(width), f64::from(height))
}

fn run_simulation(args: RunArgs, json_mode: bool) -> Result<(), CliError> {
    let config = build_config(&args)?;
    config.validate()?;
    let resize = args.resize.as_deref().map(parse_size).transpose()?;
    let frame_interval = Duration::try_from_secs_f64(1.0 / config.fps).map_err(|_| {
        FlowError::InvalidConfig(format!(
            "fps {} gives no representable frame interval",
            config.fps
        ))
    })?;
    let debounce = Duration::from_millis(config.resize_debounce_ms);

    let mut scheduler = Scheduler::new(config, extent_of(args.width, args.height))?;
    let mut host = QueuedFrameHost::new();
    let mut sink = RasterSink::new(args.width, args.height)?;

    if args.shuffle {
        scheduler.shuffle_pattern(&mut host, &mut sink)?;
    } else {
        scheduler.start(&mut host, &mut sink);
    }

    let mut now = Duration::ZERO;
    let mut frames = 0u64;
    while host.next_frame().is_some() {
        frames += 1;
        if let Some((w, h)) = resize.filter(|_| frames == args.resize_at) {
            scheduler.request_resize(extent_of(w, h), now)?;
        }
        if scheduler.poll_timers(now)? {
            let extent = scheduler.extent();
            sink.resize(extent.width as u32, extent.height as u32)?;
        }
        scheduler.on_frame(&mut host, &mut sink);
        now += frame_interval;
    }

    // A resize still in flight when the run ends lands on the stopped run.
    if scheduler.resize_pending() && scheduler.poll_timers(now + debounce)? {
        let extent = scheduler.extent();
        sink.resize(extent.width as u32, extent.height as u32)?;
        sink.draw_field(scheduler.field(), scheduler.scale_factor());
    }

    if let Some(path) = &args.output {
        flowfield_render::snapshot::write_png(sink.raster(), path)?;
    }

    let clock = scheduler.clock();
    let particle = scheduler.particle();
    let pattern = scheduler.field().pattern();
    if json_mode {
        let info = json!({
            "pattern": pattern,
            "frames": frames,
            "tick": clock.tick,
            "tick_limit": clock.tick_limit,
            "state": scheduler.state(),
            "particle": particle,
            "extent": scheduler.extent(),
            "scale_factor": scheduler.scale_factor(),
            "matched": scheduler.last_match().map(|m| m.point),
            "cache": scheduler.cache_stats(),
            "frames_requested": host.requested(),
            "output": args.output.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("pattern:   {pattern}");
        println!("frames:    {frames} (tick {} of {})", clock.tick, clock.tick_limit);
        println!("state:     {}", scheduler.state());
        println!("particle:  ({:.3}, {:.3})", particle.x, particle.y);
        match scheduler.cache_stats() {
            Some(stats) => println!(
                "cache:     {} hits, {} misses, {} entries",
                stats.hits, stats.misses, stats.entries
            ),
            None => println!("cache:     disabled"),
        }
        if let Some(path) = &args.output {
            eprintln!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Patterns => {
            let names = Pattern::list_names();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json!({ "patterns": names }))?);
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        Command::Sample {
            pattern,
            field_size,
            steps,
        } => {
            let pattern = Pattern::from_name(&pattern)?;
            let field = Field::generate(field_size, field_size, steps, pattern)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(field.points())?);
            } else {
                println!("{:>10} {:>10} {:>10} {:>10}", "x", "y", "u", "v");
                for p in field.points() {
                    println!("{:>10.4} {:>10.4} {:>10.4} {:>10.4}", p.x, p.y, p.u, p.v);
                }
            }
        }
        Command::Run(args) => run_simulation(args, cli.json)?,
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfield_core::{Metric, Strategy};

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["flowfield", "run"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Run(args) => args,
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_size_accepts_both_separators() {
        assert_eq!(parse_size("640x480").unwrap(), (640, 480));
        assert_eq!(parse_size("32X16").unwrap(), (32, 16));
    }

    #[test]
    fn parse_size_rejects_malformed_input() {
        for bad in ["640", "0x10", "ax4", "10x", ""] {
            let err = parse_size(bad).unwrap_err();
            assert_eq!(err.exit_code(), 12, "{bad}");
        }
    }

    #[test]
    fn flags_override_params() {
        let args = run_args(&[
            "--params",
            r#"{"fps": 30, "pattern": "clockwise", "seed": 1}"#,
            "--pattern",
            "anti-clockwise",
            "--metric",
            "manhattan",
            "--strategy",
            "scan",
            "--no-cache",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.fps, 30.0);
        assert_eq!(config.seed, 1);
        assert_eq!(config.pattern, Pattern::AntiClockwise);
        assert_eq!(config.metric, Metric::Manhattan);
        assert_eq!(config.strategy, Strategy::Scan);
        assert!(!config.cache_enabled);
    }

    #[test]
    fn config_file_is_the_base_layer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        std::fs::write(&path, r#"{"steps": 8, "duration_secs": 2.5}"#).unwrap();
        let path_arg = path.display().to_string();
        let args = run_args(&["--config", &path_arg, "--duration", "1"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.steps, 8);
        assert_eq!(config.duration_secs, 1.0);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let args = run_args(&["--config", "/nonexistent/flowfield.json"]);
        assert_eq!(build_config(&args).unwrap_err().exit_code(), 11);
    }

    #[test]
    fn bad_params_json_is_input_error() {
        let args = run_args(&["--params", "{not json"]);
        assert_eq!(build_config(&args).unwrap_err().exit_code(), 12);
    }

    #[test]
    fn unknown_pattern_is_core_error() {
        let args = run_args(&["--pattern", "spiral"]);
        assert_eq!(build_config(&args).unwrap_err().exit_code(), 10);
    }

    #[test]
    fn run_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run.png");
        let out_arg = out.display().to_string();
        let args = run_args(&[
            "-W", "64", "-H", "48", "--fps", "10", "--duration", "1", "--resize", "80x80",
            "--resize-at", "2", "-o", &out_arg,
        ]);
        run_simulation(args, true).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn invalid_steps_fail_before_running() {
        let args = run_args(&["--steps", "12"]);
        assert_eq!(run_simulation(args, true).unwrap_err().exit_code(), 10);
    }

    #[test]
    fn non_positive_fps_is_config_error() {
        for fps in ["--fps=0", "--fps=-5"] {
            let args = run_args(&[fps]);
            let err = run_simulation(args, true).unwrap_err();
            assert_eq!(err.exit_code(), 10, "fps = {fps}");
            assert!(err.to_string().contains("fps"), "{err}");
        }
    }

    #[test]
    fn fps_too_small_for_frame_interval_is_config_error() {
        let args = run_args(&["--fps", "1e-300", "--duration", "0"]);
        let err = run_simulation(args, true).unwrap_err();
        assert_eq!(err.exit_code(), 10);
        assert!(matches!(err, CliError::Core(FlowError::InvalidConfig(_))));
    }
}
