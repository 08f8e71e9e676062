//! grain-track CLI: link grains through a sequence of segmented EBSD maps.

use clap::{ArgAction, Args, Parser, Subcommand};
use grain_track::core::{level_for_verbosity, CrystalClass, Orientation};
use grain_track::io::TrackConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "grain-track")]
#[command(about = "Track crystal grains through sequences of segmented EBSD maps")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link every frame listed in a config file and write the report.
    Track(TrackArgs),

    /// Print the symmetry-reduced misorientation between two orientations.
    Misorientation(MisorientationArgs),
}

#[derive(Debug, Clone, Args)]
struct TrackArgs {
    /// Path to the JSON run config.
    config: PathBuf,

    /// Report path. Defaults to the config's `output_path`, then
    /// `grain_track_report.json` next to the config.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct MisorientationArgs {
    /// First orientation as `phi1,Phi,phi2`.
    #[arg(allow_hyphen_values = true)]
    a: String,

    /// Second orientation as `phi1,Phi,phi2`.
    #[arg(allow_hyphen_values = true)]
    b: String,

    /// Crystal class: cubic, hexagonal or tetrahedral.
    #[arg(long, default_value = "cubic")]
    class: CrystalClass,

    /// Angles are given and printed in degrees instead of radians.
    #[arg(long)]
    degrees: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let outcome = match cli.command {
        Commands::Track(args) => run_track(&args),
        Commands::Misorientation(args) => run_misorientation(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    grain_track::core::init_tracing(cli.json_logs);
    // RUST_LOG drives the subscriber; -v only raises the `log` bridge ceiling.
    if cli.verbose > 0 {
        log::set_max_level(level_for_verbosity(cli.verbose));
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let _ = grain_track::core::init_with_level(level_for_verbosity(cli.verbose));
}

// ── track ─────────────────────────────────────────────────────────────

fn run_track(args: &TrackArgs) -> CliResult<()> {
    let config = TrackConfig::load_json(&args.config)
        .map_err(|e| format!("failed to read config {}: {e}", args.config.display()))?;
    let base_dir = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let report = config.run(base_dir)?;

    let out = match &args.out {
        Some(path) => path.clone(),
        None => config.output_path(base_dir),
    };
    report.write_json(&out)?;
    log::info!("report written to {}", out.display());

    let chains = report.trajectories.len();
    println!(
        "tracked {chains} grains over {} frames; matched per transition: {:?}; report: {}",
        report.frames.len(),
        report.matches_per_transition,
        out.display()
    );
    Ok(())
}

// ── misorientation ────────────────────────────────────────────────────

fn parse_euler(raw: &str, degrees: bool) -> CliResult<Orientation> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid orientation `{raw}`: {e}"))?;
    let &[phi1, phi, phi2] = values.as_slice() else {
        return Err(format!("orientation `{raw}` must have three comma-separated angles").into());
    };
    Ok(if degrees {
        Orientation::from_degrees(phi1, phi, phi2)
    } else {
        Orientation::new(phi1, phi, phi2)
    })
}

fn run_misorientation(args: &MisorientationArgs) -> CliResult<()> {
    let a = parse_euler(&args.a, args.degrees)?;
    let b = parse_euler(&args.b, args.degrees)?;
    let angle = grain_track::misorientation(&a, &b, args.class)?;
    if args.degrees {
        println!("{:.6}", angle.to_degrees());
    } else {
        println!("{angle:.6}");
    }
    Ok(())
}
