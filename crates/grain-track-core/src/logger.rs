//! Log sinks for tracking runs.
//!
//! Without the `tracing` feature, records go through a small `log` backend
//! that prefixes each line with the run clock and the emitting crate:
//!
//! ```text
//! [  0.012s  INFO grain_track_matcher] linked frame 1: 24 of 25 chains
//! ```
//!
//! With `tracing`, [`init_tracing`] installs a `tracing-subscriber` instead,
//! so map construction and frame linking show up as timed spans.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct RunClockLogger {
    level: LevelFilter,
    run_start: Instant,
}

/// Crate part of a `log` target (`grain_track_matcher::matcher` becomes
/// `grain_track_matcher`).
fn crate_of(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

impl Log for RunClockLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let secs = self.run_start.elapsed().as_secs_f64();
        let mut sink = std::io::stderr().lock();
        let _ = writeln!(
            sink,
            "[{secs:7.3}s {:>5} {}] {}",
            record.level(),
            crate_of(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static RUN_LOGGER: OnceLock<RunClockLogger> = OnceLock::new();

/// Level filter for a `-v` count: warnings only by default, then info,
/// debug and trace.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Route `log` records to stderr at `level` and start the run clock.
///
/// The first call wins; later calls keep the installed logger and its level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if RUN_LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = RUN_LOGGER.get_or_init(|| RunClockLogger {
        level,
        run_start: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Closing spans report their busy and idle time. `json` switches to one
/// flattened JSON object per line. Does nothing if a global subscriber is
/// already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
