//! Stderr logging for the sieve binaries.
//!
//! Lines look like `[  0.412s  INFO detect::stones] 3 stones measured`.
//! The chosen level applies to the `stone_sieve*` crates; anything else
//! (image decoders, dependencies) is held back to warnings so `-vv` stays
//! readable. The stdout report is never touched.

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

const CRATE_PREFIX: &str = "stone_sieve";
#[cfg(any(feature = "tracing", test))]
const CRATES: [&str; 3] = ["stone_sieve", "stone_sieve_core", "stone_sieve_detect"];

/// Level at which records from `target` are kept.
fn target_level(target: &str, level: LevelFilter) -> LevelFilter {
    if target.starts_with(CRATE_PREFIX) {
        level
    } else {
        level.min(LevelFilter::Warn)
    }
}

/// `stone_sieve_detect::stones` -> `detect::stones`, `stone_sieve::run` -> `run`.
fn short_target(target: &str) -> &str {
    match target.strip_prefix(CRATE_PREFIX) {
        Some(rest) => rest
            .strip_prefix('_')
            .or_else(|| rest.strip_prefix("::"))
            .filter(|s| !s.is_empty())
            .unwrap_or(target),
        None => target,
    }
}

struct SieveLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for SieveLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= target_level(metadata.target(), self.level)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let secs = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{secs:7.3}s {:>5} {}] {}",
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<SieveLogger> = OnceLock::new();

/// Install the stderr logger. Only the first call takes effect.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| SieveLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Map a `-v` count to a level: 0 -> warn, 1 -> info, 2 -> debug, 3+ -> trace.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `EnvFilter` directives equivalent to [`target_level`]: warn globally,
/// `level` for the sieve crates.
#[cfg(any(feature = "tracing", test))]
fn filter_directives(level: LevelFilter) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push_str(&format!(",{name}={level}"));
    }
    directives
}

/// Install a `tracing` subscriber on stderr. `RUST_LOG` replaces the
/// default directives when set.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
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
