// A tiny `log` backend that writes to stderr. Level filtering is done
// entirely through `log::set_max_level`, which is set from the `RECUR_LOG`
// environment variable.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use {jiff::tz::TimeZone, log::Log};

use crate::style::Theme;

#[derive(Debug)]
pub struct Logger {
    tz: Mutex<Option<TimeZone>>,
}

impl Logger {
    /// Reads the desired log level from `RECUR_LOG`, then installs a new
    /// stderr logger as the global logger.
    ///
    /// An unset or empty `RECUR_LOG` disables logging.
    pub fn init_from_env() -> anyhow::Result<&'static Logger> {
        let level = std::env::var("RECUR_LOG").unwrap_or_default();
        log::set_max_level(parse_level(&level)?);
        let logger = Box::leak(Box::new(Logger { tz: Mutex::new(None) }));
        log::set_logger(logger)?;
        Ok(logger)
    }

    /// Sets the time zone used to render log timestamps. Until this is
    /// called, timestamps are printed in UTC.
    pub fn set_time_zone(&self, tz: TimeZone) {
        if let Ok(mut guard) = self.tz.lock() {
            *guard = Some(tz);
        }
    }

    fn now(&self) -> String {
        // N.B. This must not do anything that logs, e.g., reading the system
        // time zone from disk. Otherwise we'd recurse right back into here.
        let ts = jiff::Timestamp::now();
        let tz = self.tz.lock().ok().and_then(|tz| tz.clone());
        match tz {
            Some(tz) => ts.to_zoned(tz).to_string(),
            None => ts.to_string(),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let now = Theme::stderr().highlight(self.now());
        let level = record.level();
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => format!("|{}:{line}", relative(file)),
            (Some(file), None) => format!("|{}", relative(file)),
            _ => String::new(),
        };
        eprintln!("{now}|{level}{location}: {}", record.args());
    }

    fn flush(&self) {}
}

fn parse_level(name: &str) -> anyhow::Result<log::LevelFilter> {
    Ok(match name {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{unk}' in RECUR_LOG"),
    })
}

fn relative(path: &str) -> &str {
    static CWD: LazyLock<Option<PathBuf>> =
        LazyLock::new(|| std::env::current_dir().ok());

    let Some(cwd) = CWD.as_deref() else { return path };
    Path::new(path)
        .strip_prefix(cwd)
        .ok()
        .and_then(|relative| relative.to_str())
        .unwrap_or(path)
}
