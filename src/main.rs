use std::{io::Write, process::ExitCode, sync::LazyLock};

use {
    anyhow::Context,
    jiff::{Timestamp, civil::Date, tz::TimeZone},
};

mod args;
mod calendar;
mod cmd;
mod date;
mod event;
mod logger;
mod parse;
mod repeat;
mod style;

static TZ: LazyLock<TimeZone> = LazyLock::new(|| TimeZone::system());

/// The current date in the system time zone.
///
/// This can be overridden with the `RECUR_TODAY` environment variable, which
/// is mostly useful for getting deterministic output in tests.
static TODAY: LazyLock<Date> = LazyLock::new(|| {
    match read_env_recur_today() {
        Ok(Some(date)) => {
            log::trace!(
                "setting current date to `{date}` from `RECUR_TODAY` \
                 environment variable",
            );
            date
        }
        Ok(None) => {
            let today = Timestamp::now().to_zoned(TZ.clone()).date();
            log::trace!(
                "`RECUR_TODAY` environment variable not set, using \
                 current date `{today}`",
            );
            today
        }
        Err(err) => {
            let today = Timestamp::now().to_zoned(TZ.clone()).date();
            log::warn!(
                "reading `RECUR_TODAY` failed, using current date \
                 `{today}`: {err:#}",
            );
            today
        }
    }
});

/// Again and again and again.
fn main() -> ExitCode {
    let err = match run() {
        Ok(code) => return code,
        Err(err) => err,
    };
    if let Some(help) = err.root_cause().downcast_ref::<args::Help>() {
        // If we can't even write help to stdout, there's nothing left to do.
        let _ = writeln!(&mut std::io::stdout(), "{help}");
        return ExitCode::SUCCESS;
    }
    if let Some(version) = err.root_cause().downcast_ref::<args::Version>() {
        let _ = writeln!(&mut std::io::stdout(), "{version}");
        return ExitCode::SUCCESS;
    }
    // An unbounded sequence piped into something like `head` is normal
    // usage, so a broken pipe exits "gracefully" with a success exit code.
    // The Rust runtime ignores SIGPIPE, which means we see it as an I/O error
    // instead.
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            if err.kind() == std::io::ErrorKind::BrokenPipe {
                return ExitCode::from(0);
            }
        }
        // `serde_json` swallows the `std::io::Error` it hits when writing
        // via `to_writer`, so it needs its own check.
        if let Some(err) = cause.downcast_ref::<serde_json::Error>() {
            if err.io_error_kind() == Some(std::io::ErrorKind::BrokenPipe) {
                return ExitCode::from(0);
            }
        }
    }
    if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(&mut std::io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(&mut std::io::stderr(), "{:#}", err);
    }
    ExitCode::from(1)
}

fn run() -> anyhow::Result<ExitCode> {
    // The logger starts out emitting timestamps in UTC, since looking up the
    // system time zone may itself want to log something.
    let logger = logger::Logger::init_from_env()?;
    logger.set_time_zone(TZ.clone());
    cmd::run(&mut lexopt::Parser::from_env())?;
    Ok(ExitCode::SUCCESS)
}

fn read_env_recur_today() -> anyhow::Result<Option<Date>> {
    let Some(val) = std::env::var_os("RECUR_TODAY") else { return Ok(None) };
    let Some(val) = val.to_str() else {
        anyhow::bail!(
            "`RECUR_TODAY` environment variable is not valid UTF-8: {val:?}"
        )
    };
    val.parse::<Date>()
        .context(
            "`RECUR_TODAY` environment variable is not a valid \
             `YYYY-MM-DD` date",
        )
        .map(Some)
}
