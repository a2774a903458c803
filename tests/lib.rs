use std::{ffi::OsStr, path::Path};


/// The date that `today` means in every test.
const TODAY: &str = "2025-05-19";

/// A temporary directory for tests that read events from files.
#[derive(Debug)]
struct TempDir(tempfile::TempDir);

impl TempDir {
    fn new() -> TempDir {
        TempDir(tempfile::tempdir().unwrap())
    }

    /// Create a new `recur` command whose CWD is this directory and the
    /// given arguments appended to it.
    fn recur<T: AsRef<OsStr>>(
        &self,
        args: impl IntoIterator<Item = T>,
    ) -> crate::command::Command {
        recur(args).current_dir(self.0.path())
    }

    /// Create a new file in this directory with the given relative path and
    /// contents.
    fn create(
        &self,
        relative_path: impl AsRef<Path>,
        contents: impl AsRef<[u8]>,
    ) {
        let path = self.0.path().join(relative_path.as_ref());
        std::fs::write(&path, contents).unwrap();
    }
}

/// Return a command for the `recur` binary and no arguments.
///
/// The environment is pinned so that output doesn't depend on the machine or
/// the day the tests are run.
fn recur_bare() -> crate::command::Command {
    crate::command::bin("recur")
        .env("RECUR_TODAY", TODAY)
        .env("TZ", "Asia/Seoul")
        .env_remove("RECUR_LOG")
        .env_remove("RUST_BACKTRACE")
}

/// Return a command for the `recur` binary with the given arguments appended
/// to it.
fn recur<T: AsRef<OsStr>>(
    args: impl IntoIterator<Item = T>,
) -> crate::command::Command {
    recur_bare().args(args)
}

#[test]
fn no_args() {
    crate::command::assert_cmd_snapshot!(
        recur_bare(),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    A simple utility for generating the dates of recurring events.

    USAGE:
        recur <command> ...

    COMMANDS:
        expand  Expand event templates into one event per occurrence
        seq     Generate the dates of a repeat rule
        show    Render events as rows, marking repeating events
    ",
    );
}

#[test]
fn version() {
    crate::command::assert_cmd_snapshot!(
        recur(["--version"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    recur 0.1.0

    ----- stderr -----
    ",
    );
}

#[test]
fn unknown_command() {
    crate::command::assert_cmd_snapshot!(
        recur(["repeat"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    unrecognized command 'repeat'
    ",
    );
}

#[test]
fn bad_log_level() {
    crate::command::assert_cmd_snapshot!(
        recur(["seq", "daily", "-c1"]).env("RECUR_LOG", "loud"),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    unrecognized log level 'loud' in RECUR_LOG
    ",
    );
}

/// Short help leaves out the extended examples and long help includes them.
/// The exact text isn't snapshotted since it's just docs.
#[test]
fn help() {
    for cmd in ["expand", "seq", "show"] {
        let short = recur([cmd, "-h"]).std().output().unwrap();
        assert!(short.status.success(), "{cmd} -h failed");
        let stdout = String::from_utf8(short.stdout).unwrap();
        assert!(stdout.contains("\nARGUMENTS:\n"), "{stdout}");
        assert!(!stdout.contains("REQUIRED"), "{stdout}");
        assert!(stdout.contains("-h/--help"), "{stdout}");
        assert!(!stdout.contains("%snip"), "{stdout}");
        assert!(!stdout.contains("%args%"), "{stdout}");

        let long = recur([cmd, "--help"]).std().output().unwrap();
        assert!(long.status.success(), "{cmd} --help failed");
        let stdout = String::from_utf8(long.stdout).unwrap();
        assert!(!stdout.contains("%snip"), "{stdout}");
        assert!(!stdout.contains("%flags%"), "{stdout}");
    }

    let short = recur(["seq", "-h"]).std().output().unwrap();
    let long = recur(["seq", "--help"]).std().output().unwrap();
    assert!(short.stdout.len() < long.stdout.len());
    let long = String::from_utf8(long.stdout).unwrap();
    assert!(long.contains("Months without a 31st"), "{long}");
    assert!(
        long.contains(
            "recur seq <type> [<date>] [-i <number>] [-u <date> | -c <number>]"
        ),
        "{long}",
    );

    let short = recur(["expand", "-h"]).std().output().unwrap();
    let short = String::from_utf8(short.stdout).unwrap();
    assert!(short.contains("recur expand [<path>] [-l <number>]"), "{short}");
}
