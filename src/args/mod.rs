use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
    sync::LazyLock,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
    regex::Regex,
};

pub mod flags;

/// A target for command line arguments.
///
/// Each command splits its arguments over one or more `Configurable`
/// targets. `configure` offers every argument to each target in turn until
/// one of them claims it.
pub trait Configurable: Debug {
    /// Attempts to consume `arg` (and its value from `p`, if it has one).
    ///
    /// Returns `false` when this target doesn't recognize the argument.
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    /// Documentation for the flags and arguments this target parses.
    fn usage(&self) -> &[Usage] {
        &[]
    }
}

/// Parses all remaining arguments in `p` into the given targets.
///
/// `-h` and `--help` are handled here by rendering `usage` into a `Help`
/// error. The `%args%` and `%flags%` placeholders in `usage` are replaced
/// with the docs collected from `targets`. Anything between `%snip-start%`
/// and `%snip-end%` is only shown by `--help`.
pub fn configure(
    p: &mut Parser,
    usage: &str,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    static SNIPPED: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^\s*%snip-start%\p{any}*?%snip-end%\s*$").unwrap()
    });
    static SNIP_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?m)^\s*%snip-(start|end)%\s*$").unwrap()
    });

    while let Some(arg) = p.next()? {
        let long = match arg {
            Arg::Short('h') => Some(false),
            Arg::Long("help") => Some(true),
            _ => None,
        };
        if let Some(long) = long {
            let args = usage_for_args(targets);
            let flags = usage_for_flags(targets);
            let (usage, args, flags) = if long {
                let usage = SNIP_MARKERS.replace_all(usage, "");
                (usage, Usage::long(&args), Usage::long(&flags))
            } else {
                let usage = SNIPPED.replace_all(usage, "");
                (usage, Usage::short(&args), Usage::short(&flags))
            };
            let usage =
                usage.replace("%args%", &args).replace("%flags%", &flags);
            return Err(anyhow::Error::from(Help(usage.trim().to_string())));
        }
        // Long flag names borrow from `p`, but targets need `p` mutably to
        // read flag values. So give the name a home of its own.
        let long_name = match arg {
            Arg::Long(name) => Some(name.to_string()),
            _ => None,
        };
        let mut arg = match (arg, long_name.as_deref()) {
            (_, Some(name)) => Arg::Long(name),
            (Arg::Short(c), None) => Arg::Short(c),
            (Arg::Value(v), None) => Arg::Value(v),
            (Arg::Long(_), None) => unreachable!(),
        };
        let mut claimed = false;
        for target in targets.iter_mut() {
            if target.configure(p, &mut arg)? {
                claimed = true;
                break;
            }
        }
        if !claimed {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

fn usage_for_args(targets: &[&mut dyn Configurable]) -> Vec<Usage> {
    // Positional arguments keep the order in which they're declared.
    targets
        .iter()
        .flat_map(|t| t.usage().iter().copied())
        .filter(|u| !u.flag)
        .collect()
}

fn usage_for_flags(targets: &[&mut dyn Configurable]) -> Vec<Usage> {
    let mut usages = vec![Help::USAGE, Version::USAGE];
    usages.extend(
        targets
            .iter()
            .flat_map(|t| t.usage().iter().copied())
            .filter(|u| u.flag),
    );
    usages.sort_by_key(|u| u.format.trim_start_matches('-'));
    usages
}

/// Reads the next argument as a sub-command name.
///
/// When there are no more arguments, or when `-h/--help` is given, the
/// usage is returned as an error. `--version` returns a `Version` error.
pub fn next_as_command(usage: &str, p: &mut Parser) -> anyhow::Result<String> {
    let usage = usage.trim();
    let Some(arg) = p.next()? else { anyhow::bail!("{usage}") };
    match arg {
        Arg::Value(cmd) => Ok(cmd.string()?),
        Arg::Short('h') | Arg::Long("help") => {
            Err(anyhow::Error::from(Help(usage.to_string())))
        }
        Arg::Long("version") => Err(anyhow::Error::from(Version)),
        arg => Err(arg.unexpected().into()),
    }
}

/// Parses the value of the flag that `p` just returned into a `T`.
///
/// Errors mention `flag_name`.
pub fn parse<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    let value = p.value().context(flag_name)?;
    let Some(value) = value.to_str() else {
        let err = lexopt::Error::NonUnicodeValue(value.clone());
        return Err(anyhow::Error::from(err).context(flag_name));
    };
    // `anyhow::Error` doesn't implement `std::error::Error`, so
    // `anyhow::Error::msg` is the only way to accept it as `T::Err`.
    value.parse().map_err(|err| anyhow::Error::msg(err).context(flag_name))
}

/// Documentation for a single flag or positional argument.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// True for an optional flag, false for a positional argument.
    pub flag: bool,
    /// How the flag is written, e.g., `-c/--count <number>`.
    pub format: &'static str,
    /// A one line description.
    pub short: &'static str,
    /// A description of any length. Paragraphs are separated by blank lines.
    pub long: &'static str,
}

impl Usage {
    pub const fn flag(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: true, format, short, long }
    }

    pub const fn arg(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: false, format, short, long }
    }

    /// Renders a two column table of formats and short descriptions.
    pub fn short(usages: &[Usage]) -> String {
        let width = usages.iter().map(|u| u.format.len()).max().unwrap_or(0);
        let mut out = String::new();
        for u in usages {
            // Writing to a `String` never fails.
            let _ = writeln!(out, "    {:width$}  {}", u.format, u.short);
        }
        out
    }

    /// Renders each format followed by its long description, wrapped and
    /// indented below it.
    pub fn long(usages: &[Usage]) -> String {
        let wrap = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut out = String::new();
        for (i, u) in usages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "    {}", u.format);
            for (j, paragraph) in u.long.trim().split("\n\n").enumerate() {
                if j > 0 {
                    out.push('\n');
                }
                let flattened = paragraph.replace('\n', " ");
                for line in textwrap::wrap(&flattened, &wrap) {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// The rendered output of `-h/--help`.
///
/// This travels up to `main` as an error, where it's sniffed out via
/// downcasting and printed to stdout with a success exit code.
#[derive(Debug)]
pub struct Help(String);

impl Help {
    const USAGE: Usage = Usage::flag(
        "-h/--help",
        "Print help output.",
        r#"
Print help output.

The short flag, -h, shows a condensed help output with a single line for
every flag. The long flag, --help, shows complete documentation.
"#,
    );
}

impl std::fmt::Display for Help {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Help {}

/// The output of `--version`. Like `Help`, this is an error only so that it
/// can be printed by `main`.
#[derive(Debug)]
pub struct Version;

impl Version {
    const USAGE: Usage = Usage::flag(
        "--version",
        "Print the version of recur.",
        r#"
Print the version of recur.
"#,
    );
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let semver = option_env!("CARGO_PKG_VERSION").unwrap_or("N/A");
        match option_env!("RECUR_BUILD_GIT_HASH") {
            None => write!(f, "recur {semver}"),
            Some(hash) => write!(f, "recur {semver} (rev {hash})"),
        }
    }
}

impl std::error::Error for Version {}
