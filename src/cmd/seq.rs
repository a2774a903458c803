use std::io::Write;

use {anyhow::Context, jiff::civil::Date};

use crate::{
    args::{self, Usage},
    date::DateFlexible,
    parse::OsStrExt,
    repeat::{self, RepeatKind, RepeatRule},
};

const USAGE: &'static str = r#"
Generate the dates of a repeat rule.

Dates are printed in chronological order, one per line, in `YYYY-MM-DD`
format. The first date is always the starting date. If a starting date is not
given, then today is used.

Unless the `-u/--until` or `-c/--count` flags are used, this command will
generate dates until the year 9999. In lieu of `-c/--count`, users may also
choose to use programs like `head` to limit the output.

USAGE:
    recur seq <type> [<date>] [-i <number>] [-u <date> | -c <number>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Print the next three leap days, starting from a leap day:

        $ recur seq yearly -c3 2024-02-29
        2024-02-29
        2028-02-29
        2032-02-29

    %snip-start%

    Every other day for a week and a half:

        $ recur seq daily -i2 --until 2025-05-30 2025-05-19
        2025-05-19
        2025-05-21
        2025-05-23
        2025-05-25
        2025-05-27
        2025-05-29

    Every month on the 31st through the end of June. Months without a 31st
    are skipped:

        $ recur seq monthly --until 2025-06-30 2025-01-31
        2025-01-31
        2025-03-31
        2025-05-31

    Every other Monday for the next two months:

        $ recur seq weekly -i2 -u 2025-06-30 2025-05-19
        2025-05-19
        2025-06-02
        2025-06-16
        2025-06-30

    %snip-end%
ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let rule = config.repeat_rule()?;
    let start = config.start();
    log::debug!(
        "generating {} dates every {} period(s) from {start} ({:?})",
        rule.kind(),
        rule.interval(),
        rule.termination(),
    );
    let mut wtr = std::io::stdout().lock();
    let dates: Box<dyn Iterator<Item = Date>> = match rule.termination() {
        repeat::Termination::Until(end) => {
            let (interval, kind) = (rule.interval(), rule.kind());
            let dates = match kind {
                RepeatKind::Daily => repeat::daily(start, end, interval)?,
                RepeatKind::Weekly => repeat::weekly(start, end, interval)?,
                RepeatKind::Monthly => repeat::monthly(start, end, interval)?,
                RepeatKind::Yearly => repeat::yearly(start, end, interval)?,
            };
            Box::new(dates.into_iter())
        }
        _ => Box::new(repeat::generate(start, &rule)),
    };
    for date in dates {
        writeln!(wtr, "{date}")?;
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    kind: Option<RepeatKind>,
    start: Option<DateFlexible>,
    terminates: Termination,
    interval: Option<i32>,
}

impl Config {
    fn repeat_rule(&self) -> anyhow::Result<RepeatRule> {
        let mut b = RepeatRule::builder(self.kind()?);
        b.interval(self.interval.unwrap_or(1));
        match self.terminates {
            Termination::Never => {}
            Termination::Until(until) => {
                b.until(until.get());
            }
            Termination::Count(count) => {
                b.count(count);
            }
        }
        b.build()
    }

    fn kind(&self) -> anyhow::Result<RepeatKind> {
        self.kind.context("missing required <type>")
    }

    fn start(&self) -> Date {
        self.start.unwrap_or_else(DateFlexible::today).get()
    }
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Value(ref v) => {
                if self.kind.is_none() {
                    self.kind = Some(v.to_str()?.parse()?);
                    return Ok(true);
                }
                if self.start.is_none() {
                    self.start = Some(v.to_str()?.parse()?);
                    return Ok(true);
                }
                return Ok(false);
            }
            Short('u') | Long("until") => {
                anyhow::ensure!(
                    !matches!(self.terminates, Termination::Count(_)),
                    "the -u/--until flag cannot be used with -c/--count",
                );
                self.terminates =
                    Termination::Until(args::parse(p, "-u/--until")?);
            }
            Short('c') | Long("count") => {
                anyhow::ensure!(
                    !matches!(self.terminates, Termination::Until(_)),
                    "the -c/--count flag cannot be used with -u/--until",
                );
                self.terminates =
                    Termination::Count(args::parse(p, "-c/--count")?);
            }
            Short('i') | Long("interval") => {
                self.interval = Some(args::parse(p, "-i/--interval")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const INTERVAL: Usage = Usage::flag(
            "-i/--interval <number>",
            "Repeat every N days, weeks, months or years.",
            r#"
Repeat every N days, weeks, months or years.

The default is 1. The interval must be at least 1.

For monthly and yearly sequences, months or years that are skipped because
they lack the starting date's day still count towards the interval. For
example, a sequence starting on January 31 with an interval of 2 visits
January, March, May, July, September (skipped) and November (skipped) before
returning to January of the next year.
"#,
        );

        &[
            RepeatKind::USAGE,
            DateFlexible::ARG_START,
            INTERVAL,
            Termination::USAGE_UNTIL,
            Termination::USAGE_COUNT,
        ]
    }
}

/// How the `seq` command decides to stop. At most one of `-u/--until` or
/// `-c/--count` may be given.
#[derive(Clone, Copy, Debug, Default)]
enum Termination {
    #[default]
    Never,
    Until(DateFlexible),
    Count(usize),
}

impl Termination {
    const USAGE_UNTIL: Usage = Usage::flag(
        "-u/--until <date>",
        "Repeat a sequence until this date (inclusive).",
        r#"
Repeat a sequence until this date (inclusive).

When this date is before the starting date, nothing is printed.

This flag conflicts with `-c/--count`. That is, one or the other can be set
(or neither), but not both.
"#,
    );

    const USAGE_COUNT: Usage = Usage::flag(
        "-c/--count <number>",
        "Repeat a sequence to generate this number of dates.",
        r#"
Repeat a sequence to generate this number of dates.

The count must be at least 1. Months or years that are skipped don't count.

This flag conflicts with `-u/--until`. That is, one or the other can be set
(or neither), but not both.
"#,
    );
}
