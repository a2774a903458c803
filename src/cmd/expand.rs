use std::io::Write;

use anyhow::Context;

use crate::{
    args::{self, Usage, flags::FileOrStdin},
    event::Event,
    parse::BufReadExt,
};

const USAGE: &'static str = r#"
Expand event templates into one event per occurrence.

This reads events as JSON lines, one event object per line, and writes one
event object per line for every date in each event's series. An event that
doesn't repeat is written once. The events written for a repeating event
share everything with their template except for the date and the ID, which
is dropped.

Blank lines in the input are ignored.

Events whose repeat descriptor has neither an `endDate` nor an
`occurrenceLimit` repeat until the year 9999. Such events are rejected unless
the `-l/--limit` flag is given.

USAGE:
    recur expand [<path>] [-l <number>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Expand a daily event spanning three days:

        $ echo '{"title":"standup","date":"2025-05-19","repeat":{"type":"daily","endDate":"2025-05-21"}}' | recur expand
        {"title":"standup","date":"2025-05-19",...}
        {"title":"standup","date":"2025-05-20",...}
        {"title":"standup","date":"2025-05-21",...}

    %snip-start%

    Expand every event in a file, writing at most 10 occurrences per event:

        $ recur expand -l10 events.jsonl

    %snip-end%
ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let mut wtr = std::io::stdout().lock();
    let mut total = 0;
    config.input.reader()?.for_byte_line(|line| {
        if line.is_blank() {
            return Ok(true);
        }
        let template: Event = serde_json::from_slice(line.content())
            .with_context(|| {
                format!(
                    "{}: line {}: invalid event",
                    config.input.display(),
                    line.number(),
                )
            })?;
        total += config.expand(&template, &mut wtr).with_context(|| {
            format!(
                "{}: line {}: event `{}`",
                config.input.display(),
                line.number(),
                template.title,
            )
        })?;
        Ok(true)
    })?;
    log::debug!("wrote {total} events");
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    input: FileOrStdin,
    limit: Option<usize>,
}

impl Config {
    /// Writes every occurrence of the given template to `wtr` as JSON lines,
    /// returning how many were written.
    fn expand<W: Write>(
        &self,
        template: &Event,
        mut wtr: W,
    ) -> anyhow::Result<usize> {
        let bounded = match template.repeat.rule()? {
            None => true,
            Some(rule) => rule.is_bounded(),
        };
        anyhow::ensure!(
            bounded || self.limit.is_some(),
            "event repeats forever, use -l/--limit to bound it",
        );
        let limit = self.limit.unwrap_or(usize::MAX);
        let mut written = 0;
        for occurrence in template.series()?.take(limit) {
            serde_json::to_writer(&mut wtr, &occurrence)?;
            wtr.write_all(b"\n")?;
            written += 1;
        }
        log::debug!(
            "expanded `{}` from {} into {written} events",
            template.title,
            template.date,
        );
        Ok(written)
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
            Value(ref mut v) => {
                self.input.set(std::mem::take(v))?;
            }
            Short('l') | Long("limit") => {
                self.limit = Some(args::parse(p, "-l/--limit")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const LIMIT: Usage = Usage::flag(
            "-l/--limit <number>",
            "Write at most this many events per template.",
            r#"
Write at most this many events per template.

This applies to every event in the input, including events whose series is
already bounded by an end date or an occurrence limit. In that case, the
smaller of the two bounds wins.

This flag is required when the input contains an event that repeats forever.
"#,
        );

        &[FileOrStdin::USAGE, LIMIT]
    }
}
