use std::io::Write;

use anyhow::Context;

use crate::{
    args::{self, Usage, flags::FileOrStdin},
    event::Event,
    parse::BufReadExt,
    style::Theme,
};

const USAGE: &'static str = r#"
Render events as rows, marking repeating events.

This reads events as JSON lines, one event object per line, and prints one
row per event in the order they're given:

    <date> <start>-<end> <title>

The title of a repeating event is prefixed with 🔁. This is also true of the
events written by `recur expand`, since they keep their template's repeat
descriptor.

USAGE:
    recur show [<path>]

TIP:
    use -h for short docs and --help for long docs

EXAMPLES:
    Show a weekly event for the next month:

        $ echo '{"title":"sync","date":"2025-05-19","startTime":"09:00","endTime":"10:00","repeat":{"type":"weekly","endDate":"2025-06-09"}}' | recur expand | recur show
        2025-05-19 09:00-10:00 🔁 sync
        2025-05-26 09:00-10:00 🔁 sync
        2025-06-02 09:00-10:00 🔁 sync
        2025-06-09 09:00-10:00 🔁 sync

ARGUMENTS:
%args%
OPTIONS:
%flags%
"#;

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    args::configure(p, USAGE, &mut [&mut config])?;

    let theme = Theme::stdout();
    let mut wtr = std::io::stdout().lock();
    config.input.reader()?.for_byte_line(|line| {
        if line.is_blank() {
            return Ok(true);
        }
        let event: Event =
            serde_json::from_slice(line.content()).with_context(|| {
                format!(
                    "{}: line {}: invalid event",
                    config.input.display(),
                    line.number(),
                )
            })?;
        writeln!(
            wtr,
            "{date} {start}-{end} {title}",
            date = theme.date(event.date),
            start = event.start_time,
            end = event.end_time,
            title = event.display_title().themed(theme),
        )?;
        Ok(true)
    })
}

#[derive(Debug, Default)]
struct Config {
    input: FileOrStdin,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        let lexopt::Arg::Value(ref mut v) = *arg else { return Ok(false) };
        self.input.set(std::mem::take(v))?;
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[FileOrStdin::USAGE]
    }
}
