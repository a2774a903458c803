use {anyhow::Context, jiff::civil::Date};

use crate::{TODAY, args::Usage};

/// A calendar date parsed from the command line.
///
/// Besides `YYYY-MM-DD`, this also accepts `today`, `tomorrow` and
/// `yesterday`, which are resolved relative to the current date in the
/// system time zone (or `RECUR_TODAY`, when set).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct DateFlexible(Date);

impl DateFlexible {
    pub const ARG_START: Usage = Usage::arg(
        "<date>",
        "The first date in the sequence. Defaults to today.",
        r#"
The first date in the sequence. Defaults to today.

This is always the first date printed, regardless of the repeat type.

Dates are written as `YYYY-MM-DD`. The words `today`, `tomorrow` and
`yesterday` are also accepted.
"#,
    );

    pub fn today() -> DateFlexible {
        DateFlexible(*TODAY)
    }

    pub fn get(&self) -> Date {
        self.0
    }
}

impl From<DateFlexible> for Date {
    fn from(date: DateFlexible) -> Date {
        date.0
    }
}

impl std::str::FromStr for DateFlexible {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<DateFlexible> {
        let date = match &*s.trim().to_lowercase() {
            "today" => *TODAY,
            "tomorrow" => TODAY.tomorrow()?,
            "yesterday" => TODAY.yesterday()?,
            other => other.parse::<Date>().with_context(|| {
                format!(
                    "invalid date `{s}` (expected `YYYY-MM-DD`, `today`, \
                     `tomorrow` or `yesterday`)",
                )
            })?,
        };
        Ok(DateFlexible(date))
    }
}

impl std::fmt::Display for DateFlexible {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
