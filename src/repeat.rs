use {
    jiff::{Span, civil::Date},
    log::trace,
};

use crate::{args::Usage, calendar};

/// A rule describing how a series of dates repeats.
///
/// A rule is independent of any starting point. Use
/// `RepeatRule::occurrences` (or `generate`) to produce the dates of a series
/// beginning at a particular date.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepeatRule {
    kind: RepeatKind,
    interval: i32,
    termination: Termination,
}

impl RepeatRule {
    /// Returns a builder for constructing a `RepeatRule`.
    ///
    /// By default, the interval is `1` and the rule never terminates.
    pub fn builder(kind: RepeatKind) -> RepeatRuleBuilder {
        RepeatRuleBuilder::new(kind)
    }

    pub fn kind(&self) -> RepeatKind {
        self.kind
    }

    pub fn interval(&self) -> i32 {
        self.interval
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Returns true when this rule is guaranteed to produce a finite number
    /// of dates well before the end of the supported calendar.
    pub fn is_bounded(&self) -> bool {
        !matches!(self.termination, Termination::Never)
    }

    /// Returns an iterator over all dates in the series starting at `start`.
    ///
    /// The first date yielded is always `start` (unless the rule terminates
    /// before it). When the rule never terminates, the iterator continues
    /// until the largest date supported by Jiff. Callers should call
    /// `take(N)` in that case.
    pub fn occurrences(&self, start: Date) -> Occurrences {
        Occurrences { rule: *self, start, attempt: Some(0), emitted: 0 }
    }
}

/// A builder for constructing a valid repeat rule.
#[derive(Clone, Debug)]
pub struct RepeatRuleBuilder {
    kind: RepeatKind,
    interval: i32,
    until: Option<Date>,
    count: Option<usize>,
}

impl RepeatRuleBuilder {
    fn new(kind: RepeatKind) -> RepeatRuleBuilder {
        RepeatRuleBuilder { kind, interval: 1, until: None, count: None }
    }

    pub fn build(&self) -> anyhow::Result<RepeatRule> {
        anyhow::ensure!(
            self.interval >= 1,
            "interval value of `{}` is invalid \
             (interval must be greater than or equal to 1)",
            self.interval,
        );
        if let Some(count) = self.count {
            anyhow::ensure!(
                count >= 1,
                "occurrence limit of `{count}` is invalid \
                 (limit must be greater than or equal to 1)",
            );
        }
        let termination = match (self.until, self.count) {
            (None, None) => Termination::Never,
            (Some(until), None) => Termination::Until(until),
            (None, Some(count)) => Termination::Count(count),
            (Some(until), Some(count)) => anyhow::bail!(
                "a repeat rule can end on a date (`{until}`) or after a \
                 number of occurrences (`{count}`), but not both",
            ),
        };
        let (kind, interval) = (self.kind, self.interval);
        Ok(RepeatRule { kind, interval, termination })
    }

    pub fn interval(&mut self, interval: i32) -> &mut RepeatRuleBuilder {
        self.interval = interval;
        self
    }

    /// Sets the last date (inclusive) that may appear in the series.
    pub fn until(&mut self, until: Date) -> &mut RepeatRuleBuilder {
        self.until = Some(until);
        self
    }

    /// Sets the total number of dates in the series. This must be at least
    /// `1`.
    pub fn count(&mut self, count: usize) -> &mut RepeatRuleBuilder {
        self.count = Some(count);
        self
    }
}

/// The unit of time by which a series advances.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RepeatKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatKind {
    pub const USAGE: Usage = Usage::arg(
        "<type>",
        "How often the sequence repeats.",
        r#"
How often the sequence repeats.

Valid values are:

daily, day, d

weekly, week, wk, w

monthly, month, mo

yearly, year, yr, y

Monthly and yearly sequences keep the day of the month of the starting date.
When that day doesn't exist in a particular month (e.g., the 31st of April)
or year (e.g., the 29th of February in a common year), then that month or year
is skipped.
"#,
    );

    pub fn as_str(&self) -> &'static str {
        match *self {
            RepeatKind::Daily => "daily",
            RepeatKind::Weekly => "weekly",
            RepeatKind::Monthly => "monthly",
            RepeatKind::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for RepeatKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<RepeatKind> {
        use self::RepeatKind::*;

        let kind = match &*s.to_lowercase() {
            "daily" | "day" | "d" => Daily,
            "weekly" | "week" | "wk" | "w" => Weekly,
            "monthly" | "month" | "mo" => Monthly,
            "yearly" | "year" | "yr" | "y" => Yearly,
            _ => anyhow::bail!("unrecognized repeat type: `{s}`"),
        };
        Ok(kind)
    }
}

impl std::fmt::Display for RepeatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a series stops.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Termination {
    #[default]
    Never,
    /// The series includes dates up to and including this one.
    Until(Date),
    /// The series stops after emitting this many dates.
    Count(usize),
}

/// An iterator over the dates of a series.
///
/// Cloning this iterator, or calling `RepeatRule::occurrences` again, gives
/// a fresh cursor over the same deterministic sequence.
#[derive(Clone, Debug)]
pub struct Occurrences {
    rule: RepeatRule,
    start: Date,
    /// The index of the next candidate period, counted in units of the
    /// rule's interval from `start`.
    ///
    /// Candidates are always computed as `start + attempt * interval` instead
    /// of by adding the interval to the previous date. Otherwise a skipped
    /// period would need to be re-anchored on the original day.
    ///
    /// When this is `None`, iteration has ceased.
    attempt: Option<i64>,
    /// The number of dates yielded so far.
    emitted: usize,
}

impl Occurrences {
    /// Rewinds this iterator back to the beginning of its series.
    #[cfg_attr(not(test), expect(dead_code))]
    pub fn restart(&mut self) {
        self.attempt = Some(0);
        self.emitted = 0;
    }

    fn candidate(&self, attempt: i64) -> Candidate {
        let Some(units) = attempt.checked_mul(i64::from(self.rule.interval))
        else {
            return Candidate::Exhausted;
        };
        match self.rule.kind {
            RepeatKind::Daily => self.after_days(units),
            RepeatKind::Weekly => match units.checked_mul(7) {
                None => Candidate::Exhausted,
                Some(days) => self.after_days(days),
            },
            RepeatKind::Monthly => self.after_months(units),
            RepeatKind::Yearly => self.after_years(units),
        }
    }

    fn after_days(&self, days: i64) -> Candidate {
        let Ok(span) = Span::new().try_days(days) else {
            return Candidate::Exhausted;
        };
        match self.start.checked_add(span) {
            Ok(date) => Candidate::Date(date),
            Err(_) => Candidate::Exhausted,
        }
    }

    fn after_months(&self, months: i64) -> Candidate {
        let (year, month) = (self.start.year(), self.start.month());
        let Some((year, month)) = calendar::add_months(year, month, months)
        else {
            return Candidate::Exhausted;
        };
        let day = self.start.day();
        if let Some(date) = calendar::date(year, month, day) {
            return Candidate::Date(date);
        }
        trace!("skipping {year:04}-{month:02} since it has no day {day}");
        match calendar::date(year, month, 1) {
            Some(first) => Candidate::Skipped(first),
            None => Candidate::Exhausted,
        }
    }

    fn after_years(&self, years: i64) -> Candidate {
        let Some(year) = calendar::add_years(self.start.year(), years) else {
            return Candidate::Exhausted;
        };
        let (month, day) = (self.start.month(), self.start.day());
        if let Some(date) = calendar::date(year, month, day) {
            return Candidate::Date(date);
        }
        trace!("skipping {year:04} since it has no {month:02}-{day:02}");
        match calendar::date(year, 1, 1) {
            Some(first) => Candidate::Skipped(first),
            None => Candidate::Exhausted,
        }
    }

    fn is_past_end(&self, date: Date) -> bool {
        match self.rule.termination {
            Termination::Until(until) => date > until,
            Termination::Never | Termination::Count(_) => false,
        }
    }

    fn is_full(&self) -> bool {
        match self.rule.termination {
            Termination::Count(count) => self.emitted >= count,
            Termination::Never | Termination::Until(_) => false,
        }
    }
}

impl Iterator for Occurrences {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        loop {
            let attempt = self.attempt?;
            if self.is_full() {
                self.attempt = None;
                return None;
            }
            self.attempt = attempt.checked_add(1);
            match self.candidate(attempt) {
                Candidate::Exhausted => {
                    self.attempt = None;
                    return None;
                }
                // A skipped period still ends the series when the whole
                // period begins after the end date.
                Candidate::Skipped(first) => {
                    if self.is_past_end(first) {
                        self.attempt = None;
                        return None;
                    }
                }
                Candidate::Date(date) => {
                    if self.is_past_end(date) {
                        self.attempt = None;
                        return None;
                    }
                    self.emitted += 1;
                    return Some(date);
                }
            }
        }
    }
}

impl std::iter::FusedIterator for Occurrences {}

/// The outcome of computing the candidate date for a single period.
#[derive(Clone, Copy, Debug)]
enum Candidate {
    /// The anchor day exists in this period.
    Date(Date),
    /// The anchor day doesn't exist in this period. The date given is the
    /// first day of the period.
    Skipped(Date),
    /// The period is beyond the supported range of dates.
    Exhausted,
}

/// Returns the series of dates described by `rule` beginning at `start`.
///
/// This is lazy. The dates are computed one at a time as the iterator is
/// advanced, which makes it possible to take a bounded prefix from a rule
/// that never terminates.
pub fn generate(start: Date, rule: &RepeatRule) -> Occurrences {
    rule.occurrences(start)
}

/// Returns every `interval`-th day from `start` through `end` (inclusive).
pub fn daily(
    start: Date,
    end: Date,
    interval: i32,
) -> anyhow::Result<Vec<Date>> {
    until(RepeatKind::Daily, start, end, interval)
}

/// Returns every `interval`-th week from `start` through `end` (inclusive).
///
/// Every date returned falls on the same weekday as `start`.
pub fn weekly(
    start: Date,
    end: Date,
    interval: i32,
) -> anyhow::Result<Vec<Date>> {
    until(RepeatKind::Weekly, start, end, interval)
}

/// Returns the day-of-month of `start` in every `interval`-th month through
/// `end` (inclusive).
///
/// Months without that day are skipped.
pub fn monthly(
    start: Date,
    end: Date,
    interval: i32,
) -> anyhow::Result<Vec<Date>> {
    until(RepeatKind::Monthly, start, end, interval)
}

/// Returns the month and day of `start` in every `interval`-th year through
/// `end` (inclusive).
///
/// Years without that day (i.e., common years for a February 29 start) are
/// skipped.
pub fn yearly(
    start: Date,
    end: Date,
    interval: i32,
) -> anyhow::Result<Vec<Date>> {
    until(RepeatKind::Yearly, start, end, interval)
}

fn until(
    kind: RepeatKind,
    start: Date,
    end: Date,
    interval: i32,
) -> anyhow::Result<Vec<Date>> {
    let rule =
        RepeatRule::builder(kind).interval(interval).until(end).build()?;
    Ok(rule.occurrences(start).collect())
}
