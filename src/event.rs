use {
    jiff::civil::Date,
    serde::{Deserialize, Serialize},
};

use crate::{
    repeat::{RepeatKind, RepeatRule},
    style::Theme,
};

/// The glyph shown in front of the title of a repeating event.
pub const REPEAT_MARKER: &str = "🔁";

/// A single calendar event.
///
/// Events are read and written as JSON objects with camel case keys. When an
/// event repeats, it acts as a template: its series is one independent event
/// per occurrence, each sharing everything but the date (and the ID, which
/// is cleared since every occurrence is its own record).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    pub date: Date,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub repeat: RepeatInfo,
    /// How many minutes before the start to send a notification.
    #[serde(default)]
    pub notification_time: i64,
}

impl Event {
    /// Returns true when this event's repeat type is anything but `none`.
    pub fn is_repeating(&self) -> bool {
        self.repeat.kind != RepeatType::None
    }

    /// Returns the title as shown in an event list, with `REPEAT_MARKER` in
    /// front of it for repeating events.
    pub fn display_title(&self) -> DisplayTitle<'_> {
        DisplayTitle { event: self, marker: None }
    }

    /// Returns a copy of this event on a different date.
    ///
    /// The copy has no ID.
    pub fn on(&self, date: Date) -> Event {
        Event { id: String::new(), date, ..self.clone() }
    }

    /// Returns one event for every occurrence in this event's series.
    ///
    /// A non-repeating event yields itself (without its ID). Otherwise, the
    /// series starts on this event's date and follows its repeat rule. This
    /// fails when the repeat descriptor is invalid.
    ///
    /// Note that the series might be unbounded. See `RepeatRule::is_bounded`.
    pub fn series(&self) -> anyhow::Result<impl Iterator<Item = Event> + '_> {
        let dates: Box<dyn Iterator<Item = Date>> = match self.repeat.rule()? {
            None => Box::new(std::iter::once(self.date)),
            Some(rule) => Box::new(rule.occurrences(self.date)),
        };
        Ok(dates.map(move |date| self.on(date)))
    }
}

/// The repeat descriptor attached to an event.
///
/// This is the serialized form of a `RepeatRule`, except that it also admits
/// a type of `none` for events that don't repeat.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatInfo {
    #[serde(rename = "type")]
    pub kind: RepeatType,
    #[serde(default = "default_interval")]
    pub interval: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
    #[serde(
        default,
        alias = "count",
        skip_serializing_if = "Option::is_none"
    )]
    pub occurrence_limit: Option<usize>,
}

impl RepeatInfo {
    /// Converts this descriptor into a repeat rule.
    ///
    /// `None` is returned for the `none` type. An error is returned when the
    /// interval isn't positive or when both an end date and an occurrence
    /// limit are set.
    pub fn rule(&self) -> anyhow::Result<Option<RepeatRule>> {
        let kind = match self.kind {
            RepeatType::None => return Ok(None),
            RepeatType::Daily => RepeatKind::Daily,
            RepeatType::Weekly => RepeatKind::Weekly,
            RepeatType::Monthly => RepeatKind::Monthly,
            RepeatType::Yearly => RepeatKind::Yearly,
        };
        let mut builder = RepeatRule::builder(kind);
        builder.interval(self.interval);
        if let Some(end_date) = self.end_date {
            builder.until(end_date);
        }
        if let Some(limit) = self.occurrence_limit {
            builder.count(limit);
        }
        builder.build().map(Some)
    }
}

impl Default for RepeatInfo {
    fn default() -> RepeatInfo {
        RepeatInfo {
            kind: RepeatType::None,
            interval: default_interval(),
            end_date: None,
            occurrence_limit: None,
        }
    }
}

fn default_interval() -> i32 {
    1
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// The displayed title of an event. See `Event::display_title`.
#[derive(Clone, Copy, Debug)]
pub struct DisplayTitle<'e> {
    event: &'e Event,
    marker: Option<&'e Theme>,
}

impl<'e> DisplayTitle<'e> {
    /// Styles the repeat marker with the given theme.
    pub fn themed(self, theme: &'e Theme) -> DisplayTitle<'e> {
        DisplayTitle { marker: Some(theme), ..self }
    }
}

impl<'e> std::fmt::Display for DisplayTitle<'e> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.event.is_repeating() {
            match self.marker {
                None => write!(f, "{REPEAT_MARKER} ")?,
                Some(theme) => write!(f, "{} ", theme.marker(REPEAT_MARKER))?,
            }
        }
        f.write_str(&self.event.title)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn event(json: &str) -> Event {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn marker_on_repeating_events() {
        let repeating = event(
            r#"{
                "title": "테스트 반복 일정",
                "date": "2025-05-19",
                "startTime": "10:00",
                "endTime": "11:00",
                "repeat": {"type": "daily", "interval": 1, "endDate": "2025-05-20"}
            }"#,
        );
        assert_eq!(
            repeating.display_title().to_string(),
            "🔁 테스트 반복 일정",
        );

        let single = event(
            r#"{
                "title": "standup",
                "date": "2025-05-19",
                "repeat": {"type": "none", "interval": 1}
            }"#,
        );
        assert_eq!(single.display_title().to_string(), "standup");

        // A missing repeat descriptor means the event doesn't repeat.
        let bare = event(r#"{"title": "lunch", "date": "2025-05-19"}"#);
        assert!(!bare.is_repeating());
        assert_eq!(bare.display_title().to_string(), "lunch");
    }

    #[test]
    fn series_shares_everything_but_the_date() {
        let template = event(
            r#"{
                "id": "abc",
                "title": "종료 조건 테스트",
                "date": "2025-05-01",
                "startTime": "09:00",
                "endTime": "10:00",
                "location": "회의실 A",
                "category": "업무",
                "repeat": {"type": "daily", "interval": 1, "endDate": "2025-05-05"},
                "notificationTime": 10
            }"#,
        );
        let series: Vec<Event> = template.series().unwrap().collect();
        let dates: Vec<Date> = series.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 5, 1),
                date(2025, 5, 2),
                date(2025, 5, 3),
                date(2025, 5, 4),
                date(2025, 5, 5),
            ],
        );
        for occurrence in series {
            assert_eq!(occurrence.id, "");
            assert_eq!(occurrence, template.on(occurrence.date));
            assert_eq!(occurrence.repeat, template.repeat);
            assert_eq!(occurrence.title, template.title);
            assert_eq!(occurrence.notification_time, 10);
        }
    }

    #[test]
    fn series_of_single_event() {
        let single = event(
            r#"{"id": "x", "title": "dentist", "date": "2025-06-03"}"#,
        );
        let series: Vec<Event> = single.series().unwrap().collect();
        assert_eq!(series, vec![single.on(date(2025, 6, 3))]);
    }

    #[test]
    fn occurrence_limit() {
        let template = event(
            r#"{
                "title": "gym",
                "date": "2025-01-31",
                "repeat": {"type": "monthly", "occurrenceLimit": 3}
            }"#,
        );
        let dates: Vec<Date> =
            template.series().unwrap().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 1, 31), date(2025, 3, 31), date(2025, 5, 31)],
        );

        let aliased = event(
            r#"{
                "title": "gym",
                "date": "2025-01-31",
                "repeat": {"type": "monthly", "count": 3}
            }"#,
        );
        assert_eq!(aliased.repeat, template.repeat);
    }

    #[test]
    fn invalid_descriptors() {
        let both = event(
            r#"{
                "title": "x",
                "date": "2025-01-01",
                "repeat": {
                    "type": "weekly",
                    "endDate": "2025-02-01",
                    "occurrenceLimit": 2
                }
            }"#,
        );
        assert!(both.series().is_err());

        let zero = event(
            r#"{
                "title": "x",
                "date": "2025-01-01",
                "repeat": {"type": "daily", "interval": 0}
            }"#,
        );
        assert!(zero.series().is_err());

        let no_occurrences = event(
            r#"{
                "title": "x",
                "date": "2025-01-01",
                "repeat": {"type": "daily", "occurrenceLimit": 0}
            }"#,
        );
        assert!(no_occurrences.series().is_err());

        let unknown = serde_json::from_str::<Event>(
            r#"{
                "title": "x",
                "date": "2025-01-01",
                "repeat": {"type": "hourly"}
            }"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn serialize() {
        let template = event(
            r#"{
                "title": "2주 간격 테스트",
                "date": "2025-05-19",
                "startTime": "09:00",
                "endTime": "10:00",
                "repeat": {"type": "weekly", "interval": 2, "endDate": "2025-06-30"},
                "notificationTime": 10
            }"#,
        );
        insta::assert_snapshot!(
            serde_json::to_string(&template).unwrap(),
            @r#"{"title":"2주 간격 테스트","date":"2025-05-19","startTime":"09:00","endTime":"10:00","description":"","location":"","category":"","repeat":{"type":"weekly","interval":2,"endDate":"2025-06-30"},"notificationTime":10}"#,
        );
    }
}
