use std::{
    fmt::Display,
    io::IsTerminal,
    sync::{Arc, LazyLock},
};

use anstyle::{AnsiColor, Style};

/// A set of styles for the things `recur` prints.
///
/// A theme may have no styles at all, which happens whenever the output
/// stream isn't a tty or colors have been disabled via `NO_COLOR` or
/// `TERM=dumb`.
#[derive(Clone, Debug)]
pub struct Theme {
    styles: Option<Arc<Styles>>,
}

impl Theme {
    /// Returns a theme for stdout.
    pub fn stdout() -> &'static Theme {
        static THEME: LazyLock<Theme> =
            LazyLock::new(|| Theme::detect(std::io::stdout().is_terminal()));
        &*THEME
    }

    /// Returns a theme for stderr.
    pub fn stderr() -> &'static Theme {
        static THEME: LazyLock<Theme> =
            LazyLock::new(|| Theme::detect(std::io::stderr().is_terminal()));
        &*THEME
    }

    fn detect(is_tty: bool) -> Theme {
        if !is_tty || !colors_enabled() {
            return Theme { styles: None };
        }
        Theme { styles: Some(Arc::new(Styles::default())) }
    }

    /// Styles incidental data, like timestamps in log messages.
    pub fn highlight<T: Display>(&self, data: T) -> Styled<'_, T> {
        self.styled(data, |s| &s.highlight)
    }

    /// Styles the date column of an event row.
    pub fn date<T: Display>(&self, data: T) -> Styled<'_, T> {
        self.styled(data, |s| &s.date)
    }

    /// Styles the marker in front of a repeating event's title.
    pub fn marker<T: Display>(&self, data: T) -> Styled<'_, T> {
        self.styled(data, |s| &s.marker)
    }

    fn styled<T: Display>(
        &self,
        data: T,
        pick: impl FnOnce(&Styles) -> &Style,
    ) -> Styled<'_, T> {
        Styled { data, style: self.styles.as_deref().map(pick) }
    }
}

#[derive(Debug)]
struct Styles {
    highlight: Style,
    date: Style,
    marker: Style,
}

impl Default for Styles {
    fn default() -> Styles {
        Styles {
            highlight: Style::new()
                .bold()
                .fg_color(Some(AnsiColor::Magenta.into())),
            date: Style::new().fg_color(Some(AnsiColor::Green.into())),
            marker: Style::new().bold().fg_color(Some(AnsiColor::Cyan.into())),
        }
    }
}

/// A possibly unstyled piece of renderable data.
#[derive(Clone, Debug)]
pub struct Styled<'s, T> {
    data: T,
    style: Option<&'s Style>,
}

impl<'s, T: Display> Display for Styled<'s, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.style {
            None => self.data.fmt(f),
            Some(style) => write!(f, "{style}{}{style:#}", self.data),
        }
    }
}

/// Whether colors have been globally disabled or not.
fn colors_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    std::env::var_os("TERM").map_or(true, |term| term != "dumb")
}
