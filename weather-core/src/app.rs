//! State of the presentation root and the reducer that drives it.
//!
//! [`AppState::update`] is pure: it applies one [`Msg`] and returns the
//! [`Effect`]s the caller must run. Effects report back as further messages
//! carrying the [`Ticket`] they were issued with; anything whose ticket is no
//! longer current is dropped, so only the most recent request can touch state.

use chrono::{DateTime, FixedOffset};
use std::time::Duration;

use crate::{
    error::ResolveError,
    location::precision_toast,
    model::{CitySuggestion, Coordinates, WeatherQuery, WeatherSnapshot},
    seq::{RequestTracker, Ticket},
    suggest::{DEBOUNCE, lookup_text},
    theme::{DocumentStyle, Theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug)]
pub enum Msg {
    /// Initial load with whatever the theme store held.
    Mounted { stored_theme: Option<Theme> },
    Tick(DateTime<FixedOffset>),
    ToggleTheme,
    RefreshLocation,
    InputChanged(String),
    InputBlurred,
    Submit,
    /// Zero-based index into the visible suggestion list.
    SelectSuggestion(usize),
    DebounceElapsed(Ticket),
    SuggestionsLoaded {
        ticket: Ticket,
        result: Result<Vec<CitySuggestion>, String>,
    },
    LocationFixed { ticket: Ticket, coords: Coordinates },
    WeatherLoaded {
        ticket: Ticket,
        result: Result<WeatherSnapshot, ResolveError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistTheme(Theme),
    /// Deliver `DebounceElapsed(ticket)` after `delay`, replacing any pending timer.
    StartDebounce { ticket: Ticket, delay: Duration },
    LookupSuggestions { ticket: Ticket, text: String },
    FetchWeather { ticket: Ticket, query: WeatherQuery },
    ResolveLocation { ticket: Ticket },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub theme: Theme,
    pub style: DocumentStyle,
    pub snapshot: Option<WeatherSnapshot>,
    pub loading: bool,
    pub now: DateTime<FixedOffset>,
    pub input: String,
    pub suggestions: Vec<CitySuggestion>,
    pub suggestions_visible: bool,
    toasts: Vec<Toast>,
    weather_requests: RequestTracker,
    suggestion_requests: RequestTracker,
    keystrokes: RequestTracker,
}

impl AppState {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            theme: Theme::default(),
            style: DocumentStyle::default(),
            snapshot: None,
            loading: false,
            now,
            input: String::new(),
            suggestions: Vec::new(),
            suggestions_visible: false,
            toasts: Vec::new(),
            weather_requests: RequestTracker::default(),
            suggestion_requests: RequestTracker::default(),
            keystrokes: RequestTracker::default(),
        }
    }

    /// Notifications raised since the last call.
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Mounted { stored_theme } => {
                self.theme = stored_theme.unwrap_or_default();
                self.style.apply(self.theme);
                vec![self.start_location()]
            }
            Msg::Tick(now) => {
                self.now = now;
                vec![]
            }
            Msg::ToggleTheme => {
                self.theme = self.theme.toggled();
                self.style.apply(self.theme);
                vec![Effect::PersistTheme(self.theme)]
            }
            Msg::RefreshLocation => vec![self.start_location()],
            Msg::InputChanged(text) => {
                self.input = text;
                let ticket = self.keystrokes.issue();
                if lookup_text(&self.input).is_none() {
                    self.suggestion_requests.invalidate();
                    self.clear_suggestions();
                    return vec![];
                }
                vec![Effect::StartDebounce {
                    ticket,
                    delay: DEBOUNCE,
                }]
            }
            Msg::InputBlurred => {
                self.suggestion_requests.invalidate();
                self.clear_suggestions();
                vec![]
            }
            Msg::Submit => {
                let city = self.input.trim().to_string();
                if city.is_empty() {
                    return vec![];
                }
                self.reset_input();
                vec![self.start_fetch(WeatherQuery::City(city))]
            }
            Msg::SelectSuggestion(index) => {
                if !self.suggestions_visible {
                    return vec![];
                }
                let Some(choice) = self.suggestions.get(index) else {
                    return vec![];
                };
                let city = choice.name.clone();
                self.reset_input();
                vec![self.start_fetch(WeatherQuery::City(city))]
            }
            Msg::DebounceElapsed(ticket) => {
                if !self.keystrokes.is_current(ticket) {
                    return vec![];
                }
                let Some(text) = lookup_text(&self.input).map(str::to_string) else {
                    return vec![];
                };
                let ticket = self.suggestion_requests.issue();
                vec![Effect::LookupSuggestions { ticket, text }]
            }
            Msg::SuggestionsLoaded { ticket, result } => {
                if !self.suggestion_requests.is_current(ticket) {
                    return vec![];
                }
                match result {
                    Ok(list) => {
                        self.suggestions_visible = !list.is_empty();
                        self.suggestions = list;
                    }
                    Err(e) => {
                        tracing::debug!("Suggestion lookup failed: {}", e);
                        self.clear_suggestions();
                    }
                }
                vec![]
            }
            Msg::LocationFixed { ticket, coords } => {
                if self.weather_requests.is_current(ticket) {
                    self.toasts.push(precision_toast(&coords));
                }
                vec![]
            }
            Msg::WeatherLoaded { ticket, result } => {
                if !self.weather_requests.is_current(ticket) {
                    return vec![];
                }
                self.loading = false;
                match result {
                    Ok(snapshot) => self.snapshot = Some(snapshot),
                    Err(e) => self.toasts.push(e.to_toast()),
                }
                vec![]
            }
        }
    }

    fn start_fetch(&mut self, query: WeatherQuery) -> Effect {
        self.loading = true;
        let ticket = self.weather_requests.issue();
        Effect::FetchWeather { ticket, query }
    }

    fn start_location(&mut self) -> Effect {
        self.loading = true;
        let ticket = self.weather_requests.issue();
        Effect::ResolveLocation { ticket }
    }

    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestions_visible = false;
    }

    /// Empty the search box and drop every pending keystroke and lookup.
    fn reset_input(&mut self) {
        self.input.clear();
        self.keystrokes.invalidate();
        self.suggestion_requests.invalidate();
        self.clear_suggestions();
    }
}
