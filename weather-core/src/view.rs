//! Text rendering of the presentation root.

use chrono::{DateTime, Datelike, FixedOffset, Locale};
use std::fmt::Write;

use crate::{
    app::{AppState, Toast, ToastKind},
    model::WeatherSnapshot,
    theme::DocumentStyle,
};

pub const EMPTY_PROMPT: &str = "Busque uma cidade ou permita acesso à sua localização";
pub const LOADING_TEXT: &str = "Carregando...";

/// Long weekday names, Sunday first. chrono's pt_BR `%A` drops the "-feira".
const WEEKDAYS: [&str; 7] = [
    "domingo",
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
];

pub fn icon_url(icon_id: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_id}@4x.png")
}

/// ANSI colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const PLAIN: Palette = Palette {
        accent: "",
        muted: "",
        error: "",
        reset: "",
    };

    pub fn for_style(style: DocumentStyle) -> Self {
        if style.dark {
            Palette {
                accent: "\x1b[1;96m",
                muted: "\x1b[37m",
                error: "\x1b[91m",
                reset: "\x1b[0m",
            }
        } else {
            Palette {
                accent: "\x1b[1;34m",
                muted: "\x1b[90m",
                error: "\x1b[31m",
                reset: "\x1b[0m",
            }
        }
    }
}

/// "Quarta-feira, 14 de outubro de 2026"
pub fn header_date(now: &DateTime<FixedOffset>) -> String {
    let weekday = WEEKDAYS[now.weekday().num_days_from_sunday() as usize];
    let rest = now.format_localized("%-d de %B de %Y", Locale::pt_BR);
    capitalize(&format!("{weekday}, {rest}"))
}

pub fn header_time(now: &DateTime<FixedOffset>) -> String {
    now.format("%H:%M").to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_card(snapshot: &WeatherSnapshot, palette: &Palette) -> String {
    let (accent, muted, reset) = (palette.accent, palette.muted, palette.reset);
    let region = match snapshot.state.as_deref() {
        Some(state) => format!("{}, {}", state, snapshot.country),
        None => snapshot.country.clone(),
    };
    let temperature = snapshot.temperature_celsius;
    let condition = capitalize(&snapshot.condition_text);
    let humidity = snapshot.humidity_percent;
    let wind = snapshot.wind_speed_mps;

    let mut out = String::new();
    let _ = writeln!(out, "{accent}{}{reset}", snapshot.city);
    let _ = writeln!(out, "{muted}{region}{reset}");
    let _ = writeln!(out);
    let _ = writeln!(out, "  {accent}{temperature}°{reset}  {condition}");
    if !snapshot.icon_id.is_empty() {
        let _ = writeln!(out, "  {muted}{}{reset}", icon_url(&snapshot.icon_id));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  Umidade {humidity}%    Vento {wind} m/s");
    out
}

pub fn render_toast(toast: &Toast, palette: &Palette) -> String {
    let (marker, colour) = match toast.kind {
        ToastKind::Error => ('!', palette.error),
        ToastKind::Info => ('i', palette.accent),
    };
    let reset = palette.reset;
    let title = &toast.title;
    let description = &toast.description;
    format!("{colour}{marker} {title}{reset}: {description}")
}

/// Full screen: header, controls, search line and the body.
pub fn render(state: &AppState) -> String {
    let palette = Palette::for_style(state.style);
    let (accent, muted, reset) = (palette.accent, palette.muted, palette.reset);
    let theme = state.theme;

    let mut out = String::new();
    let _ = writeln!(out, "{accent}{}{reset}", header_date(&state.now));
    let _ = writeln!(out, "{muted}{}{reset}", header_time(&state.now));
    let _ = writeln!(
        out,
        "{muted}[:loc] localização  [:theme] tema ({theme})  [:go] buscar  \
         [:N] sugestão  [:blur]  [:q] sair{reset}"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Buscar cidade: {}", state.input);

    if state.suggestions_visible {
        for (i, suggestion) in state.suggestions.iter().enumerate() {
            let n = i + 1;
            let label = suggestion.display_label();
            let _ = writeln!(out, "  {muted}{n}.{reset} {label}");
        }
    }
    let _ = writeln!(out);

    if state.loading {
        let _ = writeln!(out, "{muted}{LOADING_TEXT}{reset}");
    } else if let Some(snapshot) = &state.snapshot {
        out.push_str(&render_card(snapshot, &palette));
    } else {
        let _ = writeln!(out, "{muted}{EMPTY_PROMPT}{reset}");
    }

    out
}
