//! Interactive widget: one loop owns the state, reads commands from stdin and
//! effect results from the runtime, and redraws after every message.

use std::io::{IsTerminal, Write};

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use weather_core::{
    AppState, Msg, Runtime, Services, ThemeStorage,
    view::{Palette, render, render_toast},
};

#[derive(Debug)]
pub enum Input {
    Quit,
    Msg(Msg),
}

/// Map one line typed by the user to a widget event.
///
/// Lines starting with `:` are controls; anything else replaces the search
/// text.
pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        if trimmed.is_empty() {
            return Input::Msg(Msg::Submit);
        }
        let text = line.trim_end_matches(['\r', '\n']).to_string();
        return Input::Msg(Msg::InputChanged(text));
    };

    match command {
        "q" | "quit" => Input::Quit,
        "loc" => Input::Msg(Msg::RefreshLocation),
        "theme" => Input::Msg(Msg::ToggleTheme),
        "go" => Input::Msg(Msg::Submit),
        "blur" => Input::Msg(Msg::InputBlurred),
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Input::Msg(Msg::SelectSuggestion(n - 1)),
            _ => Input::Msg(Msg::InputChanged(trimmed.to_string())),
        },
    }
}

pub async fn run(services: Services) -> anyhow::Result<()> {
    let stored_theme = services.themes.load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable theme preference: {e:#}");
        None
    });

    let (mut runtime, mut rx) = Runtime::new(services);
    let mut state = AppState::new(Local::now().fixed_offset());

    let effects = state.update(Msg::Mounted { stored_theme });
    runtime.run(effects);
    runtime.start_clock();
    redraw(&mut state)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let msg = tokio::select! {
            line = lines.next_line() => match line? {
                None => break,
                Some(line) => match parse_line(&line) {
                    Input::Quit => break,
                    Input::Msg(msg) => msg,
                },
            },
            Some(msg) = rx.recv() => msg,
        };

        let effects = state.update(msg);
        runtime.run(effects);
        redraw(&mut state)?;
    }

    Ok(())
}

fn redraw(state: &mut AppState) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    if stdout.is_terminal() {
        write!(stdout, "\x1b[2J\x1b[H")?;
    }
    write!(stdout, "{}", render(state))?;

    let palette = Palette::for_style(state.style);
    for toast in state.drain_toasts() {
        writeln!(stdout, "{}", render_toast(&toast, &palette))?;
    }
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}
