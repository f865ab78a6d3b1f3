//! Runs the reducer's effects on tokio and feeds their outcomes back as
//! messages over a channel. The session loop is the only owner of
//! [`AppState`](crate::app::AppState); tasks spawned here never touch it.

use chrono::Local;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, interval_at, sleep},
};

use crate::{
    WeatherProvider,
    app::{Effect, Msg},
    location::LocationResolver,
    provider::CityGeocoder,
    theme::ThemeStorage,
};

pub const CLOCK_PERIOD: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Services {
    pub weather: Arc<dyn WeatherProvider>,
    pub cities: Arc<dyn CityGeocoder>,
    pub resolver: LocationResolver,
    pub themes: Arc<dyn ThemeStorage>,
}

pub struct Runtime {
    services: Services,
    tx: mpsc::UnboundedSender<Msg>,
    debounce: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
}

impl Runtime {
    pub fn new(services: Services) -> (Self, mpsc::UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            services,
            tx,
            debounce: None,
            clock: None,
        };
        (runtime, rx)
    }

    /// Emit `Msg::Tick` once per [`CLOCK_PERIOD`], starting one period from now.
    pub fn start_clock(&mut self) {
        if let Some(old) = self.clock.take() {
            old.abort();
        }

        let tx = self.tx.clone();
        self.clock = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + CLOCK_PERIOD, CLOCK_PERIOD);
            loop {
                ticker.tick().await;
                if tx.send(Msg::Tick(Local::now().fixed_offset())).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.dispatch(effect);
        }
    }

    pub fn dispatch(&mut self, effect: Effect) {
        match effect {
            Effect::PersistTheme(theme) => {
                if let Err(e) = self.services.themes.save(theme) {
                    tracing::warn!("Failed to persist theme: {e:#}");
                }
            }
            Effect::StartDebounce { ticket, delay } => {
                if let Some(pending) = self.debounce.take() {
                    pending.abort();
                }
                let tx = self.tx.clone();
                self.debounce = Some(tokio::spawn(async move {
                    sleep(delay).await;
                    let _ = tx.send(Msg::DebounceElapsed(ticket));
                }));
            }
            Effect::LookupSuggestions { ticket, text } => {
                let cities = Arc::clone(&self.services.cities);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = cities
                        .suggest_cities(&text)
                        .await
                        .map_err(|e| format!("{e:#}"));
                    let _ = tx.send(Msg::SuggestionsLoaded { ticket, result });
                });
            }
            Effect::FetchWeather { ticket, query } => {
                let weather = Arc::clone(&self.services.weather);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = weather.current_weather(&query).await.map_err(Into::into);
                    let _ = tx.send(Msg::WeatherLoaded { ticket, result });
                });
            }
            Effect::ResolveLocation { ticket } => {
                let resolver = self.services.resolver.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let fix_tx = tx.clone();
                    let result = resolver
                        .resolve(move |coords| {
                            let _ = fix_tx.send(Msg::LocationFixed {
                                ticket,
                                coords: *coords,
                            });
                        })
                        .await;
                    let _ = tx.send(Msg::WeatherLoaded { ticket, result });
                });
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let timers = [self.debounce.take(), self.clock.take()];
        for timer in timers.into_iter().flatten() {
            timer.abort();
        }
    }
}
