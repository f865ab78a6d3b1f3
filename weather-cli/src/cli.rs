use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use weather_core::{
    CityGeocoder, Config, Coordinates, FileThemeStore, Geolocator, HomeLocation, LocationResolver,
    Services, StaticGeolocator, ThemeStorage, WeatherProvider, WeatherQuery,
    location::precision_toast,
    provider::services_from_config,
    suggest::lookup_text,
    view::{Palette, render_card, render_toast},
};

use crate::session;

const DEFAULT_ACCURACY_METERS: f64 = 50.0;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather widget for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// A position fix given on the command line instead of the configured home.
#[derive(Debug, Clone, Copy, Args)]
pub struct FixArgs {
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Reported precision of the fix, in metres.
    #[arg(long, default_value_t = DEFAULT_ACCURACY_METERS)]
    pub accuracy: f64,
}

impl FixArgs {
    const NONE: FixArgs = FixArgs {
        lat: None,
        lon: None,
        accuracy: DEFAULT_ACCURACY_METERS,
    };

    fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
                accuracy_meters: self.accuracy,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive widget (default).
    App {
        #[command(flatten)]
        fix: FixArgs,
    },

    /// Print current weather for a city, or for your location when no city is given.
    Show {
        city: Option<String>,

        #[command(flatten)]
        fix: FixArgs,
    },

    /// List city suggestions for partial input.
    Suggest { text: String },

    /// Show or toggle the persisted theme.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Configure the API key and an optional fixed location.
    Configure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ThemeAction {
    /// Print the persisted theme (default).
    Show,

    /// Switch between light and dark and persist the result.
    Toggle,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let fix = FixArgs::NONE;
        let command = self.command.unwrap_or(Command::App { fix });

        match command {
            Command::App { fix } => {
                let config = Config::load()?;
                let services = build_services(&config, fix.coordinates())?;
                session::run(services).await
            }
            Command::Show { city, fix } => show(city, fix).await,
            Command::Suggest { text } => suggest(&text).await,
            Command::Theme { action } => theme(action.unwrap_or(ThemeAction::Show)),
            Command::Configure => configure(),
        }
    }
}

/// Wire the HTTP clients, geolocator and theme store into session services.
pub fn build_services(config: &Config, fix: Option<Coordinates>) -> anyhow::Result<Services> {
    let http = services_from_config(config)?;

    let geolocator = fix
        .or_else(|| config.home.map(Coordinates::from))
        .map(|c| Arc::new(StaticGeolocator::new(c)) as Arc<dyn Geolocator>);

    let resolver = LocationResolver::new(geolocator, http.reverse.clone(), http.weather.clone());
    let themes = Arc::new(FileThemeStore::new(Config::theme_file_path()?));

    Ok(Services {
        weather: http.weather.clone(),
        cities: http.weather,
        resolver,
        themes,
    })
}

async fn show(city: Option<String>, fix: FixArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let services = build_services(&config, fix.coordinates())?;

    let result = match city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) => services
            .weather
            .current_weather(&WeatherQuery::City(city.to_string()))
            .await
            .map_err(Into::into),
        None => {
            let announce = |coords: &Coordinates| {
                let toast = precision_toast(coords);
                eprintln!("{}", render_toast(&toast, &Palette::PLAIN));
            };
            services.resolver.resolve(announce).await
        }
    };

    match result {
        Ok(snapshot) => {
            print!("{}", render_card(&snapshot, &Palette::PLAIN));
            Ok(())
        }
        Err(e) => {
            let toast = e.to_toast();
            Err(anyhow!("{}: {}", toast.title, toast.description))
        }
    }
}

async fn suggest(text: &str) -> anyhow::Result<()> {
    let Some(text) = lookup_text(text) else {
        return Ok(());
    };

    let config = Config::load()?;
    let http = services_from_config(&config)?;

    // Failures stay silent, as in the interactive widget.
    match http.weather.suggest_cities(text).await {
        Ok(list) => {
            for suggestion in list {
                println!("{}", suggestion.display_label());
            }
        }
        Err(e) => tracing::debug!("Suggestion lookup failed: {e:#}"),
    }

    Ok(())
}

fn theme(action: ThemeAction) -> anyhow::Result<()> {
    let store = FileThemeStore::new(Config::theme_file_path()?);
    let mut theme = store.load()?.unwrap_or_default();

    if action == ThemeAction::Toggle {
        theme = theme.toggled();
        store.save(theme)?;
    }

    println!("{theme}");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let wants_home = inquire::Confirm::new("Use a fixed location for geolocation?")
        .with_default(config.home.is_some())
        .prompt()
        .context("Failed to read answer")?;

    let home = if wants_home {
        let latitude = inquire::CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a decimal number")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = inquire::CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a decimal number")
            .prompt()
            .context("Failed to read longitude")?;
        let accuracy_meters = inquire::CustomType::<f64>::new("Accuracy in metres:")
            .with_default(1000.0)
            .prompt()
            .context("Failed to read accuracy")?;
        Some(HomeLocation {
            latitude,
            longitude,
            accuracy_meters,
        })
    } else {
        None
    };
    config.set_home(home);

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_interactive_app() {
        let cli = Cli::try_parse_from(["weather"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["weather", "show", "--lat", "38.7", "--lon", "-9.1"])
            .expect("parse");
        let Some(Command::Show { city, fix }) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(city, None);
        let coords = fix.coordinates().expect("coords");
        assert_eq!(coords.longitude, -9.1);
        assert_eq!(coords.accuracy_meters, 50.0);
    }

    #[test]
    fn lat_requires_lon() {
        let parsed = Cli::try_parse_from(["weather", "show", "--lat", "38.7"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn bare_theme_shows_current_value() {
        let cli = Cli::try_parse_from(["weather", "theme"]).expect("parse");
        assert!(matches!(cli.command, Some(Command::Theme { action: None })));

        let cli = Cli::try_parse_from(["weather", "theme", "show"])
            .expect("parse");
        let Some(Command::Theme { action }) = cli.command else {
            panic!("expected theme");
        };
        assert_eq!(action, Some(ThemeAction::Show));
    }

    #[test]
    fn theme_toggle_is_a_subcommand() {
        let cli = Cli::try_parse_from(["weather", "theme", "toggle"])
            .expect("parse");
        let Some(Command::Theme { action }) = cli.command else {
            panic!("expected theme");
        };
        assert_eq!(action, Some(ThemeAction::Toggle));

        let flag = Cli::try_parse_from(["weather", "theme", "--toggle"]);
        assert!(flag.is_err());
    }

    #[test]
    fn build_services_uses_home_when_no_fix_given() {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        config.set_home(Some(HomeLocation {
            latitude: 1.0,
            longitude: 2.0,
            accuracy_meters: 5.0,
        }));

        assert!(build_services(&config, None).is_ok());
    }
}
