use crate::{
    Config, FetchError,
    model::{CitySuggestion, Coordinates, Place, WeatherQuery, WeatherSnapshot},
    provider::{nominatim::NominatimGeocoder, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod nominatim;
pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError>;
}

/// Forward geocoding by (partial) city name.
#[async_trait]
pub trait CityGeocoder: Send + Sync + Debug {
    async fn suggest_cities(&self, text: &str) -> anyhow::Result<Vec<CitySuggestion>>;
}

/// Coordinates to place names. Never fails: an unknown place is empty.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    async fn reverse(&self, coords: &Coordinates) -> Place;
}

/// The HTTP-backed services a session talks to.
#[derive(Debug, Clone)]
pub struct HttpServices {
    pub weather: Arc<OpenWeatherProvider>,
    pub reverse: Arc<NominatimGeocoder>,
}

/// Build the HTTP clients from config.
pub fn services_from_config(config: &Config) -> anyhow::Result<HttpServices> {
    let api_key = config.api_key()?;
    let weather = OpenWeatherProvider::new(api_key, &config.endpoints);
    let reverse = NominatimGeocoder::new(&config.endpoints)?;

    Ok(HttpServices {
        weather: Arc::new(weather),
        reverse: Arc::new(reverse),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        // Only meaningful when the override is not set in the test environment.
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let err = services_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn services_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        assert!(services_from_config(&cfg).is_ok());
    }
}
