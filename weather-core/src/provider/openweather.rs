use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Endpoints,
    error::{DEFAULT_NOT_FOUND, FetchError},
    model::{CitySuggestion, WeatherQuery, WeatherSnapshot},
    suggest::SUGGESTION_LIMIT,
};

use super::{CityGeocoder, WeatherProvider};

const UNITS: &str = "metric";
const LANG: &str = "pt_br";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    weather_url: String,
    geocoding_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, endpoints: &Endpoints) -> Self {
        Self {
            api_key,
            weather_url: endpoints.weather.clone(),
            geocoding_url: endpoints.geocoding.clone(),
            http: Client::new(),
        }
    }

    fn weather_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            WeatherQuery::City(name) => vec![("q", name.clone())],
            WeatherQuery::Coordinates {
                latitude,
                longitude,
            } => vec![
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ],
        };
        params.push(("units", UNITS.to_string()));
        params.push(("lang", LANG.to_string()));
        params.push(("appid", self.api_key.clone()));
        params
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition_text, icon_id) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Sem descrição".to_string(), String::new()));

        WeatherSnapshot {
            city: parsed.name,
            state: None,
            country: parsed.sys.country,
            temperature_celsius: parsed.main.temp.round() as i32,
            condition_text,
            humidity_percent: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
            icon_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
    state: Option<String>,
    lat: f64,
    lon: f64,
}

impl From<OwGeoEntry> for CitySuggestion {
    fn from(entry: OwGeoEntry) -> Self {
        CitySuggestion {
            name: entry.name,
            country: entry.country,
            state: entry.state,
            latitude: entry.lat,
            longitude: entry.lon,
        }
    }
}

/// Pull the provider's `message` out of an error body, if it has a usable one.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_NOT_FOUND.to_string())
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherSnapshot, FetchError> {
        let res = self
            .http
            .get(&self.weather_url)
            .query(&self.weather_params(query))
            .send()
            .await
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(%status, "OpenWeather returned an error status");
            return Err(FetchError::Provider(provider_message(&body)));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let snapshot = WeatherSnapshot::from(parsed);
        tracing::info!(
            city = %snapshot.city,
            country = %snapshot.country,
            "Fetched current weather"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl CityGeocoder for OpenWeatherProvider {
    async fn suggest_cities(&self, text: &str) -> Result<Vec<CitySuggestion>> {
        let limit = SUGGESTION_LIMIT.to_string();

        let res = self
            .http
            .get(&self.geocoding_url)
            .query(&[
                ("q", text),
                ("limit", limit.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let entries: Vec<OwGeoEntry> =
            serde_json::from_str(&body).context("Failed to parse OpenWeather geocoding JSON")?;

        Ok(entries
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(CitySuggestion::from)
            .collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        let endpoints = Endpoints {
            weather: format!("{}/data/2.5/weather", server.uri()),
            geocoding: format!("{}/geo/1.0/direct", server.uri()),
            ..Endpoints::default()
        };
        OpenWeatherProvider::new("test_key".to_string(), &endpoints)
    }

    fn lisboa_body() -> serde_json::Value {
        json!({
            "name": "Lisboa",
            "sys": { "country": "PT" },
            "main": { "temp": 21.4, "humidity": 60 },
            "wind": { "speed": 3.2 },
            "weather": [{ "description": "céu limpo", "icon": "01d" }]
        })
    }

    #[tokio::test]
    async fn city_query_maps_into_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Lisboa"))
            .and(query_param("units", "metric"))
            .and(query_param("lang", "pt_br"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(lisboa_body()))
            .mount(&server)
            .await;

        let snapshot = provider_for(&server)
            .current_weather(&WeatherQuery::City("Lisboa".into()))
            .await
            .expect("snapshot");

        assert_eq!(
            snapshot,
            WeatherSnapshot {
                city: "Lisboa".into(),
                state: None,
                country: "PT".into(),
                temperature_celsius: 21,
                condition_text: "céu limpo".into(),
                humidity_percent: 60,
                wind_speed_mps: 3.2,
                icon_id: "01d".into(),
            }
        );
    }

    #[tokio::test]
    async fn coordinate_query_sends_lat_lon() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "38.72225"))
            .and(query_param("lon", "-9.13934"))
            .respond_with(ResponseTemplate::new(200).set_body_json(lisboa_body()))
            .expect(1)
            .mount(&server)
            .await;

        let query = WeatherQuery::Coordinates {
            latitude: 38.72225,
            longitude: -9.13934,
        };
        let snapshot = provider_for(&server)
            .current_weather(&query)
            .await
            .expect("snapshot");
        assert_eq!(snapshot.city, "Lisboa");
    }

    #[tokio::test]
    async fn error_status_surfaces_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current_weather(&WeatherQuery::City("Nowhere".into()))
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Provider("city not found".into()));
        assert_eq!(err.to_toast().description, "city not found");
    }

    #[tokio::test]
    async fn error_status_without_message_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current_weather(&WeatherQuery::City("Lisboa".into()))
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::Provider(DEFAULT_NOT_FOUND.into()));
    }

    #[tokio::test]
    async fn garbled_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .current_weather(&WeatherQuery::City("Lisboa".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connectivity_error() {
        let endpoints = Endpoints {
            weather: "http://127.0.0.1:9/data/2.5/weather".to_string(),
            ..Endpoints::default()
        };
        let provider = OpenWeatherProvider::new("k".into(), &endpoints);

        let err = provider
            .current_weather(&WeatherQuery::City("Lisboa".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connectivity(_)));
    }

    #[tokio::test]
    async fn geocoding_requests_five_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lis"))
            .and(query_param("limit", "5"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "name": "Lisbon",
                    "country": "PT",
                    "state": "Lisbon",
                    "lat": 38.7077,
                    "lon": -9.1366
                },
                { "name": "Lisbon", "country": "US", "lat": 44.0, "lon": -70.1 }
            ])))
            .mount(&server)
            .await;

        let suggestions = provider_for(&server)
            .suggest_cities("Lis")
            .await
            .expect("suggestions");

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].display_label(), "Lisbon, Lisbon, PT");
        assert_eq!(suggestions[1].state, None);
    }

    #[tokio::test]
    async fn geocoding_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .suggest_cities("Lis")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
