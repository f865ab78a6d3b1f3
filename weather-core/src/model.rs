use serde::{Deserialize, Serialize};

/// What to fetch weather for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

/// Normalised current conditions, as shown on the weather card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub state: Option<String>,
    pub country: String,
    /// Provider temperature rounded to the nearest degree.
    pub temperature_celsius: i32,
    pub condition_text: String,
    pub humidity_percent: u8,
    pub wind_speed_mps: f64,
    pub icon_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CitySuggestion {
    /// "name, state, country", skipping the state when the geocoder has none.
    pub fn display_label(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}

/// A device position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

impl Coordinates {
    /// Latitude and longitude rounded to 5 decimal places (about one metre).
    pub fn rounded(self) -> Self {
        Self {
            latitude: round5(self.latitude),
            longitude: round5(self.longitude),
            accuracy_meters: self.accuracy_meters,
        }
    }

    pub fn to_query(self) -> WeatherQuery {
        WeatherQuery::Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// Reverse-geocoded place name parts. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub locality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Place {
    /// Overlay this place's names onto a provider snapshot.
    pub fn apply_to(&self, mut snapshot: WeatherSnapshot) -> WeatherSnapshot {
        if let Some(locality) = &self.locality {
            snapshot.city = locality.clone();
        }
        if let Some(state) = &self.state {
            snapshot.state = Some(state.clone());
        }
        if let Some(country) = &self.country {
            snapshot.country = country.clone();
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Lisbon".into(),
            state: None,
            country: "PT".into(),
            temperature_celsius: 21,
            condition_text: "céu limpo".into(),
            humidity_percent: 60,
            wind_speed_mps: 3.2,
            icon_id: "01d".into(),
        }
    }

    #[test]
    fn coordinates_round_to_five_decimals() {
        let c = Coordinates {
            latitude: 38.7222524,
            longitude: -9.1393366,
            accuracy_meters: 12.5,
        };
        let r = c.rounded();
        assert_eq!(r.latitude, 38.72225);
        assert_eq!(r.longitude, -9.13934);
        assert_eq!(r.accuracy_meters, 12.5);
    }

    #[test]
    fn display_label_skips_missing_state() {
        let mut s = CitySuggestion {
            name: "Springfield".into(),
            country: "US".into(),
            state: Some("Illinois".into()),
            latitude: 39.8,
            longitude: -89.6,
        };
        assert_eq!(s.display_label(), "Springfield, Illinois, US");

        s.state = None;
        assert_eq!(s.display_label(), "Springfield, US");
    }

    #[test]
    fn place_overrides_only_present_fields() {
        let place = Place {
            locality: Some("Lisboa".into()),
            state: None,
            country: None,
        };
        let merged = place.apply_to(snapshot());
        assert_eq!(merged.city, "Lisboa");
        assert_eq!(merged.country, "PT");
        assert_eq!(merged.state, None);

        let untouched = Place::default().apply_to(snapshot());
        assert_eq!(untouched, snapshot());
    }
}
