//! Reverse geocoding against Nominatim (OpenStreetMap). No API key, but the
//! service requires an identifying `User-Agent`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::Endpoints,
    model::{Coordinates, Place},
};

use super::ReverseGeocoder;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    url: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(endpoints: &Endpoints) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(endpoints.user_agent.as_str())
            .build()?;

        Ok(Self {
            url: endpoints.reverse_geocoding.clone(),
            http,
        })
    }

    async fn lookup(&self, coords: &Coordinates) -> Result<NominatimResponse, reqwest::Error> {
        self.http
            .get(&self.url)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    suburb: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimResponse> for Place {
    fn from(body: NominatimResponse) -> Self {
        let addr = body.address.unwrap_or_default();

        // Most specific locality first.
        let candidates = [
            addr.city,
            addr.town,
            addr.village,
            addr.municipality,
            addr.suburb,
            body.name,
        ];
        let locality = candidates
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty());

        Place {
            locality,
            state: addr.state.filter(|s| !s.trim().is_empty()),
            country: addr.country.filter(|s| !s.trim().is_empty()),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coords: &Coordinates) -> Place {
        match self.lookup(coords).await {
            Ok(body) => {
                let place = Place::from(body);
                tracing::info!(locality = ?place.locality, "Reverse geocoded position");
                place
            }
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                Place::default()
            }
        }
    }
}
