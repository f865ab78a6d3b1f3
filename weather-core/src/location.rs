//! Device position → place name → weather.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    WeatherProvider,
    app::Toast,
    error::{LocationError, ResolveError},
    model::{Coordinates, WeatherSnapshot},
    provider::ReverseGeocoder,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the platform may return. Zero forces a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// A source of device position fixes.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// On failure returns the platform error code (see [`crate::error`]).
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, u16>;
}

/// Reports a fixed, configured position.
#[derive(Debug, Clone)]
pub struct StaticGeolocator {
    fix: Coordinates,
}

impl StaticGeolocator {
    pub fn new(fix: Coordinates) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl Geolocator for StaticGeolocator {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, u16> {
        Ok(self.fix)
    }
}

pub fn precision_toast(coords: &Coordinates) -> Toast {
    Toast::info(
        "Localização obtida",
        format!("Precisão de aproximadamente {:.0} metros.", coords.accuracy_meters),
    )
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    /// `None` when the device has no geolocation capability.
    geolocator: Option<Arc<dyn Geolocator>>,
    reverse: Arc<dyn ReverseGeocoder>,
    weather: Arc<dyn WeatherProvider>,
    options: PositionOptions,
}

impl LocationResolver {
    pub fn new(
        geolocator: Option<Arc<dyn Geolocator>>,
        reverse: Arc<dyn ReverseGeocoder>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            geolocator,
            reverse,
            weather,
            options: PositionOptions::default(),
        }
    }

    /// Obtain a fix, name it, and fetch its weather.
    ///
    /// `on_fix` runs once the (rounded) position is known, before any
    /// network call.
    pub async fn resolve<F>(&self, on_fix: F) -> Result<WeatherSnapshot, ResolveError>
    where
        F: FnOnce(&Coordinates) + Send,
    {
        let geolocator = self.geolocator.as_ref().ok_or(LocationError::Unsupported)?;

        let fix = tokio::time::timeout(
            self.options.timeout,
            geolocator.current_position(&self.options),
        )
        .await;

        let coords = match fix {
            Ok(Ok(coords)) => coords.rounded(),
            Ok(Err(code)) => return Err(LocationError::from_code(code).into()),
            Err(_) => return Err(LocationError::Timeout.into()),
        };

        tracing::debug!(
            latitude = coords.latitude,
            longitude = coords.longitude,
            accuracy = coords.accuracy_meters,
            "Captured position"
        );
        on_fix(&coords);

        let place = self.reverse.reverse(&coords).await;
        let snapshot = self.weather.current_weather(&coords.to_query()).await?;

        Ok(place.apply_to(snapshot))
    }
}
