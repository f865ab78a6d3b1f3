//! Core library for the `weather` widget.
//!
//! This crate defines:
//! - Configuration, credentials and the persisted theme
//! - The OpenWeather and Nominatim clients
//! - Location resolution (position fix → place name → weather)
//! - The presentation root's state, reducer, effect runtime and renderer
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod runtime;
pub mod seq;
pub mod suggest;
pub mod theme;
pub mod view;

pub use app::{AppState, Effect, Msg, Toast, ToastKind};
pub use config::{Config, Endpoints, HomeLocation};
pub use error::{FetchError, LocationError, ResolveError};
pub use location::{Geolocator, LocationResolver, PositionOptions, StaticGeolocator};
pub use model::{CitySuggestion, Coordinates, Place, WeatherQuery, WeatherSnapshot};
pub use provider::{CityGeocoder, ReverseGeocoder, WeatherProvider};
pub use runtime::{Runtime, Services};
pub use theme::{DocumentStyle, FileThemeStore, Theme, ThemeStorage};
