//! User-facing failure taxonomy.
//!
//! None of these are fatal: the presentation root turns each one into a
//! [`Toast`] and keeps whatever snapshot it already had.

use thiserror::Error;

use crate::app::Toast;

pub const DEFAULT_NOT_FOUND: &str = "Cidade não encontrada. Tente novamente.";
pub const CONNECTIVITY_MESSAGE: &str = "Não foi possível conectar ao serviço de clima.";

/// Failure of a single weather fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The provider answered with an error status. Holds the provider's own
    /// message, or [`DEFAULT_NOT_FOUND`] when it gave none.
    #[error("{0}")]
    Provider(String),

    #[error("weather request failed: {0}")]
    Connectivity(String),

    #[error("unreadable weather response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn to_toast(&self) -> Toast {
        match self {
            FetchError::Provider(message) => Toast::error("Erro", message),
            FetchError::Connectivity(_) | FetchError::Decode(_) => {
                Toast::error("Erro de conexão", CONNECTIVITY_MESSAGE)
            }
        }
    }
}

/// Platform geolocation error codes.
pub const PERMISSION_DENIED: u16 = 1;
pub const POSITION_UNAVAILABLE: u16 = 2;
pub const TIMEOUT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("geolocation is not available on this device")]
    Unsupported,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("geolocation failed with code {0}")]
    Other(u16),
}

impl LocationError {
    pub fn from_code(code: u16) -> Self {
        match code {
            PERMISSION_DENIED => LocationError::PermissionDenied,
            POSITION_UNAVAILABLE => LocationError::PositionUnavailable,
            TIMEOUT => LocationError::Timeout,
            other => LocationError::Other(other),
        }
    }

    pub fn to_toast(&self) -> Toast {
        match self {
            LocationError::Unsupported => Toast::error(
                "Geolocalização não suportada",
                "Seu dispositivo não suporta geolocalização.",
            ),
            LocationError::PermissionDenied => Toast::error(
                "Permissão negada",
                "Não foi possível acessar sua localização. Busque uma cidade manualmente.",
            ),
            LocationError::PositionUnavailable => Toast::error(
                "Localização indisponível",
                "Sem sinal de GPS. Verifique se a localização está ativada.",
            ),
            LocationError::Timeout => Toast::error(
                "Tempo esgotado",
                "A busca pela sua localização demorou demais. Tente novamente.",
            ),
            LocationError::Other(_) => Toast::error(
                "Erro de localização",
                "Ocorreu um erro ao obter sua localização.",
            ),
        }
    }
}

/// Anything that can stop a weather request from producing a snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Location(#[from] LocationError),
}

impl ResolveError {
    pub fn to_toast(&self) -> Toast {
        match self {
            ResolveError::Fetch(e) => e.to_toast(),
            ResolveError::Location(e) => e.to_toast(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_codes_map_to_distinct_messages() {
        let cases = [
            (PERMISSION_DENIED, LocationError::PermissionDenied),
            (POSITION_UNAVAILABLE, LocationError::PositionUnavailable),
            (TIMEOUT, LocationError::Timeout),
            (9, LocationError::Other(9)),
        ];
        for (code, expected) in cases {
            assert_eq!(LocationError::from_code(code), expected);
        }

        let denied = LocationError::PermissionDenied.to_toast();
        assert_eq!(denied.title, "Permissão negada");
        let unavailable = LocationError::PositionUnavailable.to_toast();
        assert!(unavailable.description.contains("GPS"));
        assert_eq!(LocationError::Timeout.to_toast().title, "Tempo esgotado");
        let other = LocationError::Other(9).to_toast();
        assert_eq!(other.title, "Erro de localização");
    }

    #[test]
    fn provider_message_is_shown_verbatim() {
        let toast = FetchError::Provider("city not found".into()).to_toast();
        assert_eq!(toast.description, "city not found");
    }

    #[test]
    fn transport_and_decode_share_connectivity_message() {
        let a = FetchError::Connectivity("refused".into()).to_toast();
        let b = FetchError::Decode("eof".into()).to_toast();
        assert_eq!(a, b);
        assert_eq!(a.description, CONNECTIVITY_MESSAGE);
    }
}
