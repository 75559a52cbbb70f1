use thiserror::Error;

/// Failures produced by the geocoding, forecast and normalization stages.
///
/// None of these are retried inside the core; the orchestrator converts them
/// into a [`crate::orchestrator::SearchFailure`] for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The query resolved to zero places (user-correctable).
    #[error("Place not found: {0}")]
    NotFound(String),

    /// Network, HTTP status or timeout failure (transient).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a structurally incomplete payload.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl WeatherError {
    /// Only transport failures are worth a manual re-submit.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WeatherError::Transport(_))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherError::MalformedPayload(err.to_string())
        } else {
            WeatherError::Transport(err.to_string())
        }
    }
}
