//! Crate-wide error type.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Malformed request; fatal, no partial result is produced.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Dijkstra settled every reachable node without reaching the target.
    #[error("no path found between graph nodes {from} and {to}")]
    NoPathFound { from: usize, to: usize },
    /// A query point could not be snapped to the graph.
    #[error("no graph node within {radius_km} km of ({latitude}, {longitude})")]
    NoNearbyNode {
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    },
    #[error("routing provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable(message.into())
    }

    /// Whether the failure concerns the external routing provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Http(_))
    }
}
