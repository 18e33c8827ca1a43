//! Remote chart sessions for Viz House
//!
//! Ties the fetcher, the query-result transformer and the auto-refresh
//! configuration together into a [`RemoteChart`]: one initial
//! fetch-and-transform cycle, an optional recurring cycle, and render
//! state published to subscribers after every change.

pub mod lifecycle;
pub mod refresh;
pub mod render;

pub use lifecycle::{PhaseTracker, RefreshPhase, RefreshStats};
pub use refresh::RemoteChart;
pub use render::{RenderCallback, RenderProps, DEFAULT_DIMENSION};

use thiserror::Error;
use viz_house_config::ConfigError;
use viz_house_shared::ChartsError;

/// Remote chart session errors
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error(transparent)]
    Charts(#[from] ChartsError),
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
