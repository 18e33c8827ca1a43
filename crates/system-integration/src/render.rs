//! State handed to the rendering layer

use serde::Serialize;
use std::sync::Arc;
use viz_house_shared::{ChartsError, SeriesDescriptor};

/// Height and width used when the caller does not size the chart
pub const DEFAULT_DIMENSION: &str = "inherit";

/// Invoked with the current props every time they change
pub type RenderCallback = Arc<dyn Fn(&RenderProps) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProps {
    pub height: String,
    pub width: String,
    pub is_loading: bool,
    /// Empty unless the latest cycle failed
    pub error_message: String,
    /// Failure of the latest cycle, for callers that branch on the kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ChartsError>,
    pub series: Vec<SeriesDescriptor>,
}

impl Default for RenderProps {
    fn default() -> Self {
        Self {
            height: DEFAULT_DIMENSION.to_string(),
            width: DEFAULT_DIMENSION.to_string(),
            is_loading: false,
            error_message: String::new(),
            error: None,
            series: Vec::new(),
        }
    }
}

impl RenderProps {
    pub fn has_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}
