//! Configuration validation utilities

use crate::{Authentication, RemoteChartConfig, Result};
use viz_house_shared::{ChartConfig, ChartsError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete remote chart configuration
    pub fn validate(config: &RemoteChartConfig) -> Result<()> {
        Self::validate_url(&config.url)?;
        Self::validate_authentication(&config.authentication)?;
        Self::validate_chart_config(&config.chart_config)?;

        if let Some(interval) = &config.auto_refresh {
            if interval.is_blank() {
                log::warn!("Empty auto-refresh interval, the chart will load once");
            } else if !interval.is_recognised() {
                log::warn!("Unrecognised auto-refresh interval '{interval}', using 30s");
            }
        }

        if config.request.format.trim().is_empty() {
            return Err(invalid("request.format", "Request format must not be empty"));
        }

        Ok(())
    }

    fn validate_url(raw: &str) -> Result<()> {
        let parsed =
            url::Url::parse(raw).map_err(|e| invalid("url", format!("Invalid url '{raw}': {e}")))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                "url",
                format!("Unsupported url scheme: {scheme}. Must be http or https"),
            )),
        }
    }

    fn validate_authentication(auth: &Authentication) -> Result<()> {
        match auth {
            Authentication::Basic { username, .. } if username.is_empty() => Err(invalid(
                "authentication.username",
                "Basic authentication requires a username",
            )),
            Authentication::Basic { username, .. } if username.contains(':') => Err(invalid(
                "authentication.username",
                "Basic authentication username must not contain ':'",
            )),
            Authentication::Basic { .. } => Ok(()),
        }
    }

    /// Validate the series configuration
    pub fn validate_chart_config(chart: &ChartConfig) -> Result<()> {
        if chart.series.is_empty() {
            return Err(invalid(
                "chart_config.series",
                "Chart configuration must contain at least one series",
            ));
        }

        for (index, series) in chart.series.iter().enumerate() {
            let label = series.label(index);

            if series.x_axis.column.is_empty() {
                return Err(invalid(
                    &format!("chart_config.series[{index}].x_axis"),
                    format!("{label}: x axis column must not be empty"),
                ));
            }
            if series.y_axis.column.is_empty() {
                return Err(invalid(
                    &format!("chart_config.series[{index}].y_axis"),
                    format!("{label}: y axis column must not be empty"),
                ));
            }
            if matches!(series.value.as_deref(), Some("")) {
                return Err(invalid(
                    &format!("chart_config.series[{index}].value"),
                    format!("{label}: value column must not be empty"),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> crate::ConfigError {
    ChartsError::invalid_config(field, message).into()
}
