//! National Weather Service client and text formatting.
//!
//! Every upstream failure is logged and folded into a plain-text message so
//! the tool layer can return it to the model as an ordinary result.

use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const NWS_API_BASE: &str = "https://api.weather.gov";
const USER_AGENT: &str = "weather-app/1.0";
const ACCEPT: &str = "application/geo+json";

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("state must be a two-letter code (e.g. CA, NY), got {0:?}")]
    InvalidState(String),
    #[error("latitude must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),
}

/// Trim and uppercase a two-letter state code.
pub fn normalize_state(state: &str) -> Result<String, WeatherError> {
    let trimmed = state.trim();
    if trimmed.chars().count() != 2 {
        return Err(WeatherError::InvalidState(state.to_string()));
    }
    Ok(trimmed.to_uppercase())
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(WeatherError::LatitudeOutOfRange(latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(WeatherError::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

// NWS GeoJSON response structures

#[derive(Debug, Deserialize)]
pub struct AlertsResponse {
    #[serde(default)]
    pub features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
pub struct AlertFeature {
    #[serde(default)]
    pub properties: AlertProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    pub event: Option<String>,
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub headline: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PointsResponse {
    #[serde(default)]
    pub properties: PointProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct PointProperties {
    pub forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub properties: ForecastProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub name: Option<String>,
    pub temperature: Option<f64>,
    pub temperature_unit: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub short_forecast: Option<String>,
}

fn field_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(fallback)
}

pub fn format_alert(feature: &AlertFeature) -> String {
    let props = &feature.properties;
    [
        format!("Event: {}", field_or(&props.event, "Unknown")),
        format!("Area: {}", field_or(&props.area_desc, "Unknown")),
        format!("Severity: {}", field_or(&props.severity, "Unknown")),
        format!("Status: {}", field_or(&props.status, "Unknown")),
        format!("Headline: {}", field_or(&props.headline, "No headline")),
        "---".to_string(),
    ]
    .join("\n")
}

pub fn format_period(period: &ForecastPeriod) -> String {
    let temperature = period
        .temperature
        .map(|t| t.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    [
        format!("{}:", field_or(&period.name, "Unknown")),
        format!(
            "Temperature: {}°{}",
            temperature,
            field_or(&period.temperature_unit, "F")
        ),
        format!(
            "Wind: {} {}",
            field_or(&period.wind_speed, "Unknown"),
            field_or(&period.wind_direction, "")
        ),
        field_or(&period.short_forecast, "No forecast available").to_string(),
        "---".to_string(),
    ]
    .join("\n")
}

#[derive(Debug, Clone)]
pub struct NwsClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for NwsClient {
    fn default() -> Self {
        Self::new(NWS_API_BASE)
    }
}

impl NwsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON document, returning `None` on any transport, status or
    /// decoding failure.
    async fn request<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = match self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%url, error = %e, "NWS request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::error!(%url, status = %response.status(), "NWS returned an error status");
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!(%url, error = %e, "failed to parse NWS response");
                None
            }
        }
    }

    /// Active alerts for an already-normalized state code.
    pub async fn alerts(&self, state_code: &str) -> String {
        let url = format!(
            "{}/alerts?area={}",
            self.base_url,
            urlencoding::encode(state_code)
        );
        tracing::debug!(%url, "fetching alerts");

        let Some(data) = self.request::<AlertsResponse>(&url).await else {
            return "Failed to retrieve alerts data".to_string();
        };

        if data.features.is_empty() {
            return format!("No active alerts for {}", state_code);
        }

        let formatted: Vec<String> = data.features.iter().map(format_alert).collect();
        format!("Active alerts for {}:\n\n{}", state_code, formatted.join("\n"))
    }

    pub async fn forecast(&self, latitude: f64, longitude: f64) -> String {
        let points_url = format!("{}/points/{:.4},{:.4}", self.base_url, latitude, longitude);
        tracing::debug!(url = %points_url, "fetching grid point");

        let Some(points) = self.request::<PointsResponse>(&points_url).await else {
            return format!(
                "Failed to retrieve grid point data for coordinates: {}, {}. \
                 This location may not be supported by the NWS API (only US locations are supported).",
                latitude, longitude
            );
        };

        let Some(forecast_url) = points.properties.forecast.filter(|u| !u.is_empty()) else {
            return "Failed to get forecast URL from grid point data".to_string();
        };

        let Some(forecast) = self.request::<ForecastResponse>(&forecast_url).await else {
            return "Failed to retrieve forecast data".to_string();
        };

        let periods = &forecast.properties.periods;
        if periods.is_empty() {
            return "No forecast periods available".to_string();
        }

        let formatted: Vec<String> = periods.iter().map(format_period).collect();
        format!(
            "Forecast for {}, {}:\n\n{}",
            latitude,
            longitude,
            formatted.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn state_is_uppercased() {
        assert_eq!(normalize_state("ca").unwrap(), "CA");
        assert_eq!(normalize_state(" ny ").unwrap(), "NY");
    }

    #[test]
    fn state_must_be_two_chars() {
        assert!(matches!(
            normalize_state("cal"),
            Err(WeatherError::InvalidState(_))
        ));
        assert!(normalize_state("").is_err());
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert!(validate_coordinates(37.77, -122.42).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(matches!(
            validate_coordinates(91.0, 0.0),
            Err(WeatherError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            validate_coordinates(0.0, -180.5),
            Err(WeatherError::LongitudeOutOfRange(_))
        ));
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn alert_uses_placeholders_for_missing_fields() {
        let feature = AlertFeature {
            properties: AlertProperties {
                event: Some("Flood Warning".into()),
                ..Default::default()
            },
        };
        assert_eq!(
            format_alert(&feature),
            "Event: Flood Warning\nArea: Unknown\nSeverity: Unknown\nStatus: Unknown\nHeadline: No headline\n---"
        );
    }

    #[test]
    fn period_formatting() {
        let period = ForecastPeriod {
            name: Some("Tonight".into()),
            temperature: Some(54.0),
            temperature_unit: Some("F".into()),
            wind_speed: Some("5 mph".into()),
            wind_direction: Some("NW".into()),
            short_forecast: Some("Clear".into()),
        };
        assert_eq!(
            format_period(&period),
            "Tonight:\nTemperature: 54°F\nWind: 5 mph NW\nClear\n---"
        );

        let empty = format_period(&ForecastPeriod::default());
        assert_eq!(
            empty,
            "Unknown:\nTemperature: Unknown°F\nWind: Unknown \nNo forecast available\n---"
        );
    }

    #[tokio::test]
    async fn alerts_query_uses_state_code_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alerts"))
            .and(query_param("area", "CA"))
            .and(header("User-Agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [{
                    "properties": {
                        "event": "Heat Advisory",
                        "areaDesc": "Inland Empire",
                        "severity": "Moderate",
                        "status": "Actual",
                        "headline": "Heat Advisory until 8 PM"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NwsClient::new(server.uri());
        let text = client.alerts(&normalize_state("ca").unwrap()).await;

        assert!(text.starts_with("Active alerts for CA:\n\n"));
        assert!(text.contains("Event: Heat Advisory"));
        assert!(text.contains("Area: Inland Empire"));
        assert!(text.ends_with("---"));
    }

    #[tokio::test]
    async fn alerts_empty_and_failure() {
        let server = MockServer::start().await;
        Mock::given(path("/alerts"))
            .and(query_param("area", "NY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
            .mount(&server)
            .await;
        Mock::given(path("/alerts"))
            .and(query_param("area", "TX"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = NwsClient::new(server.uri());
        assert_eq!(client.alerts("NY").await, "No active alerts for NY");
        assert_eq!(client.alerts("TX").await, "Failed to retrieve alerts data");
    }

    #[tokio::test]
    async fn forecast_follows_points_link() {
        let server = MockServer::start().await;
        let forecast_url = format!("{}/gridpoints/MTR/85,105/forecast", server.uri());

        Mock::given(path("/points/37.7749,-122.4194"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "forecast": forecast_url }
            })))
            .mount(&server)
            .await;
        Mock::given(path("/gridpoints/MTR/85,105/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "periods": [
                    {
                        "name": "Today",
                        "temperature": 68,
                        "temperatureUnit": "F",
                        "windSpeed": "10 mph",
                        "windDirection": "W",
                        "shortForecast": "Sunny"
                    },
                    { "name": "Tonight", "temperature": 52 }
                ]}
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(server.uri());
        let text = client.forecast(37.7749, -122.4194).await;

        assert!(text.starts_with("Forecast for 37.7749, -122.4194:\n\n"));
        assert!(text.contains("Today:\nTemperature: 68°F\nWind: 10 mph W\nSunny\n---"));
        assert!(text.contains("Tonight:\nTemperature: 52°F\nWind: Unknown \nNo forecast available\n---"));
    }

    #[tokio::test]
    async fn forecast_failure_messages() {
        let server = MockServer::start().await;
        Mock::given(path("/points/10.0000,10.0000"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/points/20.0000,20.0000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "properties": {} })))
            .mount(&server)
            .await;
        Mock::given(path("/points/30.0000,30.0000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "forecast": format!("{}/empty", server.uri()) }
            })))
            .mount(&server)
            .await;
        Mock::given(path("/empty"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": { "periods": [] }
            })))
            .mount(&server)
            .await;

        let client = NwsClient::new(server.uri());

        let text = client.forecast(10.0, 10.0).await;
        assert!(text.starts_with("Failed to retrieve grid point data for coordinates: 10, 10."));
        assert_eq!(
            client.forecast(20.0, 20.0).await,
            "Failed to get forecast URL from grid point data"
        );
        assert_eq!(client.forecast(30.0, 30.0).await, "No forecast periods available");
    }
}
