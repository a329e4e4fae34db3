use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler, wrapper::Parameters},
    model::*,
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod nws;

pub use nws::{normalize_state, validate_coordinates, NwsClient, WeatherError, NWS_API_BASE};

// Tool parameter structs
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AlertsParams {
    #[schemars(description = "Two-letter state code (e.g. CA, NY)", length(min = 2, max = 2))]
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ForecastParams {
    #[schemars(description = "Latitude of the location", range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[schemars(description = "Longitude of the location", range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Run the `get-alerts` tool against a client.
pub async fn alerts_tool(client: &NwsClient, params: AlertsParams) -> CallToolResult {
    match normalize_state(&params.state) {
        Ok(code) => CallToolResult::success(vec![Content::text(client.alerts(&code).await)]),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

/// Run the `get-forecast` tool against a client.
pub async fn forecast_tool(client: &NwsClient, params: ForecastParams) -> CallToolResult {
    match validate_coordinates(params.latitude, params.longitude) {
        Ok(()) => CallToolResult::success(vec![Content::text(
            client.forecast(params.latitude, params.longitude).await,
        )]),
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

#[derive(Debug, Clone)]
pub struct WeatherServer {
    pub tool_router: ToolRouter<Self>,
    client: NwsClient,
}

impl Default for WeatherServer {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherServer {
    pub fn new() -> Self {
        Self::with_client(NwsClient::default())
    }

    pub fn with_client(client: NwsClient) -> Self {
        Self {
            tool_router: Self::tool_router(),
            client,
        }
    }
}

#[rmcp::tool_router]
impl WeatherServer {
    #[rmcp::tool(name = "get-alerts", description = "Get weather alerts for a state")]
    pub async fn get_alerts(
        &self,
        Parameters(params): Parameters<AlertsParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(alerts_tool(&self.client, params).await)
    }

    #[rmcp::tool(name = "get-forecast", description = "Get weather forecast for a location")]
    pub async fn get_forecast(
        &self,
        Parameters(params): Parameters<ForecastParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(forecast_tool(&self.client, params).await)
    }
}

#[rmcp::tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("Weather alerts and forecasts from the US National Weather Service".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[test]
    fn registers_both_tools() {
        let server = WeatherServer::new();
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert!(names.contains(&"get-alerts".to_string()));
        assert!(names.contains(&"get-forecast".to_string()));
    }

    #[test]
    fn input_schemas_carry_bounds() {
        let alerts = serde_json::to_value(schemars::schema_for!(AlertsParams)).unwrap();
        assert_eq!(alerts["properties"]["state"]["minLength"], 2);
        assert_eq!(alerts["properties"]["state"]["maxLength"], 2);

        let forecast = serde_json::to_value(schemars::schema_for!(ForecastParams)).unwrap();
        assert_eq!(forecast["properties"]["latitude"]["minimum"], -90.0);
        assert_eq!(forecast["properties"]["latitude"]["maximum"], 90.0);
        assert_eq!(forecast["properties"]["longitude"]["minimum"], -180.0);
        assert_eq!(forecast["properties"]["longitude"]["maximum"], 180.0);
    }

    #[tokio::test]
    async fn invalid_state_is_a_tool_error() {
        let client = NwsClient::new("http://127.0.0.1:9");
        let result = alerts_tool(&client, AlertsParams { state: "CAL".into() }).await;
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("two-letter"));
    }

    #[tokio::test]
    async fn out_of_range_latitude_is_a_tool_error() {
        let client = NwsClient::new("http://127.0.0.1:9");
        let result = forecast_tool(
            &client,
            ForecastParams {
                latitude: 120.0,
                longitude: 0.0,
            },
        )
        .await;
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("latitude"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_swallowed() {
        let client = NwsClient::new("http://127.0.0.1:9");
        let result = alerts_tool(&client, AlertsParams { state: "ca".into() }).await;
        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Failed to retrieve alerts data");
    }
}
