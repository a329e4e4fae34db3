//! Unified MCP server exposing every tool in one handler.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::*,
    ErrorData as McpError,
};
use rmcp_material::{CorePaletteParams, SchemeParams};
use rmcp_weather::{AlertsParams, ForecastParams, NwsClient};

#[derive(Debug, Clone)]
pub struct McuServer {
    pub tool_router: ToolRouter<Self>,
    nws: NwsClient,
}

impl Default for McuServer {
    fn default() -> Self {
        Self::new(NwsClient::default())
    }
}

impl McuServer {
    /// The NWS client is cheap to clone and shares its connection pool.
    pub fn new(nws: NwsClient) -> Self {
        Self {
            tool_router: Self::tool_router(),
            nws,
        }
    }
}

#[rmcp::tool_router]
impl McuServer {
    // ========================================================================
    // WEATHER
    // ========================================================================

    #[rmcp::tool(name = "get-alerts", description = "Get weather alerts for a state")]
    pub async fn get_alerts(
        &self,
        Parameters(params): Parameters<AlertsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(state = %params.state, "get-alerts");
        Ok(rmcp_weather::alerts_tool(&self.nws, params).await)
    }

    #[rmcp::tool(name = "get-forecast", description = "Get weather forecast for a location")]
    pub async fn get_forecast(
        &self,
        Parameters(params): Parameters<ForecastParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(latitude = params.latitude, longitude = params.longitude, "get-forecast");
        Ok(rmcp_weather::forecast_tool(&self.nws, params).await)
    }

    // ========================================================================
    // MATERIAL COLOR
    // ========================================================================

    #[rmcp::tool(
        description = "Generate a Material Design color scheme using Material Color Utilities, by receiving a seed color and a category"
    )]
    pub async fn generate_material_scheme_by_category(
        &self,
        Parameters(params): Parameters<SchemeParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(seed = %params.seed_color, category = %params.category, "generate_material_scheme_by_category");
        Ok(rmcp_material::scheme_tool(params))
    }

    #[rmcp::tool(description = "Generate the six key colors from Material Color Utilities CorePalette")]
    pub async fn generate_corepalette_colors(
        &self,
        Parameters(params): Parameters<CorePaletteParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(seed = %params.seed_color, "generate_corepalette_colors");
        Ok(rmcp_material::core_palette_tool(params))
    }
}

#[rmcp::tool_handler]
impl ServerHandler for McuServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Weather alerts and forecasts from the US National Weather Service, \
                 plus Material Design color schemes and core palettes generated from a seed color."
                    .into(),
            ),
        }
    }
}
