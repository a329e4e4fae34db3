use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler, wrapper::Parameters},
    model::*,
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod category;
pub mod palette;
pub mod seed;

pub use category::{quoted_supported_categories, supported_categories, SchemeCategory};
pub use palette::{
    generate_color_scheme, generate_core_palette_colors, CorePaletteColors, SchemeColors,
    SchemeOptions,
};
pub use seed::{ensure_hash_prefix, parse_seed};

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("Invalid seed color {0:?}: expected #RRGGBB or #AARRGGBB")]
    InvalidSeed(String),
    #[error(
        "Unsupported color scheme category: \"{0}\". Supported categories: {}.",
        quoted_supported_categories()
    )]
    UnsupportedCategory(String),
    #[error("Contrast level must be between -1 and 1, got {0}")]
    ContrastOutOfRange(f64),
}

// Tool parameter structs
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemeParams {
    #[schemars(
        description = "Seed color hex code (e.g. #6200EE)",
        regex(pattern = r"^#?(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
    )]
    pub seed_color: String,
    #[schemars(
        length(min = 1),
        description = "Material color scheme category. Supported categories: \"content\", \"expressive\", \"fidelity\", \"fruit-salad\", \"monochrome\", \"neutral\", \"rainbow\", \"tonal-spot\", \"vibrant\""
    )]
    pub category: String,
    #[schemars(description = "Generate the dark variant of the scheme (default false)")]
    #[serde(default)]
    pub dark_mode: Option<bool>,
    #[schemars(description = "Contrast level from -1 (reduced) to 1 (high), default 0")]
    #[serde(default)]
    pub contrast_level: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorePaletteParams {
    #[schemars(
        description = "Seed color hex code (e.g. #6200EE)",
        regex(pattern = r"^#?(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
    )]
    pub seed_color: String,
}

fn json_result<T: Serialize>(value: &T, failure: &str) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(format!("{}: {}", failure, e))]),
    }
}

/// Run the `generate_material_scheme_by_category` tool.
pub fn scheme_tool(params: SchemeParams) -> CallToolResult {
    const FAILURE: &str = "Failed to generate color scheme";

    let options = SchemeOptions {
        seed_color: ensure_hash_prefix(&params.seed_color),
        category: params.category,
        dark_mode: params.dark_mode.unwrap_or(false),
        contrast_level: params.contrast_level.unwrap_or(0.0),
    };

    match generate_color_scheme(&options) {
        Ok(colors) => json_result(&colors, FAILURE),
        Err(e) => {
            tracing::warn!(error = %e, "color scheme request rejected");
            CallToolResult::error(vec![Content::text(format!("{}: {}", FAILURE, e))])
        }
    }
}

/// Run the `generate_corepalette_colors` tool.
pub fn core_palette_tool(params: CorePaletteParams) -> CallToolResult {
    const FAILURE: &str = "Failed to generate core palette colors";

    match generate_core_palette_colors(&ensure_hash_prefix(&params.seed_color)) {
        Ok(colors) => json_result(&colors, FAILURE),
        Err(e) => {
            tracing::warn!(error = %e, "core palette request rejected");
            CallToolResult::error(vec![Content::text(format!("{}: {}", FAILURE, e))])
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaterialServer {
    pub tool_router: ToolRouter<Self>,
}

impl Default for MaterialServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialServer {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

#[rmcp::tool_router]
impl MaterialServer {
    #[rmcp::tool(
        description = "Generate a Material Design color scheme using Material Color Utilities, by receiving a seed color and a category"
    )]
    pub async fn generate_material_scheme_by_category(
        &self,
        Parameters(params): Parameters<SchemeParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(scheme_tool(params))
    }

    #[rmcp::tool(description = "Generate the six key colors from Material Color Utilities CorePalette")]
    pub async fn generate_corepalette_colors(
        &self,
        Parameters(params): Parameters<CorePaletteParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(core_palette_tool(params))
    }
}

#[rmcp::tool_handler]
impl ServerHandler for MaterialServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("Material Design color schemes and core palettes from a seed color".into()),
        }
    }
}
