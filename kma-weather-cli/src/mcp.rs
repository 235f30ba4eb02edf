//! MCP tool server.
//!
//! Exposes `get_current_weather` over Model Context Protocol on stdin/stdout.

use std::sync::Arc;

use kma_weather_core::{WeatherOutcome, WeatherProvider, location::DEFAULT_LOCATION};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWeatherArgs {
    /// Region name in Korean or English (e.g. "부산", "Busan", "충남")
    #[serde(default = "default_city")]
    pub city: String,
}

fn default_city() -> String {
    DEFAULT_LOCATION.to_string()
}

/// Weather MCP server backed by a [`WeatherProvider`].
#[derive(Clone)]
pub struct WeatherMcpServer {
    provider: Arc<dyn WeatherProvider>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WeatherMcpServer {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Get the current observed weather for a Korean region. Returns temperature, \
                       1h rainfall, humidity, precipitation type and wind."
    )]
    async fn get_current_weather(
        &self,
        Parameters(args): Parameters<GetWeatherArgs>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        tracing::info!(city = %args.city, "get_current_weather called");

        let outcome = self.provider.current_weather(&args.city).await;
        let text = serde_json::to_string_pretty(&outcome)
            .map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None))?;

        match &outcome {
            WeatherOutcome::Weather(_) => Ok(CallToolResult::success(vec![Content::text(text)])),
            WeatherOutcome::Error(err) => {
                tracing::warn!(city = %args.city, error = %err.message, "lookup returned an error");
                Ok(CallToolResult::error(vec![Content::text(text)]))
            }
        }
    }
}

impl WeatherMcpServer {
    /// Serve on stdin/stdout until the client disconnects.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!("MCP server ready, listening on stdio");
        self.serve(rmcp::transport::stdio()).await?.waiting().await?;
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for WeatherMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Current weather for Korean regions from the KMA ultra-short-term \
                 observation service. Call get_current_weather with a region name; \
                 unknown names fall back to 서울."
                    .into(),
            ),
        }
    }
}
