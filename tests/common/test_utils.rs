use super::mocks::{MemoryObserver, StubModelClient};
use assistive_flows::{
    Result,
    config::{Config, LlmConfig, LogsConfig, ServerConfig},
    flows::{
        AssistantResponse, ContentRelevance, FlowKind, FlowRunner, PersonalAssistant,
        RelevanceResponse, SceneDescription, SceneResponse,
    },
    server::{self, handlers::AppState},
};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        llm: LlmConfig {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: "test-api-key".to_string(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            temperature: 0.7,
            timeout_secs: None,
        },
    }
}

/// Wire a runner around the given stub, returning the observer for assertions
pub fn create_runner(model: Arc<StubModelClient>) -> (FlowRunner, Arc<MemoryObserver>) {
    let observer = Arc::new(MemoryObserver::new());
    let runner = FlowRunner::new(model, observer.clone());
    (runner, observer)
}

/// Full router backed by the given stub
pub fn create_test_app(model: Arc<StubModelClient>) -> Router {
    let (flows, _) = create_runner(model);
    server::router(AppState { flows })
}

/// Runs any flow by kind and returns its response as JSON
pub async fn run_flow(runner: &FlowRunner, kind: FlowKind, input: Value) -> Value {
    let response = match kind {
        FlowKind::ContentRelevance => {
            let response: RelevanceResponse = runner.run::<ContentRelevance>(input).await;
            serde_json::to_value(response)
        }
        FlowKind::SceneDescription => {
            let response: SceneResponse = runner.run::<SceneDescription>(input).await;
            serde_json::to_value(response)
        }
        FlowKind::PersonalAssistant => {
            let response: AssistantResponse = runner.run::<PersonalAssistant>(input).await;
            serde_json::to_value(response)
        }
    };
    response.expect("responses always serialize")
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> Result<String> {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).await?;
    Ok(config_path.to_string_lossy().to_string())
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9090
  logs:
    level: "debug"
llm:
  base_url: "http://localhost:11434/v1"
  api_key: "sk-test"
  model: "gpt-4o-mini"
  system_prompt: "Always answer in JSON."
  temperature: 0.3
  timeout_secs: 20
"#;

/// Minimal configuration relying on defaults
pub const MINIMAL_CONFIG_YAML: &str = r#"
llm:
  api_key: "sk-minimal"
  model: "gpt-4o-mini"
"#;
