use super::types::ApiError;
use crate::flows::{
    AssistantResponse, ContentRelevance, FlowRunner, PersonalAssistant, RelevanceResponse,
    SceneDescription, SceneResponse,
};
use axum::{body::Bytes, extract::State, response::Json};
use serde_json::{Map, Value, json};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub flows: FlowRunner,
}

pub async fn relevance(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelevanceResponse>, ApiError> {
    let body = parse_body(&body)?;

    if is_blank(body.get("query")) || is_blank(body.get("content")) {
        return Err(ApiError::BadRequest(
            "Both query and content are required".to_string(),
        ));
    }

    info!("Received content relevance request");
    let input = select_fields(&body, &["query", "content"]);
    Ok(Json(state.flows.run::<ContentRelevance>(input).await))
}

pub async fn scene_description(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SceneResponse>, ApiError> {
    let mut body = parse_body(&body)?;

    if is_blank(body.get("photoDataUri")) {
        return Err(ApiError::BadRequest("photoDataUri is required".to_string()));
    }
    let is_image_uri = matches!(
        body.get("photoDataUri"),
        Some(Value::String(uri)) if uri.starts_with("data:image/")
    );
    if !is_image_uri {
        return Err(ApiError::BadRequest(
            "photoDataUri must be a valid base64-encoded image data URI".to_string(),
        ));
    }

    // Older clients send the previous description under its original name.
    if body.get("previousDescription").is_none_or(Value::is_null) {
        if let Some(previous) = body.remove("previousDetailedDescription") {
            body.insert("previousDescription".to_string(), previous);
        }
    }

    info!("Received scene description request");
    let input = select_fields(&body, &["photoDataUri", "previousDescription"]);
    Ok(Json(state.flows.run::<SceneDescription>(input).await))
}

pub async fn assistant(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AssistantResponse>, ApiError> {
    let body = parse_body(&body)?;

    if is_blank(body.get("speech")) {
        return Err(ApiError::BadRequest("speech is required".to_string()));
    }

    info!("Received personal assistant request");
    let input = select_fields(&body, &["speech", "location"]);
    Ok(Json(state.flows.run::<PersonalAssistant>(input).await))
}

/// CORS preflight. The allow-* headers are added by the router layers.
pub async fn preflight() -> Json<Value> {
    Json(json!({}))
}

fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(body)) => Ok(body),
        Ok(other) => Err(ApiError::Transport(format!(
            "Expected a JSON object body, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ApiError::Transport(format!("Invalid JSON body: {}", e))),
    }
}

/// Missing or falsy: null, `""`, `false` and zero.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

fn select_fields(body: &Map<String, Value>, fields: &[&str]) -> Value {
    let selected = fields
        .iter()
        .filter_map(|&field| {
            body.get(field)
                .map(|value| (field.to_string(), value.clone()))
        })
        .collect::<Map<String, Value>>();
    Value::Object(selected)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
