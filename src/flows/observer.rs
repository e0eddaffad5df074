use super::{FlowKind, FlowState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Error,
}

/// One structured record emitted while a flow call runs.
#[derive(Debug, Clone, Serialize)]
pub struct FlowEvent {
    pub call_id: Uuid,
    pub flow: FlowKind,
    pub level: EventLevel,
    pub stage: FlowState,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

impl FlowEvent {
    pub fn info(
        call_id: Uuid,
        flow: FlowKind,
        stage: FlowState,
        message: impl Into<String>,
    ) -> Self {
        Self::new(call_id, flow, EventLevel::Info, stage, message.into())
    }

    pub fn error(
        call_id: Uuid,
        flow: FlowKind,
        stage: FlowState,
        message: impl Into<String>,
    ) -> Self {
        Self::new(call_id, flow, EventLevel::Error, stage, message.into())
    }

    fn new(
        call_id: Uuid,
        flow: FlowKind,
        level: EventLevel,
        stage: FlowState,
        message: String,
    ) -> Self {
        Self {
            call_id,
            flow,
            level,
            stage,
            message,
            recorded_at: Utc::now(),
        }
    }
}

/// Sink for flow events, injected into the runner.
pub trait FlowObserver: Send + Sync {
    fn record(&self, event: FlowEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FlowObserver for TracingObserver {
    fn record(&self, event: FlowEvent) {
        match event.level {
            EventLevel::Info => info!(
                call_id = %event.call_id,
                flow = %event.flow,
                stage = %event.stage,
                "{}",
                event.message
            ),
            EventLevel::Error => error!(
                call_id = %event.call_id,
                flow = %event.flow,
                stage = %event.stage,
                "{}",
                event.message
            ),
        }
    }
}

/// Truncates to `max_chars` characters, marking the cut with an ellipsis.
pub fn summarize(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
